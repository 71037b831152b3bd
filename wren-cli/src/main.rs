//! Wren CLI
//!
//! Parse an HTML file or string and print what the engine made of it.
//!
//! ```text
//! wren page.html                  # DOM tree and parse issues
//! wren --mode tokens page.html    # token stream
//! wren --mode preload page.html   # resources the preload scanner finds
//! wren --mode json --html '<p>x'  # DOM tree as JSON
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use strum::IntoEnumIterator;
use strum_macros::Display;
use wren_dom::{DomTree, ParseMode};
use wren_html::{
    DocumentParser, HTMLTokenizer, NoScripts, NodeSnapshot, ParseIssue, ParserConfig,
    PreloadScanner, Progress, RecordingLoader, ResourceKind, SuspendReason, tree_to_string,
};

/// What to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
enum Mode {
    /// Indented DOM tree followed by parse issues
    Tree,
    /// One line per token
    Tokens,
    /// URLs found by the speculative preload scanner
    Preload,
    /// The DOM tree as JSON
    Json,
}

/// Wren - error-tolerant HTML ingestion
#[derive(Parser, Debug)]
#[command(name = "wren")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the DOM tree of a file
    wren ./index.html

    # Parse inline HTML
    wren --html '<table><tr><td>x</table>'

    # Dump the tree as JSON with scripting disabled
    wren --mode json --no-scripting ./index.html

    # Feed the document in 64 byte slices with a small work budget
    wren --feed-size 64 --chunk-size 128 ./index.html

    # Show debug logging of recovery decisions
    RUST_LOG=wren=debug wren ./index.html
"#)]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this HTML string instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// What to print
    #[arg(short, long, value_enum, default_value_t = Mode::Tree)]
    mode: Mode,

    /// JSON parser configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Treat scripting as disabled (parse <noscript> content)
    #[arg(long)]
    no_scripting: bool,

    /// Base URL for resolving script and preload URLs
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Characters tokenized per step before the parser yields (0 = never)
    #[arg(long, value_name = "N")]
    chunk_size: Option<usize>,

    /// Feed the input in slices of this many bytes
    #[arg(long, value_name = "BYTES")]
    feed_size: Option<usize>,

    /// Do not print engine warnings
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = build_config(&cli)?;
    let html = read_input(&cli)?;
    log::debug!(target: "wren::cli", "mode {}, {} bytes of input", cli.mode, html.len());

    match cli.mode {
        Mode::Tree => {
            let run = parse(&html, &config, cli.feed_size);
            print_document(&run);
        }
        Mode::Tokens => print_tokens(&html, &config),
        Mode::Preload => print_preloads(&html, &config),
        Mode::Json => {
            let run = parse(&html, &config, cli.feed_size);
            let snapshot = NodeSnapshot::from_tree(&run.tree);
            let json = serde_json::to_string_pretty(&snapshot)
                .context("failed to serialize the document")?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Load the configuration file, if any, and apply flag overrides.
fn build_config(cli: &Cli) -> Result<ParserConfig> {
    let mut config = match &cli.config {
        Some(path) => ParserConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => ParserConfig::default(),
    };
    if cli.no_scripting {
        config.scripting_enabled = false;
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = Some(base_url.clone());
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = chunk_size;
    }
    if cli.quiet {
        config.report_warnings = false;
    }
    Ok(config)
}

fn read_input(cli: &Cli) -> Result<String> {
    if let Some(html) = &cli.html {
        Ok(html.clone())
    } else if let Some(path) = &cli.path {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    } else {
        anyhow::bail!("expected a file path or --html")
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// The outcome of a full parse.
struct ParseRun {
    tree: DomTree,
    issues: Vec<ParseIssue>,
    loader: RecordingLoader,
    yields: usize,
    skipped_scripts: Vec<String>,
}

/// Drive a [`DocumentParser`] to completion, feeding `html` in slices of
/// `feed_size` bytes. External scripts are reported as failed fetches.
fn parse(html: &str, config: &ParserConfig, feed_size: Option<usize>) -> ParseRun {
    let mut parser = DocumentParser::new(config.clone(), RecordingLoader::new(), NoScripts);
    let mut yields = 0;
    let mut skipped_scripts = Vec::new();

    let mut drive = |parser: &mut DocumentParser<RecordingLoader, NoScripts>,
                     mut progress: Progress| {
        loop {
            progress = match progress {
                Progress::NeedInput | Progress::Done => return,
                Progress::Suspended(SuspendReason::Yield) => {
                    yields += 1;
                    parser.resume()
                }
                Progress::Suspended(SuspendReason::WaitingForScript { url }) => {
                    log::info!(target: "wren::cli", "not fetching script {url}");
                    let progress = parser.script_failed(&url);
                    skipped_scripts.push(url);
                    progress
                }
            };
        }
    };

    for slice in slices(html, feed_size.unwrap_or(0)) {
        let progress = parser.feed(slice);
        drive(&mut parser, progress);
    }
    let progress = parser.finish();
    drive(&mut parser, progress);

    let issues = parser.issues().to_vec();
    let loader = parser.loader().clone();
    ParseRun {
        tree: parser.into_document(),
        issues,
        loader,
        yields,
        skipped_scripts,
    }
}

/// Split `text` into pieces of about `size` bytes on character boundaries.
/// A size of zero yields the whole text.
fn slices(text: &str, size: usize) -> Vec<&str> {
    if size == 0 {
        return vec![text];
    }
    let mut pieces = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = size.min(rest.len());
        while !rest.is_char_boundary(end) {
            end += 1;
        }
        let (piece, tail) = rest.split_at(end);
        pieces.push(piece);
        rest = tail;
    }
    pieces
}

// =============================================================================
// Output
// =============================================================================

fn print_document(run: &ParseRun) {
    println!("{}", "=== DOM Tree ===".bold());
    print!("{}", tree_to_string(&run.tree));

    let mode = match run.tree.parse_mode() {
        Some(ParseMode::Strict) => "strict",
        Some(ParseMode::AlmostStandards) => "almost standards",
        Some(ParseMode::Compat) | None => "compat",
    };
    println!("\n{}", "=== Document ===".bold());
    println!("  parse mode: {mode}");
    println!("  yields: {}", run.yields);

    if !run.skipped_scripts.is_empty() {
        println!("\n{}", "=== Skipped Scripts ===".bold());
        for url in &run.skipped_scripts {
            println!("  - {url}");
        }
    }

    let preloads = run.loader.preloads();
    if !preloads.is_empty() {
        println!("\n{}", "=== Preloaded ===".bold());
        for request in preloads {
            println!("  - {} {}", request.kind, request.url);
        }
    }

    if !run.issues.is_empty() {
        println!("\n{}", "=== Parse Issues ===".bold());
        for issue in &run.issues {
            if issue.is_error {
                println!("  - {}", issue.red());
            } else {
                println!("  - {}", issue.yellow());
            }
        }
    }
}

fn print_tokens(html: &str, config: &ParserConfig) {
    let mut tokenizer = HTMLTokenizer::new(html.to_string());
    tokenizer.set_report_warnings(config.report_warnings);
    tokenizer.run();
    for token in tokenizer.into_tokens() {
        println!("{token}");
    }
}

fn print_preloads(html: &str, config: &ParserConfig) {
    let found = PreloadScanner::new(config).write(html);
    for request in &found {
        println!("{:<10} {}", request.kind.to_string(), request.url);
    }
    let counts: Vec<String> = ResourceKind::iter()
        .map(|kind| {
            let n = found.iter().filter(|r| r.kind == kind).count();
            format!("{n} {kind}")
        })
        .collect();
    println!("\n{}", counts.join(", ").dimmed());
}
