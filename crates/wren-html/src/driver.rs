//! The incremental document parser.
//!
//! [§ 13.2 Parsing HTML documents](https://html.spec.whatwg.org/multipage/parsing.html#parsing)
//!
//! [`DocumentParser`] owns a tokenizer and a tree builder and pushes input
//! through them in bounded slices. It never blocks: every call returns a
//! [`Progress`] telling the host what the parser is waiting for.
//!
//! ```text
//! feed ──► NeedInput ──► feed / finish
//!      ──► Suspended(Yield) ──► resume
//!      ──► Suspended(WaitingForScript) ──► script_loaded / script_failed
//!      ──► Done
//! ```
//!
//! While a `<script src>` is being fetched, fed input is queued behind the
//! script and run through the [`PreloadScanner`] so its resources can be
//! requested early.

use std::time::Duration;

use wren_dom::DomTree;

use crate::config::ParserConfig;
use crate::loader::{RecordingLoader, ResourceKind, ResourceLoader};
use crate::parser::{CompletedScript, HTMLParser, ParseIssue};
use crate::preload::{PreloadRequest, PreloadScanner};
use crate::tokenizer::HTMLTokenizer;

/// Why the parser stopped before consuming all of its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuspendReason {
    /// The slice budget is used up; call [`DocumentParser::resume`].
    Yield,
    /// An external script has to run first; report it with
    /// [`DocumentParser::script_loaded`] or [`DocumentParser::script_failed`].
    WaitingForScript {
        /// Resolved URL of the script.
        url: String,
    },
}

/// Result of driving the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// All input so far has been parsed; feed more or finish.
    NeedInput,
    /// Parsing stopped and can be resumed.
    Suspended(SuspendReason),
    /// The document is complete.
    Done,
}

/// Collects `document.write` output of a running script.
#[derive(Debug, Clone, Default)]
pub struct DocumentWriter {
    written: String,
}

impl DocumentWriter {
    /// Append markup. It is parsed right after the script's end tag.
    pub fn write(&mut self, markup: &str) {
        self.written.push_str(markup);
    }

    /// Everything written so far.
    #[must_use]
    pub fn written(&self) -> &str {
        &self.written
    }
}

/// Executes scripts for the parser.
pub trait ScriptRunner {
    /// Run `source`. `url` is set for external scripts; `base_line` is the
    /// line on which inline source starts.
    fn execute(
        &mut self,
        source: &str,
        url: Option<&str>,
        base_line: usize,
        writer: &mut DocumentWriter,
    );
}

/// A runner that ignores every script.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScripts;

impl ScriptRunner for NoScripts {
    fn execute(&mut self, _: &str, _: Option<&str>, _: usize, _: &mut DocumentWriter) {}
}

/// An external script the parser is blocked on.
#[derive(Debug, Clone)]
struct PendingScript {
    url: String,
}

/// Incremental parser front end.
pub struct DocumentParser<L: ResourceLoader, S: ScriptRunner> {
    config: ParserConfig,
    tokenizer: HTMLTokenizer,
    parser: HTMLParser,
    loader: L,
    runner: S,
    pending_script: Option<PendingScript>,
    /// Input that arrived while a script was pending.
    queued: String,
    input_finished: bool,
    scanner: Option<PreloadScanner>,
    yields: usize,
    done: bool,
}

impl<L: ResourceLoader, S: ScriptRunner> DocumentParser<L, S> {
    /// A parser for an empty document.
    #[must_use]
    pub fn new(config: ParserConfig, loader: L, runner: S) -> Self {
        let mut tokenizer = HTMLTokenizer::new(String::new());
        tokenizer.set_report_warnings(config.report_warnings);
        let parser = HTMLParser::with_config(&config);
        Self {
            config,
            tokenizer,
            parser,
            loader,
            runner,
            pending_script: None,
            queued: String::new(),
            input_finished: false,
            scanner: None,
            yields: 0,
            done: false,
        }
    }

    // =========================================================================
    // Host interface
    // =========================================================================

    /// Append a chunk of the document and parse as far as possible.
    pub fn feed(&mut self, chunk: &str) -> Progress {
        if self.done {
            return Progress::Done;
        }
        if self.pending_script.is_some() {
            self.queued.push_str(chunk);
            if let Some(scanner) = self.scanner.as_mut() {
                let hints = scanner.write(chunk);
                self.register_preloads(hints);
            }
            return self.status();
        }
        self.tokenizer.feed(chunk);
        self.pump()
    }

    /// Continue after a [`SuspendReason::Yield`].
    pub fn resume(&mut self) -> Progress {
        self.pump()
    }

    /// No more input will arrive.
    pub fn finish(&mut self) -> Progress {
        if self.done {
            return Progress::Done;
        }
        self.input_finished = true;
        if self.pending_script.is_some() {
            return self.status();
        }
        self.tokenizer.finish();
        self.pump()
    }

    /// Stop parsing. Open elements stay open and the document is closed as
    /// it is.
    pub fn abort(&mut self) {
        if self.done {
            return;
        }
        log::debug!(target: "wren::driver", "aborting");
        self.parser.abort();
        self.pending_script = None;
        self.scanner = None;
        self.queued.clear();
        self.done = true;
    }

    /// The script at `url` has arrived. It runs and parsing continues.
    /// Reports for scripts the parser is not waiting on are ignored.
    pub fn script_loaded(&mut self, url: &str, source: &str) -> Progress {
        if !self.is_waiting_for(url) {
            return self.status();
        }
        self.run_script(source, Some(url), 1);
        self.unblock();
        self.pump()
    }

    /// The script at `url` could not be fetched. Parsing continues without
    /// it.
    pub fn script_failed(&mut self, url: &str) -> Progress {
        if !self.is_waiting_for(url) {
            return self.status();
        }
        log::warn!(target: "wren::driver", "script {url} failed to load");
        self.unblock();
        self.pump()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The document built so far.
    #[must_use]
    pub const fn document(&self) -> &DomTree {
        self.parser.tree()
    }

    /// Take the document out of the parser.
    #[must_use]
    pub fn into_document(self) -> DomTree {
        self.parser.into_tree()
    }

    /// Issues recorded by the tree builder.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        self.parser.issues()
    }

    /// The resource loader.
    #[must_use]
    pub const fn loader(&self) -> &L {
        &self.loader
    }

    /// The script runner.
    #[must_use]
    pub const fn runner(&self) -> &S {
        &self.runner
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// URL of the script the parser is blocked on.
    #[must_use]
    pub fn waiting_for(&self) -> Option<&str> {
        self.pending_script.as_ref().map(|script| script.url.as_str())
    }

    /// Whether the document is complete or aborted.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// How long the host should wait before resuming after a yield. The
    /// first yield gets the shorter delay so something shows early.
    #[must_use]
    pub const fn suggested_delay(&self) -> Duration {
        if self.yields <= 1 {
            Duration::from_millis(self.config.fast_yield_delay_ms)
        } else {
            Duration::from_millis(self.config.yield_delay_ms)
        }
    }

    // =========================================================================
    // Parsing loop
    // =========================================================================

    fn status(&self) -> Progress {
        if self.done {
            Progress::Done
        } else if let Some(script) = &self.pending_script {
            Progress::Suspended(SuspendReason::WaitingForScript {
                url: script.url.clone(),
            })
        } else {
            Progress::NeedInput
        }
    }

    /// Tokenize and build until input runs out, a script blocks, or the
    /// slice budget is spent.
    fn pump(&mut self) -> Progress {
        if self.done || self.pending_script.is_some() {
            return self.status();
        }
        let slice_start = self.tokenizer.chars_consumed();

        loop {
            let Some(token) = self.tokenizer.next_token() else {
                if self.input_finished || self.tokenizer.is_done() {
                    self.parser.finish();
                    self.done = true;
                    return Progress::Done;
                }
                return Progress::NeedInput;
            };
            self.parser.process_token(token);

            if let Some(script) = self.parser.take_completed_script()
                && self.handle_script(script)
            {
                return self.status();
            }

            let used = self.tokenizer.chars_consumed() - slice_start;
            if self.config.chunk_size > 0 && used >= self.config.chunk_size {
                self.yields += 1;
                log::trace!(target: "wren::driver", "yielding after {used} characters");
                return Progress::Suspended(SuspendReason::Yield);
            }
        }
    }

    /// Run an inline script, or block on an external one. Returns true when
    /// parsing has to stop.
    fn handle_script(&mut self, script: CompletedScript) -> bool {
        if !self.config.scripting_enabled {
            return false;
        }
        let src = script
            .src
            .as_deref()
            .map(wren_common::url::parse_url)
            .filter(|src| !src.is_empty());

        let Some(src) = src else {
            let base_line = self.tokenizer.script_line();
            self.run_script(&script.source, None, base_line);
            return false;
        };

        let url = self.config.resolve(&src);
        let _ = self.loader.request(&url, ResourceKind::Script);
        log::debug!(target: "wren::driver", "waiting for script {url}");

        if self.config.preload_scanning {
            let mut scanner = PreloadScanner::new(&self.config);
            let hints = scanner.write(self.tokenizer.pending_input());
            self.register_preloads(hints);
            self.scanner = Some(scanner);
        }
        self.pending_script = Some(PendingScript { url });
        true
    }

    fn run_script(&mut self, source: &str, url: Option<&str>, base_line: usize) {
        let mut writer = DocumentWriter::default();
        self.runner.execute(source, url, base_line, &mut writer);
        if !writer.written.is_empty() {
            log::trace!(target: "wren::driver", "script wrote {} bytes", writer.written.len());
            self.tokenizer.insert(&writer.written);
        }
    }

    fn is_waiting_for(&self, url: &str) -> bool {
        self.pending_script
            .as_ref()
            .is_some_and(|script| script.url == url)
    }

    /// Drop the pending script and move queued input into the tokenizer,
    /// behind anything the script wrote.
    fn unblock(&mut self) {
        self.pending_script = None;
        self.scanner = None;
        let queued = std::mem::take(&mut self.queued);
        if !queued.is_empty() {
            self.tokenizer.feed(&queued);
        }
        if self.input_finished {
            self.tokenizer.finish();
        }
    }

    fn register_preloads(&mut self, hints: Vec<PreloadRequest>) {
        for hint in hints {
            let handle = self.loader.request(&hint.url, hint.kind);
            self.loader.register_preload(handle);
        }
    }
}

/// Parse a complete document without running scripts.
#[must_use]
pub fn parse_document(html: &str) -> DomTree {
    parse_document_with(html, &ParserConfig::default())
}

/// Parse a complete document with `config`, without running scripts.
/// External scripts are treated as failed fetches.
#[must_use]
pub fn parse_document_with(html: &str, config: &ParserConfig) -> DomTree {
    let mut parser = DocumentParser::new(config.clone(), RecordingLoader::new(), NoScripts);
    run_to_completion(&mut parser, html);
    parser.into_document()
}

/// Feed `html` and drive `parser` until the document is done, skipping
/// every external script.
pub fn run_to_completion<L: ResourceLoader, S: ScriptRunner>(
    parser: &mut DocumentParser<L, S>,
    html: &str,
) {
    let mut progress = parser.feed(html);
    loop {
        progress = match progress {
            Progress::Done => break,
            Progress::NeedInput => parser.finish(),
            Progress::Suspended(SuspendReason::Yield) => parser.resume(),
            Progress::Suspended(SuspendReason::WaitingForScript { url }) => {
                parser.script_failed(&url)
            }
        };
    }
}
