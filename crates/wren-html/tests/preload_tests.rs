//! Integration tests for the speculative preload scanner.

use wren_html::{ParserConfig, PreloadRequest, PreloadScanner, ResourceKind};

/// Helper to scan one chunk with the default configuration
fn scan(html: &str) -> Vec<PreloadRequest> {
    PreloadScanner::new(&ParserConfig::default()).write(html)
}

fn request(url: &str, kind: ResourceKind) -> PreloadRequest {
    PreloadRequest {
        url: url.to_string(),
        kind,
    }
}

#[test]
fn test_finds_scripts_images_and_stylesheets() {
    let found = scan(
        "<script src=\"a.js\"></script><img src=b.png><link rel=stylesheet href=c.css><image src='d.gif'>",
    );
    assert_eq!(
        found,
        vec![
            request("a.js", ResourceKind::Script),
            request("b.png", ResourceKind::Image),
            request("c.css", ResourceKind::Stylesheet),
            request("d.gif", ResourceKind::Image),
        ]
    );
}

#[test]
fn test_ignores_alternate_stylesheets_and_icons() {
    let found = scan(
        "<link rel=\"alternate stylesheet\" href=a.css><link rel=icon href=i.png><link href=x.css>",
    );
    assert!(found.is_empty());
}

#[test]
fn test_link_attribute_order_does_not_matter() {
    let found = scan("<link href=\"s.css\" REL=\"StyleSheet\">");
    assert_eq!(found, vec![request("s.css", ResourceKind::Stylesheet)]);
}

#[test]
fn test_urls_are_cleaned_and_resolved() {
    let config = ParserConfig {
        base_url: Some("http://example.com/dir/page.html".to_string()),
        ..ParserConfig::default()
    };
    let mut scanner = PreloadScanner::new(&config);
    let found = scanner.write("<img src=\" img/x.png \"><img src=http://cdn.test/y.png>");
    assert_eq!(
        found,
        vec![
            request("http://example.com/dir/img/x.png", ResourceKind::Image),
            request("http://cdn.test/y.png", ResourceKind::Image),
        ]
    );
}

#[test]
fn test_state_carries_across_chunks() {
    let mut scanner = PreloadScanner::new(&ParserConfig::default());
    assert!(scanner.write("<img sr").is_empty());
    assert_eq!(
        scanner.write("c=\"a.png\">"),
        vec![request("a.png", ResourceKind::Image)]
    );
}

#[test]
fn test_entity_split_across_chunks() {
    let mut scanner = PreloadScanner::new(&ParserConfig::default());
    assert!(scanner.write("<img src=\"a&am").is_empty());
    assert_eq!(
        scanner.write("p;b.png\">"),
        vec![request("a&b.png", ResourceKind::Image)]
    );
}

#[test]
fn test_numeric_entity_in_attribute() {
    let found = scan("<img src=\"a&#95;b.png\">");
    assert_eq!(found, vec![request("a_b.png", ResourceKind::Image)]);
}

#[test]
fn test_markup_inside_script_is_not_scanned() {
    let found = scan("<script>var s = \"<img src=no.png>\";</script><img src=yes.png>");
    assert_eq!(found, vec![request("yes.png", ResourceKind::Image)]);
}

#[test]
fn test_markup_inside_comment_is_not_scanned() {
    let found = scan("<!-- <img src=no.png> --><img src=yes.png>");
    assert_eq!(found, vec![request("yes.png", ResourceKind::Image)]);
}

#[test]
fn test_style_imports() {
    let found = scan(
        "<style>@import url(\"s.css\"); @import 't.css'; @import \"m.css\" screen; p { color: red }</style>",
    );
    assert_eq!(
        found,
        vec![
            request("s.css", ResourceKind::Stylesheet),
            request("t.css", ResourceKind::Stylesheet),
        ]
    );
}

#[test]
fn test_imports_in_css_comments_are_ignored() {
    let found = scan("<style>/* @import 'x.css'; */</style>");
    assert!(found.is_empty());
}

#[test]
fn test_noscript_follows_scripting_setting() {
    let html = "<noscript><img src=a.png></noscript>";
    assert!(scan(html).is_empty());

    let config = ParserConfig {
        scripting_enabled: false,
        ..ParserConfig::default()
    };
    let found = PreloadScanner::new(&config).write(html);
    assert_eq!(found, vec![request("a.png", ResourceKind::Image)]);
}

#[test]
fn test_plaintext_ends_scanning() {
    let found = scan("<plaintext><img src=a.png>");
    assert!(found.is_empty());
}
