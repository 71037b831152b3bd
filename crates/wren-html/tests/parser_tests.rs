//! Integration tests for the HTML parser.

use wren_dom::{DomTree, NodeId, NodeType, ParseMode};
use wren_html::parser::subtree_to_string;
use wren_html::{HTMLParser, HTMLTokenizer, ParseIssue, ParserConfig, parse_document};

/// Helper to parse HTML and return the DOM tree
fn parse(html: &str) -> DomTree {
    parse_document(html)
}

/// Helper to parse HTML straight through the tree builder and keep the issues
fn parse_with_issues(html: &str) -> (DomTree, Vec<ParseIssue>) {
    let mut tokenizer = HTMLTokenizer::new(html.to_string());
    tokenizer.set_report_warnings(false);
    tokenizer.run();
    HTMLParser::new().run_with_issues(tokenizer.into_tokens())
}

/// Helper to get element by tag name (first match, depth-first)
fn find_element(tree: &DomTree, from: NodeId, tag: &str) -> Option<NodeId> {
    if let Some(data) = tree.as_element(from)
        && data.tag_name == tag
    {
        return Some(from);
    }
    for &child_id in tree.children(from) {
        if let Some(found) = find_element(tree, child_id, tag) {
            return Some(found);
        }
    }
    None
}

/// Helper to count elements with a tag name
fn count(tree: &DomTree, tag: &str) -> usize {
    tree.descendants(NodeId::ROOT)
        .filter(|&id| tree.as_element(id).is_some_and(|e| e.tag_name == tag))
        .count()
}

/// Helper to get text content of a node (concatenated)
fn text_content(tree: &DomTree, id: NodeId) -> String {
    tree.text_content(id)
}

/// Helper to name the children of a node: tag names, `#text` or `#comment`
fn child_names(tree: &DomTree, id: NodeId) -> Vec<String> {
    tree.children(id)
        .iter()
        .map(|&child| match tree.get(child).map(|n| &n.node_type) {
            Some(NodeType::Element(data)) => data.tag_name.clone(),
            Some(NodeType::Text(_)) => "#text".to_string(),
            Some(NodeType::Comment(_)) => "#comment".to_string(),
            Some(NodeType::Doctype(_)) => "#doctype".to_string(),
            _ => "?".to_string(),
        })
        .collect()
}

/// Helper to dump the body subtree
fn body_dump(tree: &DomTree) -> String {
    let body = tree.body().expect("document has a body");
    subtree_to_string(tree, body, 0)
}

fn attribute<'a>(tree: &'a DomTree, id: NodeId, name: &str) -> Option<&'a str> {
    tree.as_element(id).and_then(|e| e.get_attribute(name))
}

// =============================================================================
// Document structure
// =============================================================================

#[test]
fn test_document_structure() {
    let tree = parse("<!DOCTYPE html><html><head></head><body></body></html>");

    assert!(matches!(
        tree.get(NodeId::ROOT).map(|n| &n.node_type),
        Some(NodeType::Document)
    ));
    assert_eq!(child_names(&tree, NodeId::ROOT), vec!["#doctype", "html"]);
    let html = tree.document_element().expect("html element");
    assert_eq!(child_names(&tree, html), vec!["head", "body"]);
}

#[test]
fn test_implied_html_and_body() {
    let tree = parse("<p>Hello</p>");
    let html = tree.document_element().expect("html element");
    // No head is created when nothing needs one.
    assert_eq!(child_names(&tree, html), vec!["body"]);
    assert_eq!(body_dump(&tree), "<body>\n  <p>\n    \"Hello\"\n");
}

#[test]
fn test_list_items_close_each_other() {
    let tree = parse("<ul><li>a<li>b</ul>");
    assert_eq!(
        wren_html::tree_to_string(&tree),
        "Document\n  <html>\n    <body>\n      <ul>\n        <li>\n          \"a\"\n        <li>\n          \"b\"\n"
    );
}

#[test]
fn test_title_creates_head() {
    let tree = parse("<title>T</title><p>x");
    let html = tree.document_element().expect("html element");
    assert_eq!(child_names(&tree, html), vec!["head", "body"]);
    let head = tree.head().expect("head");
    assert_eq!(child_names(&tree, head), vec!["title"]);
    assert_eq!(text_content(&tree, head), "T");
}

#[test]
fn test_style_before_content_goes_to_head() {
    let tree = parse("<style>p{}</style><p>x");
    let head = tree.head().expect("head");
    let style = find_element(&tree, head, "style").expect("style in head");
    assert_eq!(text_content(&tree, style), "p{}");
}

#[test]
fn test_late_meta_moves_into_new_head() {
    let tree = parse("<p>x</p><meta charset=utf-8>");
    let html = tree.document_element().expect("html element");
    // The head is inserted in front of the existing body.
    assert_eq!(child_names(&tree, html), vec!["head", "body"]);
    let head = tree.head().expect("head");
    assert_eq!(child_names(&tree, head), vec!["meta"]);
}

#[test]
fn test_comment_before_html_stays_on_document() {
    let tree = parse("<!--c--><p>x");
    assert_eq!(child_names(&tree, NodeId::ROOT), vec!["#comment", "html"]);
}

#[test]
fn test_leading_whitespace_is_dropped() {
    let tree = parse("  \n<p>x");
    assert_eq!(child_names(&tree, NodeId::ROOT), vec!["html"]);
}

#[test]
fn test_second_title_is_skipped() {
    let tree = parse("<title>A</title><title>B</title><p>x");
    assert_eq!(count(&tree, "title"), 1);
    let head = tree.head().expect("head");
    assert_eq!(text_content(&tree, head), "A");
    assert_eq!(text_content(&tree, tree.body().expect("body")), "x");
}

#[test]
fn test_duplicate_body_merges_attributes() {
    let tree = parse("<body class=a><p>x<body id=b class=c>");
    assert_eq!(count(&tree, "body"), 1);
    let body = tree.body().expect("body");
    // Attributes already present win.
    assert_eq!(attribute(&tree, body, "class"), Some("a"));
    assert_eq!(attribute(&tree, body, "id"), Some("b"));
}

// =============================================================================
// Optional end tags and closing
// =============================================================================

#[test]
fn test_paragraph_closed_by_block() {
    let tree = parse("<p>a<div>b</div>");
    let body = tree.body().expect("body");
    assert_eq!(child_names(&tree, body), vec!["p", "div"]);
}

#[test]
fn test_definition_list_items() {
    let tree = parse("<dl><dt>a<dd>b<dt>c</dl>");
    let dl = find_element(&tree, NodeId::ROOT, "dl").expect("dl");
    assert_eq!(child_names(&tree, dl), vec!["dt", "dd", "dt"]);
    assert_eq!(text_content(&tree, dl), "abc");
}

#[test]
fn test_stray_close_paragraph_creates_empty_paragraph() {
    let tree = parse("<div></p></div>");
    let div = find_element(&tree, NodeId::ROOT, "div").expect("div");
    assert_eq!(child_names(&tree, div), vec!["p"]);
    assert!(tree.children(tree.children(div)[0]).is_empty());
}

#[test]
fn test_close_br_is_a_line_break_in_compat_mode() {
    let tree = parse("a</br>b");
    assert_eq!(count(&tree, "br"), 1);
    let body = tree.body().expect("body");
    assert_eq!(child_names(&tree, body), vec!["#text", "br", "#text"]);
}

#[test]
fn test_close_br_is_ignored_in_strict_mode() {
    let tree = parse("<!DOCTYPE html>a</br>b");
    assert_eq!(count(&tree, "br"), 0);
    assert_eq!(text_content(&tree, tree.body().expect("body")), "ab");
}

#[test]
fn test_new_anchor_closes_open_anchor() {
    let tree = parse("<a href=1>x<a href=2>y");
    let body = tree.body().expect("body");
    assert_eq!(child_names(&tree, body), vec!["a", "a"]);
}

#[test]
fn test_content_rejected_by_list_gets_item() {
    let tree = parse("<ul><option>x</ul>");
    let ul = find_element(&tree, NodeId::ROOT, "ul").expect("ul");
    assert_eq!(child_names(&tree, ul), vec!["li"]);
    let li = tree.children(ul)[0];
    assert_eq!(attribute(&tree, li, "style"), Some("list-style-type: none"));
    assert_eq!(text_content(&tree, li), "x");
    assert_eq!(count(&tree, "option"), 0);
}

// =============================================================================
// Residual style
// =============================================================================

#[test]
fn test_formatting_reopened_after_block_close() {
    let tree = parse("<p><b>x</p>y");
    assert_eq!(
        body_dump(&tree),
        "<body>\n  <p>\n    <b>\n      \"x\"\n  <b>\n    \"y\"\n"
    );
}

#[test]
fn test_formatting_close_across_block() {
    let tree = parse("<b>A<p>B</b>C</p>");
    assert_eq!(
        body_dump(&tree),
        "<body>\n  <b>\n    \"A\"\n  <p>\n    <b>\n      \"B\"\n    \"C\"\n"
    );
}

#[test]
fn test_text_after_crossing_close_is_unstyled_inside_block() {
    // The repair moves <p> out of the emptied <b>. <p> stays open, so Y
    // lands in it after the <b> clone, with no style.
    let tree = parse("<b><p>X</b>Y");
    assert_eq!(
        body_dump(&tree),
        "<body>\n  <b>\n  <p>\n    <b>\n      \"X\"\n    \"Y\"\n"
    );
}

// =============================================================================
// Tables
// =============================================================================

#[test]
fn test_implied_tbody() {
    let tree = parse("<table><tr><td>x</table>");
    let table = find_element(&tree, NodeId::ROOT, "table").expect("table");
    assert_eq!(child_names(&tree, table), vec!["tbody"]);
    let tbody = tree.children(table)[0];
    assert_eq!(child_names(&tree, tbody), vec!["tr"]);
    assert_eq!(text_content(&tree, table), "x");
}

#[test]
fn test_text_in_table_is_moved_before_it() {
    let tree = parse("<table>X<tr><td>Y</td></tr></table>");
    let body = tree.body().expect("body");
    assert_eq!(child_names(&tree, body), vec!["#text", "table"]);
    let td = find_element(&tree, body, "td").expect("td");
    assert_eq!(text_content(&tree, td), "Y");
}

#[test]
fn test_formatting_in_table_is_moved_before_it() {
    let tree = parse("<table><font>A</table></font>");
    let body = tree.body().expect("body");
    assert_eq!(child_names(&tree, body), vec!["font", "table"]);
    assert_eq!(count(&tree, "font"), 1);
    let font = tree.children(body)[0];
    assert_eq!(text_content(&tree, font), "A");
}

#[test]
fn test_hidden_input_is_moved_out_of_table() {
    let tree = parse("<table><input type=hidden name=a><tr><td>x</td></tr></table>");
    let body = tree.body().expect("body");
    assert_eq!(child_names(&tree, body), vec!["input", "table"]);
}

#[test]
fn test_table_inside_table_closes_first() {
    let tree = parse("<table><table>");
    let body = tree.body().expect("body");
    assert_eq!(child_names(&tree, body), vec!["table", "table"]);
}

#[test]
fn test_table_in_paragraph_depends_on_mode() {
    let quirky = parse("<p><table></table>");
    let p = find_element(&quirky, NodeId::ROOT, "p").expect("p");
    assert_eq!(child_names(&quirky, p), vec!["table"]);

    let strict = parse("<!DOCTYPE html><p><table></table>");
    let body = strict.body().expect("body");
    assert_eq!(child_names(&strict, body), vec!["p", "table"]);
}

// =============================================================================
// Special elements
// =============================================================================

#[test]
fn test_noscript_content_skipped_with_scripting() {
    let tree = parse("<noscript><p>a</p></noscript>b");
    let noscript = find_element(&tree, NodeId::ROOT, "noscript").expect("noscript");
    assert!(tree.children(noscript).is_empty());
    assert_eq!(text_content(&tree, tree.body().expect("body")), "b");
}

#[test]
fn test_noscript_content_parsed_without_scripting() {
    let config = ParserConfig {
        scripting_enabled: false,
        ..ParserConfig::default()
    };
    let tree = wren_html::parse_document_with("<noscript><p>a</p></noscript>b", &config);
    let noscript = find_element(&tree, NodeId::ROOT, "noscript").expect("noscript");
    assert_eq!(child_names(&tree, noscript), vec!["p"]);
    assert_eq!(text_content(&tree, tree.body().expect("body")), "ab");
}

#[test]
fn test_forms_do_not_nest() {
    let tree = parse("<form id=a><form id=b><input></form>");
    assert_eq!(count(&tree, "form"), 1);
    let form = find_element(&tree, NodeId::ROOT, "form").expect("form");
    assert_eq!(attribute(&tree, form, "id"), Some("a"));
    assert_eq!(child_names(&tree, form), vec!["input"]);
}

#[test]
fn test_area_finds_its_map() {
    let tree = parse("<map name=m><div><area href=x></div></map>");
    let map = find_element(&tree, NodeId::ROOT, "map").expect("map");
    let area = find_element(&tree, NodeId::ROOT, "area").expect("area");
    assert_eq!(tree.parent(area), Some(map));
}

#[test]
fn test_isindex_before_body() {
    let tree = parse("<isindex><p>x");
    let body = tree.body().expect("body");
    assert_eq!(child_names(&tree, body), vec!["form", "p"]);
    let form = tree.children(body)[0];
    assert_eq!(child_names(&tree, form), vec!["hr", "#text", "input", "hr"]);
    assert_eq!(
        text_content(&tree, form),
        "This is a searchable index. Enter search keywords: "
    );
    let input = tree.children(form)[2];
    assert_eq!(attribute(&tree, input, "name"), Some("isindex"));
}

#[test]
fn test_isindex_prompt() {
    let tree = parse("<body><isindex prompt=\"Search:\">");
    let form = find_element(&tree, NodeId::ROOT, "form").expect("form");
    assert_eq!(text_content(&tree, form), "Search:");
}

#[test]
fn test_frameset_document() {
    let tree = parse("<frameset><frame src=a></frameset><body>");
    let html = tree.document_element().expect("html element");
    assert_eq!(child_names(&tree, html), vec!["frameset"]);
    let frameset = tree.children(html)[0];
    assert_eq!(child_names(&tree, frameset), vec!["frame"]);
    assert_eq!(count(&tree, "body"), 0);
}

#[test]
fn test_script_text_with_comment_opener() {
    let tree = parse("<script>var x = \"<!--\"; foo(); </script>");
    let script = find_element(&tree, NodeId::ROOT, "script").expect("script");
    assert_eq!(text_content(&tree, script), "var x = \"<!--\"; foo(); ");
}

#[test]
fn test_script_comment_hides_end_tag() {
    let tree = parse("<script><!-- document.write(\"</script>\"); --></script>");
    let script = find_element(&tree, NodeId::ROOT, "script").expect("script");
    assert_eq!(
        text_content(&tree, script),
        "<!-- document.write(\"</script>\"); -->"
    );
}

#[test]
fn test_custom_elements_behave_like_span() {
    let tree = parse("<p><my-widget>x</my-widget></p>");
    let p = find_element(&tree, NodeId::ROOT, "p").expect("p");
    assert_eq!(child_names(&tree, p), vec!["my-widget"]);
}

// =============================================================================
// Parse modes
// =============================================================================

#[test]
fn test_no_doctype_is_compat() {
    assert_eq!(parse("<p>x").parse_mode(), Some(ParseMode::Compat));
}

#[test]
fn test_html5_doctype_is_strict() {
    assert_eq!(
        parse("<!DOCTYPE html><p>x").parse_mode(),
        Some(ParseMode::Strict)
    );
}

#[test]
fn test_transitional_doctype_without_system_id_is_compat() {
    let tree = parse("<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 4.01 Transitional//EN\"><p>x");
    assert_eq!(tree.parse_mode(), Some(ParseMode::Compat));
}

#[test]
fn test_late_doctype_is_ignored() {
    let tree = parse("<p>x<!DOCTYPE html>");
    assert!(tree.doctype().is_none());
    assert_eq!(tree.parse_mode(), Some(ParseMode::Compat));
}

// =============================================================================
// Issues
// =============================================================================

#[test]
fn test_issues_are_recorded() {
    let (_, issues) = parse_with_issues("<form><form></form>");
    assert!(
        issues
            .iter()
            .any(|issue| issue.message == "nested <form> ignored" && !issue.is_error)
    );
}

#[test]
fn test_dropped_content_is_an_error() {
    let (_, issues) = parse_with_issues("<ul><option>x</ul>");
    assert!(issues.iter().any(|issue| issue.is_error));
    assert!(issues.iter().all(|issue| issue.token_index >= 1));
}

#[test]
fn test_merged_duplicates_are_warnings_only() {
    let (tree, issues) = parse_with_issues("<body class=a>x<body id=b><html lang=en>");
    let messages: Vec<&str> = issues.iter().map(|issue| issue.message.as_str()).collect();
    assert!(messages.contains(&"duplicate <body> merged into the first one"));
    assert!(messages.contains(&"duplicate <html> merged into the first one"));
    assert!(
        issues.iter().all(|issue| !issue.is_error),
        "unexpected errors: {issues:?}"
    );
    let html = tree.document_element().expect("html");
    assert_eq!(attribute(&tree, html, "lang"), Some("en"));
}

#[test]
fn test_well_formed_document_has_no_issues() {
    let (_, issues) = parse_with_issues(
        "<!DOCTYPE html><html><head><title>t</title></head><body><p>x</p></body></html>",
    );
    assert!(issues.is_empty(), "unexpected issues: {issues:?}");
}

// =============================================================================
// Termination
// =============================================================================

#[test]
fn test_deep_nesting_terminates() {
    let html = "<div>".repeat(500);
    let tree = parse(&html);
    assert_eq!(count(&tree, "div"), 500);
}

#[test]
fn test_nested_broken_tables_terminate() {
    let html = "<table><tr><td><table><font>".repeat(50);
    let tree = parse(&html);
    assert!(tree.body().is_some());
    assert!(count(&tree, "table") > 0);
}

#[test]
fn test_garbage_terminates() {
    for html in [
        "<<<>>>&&&</></><!--",
        "</b></i></table></html></body>",
        "<html><html><head><head><body><body>",
        "<select><option><table><tr><select><td>",
        "<frameset><body><frameset><p>x",
        "<b><i><u><p><s><table><tr><td></b></i></u>text",
    ] {
        let tree = parse(html);
        assert!(tree.get(NodeId::ROOT).is_some());
    }
}
