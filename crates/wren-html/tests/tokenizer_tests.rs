//! Integration tests for the HTML tokenizer.

use wren_dom::dtd::TagId;
use wren_html::{HTMLTokenizer, Token};

/// Helper to tokenize a complete document and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokenizer = HTMLTokenizer::new(input.to_string());
    tokenizer.set_report_warnings(false);
    tokenizer.run();
    tokenizer.into_tokens()
}

/// Helper to get the text of a text token
fn text(token: &Token) -> &str {
    match token {
        Token::Text(data) => data,
        other => panic!("Expected text token, got {other:?}"),
    }
}

#[test]
fn test_plain_text_is_one_token() {
    let tokens = tokenize("Hello");
    assert_eq!(tokens, vec![Token::Text("Hello".to_string())]);
}

#[test]
fn test_empty_input() {
    assert!(tokenize("").is_empty());
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 1);
    match &tokens[0] {
        Token::Doctype(doctype) => {
            assert_eq!(doctype.name, "html");
            assert!(doctype.public_id.is_empty());
            assert!(doctype.system_id.is_empty());
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_doctype_public_and_system_ids() {
    let tokens = tokenize(
        "<!doctype HTML public \"-//W3C//DTD HTML 4.01   Transitional//EN\" 'http://www.w3.org/TR/html4/loose.dtd'>",
    );
    match &tokens[0] {
        Token::Doctype(doctype) => {
            assert_eq!(doctype.name, "html");
            assert_eq!(doctype.public_id, "-//W3C//DTD HTML 4.01 Transitional//EN");
            assert_eq!(doctype.system_id, "http://www.w3.org/TR/html4/loose.dtd");
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_doctype_comment_sections_are_skipped() {
    let tokens = tokenize("<!DOCTYPE html -- a comment -- PUBLIC \"x\">");
    match &tokens[0] {
        Token::Doctype(doctype) => {
            assert_eq!(doctype.name, "html");
            assert_eq!(doctype.public_id, "x");
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_doctype_comment_after_public_id() {
    let tokens = tokenize("<!DOCTYPE html PUBLIC \"p\" -- c -- \"s\">");
    match &tokens[0] {
        Token::Doctype(doctype) => {
            assert_eq!(doctype.public_id, "p");
            assert_eq!(doctype.system_id, "s");
        }
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_doctype_comment_split_across_chunks() {
    let mut tokenizer = HTMLTokenizer::new("<!DOCTYPE html -".to_string());
    tokenizer.set_report_warnings(false);
    assert_eq!(tokenizer.next_token(), None);
    tokenizer.feed("- x -- PUBLIC \"q\">");
    tokenizer.finish();
    match tokenizer.next_token() {
        Some(Token::Doctype(doctype)) => {
            assert_eq!(doctype.name, "html");
            assert_eq!(doctype.public_id, "q");
        }
        other => panic!("Expected DOCTYPE token, got {other:?}"),
    }
}

#[test]
fn test_doctype_internal_subset() {
    let tokens = tokenize("<!DOCTYPE html [<!ENTITY x \"y\">]>");
    match &tokens[0] {
        Token::Doctype(doctype) => assert_eq!(doctype.internal_subset, "<!ENTITY x \"y\">"),
        _ => panic!("Expected DOCTYPE token"),
    }
}

#[test]
fn test_malformed_doctype_is_dropped() {
    let tokens = tokenize("<!DOCTYPE html PUBLIC>x");
    assert_eq!(tokens, vec![Token::Text("x".to_string())]);
}

#[test]
fn test_start_tag() {
    let tokens = tokenize("<div>");
    assert_eq!(tokens.len(), 1);
    match &tokens[0] {
        Token::StartTag {
            tag,
            name,
            attributes,
            self_closing,
        } => {
            assert_eq!(*tag, TagId::DIV);
            assert_eq!(name, "div");
            assert!(attributes.is_empty());
            assert!(!self_closing);
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_end_tag() {
    let tokens = tokenize("</div>");
    assert_eq!(
        tokens,
        vec![Token::EndTag {
            tag: TagId::DIV,
            name: "div".to_string()
        }]
    );
}

#[test]
fn test_names_are_lowercased() {
    let tokens = tokenize("<DIV CLASS=x></Div>");
    assert!(tokens[0].is_start_tag(TagId::DIV));
    assert_eq!(tokens[0].attribute("class"), Some("x"));
    assert!(tokens[1].is_end_tag(TagId::DIV));
}

#[test]
fn test_attributes() {
    let tokens = tokenize("<input type=\"text\" name='q' value=a=b disabled>");
    let token = &tokens[0];
    assert_eq!(token.attribute("type"), Some("text"));
    assert_eq!(token.attribute("name"), Some("q"));
    assert_eq!(token.attribute("value"), Some("a=b"));
    assert_eq!(token.attribute("disabled"), Some(""));
}

#[test]
fn test_first_duplicate_attribute_wins() {
    let tokens = tokenize("<p id=a id=b>");
    match &tokens[0] {
        Token::StartTag { attributes, .. } => {
            assert_eq!(attributes.len(), 1);
            assert_eq!(attributes[0].value, "a");
        }
        _ => panic!("Expected StartTag token"),
    }
}

#[test]
fn test_quoted_value_keeps_greater_than() {
    let tokens = tokenize("<a title=\"1 > 0\">");
    assert_eq!(tokens[0].attribute("title"), Some("1 > 0"));
}

#[test]
fn test_entities_in_attribute_values() {
    let tokens = tokenize("<a href=\"?a=1&amp;b=2&copy=3\">");
    assert_eq!(tokens[0].attribute("href"), Some("?a=1&b=2©=3"));
}

#[test]
fn test_self_closing_kept_only_for_void_and_script() {
    let tokens = tokenize("<br/><div/><script src=x />");
    assert!(matches!(
        tokens[0],
        Token::StartTag {
            self_closing: true,
            ..
        }
    ));
    assert!(matches!(
        tokens[1],
        Token::StartTag {
            self_closing: false,
            ..
        }
    ));
    assert!(matches!(
        tokens[2],
        Token::StartTag {
            self_closing: true,
            ..
        }
    ));
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hello -->");
    assert_eq!(tokens, vec![Token::Comment(" hello ".to_string())]);
}

#[test]
fn test_comment_with_dashes() {
    let tokens = tokenize("<!-- a -- b --->");
    assert_eq!(tokens, vec![Token::Comment(" a -- b -".to_string())]);
}

#[test]
fn test_unterminated_comment_ends_at_first_greater_than() {
    let tokens = tokenize("<!-- a > b");
    assert_eq!(
        tokens,
        vec![
            Token::Comment(" a ".to_string()),
            Token::Text(" b".to_string())
        ]
    );
}

#[test]
fn test_lone_less_than_is_text() {
    let tokens = tokenize("a < b <3");
    assert_eq!(tokens, vec![Token::Text("a < b <3".to_string())]);
}

#[test]
fn test_character_references() {
    let tokens = tokenize("a &amp; b &lt;&gt; &#65;&#x42; &copy;");
    assert_eq!(text(&tokens[0]), "a & b <> AB ©");
}

#[test]
fn test_windows_1252_numeric_references() {
    let tokens = tokenize("&#150;&#128;");
    assert_eq!(text(&tokens[0]), "\u{2013}\u{20AC}");
}

#[test]
fn test_unknown_entity_stays_literal() {
    let tokens = tokenize("&bogus; & x");
    assert_eq!(text(&tokens[0]), "&bogus; & x");
}

#[test]
fn test_newlines_are_normalized() {
    let tokens = tokenize("a\r\nb\rc");
    assert_eq!(text(&tokens[0]), "a\nb\nc");
}

#[test]
fn test_newline_after_pre_is_dropped() {
    let tokens = tokenize("<pre>\nx</pre>");
    assert_eq!(text(&tokens[1]), "x");
}

#[test]
fn test_script_is_raw_text() {
    let tokens = tokenize("<script>if (a<b) x = '<p>';</script>");
    assert!(tokens[0].is_start_tag(TagId::SCRIPT));
    assert_eq!(text(&tokens[1]), "if (a<b) x = '<p>';");
    assert!(tokens[2].is_end_tag(TagId::SCRIPT));
}

#[test]
fn test_raw_end_tag_needs_delimiter() {
    let tokens = tokenize("<script>a</scripts>b</SCRIPT >");
    assert_eq!(text(&tokens[1]), "a</scripts>b");
    assert!(tokens[2].is_end_tag(TagId::SCRIPT));
}

#[test]
fn test_raw_end_tag_skips_to_unquoted_greater_than() {
    let tokens = tokenize("<style>p{}</style foo=\">\">after");
    assert_eq!(text(&tokens[1]), "p{}");
    assert!(tokens[2].is_end_tag(TagId::STYLE));
    assert_eq!(text(&tokens[3]), "after");
}

#[test]
fn test_script_comment_escape_hides_end_tag() {
    let tokens = tokenize("<script><!-- document.write(\"</script>\"); --></script>x");
    assert_eq!(text(&tokens[1]), "<!-- document.write(\"</script>\"); -->");
    assert!(tokens[2].is_end_tag(TagId::SCRIPT));
    assert_eq!(text(&tokens[3]), "x");
}

#[test]
fn test_script_with_unclosed_comment_opener() {
    let tokens = tokenize("<script>var x = \"<!--\"; foo(); </script>y");
    assert_eq!(text(&tokens[1]), "var x = \"<!--\"; foo(); ");
    assert!(tokens[2].is_end_tag(TagId::SCRIPT));
    assert_eq!(text(&tokens[3]), "y");
}

#[test]
fn test_textarea_decodes_entities_and_drops_leading_newline() {
    let tokens = tokenize("<textarea>\n&lt;b&gt;</textarea>");
    assert_eq!(text(&tokens[1]), "<b>");
}

#[test]
fn test_unterminated_title_is_reparsed_as_markup() {
    let tokens = tokenize("<title>a<b>c");
    assert!(tokens[0].is_start_tag(TagId::TITLE));
    assert_eq!(text(&tokens[1]), "a");
    assert!(tokens[2].is_start_tag(TagId::B));
    assert_eq!(text(&tokens[3]), "c");
}

#[test]
fn test_plaintext_swallows_the_rest() {
    let tokens = tokenize("<plaintext><b>x</plaintext>");
    assert!(tokens[0].is_start_tag(TagId::PLAINTEXT));
    assert_eq!(text(&tokens[1]), "<b>x</plaintext>");
}

#[test]
fn test_processing_instruction_is_dropped() {
    let tokens = tokenize("a<?xml version=\"1.0\"?>b");
    assert_eq!(tokens, vec![Token::Text("ab".to_string())]);
}

#[test]
fn test_server_include_is_dropped() {
    let tokens = tokenize("<p>x<% a %>y");
    assert!(tokens[0].is_start_tag(TagId::P));
    assert_eq!(tokens[1..], [Token::Text("xy".to_string())]);
}

#[test]
fn test_unterminated_server_include_is_text() {
    let tokens = tokenize("<%x <b>y</b>");
    assert_eq!(text(&tokens[0]), "<%x ");
    assert!(tokens[1].is_start_tag(TagId::B));
    assert_eq!(text(&tokens[2]), "y");
    assert!(tokens[3].is_end_tag(TagId::B));
}

#[test]
fn test_entities_decode_once() {
    assert_eq!(tokenize("&amp;lt;"), vec![Token::Text("&lt;".to_string())]);

    let tokens = tokenize("<a title=\"&amp;lt;\">");
    assert_eq!(tokens[0].attribute("title"), Some("&lt;"));

    let tokens = tokenize("<textarea>&amp;lt;</textarea>");
    assert_eq!(text(&tokens[1]), "&lt;");

    let tokens = tokenize("<title>&amp;lt;</title>");
    assert_eq!(text(&tokens[1]), "&lt;");
}

#[test]
fn test_custom_tags_get_stable_ids() {
    let tokens = tokenize("<my-tag></my-tag><my-tag>");
    let id = tokens[0].tag_id();
    assert!(id.is_custom());
    assert_eq!(tokens[1].tag_id(), id);
    assert_eq!(tokens[2].tag_id(), id);
}

#[test]
fn test_incremental_feeding() {
    let mut tokenizer = HTMLTokenizer::new(String::new());
    tokenizer.feed("<di");
    assert_eq!(tokenizer.next_token(), None);
    tokenizer.feed("v>hi");
    assert!(
        tokenizer
            .next_token()
            .is_some_and(|t| t.is_start_tag(TagId::DIV))
    );
    // Text is held until it is known to be complete.
    assert_eq!(tokenizer.next_token(), None);
    assert!(!tokenizer.is_done());
    tokenizer.finish();
    assert_eq!(tokenizer.next_token(), Some(Token::Text("hi".to_string())));
    assert_eq!(tokenizer.next_token(), None);
    assert!(tokenizer.is_done());
}

#[test]
fn test_crlf_split_across_chunks() {
    let mut tokenizer = HTMLTokenizer::new("a\r".to_string());
    tokenizer.feed("\nb");
    tokenizer.finish();
    assert_eq!(tokenizer.next_token(), Some(Token::Text("a\nb".to_string())));
}

#[test]
fn test_inserted_markup_is_read_next() {
    let mut tokenizer = HTMLTokenizer::new("<a>rest".to_string());
    assert!(tokenizer.next_token().is_some_and(|t| t.is_start_tag(TagId::A)));
    tokenizer.insert("<b>");
    assert!(tokenizer.next_token().is_some_and(|t| t.is_start_tag(TagId::B)));
    tokenizer.finish();
    assert_eq!(tokenizer.next_token(), Some(Token::Text("rest".to_string())));
}

#[test]
fn test_script_line_is_tracked() {
    let mut tokenizer = HTMLTokenizer::new("<p>\n\n<script>x</script>".to_string());
    tokenizer.run();
    assert_eq!(tokenizer.script_line(), 3);
}

#[test]
fn test_token_display() {
    let tokens = tokenize("<a href=x hidden>t</a><!--c-->");
    let shown: Vec<String> = tokens.iter().map(ToString::to_string).collect();
    assert_eq!(shown, vec!["<a href=\"x\" hidden>", "\"t\"", "</a>", "<!--c-->"]);
}
