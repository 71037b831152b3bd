//! Tests for the static content-model tables.

use wren_dom::dtd::{
    EndTag, ForbiddenTags, TagId, TagInterner, check_child, end_tag_requirement,
    is_affected_by_residual_style, is_residual_style, is_scope_boundary, tag_priority,
};

#[test]
fn test_known_names_resolve() {
    assert_eq!(TagId::from_name("table"), Some(TagId::TABLE));
    assert_eq!(TagId::from_name("TaBlE"), Some(TagId::TABLE));
    assert_eq!(TagId::from_name("noscript"), Some(TagId::NOSCRIPT));
    assert_eq!(TagId::from_name("nolayer"), Some(TagId::NOLAYER));
    assert_eq!(TagId::from_name("my-widget"), None);
    assert_eq!(TagId::from_name("#text"), None);
    assert_eq!(TagId::TD.to_string(), "td");
}

#[test]
fn test_priorities() {
    assert_eq!(tag_priority(TagId::BR), 0);
    assert_eq!(tag_priority(TagId::B), 1);
    assert_eq!(tag_priority(TagId::OPTION), 2);
    assert_eq!(tag_priority(TagId::FORM), 3);
    assert_eq!(tag_priority(TagId::P), 5);
    assert_eq!(tag_priority(TagId::NOBR), 5);
    assert_eq!(tag_priority(TagId::TD), 6);
    assert_eq!(tag_priority(TagId::SELECT), 6);
    assert_eq!(tag_priority(TagId::TR), 7);
    assert_eq!(tag_priority(TagId::TBODY), 8);
    assert_eq!(tag_priority(TagId::TABLE), 9);
    assert_eq!(tag_priority(TagId::BODY), 10);
    assert_eq!(tag_priority(TagId::HTML), 11);
    assert_eq!(tag_priority(TagId::TEXT), 0);
}

#[test]
fn test_end_tag_requirements() {
    assert_eq!(end_tag_requirement(TagId::IMG), EndTag::Forbidden);
    assert_eq!(end_tag_requirement(TagId::LI), EndTag::Optional);
    assert_eq!(end_tag_requirement(TagId::OPTION), EndTag::Optional);
    assert_eq!(end_tag_requirement(TagId::DIV), EndTag::Required);
    // <embed> is never pushed but still has an end tag.
    assert_eq!(end_tag_requirement(TagId::EMBED), EndTag::Required);
    assert_eq!(tag_priority(TagId::EMBED), 0);
}

#[test]
fn test_scope_boundaries() {
    for tag in [
        TagId::HTML,
        TagId::TABLE,
        TagId::TD,
        TagId::TH,
        TagId::CAPTION,
        TagId::BUTTON,
        TagId::OBJECT,
        TagId::APPLET,
        TagId::MARQUEE,
    ] {
        assert!(is_scope_boundary(tag), "{tag}");
    }
    assert!(!is_scope_boundary(TagId::DIV));
    assert!(!is_scope_boundary(TagId::TR));
}

#[test]
fn test_residual_style_sets() {
    assert!(is_residual_style(TagId::B));
    assert!(is_residual_style(TagId::FONT));
    assert!(!is_residual_style(TagId::SPAN));
    assert!(is_affected_by_residual_style(TagId::P));
    assert!(is_affected_by_residual_style(TagId::I));
    assert!(!is_affected_by_residual_style(TagId::TABLE));
}

#[test]
fn test_formatting_elements_accept_blocks() {
    assert!(check_child(TagId::B, TagId::P, false));
    assert!(check_child(TagId::B, TagId::P, true));
    assert!(check_child(TagId::A, TagId::DIV, true));
}

#[test]
fn test_paragraph_accepts_table_only_when_not_strict() {
    assert!(check_child(TagId::P, TagId::TEXT, true));
    assert!(check_child(TagId::P, TagId::TABLE, false));
    assert!(!check_child(TagId::P, TagId::TABLE, true));
    assert!(!check_child(TagId::P, TagId::P, false));
    assert!(!check_child(TagId::P, TagId::DIV, false));
}

#[test]
fn test_headings_reject_nested_headings() {
    assert!(check_child(TagId::H1, TagId::DIV, false));
    assert!(!check_child(TagId::H1, TagId::DIV, true));
    assert!(!check_child(TagId::H1, TagId::H2, false));
    assert!(check_child(TagId::H1, TagId::B, true));
}

#[test]
fn test_table_structure() {
    for child in [
        TagId::CAPTION,
        TagId::COL,
        TagId::COLGROUP,
        TagId::THEAD,
        TagId::TFOOT,
        TagId::TBODY,
        TagId::FORM,
        TagId::SCRIPT,
    ] {
        assert!(check_child(TagId::TABLE, child, false), "{child}");
    }
    assert!(!check_child(TagId::TABLE, TagId::TR, false));
    assert!(!check_child(TagId::TABLE, TagId::TEXT, false));
    assert!(check_child(TagId::TBODY, TagId::TR, false));
    assert!(!check_child(TagId::TBODY, TagId::TD, false));
    assert!(check_child(TagId::TR, TagId::TD, false));
    assert!(!check_child(TagId::TR, TagId::TEXT, false));
}

#[test]
fn test_select_and_option() {
    for child in [
        TagId::OPTION,
        TagId::OPTGROUP,
        TagId::SCRIPT,
        TagId::COMMENT,
        TagId::TEXT,
    ] {
        assert!(check_child(TagId::SELECT, child, false), "{child}");
    }
    assert!(!check_child(TagId::SELECT, TagId::B, false));
    assert!(check_child(TagId::OPTION, TagId::TEXT, false));
    assert!(!check_child(TagId::OPTION, TagId::OPTION, false));
    assert!(check_child(TagId::OPTGROUP, TagId::OPTION, false));
}

#[test]
fn test_void_elements_accept_nothing() {
    for parent in [TagId::BR, TagId::IMG, TagId::INPUT, TagId::HR, TagId::META] {
        assert!(!check_child(parent, TagId::TEXT, false), "{parent}");
        assert!(!check_child(parent, TagId::SPAN, false), "{parent}");
    }
}

#[test]
fn test_comments_go_anywhere() {
    assert!(check_child(TagId::TABLE, TagId::COMMENT, true));
    assert!(check_child(TagId::TR, TagId::COMMENT, true));
    assert!(check_child(TagId::BR, TagId::COMMENT, true));
}

#[test]
fn test_custom_elements_behave_like_span() {
    let mut interner = TagInterner::new();
    let widget = interner.intern("my-widget");
    assert!(widget.is_custom());
    assert_eq!(interner.intern("my-widget"), widget);
    assert_eq!(interner.name(widget), Some("my-widget"));
    assert_eq!(interner.intern("div"), TagId::DIV);

    assert!(check_child(TagId::DIV, widget, true));
    assert!(check_child(widget, TagId::DIV, false));
    assert!(!check_child(TagId::TABLE, widget, false));
    assert_eq!(tag_priority(widget), tag_priority(TagId::SPAN));
}

#[test]
fn test_lists_and_definitions() {
    assert!(check_child(TagId::UL, TagId::LI, true));
    assert!(check_child(TagId::DL, TagId::DT, true));
    assert!(check_child(TagId::DL, TagId::DD, true));
    assert!(check_child(TagId::DT, TagId::B, true));
    assert!(!check_child(TagId::DT, TagId::DL, false));
    assert!(check_child(TagId::DT, TagId::DIV, false));
}

#[test]
fn test_forbidden_counters() {
    let mut forbidden = ForbiddenTags::new();
    assert!(!forbidden.is_forbidden(TagId::BUTTON));

    forbidden.add(TagId::BUTTON);
    assert!(forbidden.is_forbidden(TagId::BUTTON));
    assert!(forbidden.is_forbidden(TagId::A));
    assert!(forbidden.is_forbidden(TagId::FORM));

    forbidden.add(TagId::NOBR);
    assert!(forbidden.is_forbidden(TagId::PRE));
    assert!(forbidden.is_forbidden(TagId::OBJECT));

    forbidden.remove(TagId::BUTTON);
    assert!(!forbidden.is_forbidden(TagId::BUTTON));
    assert!(forbidden.is_forbidden(TagId::OBJECT));

    forbidden.remove(TagId::NOBR);
    assert!(!forbidden.is_forbidden(TagId::OBJECT));

    // Anchors never forbid anything.
    forbidden.add(TagId::A);
    assert!(!forbidden.is_forbidden(TagId::A));
}
