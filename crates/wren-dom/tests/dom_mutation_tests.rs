//! Tests for DOM tree mutation methods: checked insertion, removal,
//! reparenting and cloning.

use wren_dom::dtd::TagId;
use wren_dom::{Attribute, DomError, DomTree, NodeId, ParseMode};

/// Helper to create a detached element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    let id = TagId::from_name(tag).unwrap_or(TagId::SPAN);
    tree.create_element(id, tag, Vec::new())
}

/// `<html><body>` skeleton; returns the body.
fn skeleton(tree: &mut DomTree) -> NodeId {
    let html = alloc_element(tree, "html");
    let body = alloc_element(tree, "body");
    tree.append_child(NodeId::ROOT, html);
    tree.append_child(html, body);
    body
}

// ========== remove_child ==========

#[test]
fn test_remove_child_single_child() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let child = alloc_element(&mut tree, "p");
    tree.append_child(parent, child);

    assert_eq!(tree.children(parent).len(), 1);

    tree.remove_child(parent, child).unwrap();

    assert_eq!(tree.children(parent).len(), 0);
    assert_eq!(tree.parent(child), None);
    assert_eq!(tree.prev_sibling(child), None);
    assert_eq!(tree.next_sibling(child), None);
}

#[test]
fn test_remove_child_middle_of_three() {
    let mut tree = DomTree::new();
    let parent = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, parent);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "i");
    tree.append_child(parent, a);
    tree.append_child(parent, b);
    tree.append_child(parent, c);

    tree.remove_child(parent, b).unwrap();

    // a and c are siblings now
    assert_eq!(tree.children(parent), &[a, c]);
    assert_eq!(tree.next_sibling(a), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(a));
}

#[test]
fn test_remove_child_of_wrong_parent() {
    let mut tree = DomTree::new();
    let body = skeleton(&mut tree);
    let div = alloc_element(&mut tree, "div");
    let stray = alloc_element(&mut tree, "span");
    tree.append_child(body, div);

    assert_eq!(tree.remove_child(div, stray), Err(DomError::NotFound(stray)));
    assert_eq!(
        tree.remove_child(div, NodeId(999)),
        Err(DomError::WrongDocument(NodeId(999)))
    );
}

// ========== insert_before ==========

#[test]
fn test_insert_before_first_child() {
    let mut tree = DomTree::new();
    let body = skeleton(&mut tree);

    let existing = alloc_element(&mut tree, "b");
    tree.append_child(body, existing);

    let new_child = alloc_element(&mut tree, "a");
    tree.insert_before(body, new_child, existing).unwrap();

    assert_eq!(tree.children(body), &[new_child, existing]);
    assert_eq!(tree.parent(new_child), Some(body));
    assert_eq!(tree.next_sibling(new_child), Some(existing));
    assert_eq!(tree.prev_sibling(new_child), None);
    assert_eq!(tree.prev_sibling(existing), Some(new_child));
}

#[test]
fn test_insert_before_middle() {
    let mut tree = DomTree::new();
    let body = skeleton(&mut tree);

    let a = alloc_element(&mut tree, "a");
    let c = alloc_element(&mut tree, "i");
    tree.append_child(body, a);
    tree.append_child(body, c);

    let b = alloc_element(&mut tree, "b");
    tree.insert_before(body, b, c).unwrap();

    assert_eq!(tree.children(body), &[a, b, c]);
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(b), Some(a));
    assert_eq!(tree.next_sibling(b), Some(c));
    assert_eq!(tree.prev_sibling(c), Some(b));
}

#[test]
fn test_insert_before_rejects_content_model_violation() {
    let mut tree = DomTree::new();
    let body = skeleton(&mut tree);
    let table = alloc_element(&mut tree, "table");
    let caption = alloc_element(&mut tree, "caption");
    tree.append_child(body, table);
    tree.append_child(table, caption);

    let text = tree.create_text("stray");
    assert_eq!(
        tree.insert_before(table, text, caption),
        Err(DomError::HierarchyRequest {
            parent: table,
            child: text
        })
    );
    // Fostering the same text before the table is fine.
    tree.insert_before(body, text, table).unwrap();
    assert_eq!(tree.children(body), &[text, table]);
}

#[test]
fn test_insert_before_rejects_cycles() {
    let mut tree = DomTree::new();
    let body = skeleton(&mut tree);
    let outer = alloc_element(&mut tree, "div");
    let inner = alloc_element(&mut tree, "div");
    let leaf = alloc_element(&mut tree, "span");
    tree.append_child(body, outer);
    tree.append_child(outer, inner);
    tree.append_child(inner, leaf);

    assert!(matches!(
        tree.insert_before(inner, outer, leaf),
        Err(DomError::HierarchyRequest { .. })
    ));
}

// ========== replace_child ==========

#[test]
fn test_replace_child_keeps_position() {
    let mut tree = DomTree::new();
    let body = skeleton(&mut tree);
    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "i");
    tree.append_child(body, a);
    tree.append_child(body, b);
    tree.append_child(body, c);

    let replacement = alloc_element(&mut tree, "em");
    tree.replace_child(body, replacement, b).unwrap();

    assert_eq!(tree.children(body), &[a, replacement, c]);
    assert_eq!(tree.parent(b), None);
}

// ========== add_child ==========

#[test]
fn test_add_child_consults_content_model() {
    let mut tree = DomTree::new();
    let body = skeleton(&mut tree);
    let ul = alloc_element(&mut tree, "ul");
    assert_eq!(tree.add_child(body, ul), Some(ul));

    let li = alloc_element(&mut tree, "li");
    assert_eq!(tree.add_child(ul, li), Some(li));

    let br = alloc_element(&mut tree, "br");
    assert_eq!(tree.add_child(li, br), Some(br));

    let text = tree.create_text("x");
    assert_eq!(tree.add_child(br, text), None);
    assert_eq!(tree.parent(text), None);
}

#[test]
fn test_add_child_strictness_follows_parse_mode() {
    let mut tree = DomTree::new();
    let body = skeleton(&mut tree);
    let p = alloc_element(&mut tree, "p");
    tree.append_child(body, p);

    let table = alloc_element(&mut tree, "table");
    assert_eq!(tree.add_child(p, table), Some(table));
    tree.detach(table);

    assert!(tree.set_parse_mode(ParseMode::Strict));
    assert!(!tree.set_parse_mode(ParseMode::Compat));
    assert_eq!(tree.add_child(p, table), None);
}

#[test]
fn test_document_accepts_single_html_element() {
    let mut tree = DomTree::new();
    let comment = tree.create_comment("c");
    assert_eq!(tree.add_child(NodeId::ROOT, comment), Some(comment));

    let div = alloc_element(&mut tree, "div");
    assert_eq!(tree.add_child(NodeId::ROOT, div), None);

    let html = alloc_element(&mut tree, "html");
    assert_eq!(tree.add_child(NodeId::ROOT, html), Some(html));

    let second = alloc_element(&mut tree, "html");
    assert_eq!(tree.add_child(NodeId::ROOT, second), None);
    assert_eq!(tree.document_element(), Some(html));
}

// ========== move_children / clone_shallow / merge_attributes ==========

#[test]
fn test_move_children_appends_to_existing() {
    let mut tree = DomTree::new();
    let from = alloc_element(&mut tree, "div");
    let to = alloc_element(&mut tree, "span");
    tree.append_child(NodeId::ROOT, from);
    tree.append_child(NodeId::ROOT, to);

    let existing = alloc_element(&mut tree, "i");
    tree.append_child(to, existing);

    let moved = alloc_element(&mut tree, "b");
    tree.append_child(from, moved);

    tree.move_children(from, to);

    assert!(tree.children(from).is_empty());
    assert_eq!(tree.children(to), &[existing, moved]);
    assert_eq!(tree.next_sibling(existing), Some(moved));
    assert_eq!(tree.prev_sibling(moved), Some(existing));
    assert_eq!(tree.parent(moved), Some(to));
}

#[test]
fn test_clone_shallow_copies_attributes_not_children() {
    let mut tree = DomTree::new();
    let body = skeleton(&mut tree);
    let b = tree.create_element(TagId::B, "b", vec![Attribute::new("class", "x")]);
    tree.append_child(body, b);
    let text = tree.create_text("inside");
    tree.append_child(b, text);

    let clone = tree.clone_shallow(b);

    assert_ne!(clone, b);
    assert_eq!(tree.parent(clone), None);
    assert!(tree.children(clone).is_empty());
    let data = tree.as_element(clone).unwrap();
    assert_eq!(data.tag, TagId::B);
    assert_eq!(data.get_attribute("class"), Some("x"));
}

#[test]
fn test_merge_attributes_existing_values_win() {
    let mut tree = DomTree::new();
    let body = tree.create_element(TagId::BODY, "body", vec![Attribute::new("bgcolor", "red")]);

    let changed = tree.merge_attributes(
        body,
        &[Attribute::new("bgcolor", "blue"), Attribute::new("text", "white")],
    );

    assert!(changed);
    let data = tree.as_element(body).unwrap();
    assert_eq!(data.get_attribute("bgcolor"), Some("red"));
    assert_eq!(data.get_attribute("text"), Some("white"));
    assert!(!tree.merge_attributes(body, &[Attribute::new("text", "black")]));
}

#[test]
fn test_text_content_in_tree_order() {
    let mut tree = DomTree::new();
    let body = skeleton(&mut tree);
    let p = alloc_element(&mut tree, "p");
    tree.append_child(body, p);
    let a = tree.create_text("a");
    let b = alloc_element(&mut tree, "b");
    let bc = tree.create_text("b");
    let c = tree.create_text("c");
    tree.append_child(p, a);
    tree.append_child(p, b);
    tree.append_child(b, bc);
    tree.append_child(p, c);

    assert_eq!(tree.text_content(NodeId::ROOT), "abc");
    assert_eq!(tree.body(), Some(body));
}
