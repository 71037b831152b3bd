use std::fmt::Write as _;

use wren_dom::{DomTree, NodeId, NodeType};

/// Print the subtree rooted at `id` to stdout, one node per line, indented
/// by depth.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    print!("{}", subtree_to_string(tree, id, indent));
}

/// The whole document in [`print_tree`] format.
#[must_use]
pub fn tree_to_string(tree: &DomTree) -> String {
    subtree_to_string(tree, NodeId::ROOT, 0)
}

/// The subtree rooted at `id` in [`print_tree`] format.
#[must_use]
pub fn subtree_to_string(tree: &DomTree, id: NodeId, indent: usize) -> String {
    let mut out = String::new();
    write_node(tree, id, indent, &mut out);
    out
}

fn write_node(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let prefix = "  ".repeat(indent);
    let _ = match &node.node_type {
        NodeType::Document => writeln!(out, "{prefix}Document"),
        NodeType::Doctype(doctype) => writeln!(out, "{prefix}<!DOCTYPE {}>", doctype.name),
        NodeType::Element(data) => {
            if data.attrs.is_empty() {
                writeln!(out, "{prefix}<{}>", data.tag_name)
            } else {
                let attrs: Vec<String> = data
                    .attrs
                    .iter()
                    .map(|attr| {
                        if attr.value.is_empty() {
                            attr.name.clone()
                        } else {
                            format!("{}=\"{}\"", attr.name, attr.value)
                        }
                    })
                    .collect();
                writeln!(out, "{prefix}<{} {}>", data.tag_name, attrs.join(" "))
            }
        }
        NodeType::Text(data) => writeln!(out, "{prefix}\"{}\"", data.replace('\n', "\\n")),
        NodeType::Comment(data) => writeln!(out, "{prefix}<!-- {data} -->"),
    };
    for &child in tree.children(id) {
        write_node(tree, child, indent + 1, out);
    }
}
