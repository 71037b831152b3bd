//! Serializable view of a parsed document.
//!
//! The arena tree is flattened into nested [`NodeSnapshot`] values, which
//! `serde_json` renders as:
//!
//! ```json
//! {"type":"element","tag":"p","attributes":[{"name":"id","value":"x"}],"children":[...]}
//! ```

use serde::Serialize;
use wren_dom::{DomTree, NodeId, NodeType, ParseMode};

/// One node and its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeSnapshot {
    /// The document node.
    Document {
        /// `strict`, `almost-standards` or `compat`; absent before any
        /// content decided it.
        #[serde(skip_serializing_if = "Option::is_none")]
        mode: Option<&'static str>,
        /// Top level nodes.
        children: Vec<NodeSnapshot>,
    },
    /// A `<!DOCTYPE>`.
    Doctype {
        /// Doctype name.
        name: String,
        /// Public identifier.
        public_id: String,
        /// System identifier.
        system_id: String,
    },
    /// An element.
    Element {
        /// Lowercase tag name.
        tag: String,
        /// Attributes in source order.
        attributes: Vec<AttributeSnapshot>,
        /// Child nodes.
        children: Vec<NodeSnapshot>,
    },
    /// Character data.
    Text {
        /// The text.
        data: String,
    },
    /// A comment.
    Comment {
        /// The comment text.
        data: String,
    },
}

/// A `name="value"` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeSnapshot {
    /// Attribute name.
    pub name: String,
    /// Attribute value.
    pub value: String,
}

impl NodeSnapshot {
    /// Snapshot the whole document.
    #[must_use]
    pub fn from_tree(tree: &DomTree) -> Self {
        Self::from_node(tree, NodeId::ROOT)
    }

    /// Snapshot the subtree rooted at `id`.
    #[must_use]
    pub fn from_node(tree: &DomTree, id: NodeId) -> Self {
        let children = || {
            tree.children(id)
                .iter()
                .map(|&child| Self::from_node(tree, child))
                .collect()
        };
        match tree.get(id).map(|node| &node.node_type) {
            Some(NodeType::Doctype(doctype)) => Self::Doctype {
                name: doctype.name.clone(),
                public_id: doctype.public_id.clone(),
                system_id: doctype.system_id.clone(),
            },
            Some(NodeType::Element(data)) => Self::Element {
                tag: data.tag_name.clone(),
                attributes: data
                    .attrs
                    .iter()
                    .map(|attr| AttributeSnapshot {
                        name: attr.name.clone(),
                        value: attr.value.clone(),
                    })
                    .collect(),
                children: children(),
            },
            Some(NodeType::Text(data)) => Self::Text { data: data.clone() },
            Some(NodeType::Comment(data)) => Self::Comment { data: data.clone() },
            Some(NodeType::Document) | None => Self::Document {
                mode: tree.parse_mode().map(mode_name),
                children: children(),
            },
        }
    }
}

const fn mode_name(mode: ParseMode) -> &'static str {
    match mode {
        ParseMode::Strict => "strict",
        ParseMode::AlmostStandards => "almost-standards",
        ParseMode::Compat => "compat",
    }
}

#[cfg(test)]
mod tests {
    use wren_dom::Attribute;
    use wren_dom::dtd::TagId;

    use super::*;

    #[test]
    fn test_snapshot_serializes_tagged_nodes() {
        let mut tree = DomTree::new();
        let _ = tree.set_parse_mode(ParseMode::Compat);
        let html = tree.create_element(TagId::HTML, "html", vec![Attribute::new("lang", "en")]);
        tree.append_child(NodeId::ROOT, html);
        let text = tree.create_text("hi");
        tree.append_child(html, text);

        let json = serde_json::to_value(NodeSnapshot::from_tree(&tree)).unwrap();
        assert_eq!(json["type"], "document");
        assert_eq!(json["mode"], "compat");
        let html = &json["children"][0];
        assert_eq!(html["tag"], "html");
        assert_eq!(html["attributes"][0]["name"], "lang");
        assert_eq!(html["children"][0]["type"], "text");
        assert_eq!(html["children"][0]["data"], "hi");
    }
}
