//! Document tree for the Wren HTML engine.
//!
//! This crate provides an arena-based DOM tree structure following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), plus the static
//! content-model tables ([`dtd`]) the tree enforces when the parser adds
//! children.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. The
//! parser only ever holds `NodeId` handles; it never owns nodes.
//!
//! Two kinds of mutation are offered:
//! - **checked** ([`DomTree::add_child`], [`DomTree::insert_before`],
//!   [`DomTree::replace_child`]) consult [`dtd::check_child`] with the
//!   document's strictness and refuse illegal nesting
//! - **unchecked** ([`DomTree::append_child`], [`DomTree::move_children`]) are
//!   the raw primitives used by error recovery once it has decided where a
//!   node belongs

pub mod dtd;

use std::collections::HashSet;

use thiserror::Error;

use dtd::{TagId, check_child};

/// A single `name="value"` pair on an element.
///
/// Names are stored lowercase. Boolean attributes have an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute's name.
    pub name: String,
    /// The attribute's value.
    pub value: String,
}

impl Attribute {
    /// Build an attribute from anything string-like.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered attribute list of an element. The first occurrence of a name wins.
pub type AttributesMap = Vec<Attribute>;

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// The compatibility mode of a document, selected from its doctype.
///
/// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
///
/// Only the parser decides the mode; layout consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseMode {
    /// "no-quirks mode": the content model is checked strictly.
    Strict,
    /// "limited-quirks mode" (transitional doctypes with a system id).
    AlmostStandards,
    /// "quirks mode": legacy rendering, relaxed content model.
    Compat,
}

/// Errors returned by checked tree mutations.
///
/// [§ 4.2.3 Mutation algorithms](https://dom.spec.whatwg.org/#mutation-algorithms)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomError {
    /// "If child is non-null and its parent is not parent, then throw a
    /// NotFoundError DOMException."
    #[error("node {0:?} is not a child of the given parent")]
    NotFound(NodeId),
    /// The insertion would create a cycle or violate the content model.
    #[error("node {child:?} cannot be a child of {parent:?}")]
    HierarchyRequest {
        /// The would-be parent.
        parent: NodeId,
        /// The rejected child.
        child: NodeId,
    },
    /// The handle does not belong to this tree.
    #[error("node {0:?} does not exist in this document")]
    WrongDocument(NodeId),
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,

    /// Set once the parser has finished adding children to this node.
    pub closed: bool,

    /// Set once the node has been handed to style and layout.
    pub attached: bool,
}

impl Node {
    const fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
            closed: false,
            attached: false,
        }
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.6 Interface DocumentType](https://dom.spec.whatwg.org/#interface-documenttype)
    Doctype(DoctypeData),
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// "Doctypes have an associated name, public ID, and system ID."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctypeData {
    /// The doctype name, as written (usually `html`).
    pub name: String,
    /// The public identifier, whitespace-simplified.
    pub public_id: String,
    /// The system identifier, whitespace-simplified.
    pub system_id: String,
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "When an element is created, its local name is always given."
///
/// NOTE: We store the numeric tag id next to the lowercase name so the
/// content model can be consulted without string comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// The element's tag id (custom names have ids above the known range).
    pub tag: TagId,
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
}

impl ElementData {
    /// Returns the value of the named attribute if present.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Returns the element's id attribute value if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Returns the set of class names from the class attribute.
    #[must_use]
    pub fn classes(&self) -> HashSet<&str> {
        self.get_attribute("class")
            .map(|list| list.split_ascii_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree."
///
/// Besides nodes, the tree carries the document-level state the parser
/// reports: the compatibility mode and the number of style recalculations
/// it requested.
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,

    parse_mode: Option<ParseMode>,

    style_recalcs: usize,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeType::Document)],
            parse_mode: None,
            style_recalcs: 0,
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes ever allocated in the tree (attached or not).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(node_type));
        id
    }

    /// [§ 4.5 createElement()](https://dom.spec.whatwg.org/#dom-document-createelement)
    ///
    /// Allocate a detached element.
    pub fn create_element(&mut self, tag: TagId, tag_name: &str, attrs: AttributesMap) -> NodeId {
        self.alloc(NodeType::Element(ElementData {
            tag,
            tag_name: tag_name.to_string(),
            attrs,
        }))
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Text(data.to_string()))
    }

    /// Allocate a detached comment node.
    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Comment(data.to_string()))
    }

    /// Allocate a detached doctype node.
    pub fn create_doctype(&mut self, doctype: DoctypeData) -> NodeId {
        self.alloc(NodeType::Doctype(doctype))
    }

    // =========================================================================
    // Document state
    // =========================================================================

    /// Record the compatibility mode. Only the first call has an effect;
    /// returns whether this call set it.
    pub fn set_parse_mode(&mut self, mode: ParseMode) -> bool {
        if self.parse_mode.is_some() {
            return false;
        }
        log::debug!(target: "wren::dom", "document parse mode {mode:?}");
        self.parse_mode = Some(mode);
        true
    }

    /// The compatibility mode, if one was chosen.
    #[must_use]
    pub const fn parse_mode(&self) -> Option<ParseMode> {
        self.parse_mode
    }

    /// The content model is applied strictly only in [`ParseMode::Strict`].
    #[must_use]
    pub fn in_strict_mode(&self) -> bool {
        self.parse_mode == Some(ParseMode::Strict)
    }

    /// Ask for styles to be recomputed (attributes changed after the fact).
    pub const fn request_style_recalc(&mut self) {
        self.style_recalcs += 1;
    }

    /// How many style recalculations were requested.
    #[must_use]
    pub const fn style_recalc_requests(&self) -> usize {
        self.style_recalcs
    }

    // =========================================================================
    // Node finalization
    // =========================================================================

    /// Mark a node as finished: the parser will add no more children to it.
    pub fn close(&mut self, id: NodeId) {
        if let Some(node) = self.get_mut(id) {
            node.closed = true;
        }
    }

    /// Whether [`DomTree::close`] has been called on this node.
    #[must_use]
    pub fn is_closed(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.closed)
    }

    /// Hand a node over to style and layout.
    pub fn attach(&mut self, id: NodeId) {
        if let Some(node) = self.get_mut(id) {
            node.attached = true;
        }
    }

    // =========================================================================
    // Content model
    // =========================================================================

    /// The tag id of a node: the element tag, or the text/comment pseudo
    /// tags. Documents and doctypes report [`TagId::NONE`].
    #[must_use]
    pub fn tag(&self, id: NodeId) -> TagId {
        match self.get(id).map(|n| &n.node_type) {
            Some(NodeType::Element(data)) => data.tag,
            Some(NodeType::Text(_)) => TagId::TEXT,
            Some(NodeType::Comment(_)) => TagId::COMMENT,
            _ => TagId::NONE,
        }
    }

    /// Whether `child` may be added under `parent`.
    ///
    /// - The document accepts comments, a single doctype before the
    ///   document element, and a single `<html>` element.
    /// - Elements consult [`check_child`] with the document's strictness.
    /// - Leaf nodes accept nothing.
    #[must_use]
    pub fn child_allowed(&self, parent: NodeId, child: NodeId) -> bool {
        let Some(parent_node) = self.get(parent) else {
            return false;
        };
        let Some(child_node) = self.get(child) else {
            return false;
        };

        match (&parent_node.node_type, &child_node.node_type) {
            (NodeType::Document, NodeType::Comment(_)) => true,
            (NodeType::Document, NodeType::Doctype(_)) => {
                self.doctype().is_none() && self.document_element().is_none()
            }
            (NodeType::Document, NodeType::Element(data)) => {
                data.tag == TagId::HTML && self.document_element().is_none()
            }
            (NodeType::Element(data), _) => {
                check_child(data.tag, self.tag(child), self.in_strict_mode())
            }
            _ => false,
        }
    }

    /// Add `child` as the last child of `parent` if the content model allows
    /// it. Returns the inserted node, or `None` when the content model
    /// rejects it (the child is left untouched).
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Option<NodeId> {
        if !self.child_allowed(parent, child) || self.is_inclusive_ancestor(child, parent) {
            return None;
        }
        self.detach(child);
        self.append_child(parent, child);
        Some(child)
    }

    // =========================================================================
    // Mutation primitives
    // =========================================================================

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent`, updating all
    /// relationships. Does not consult the content model. `child` must be
    /// detached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        // Get the current last child of parent (if any) to set up sibling links
        let prev_last_child = self.nodes[parent.0].children.last().copied();

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[child.0].next_sibling = None;
        self.nodes[child.0].prev_sibling = prev_last_child;

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
        }
    }

    /// [§ 4.2.3 Pre-insert](https://dom.spec.whatwg.org/#concept-node-pre-insert)
    ///
    /// Insert `new_child` into `parent` immediately before `reference`.
    ///
    /// # Errors
    ///
    /// - [`DomError::NotFound`] if `reference` is not a child of `parent`
    /// - [`DomError::HierarchyRequest`] if the content model rejects the child
    ///   or `new_child` is an inclusive ancestor of `parent`
    /// - [`DomError::WrongDocument`] for handles outside this tree
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.ensure_exists(parent)?;
        self.ensure_exists(new_child)?;
        self.ensure_exists(reference)?;

        if self.parent(reference) != Some(parent) {
            return Err(DomError::NotFound(reference));
        }
        if !self.child_allowed(parent, new_child) || self.is_inclusive_ancestor(new_child, parent)
        {
            return Err(DomError::HierarchyRequest {
                parent,
                child: new_child,
            });
        }
        if new_child == reference {
            return Ok(());
        }

        self.detach(new_child);
        self.link_before(parent, new_child, reference);
        Ok(())
    }

    /// [§ 4.2.3 Replace](https://dom.spec.whatwg.org/#concept-node-replace)
    ///
    /// Replace `old_child` of `parent` with `new_child`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DomTree::insert_before`], with `old_child` in the
    /// role of the reference node.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<(), DomError> {
        if new_child == old_child {
            return self.ensure_exists(old_child);
        }
        self.insert_before(parent, new_child, old_child)?;
        self.remove_child(parent, old_child)
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Remove `child` from `parent`, fixing up the sibling links of its
    /// neighbours. The removed node keeps its own subtree.
    ///
    /// # Errors
    ///
    /// [`DomError::NotFound`] if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.ensure_exists(parent)?;
        self.ensure_exists(child)?;
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotFound(child));
        }
        self.detach(child);
        Ok(())
    }

    /// Remove a node from its parent, if it has one.
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        let prev = self.nodes[child.0].prev_sibling;
        let next = self.nodes[child.0].next_sibling;

        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = next;
        }
        if let Some(next) = next {
            self.nodes[next.0].prev_sibling = prev;
        }
        self.nodes[parent.0].children.retain(|&c| c != child);

        let node = &mut self.nodes[child.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Move every child of `from` to the end of `to`, preserving order.
    /// Does not consult the content model.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.nodes[from.0].children);
        for &child in &children {
            let node = &mut self.nodes[child.0];
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
        for child in children {
            self.append_child(to, child);
        }
    }

    /// [§ 4.4 cloneNode()](https://dom.spec.whatwg.org/#dom-node-clonenode)
    ///
    /// "clone a node ... with the clone children flag unset": copy the node's
    /// data (tag and attributes for elements) without its children. The
    /// clone is detached.
    pub fn clone_shallow(&mut self, id: NodeId) -> NodeId {
        let node_type = self.nodes[id.0].node_type.clone();
        self.alloc(node_type)
    }

    /// Merge `attrs` into an element's attribute list. Attributes the element
    /// already has keep their value; returns whether anything was added.
    pub fn merge_attributes(&mut self, id: NodeId, attrs: &[Attribute]) -> bool {
        let Some(Node {
            node_type: NodeType::Element(data),
            ..
        }) = self.get_mut(id)
        else {
            return false;
        };

        let mut changed = false;
        for attr in attrs {
            if data.attrs.iter().all(|a| a.name != attr.name) {
                data.attrs.push(attr.clone());
                changed = true;
            }
        }
        changed
    }

    fn link_before(&mut self, parent: NodeId, new_child: NodeId, reference: NodeId) {
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(self.nodes[parent.0].children.len());
        let prev = self.nodes[reference.0].prev_sibling;

        self.nodes[parent.0].children.insert(index, new_child);
        let node = &mut self.nodes[new_child.0];
        node.parent = Some(parent);
        node.prev_sibling = prev;
        node.next_sibling = Some(reference);

        self.nodes[reference.0].prev_sibling = Some(new_child);
        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = Some(new_child);
        }
    }

    fn ensure_exists(&self, id: NodeId) -> Result<(), DomError> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(DomError::WrongDocument(id))
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.is_descendant_of(node, ancestor)
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// Iterate over a node and all its descendants in document order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: vec![id],
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// "The descendant text content of a node is the concatenation of the
    /// data of all the Text node descendants of node, in tree order."
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|n| self.as_text(n))
            .collect()
    }

    /// The doctype node, if the document has one.
    #[must_use]
    pub fn doctype(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| matches!(self.get(id).map(|n| &n.node_type), Some(NodeType::Doctype(_))))
            .copied()
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null."
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// [§ 3.1.3 The body element](https://html.spec.whatwg.org/multipage/dom.html#the-body-element-2)
    ///
    /// "The body element of a document is the first of the html element's children
    /// that is either a body element or a frameset element, or null if there is
    /// no such element."
    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.child_with_tag(self.document_element()?, &[TagId::BODY, TagId::FRAMESET])
    }

    /// The first `<head>` child of the document element.
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.child_with_tag(self.document_element()?, &[TagId::HEAD])
    }

    fn child_with_tag(&self, parent: NodeId, tags: &[TagId]) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .find(|&&id| self.as_element(id).is_some_and(|e| tags.contains(&e.tag)))
            .copied()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Pre-order iterator over a node and its descendants.
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
