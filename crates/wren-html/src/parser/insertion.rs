//! Node insertion and the error recovery cascade.
//!
//! [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//!
//! A node is first offered to the current node. When the content model
//! rejects it, recovery runs in three phases and the insertion is retried:
//!
//! 1. the current element may simply be closed (`<p>`, `<dt>`, `<title>`);
//! 2. the new node may have a fixed home (head content, `<area>` in the open
//!    map, table sections) or be dropped;
//! 3. the current element decides: imply `<html>`, `<head>`, `<body>`,
//!    table parts or list items, move content out of a table, or close
//!    something.

use wren_dom::dtd::{EndTag, TagId, check_child, end_tag_requirement, tag_priority};
use wren_dom::{Attribute, NodeId};

use super::core::HTMLParser;

/// Nested recovery attempts for a single node before it is dropped.
const MAX_RECOVERY_DEPTH: usize = 256;

impl HTMLParser {
    /// Insert `node` at the current position, repairing the tree as needed.
    /// A `flat` node is never made current.
    ///
    /// Returns `false` if the node could not be placed.
    pub(super) fn insert_node(&mut self, node: NodeId, flat: bool) -> bool {
        self.insert_with_recovery(node, flat, 0)
    }

    fn insert_with_recovery(&mut self, node: NodeId, flat: bool, depth: usize) -> bool {
        if depth > MAX_RECOVERY_DEPTH {
            self.parse_error("error recovery did not converge, node dropped");
            return false;
        }
        let id = self.tree.tag(node);

        // A table never opens inside content moved out of another table: the
        // first table is closed and the new one becomes its sibling.
        if self.stray_table_content_depth > 0 && id == TagId::TABLE {
            self.pop_block(TagId::TABLE);
        }

        if self.tree.add_child(self.current, node).is_some() {
            self.node_inserted(node, id, flat);
            return true;
        }

        log::trace!(
            target: "wren::parser",
            "{id} rejected by {}, recovering",
            self.current_tag()
        );
        self.recover(node, id, flat, depth)
    }

    /// Bookkeeping once a node is in the tree: elements with an end tag
    /// become current.
    fn node_inserted(&mut self, node: NodeId, id: TagId, flat: bool) {
        let mut flat = flat;
        if self.current_tag() == TagId::TABLE && id == TagId::FORM {
            // Allowed by the content model, but the form keeps no children.
            self.parse_warning("<form> directly inside <table> kept empty");
            flat = true;
        }

        self.tree.attach(node);
        if self.is_inline_node(node) {
            self.inline = true;
        }
        let level = tag_priority(id);
        if level != 0 && !flat {
            self.push_block(id, level);
            self.current = node;
        } else {
            self.tree.close(node);
        }
    }

    fn recover(&mut self, node: NodeId, id: TagId, flat: bool, depth: usize) -> bool {
        let retry = depth + 1;

        // =====================================================================
        // Phase 1: elements with an optional end tag and inline-only content
        // =====================================================================
        let current_tag = self.current_tag();
        match current_tag {
            TagId::P | TagId::DT if !self.is_inline_node(node) => {
                self.pop_block(current_tag);
                return self.insert_with_recovery(node, flat, retry);
            }
            TagId::TITLE => {
                self.pop_block(current_tag);
                return self.insert_with_recovery(node, flat, retry);
            }
            _ => {}
        }

        // =====================================================================
        // Phase 2: the node being inserted
        // =====================================================================
        let mut handled = false;
        let mut script_rejected = false;
        match id {
            TagId::TR | TagId::TH | TagId::TD => {
                if self.stray_table_content_depth > 0 && !current_tag.is_table_related() {
                    // Back out to the nearest table part.
                    while !self.stack.is_empty() && !self.current_tag().is_table_related() {
                        self.pop_one_block();
                    }
                    return self.insert_with_recovery(node, flat, retry);
                }
            }
            TagId::HEAD => {
                if self.current != NodeId::ROOT && current_tag != TagId::HTML {
                    return false;
                }
            }
            TagId::COMMENT | TagId::META | TagId::LINK | TagId::BASE
                if id != TagId::COMMENT || self.head.is_none() =>
            {
                self.create_head();
                if let Some(head) = self.head {
                    if self.tree.add_child(head, node).is_some() {
                        self.tree.attach(node);
                        self.tree.close(node);
                    } else {
                        self.parse_error(&format!("<{id}> rejected by <head>, dropped"));
                    }
                    return true;
                }
            }
            TagId::HTML => {
                if self.current != NodeId::ROOT {
                    self.merge_into_existing(TagId::HTML, node);
                    return false;
                }
            }
            TagId::TITLE | TagId::STYLE => {
                self.create_head();
                if let Some(head) = self.head {
                    if self.tree.add_child(head, node).is_some() {
                        self.parse_warning(&format!("<{id}> moved into <head>"));
                        self.tree.attach(node);
                        self.push_block(id, tag_priority(id));
                        self.current = node;
                        return true;
                    }
                    self.discard_until = Some(id);
                    return false;
                } else if self.in_body {
                    self.discard_until = Some(id);
                    return false;
                }
            }
            TagId::SCRIPT => script_rejected = true,
            TagId::BODY => {
                if self.in_body && self.tree.body().is_some() {
                    self.merge_into_existing(TagId::BODY, node);
                    return false;
                } else if self.current != NodeId::ROOT {
                    return false;
                }
            }
            TagId::INPUT | TagId::TEXT if self.is_text_like(node) => {
                // Stray whitespace is not worth a repair.
                if self.is_whitespace_text(node) || current_tag == TagId::SELECT {
                    return false;
                }
            }
            TagId::DL => {
                self.pop_block(TagId::DT);
                if self.current_tag() == TagId::DL {
                    let dd = self.create_implied(TagId::DD);
                    handled = self.insert_with_recovery(dd, false, retry);
                }
            }
            TagId::DT => {
                let dl = self.create_implied(TagId::DL);
                if self.insert_with_recovery(dl, false, retry) {
                    return self.insert_with_recovery(node, flat, retry);
                }
            }
            TagId::AREA => {
                let Some(map) = self.map else {
                    return false;
                };
                if self.tree.add_child(map, node).is_none() {
                    return false;
                }
                self.tree.attach(node);
                self.tree.close(node);
                return true;
            }
            TagId::THEAD | TagId::TBODY | TagId::TFOOT | TagId::CAPTION | TagId::COLGROUP => {
                if current_tag.is_table_related() {
                    while !self.stack.is_empty()
                        && self.current_tag() != TagId::TABLE
                        && self.current_tag().is_table_related()
                    {
                        self.pop_one_block();
                    }
                    return self.insert_with_recovery(node, flat, retry);
                }
            }
            _ => {}
        }

        // =====================================================================
        // Phase 3: the current element
        // =====================================================================
        let current_tag = self.current_tag();
        match current_tag {
            TagId::HTML => match id {
                TagId::SCRIPT
                | TagId::STYLE
                | TagId::META
                | TagId::LINK
                | TagId::OBJECT
                | TagId::EMBED
                | TagId::TITLE
                | TagId::ISINDEX
                | TagId::BASE => {
                    if self.head.is_none() {
                        let head = self.create_implied(TagId::HEAD);
                        self.head = Some(head);
                        handled = self.insert_with_recovery(head, false, retry);
                        if !handled {
                            self.head = None;
                        }
                    }
                }
                TagId::TEXT if self.is_whitespace_text(node) => return false,
                _ => {
                    if !self.have_frameset {
                        handled = self.imply_body(retry);
                    }
                }
            },
            TagId::HEAD => {
                if id == TagId::HTML {
                    return false;
                }
                // Body content: the head is over.
                if !self.have_frameset {
                    self.pop_block(TagId::HEAD);
                    handled = self.imply_body(retry);
                }
            }
            TagId::BODY => {}
            TagId::CAPTION => {
                self.pop_block(TagId::CAPTION);
                if matches!(
                    id,
                    TagId::THEAD
                        | TagId::TFOOT
                        | TagId::TBODY
                        | TagId::TR
                        | TagId::TD
                        | TagId::TH
                ) {
                    return self.insert_with_recovery(node, flat, retry);
                }
            }
            TagId::TABLE | TagId::THEAD | TagId::TFOOT | TagId::TBODY | TagId::TR => {
                if id == TagId::TABLE {
                    // A table inside a table ends the first one.
                    self.pop_block(TagId::TABLE);
                    handled = check_child(self.current_tag(), id, self.tree.in_strict_mode());
                } else {
                    match self.table_recovery(node, id, flat, retry) {
                        TableRecovery::Fostered => return true,
                        TableRecovery::Failed => return false,
                        TableRecovery::Synthesized(ok) => handled = ok,
                        TableRecovery::NotMoved => {}
                    }
                }
            }
            TagId::OBJECT => {
                if self.tree.as_element(node).is_some() && end_tag_requirement(id) != EndTag::Forbidden
                {
                    self.parse_warning(&format!("<{id}> inside <object> skipped"));
                    self.discard_until = Some(id);
                }
                return false;
            }
            TagId::UL | TagId::OL | TagId::DIR | TagId::MENU => {
                let li = self.create_implied_with(
                    TagId::LI,
                    vec![Attribute::new("style", "list-style-type: none")],
                );
                handled = self.insert_with_recovery(li, false, retry);
            }
            TagId::FORM => handled = self.pop_current(),
            TagId::SELECT => {
                if self.is_inline_node(node) {
                    return false;
                }
            }
            TagId::P | TagId::H1 | TagId::H2 | TagId::H3 | TagId::H4 | TagId::H5 | TagId::H6 => {
                if !self.is_inline_node(node) {
                    handled = self.pop_current();
                }
            }
            TagId::OPTION | TagId::OPTGROUP => {
                if id == TagId::OPTGROUP {
                    handled = self.pop_current();
                } else if id == TagId::SELECT {
                    // A nested select closes the open one.
                    self.pop_block(TagId::SELECT);
                }
            }
            TagId::ADDRESS | TagId::COLGROUP | TagId::FONT => handled = self.pop_current(),
            _ => {
                if self.current == NodeId::ROOT {
                    if self.tree.document_element().is_none() {
                        let html = self.create_implied(TagId::HTML);
                        handled = self.insert_with_recovery(html, false, retry);
                    }
                } else if self.is_inline_node(self.current) {
                    let depth_before = self.stack.len();
                    self.pop_inline_blocks();
                    handled = self.stack.len() < depth_before;
                }
            }
        }

        if !handled {
            if script_rejected {
                self.discard_until = Some(TagId::SCRIPT);
            }
            return false;
        }
        self.insert_with_recovery(node, flat, retry)
    }

    /// Text, and hidden inputs which move out of tables the same way.
    fn is_text_like(&self, node: NodeId) -> bool {
        if self.tree.as_text(node).is_some() {
            return true;
        }
        self.tree
            .as_element(node)
            .filter(|data| data.tag == TagId::INPUT)
            .and_then(|data| data.get_attribute("type"))
            .is_some_and(|kind| kind.eq_ignore_ascii_case("hidden"))
    }

    /// Close the current element. Returns whether anything was closed.
    fn pop_current(&mut self) -> bool {
        let before = self.current;
        self.pop_block(self.current_tag());
        self.current != before
    }

    /// A second `<html>` or `<body>` lends its attributes to the first one.
    /// Attributes already present are kept.
    fn merge_into_existing(&mut self, tag: TagId, duplicate: NodeId) {
        let target = if tag == TagId::HTML {
            self.tree.document_element()
        } else {
            self.tree.body()
        };
        let Some(target) = target.filter(|&t| self.tree.tag(t) == tag) else {
            return;
        };
        let attrs = self
            .tree
            .as_element(duplicate)
            .map(|data| data.attrs.clone())
            .unwrap_or_default();
        if self.tree.merge_attributes(target, &attrs) {
            self.tree.request_style_recalc();
        }
        self.parse_warning(&format!("duplicate <{tag}> merged into the first one"));
        self.merged_duplicate = true;
    }

    /// Create the `<body>` the markup left out.
    fn imply_body(&mut self, depth: usize) -> bool {
        let body = self.create_implied(TagId::BODY);
        self.start_body();
        let inserted = self.insert_with_recovery(body, false, depth);
        if inserted {
            self.flush_isindex();
        }
        inserted
    }

    /// Create the `<head>` if the document has an `<html>` element and no
    /// head yet. Before the body it becomes the current element.
    pub(super) fn create_head(&mut self) {
        if self.head.is_some() {
            return;
        }
        let Some(html) = self.tree.document_element() else {
            return;
        };

        let head = self.create_implied(TagId::HEAD);
        let body = self.tree.body();
        let inserted = match body {
            Some(body) => self.tree.insert_before(html, head, body).is_ok(),
            None => self.tree.add_child(html, head).is_some(),
        };
        if !inserted {
            log::debug!(target: "wren::parser", "creating <head> failed");
            return;
        }
        self.head = Some(head);
        self.tree.attach(head);

        if body.is_none() {
            self.push_block(TagId::HEAD, tag_priority(TagId::HEAD));
            self.current = head;
        }
    }

    /// [§ 13.2.6.1 Foster parenting](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    ///
    /// Content a table part rejects is either moved in front of the table or
    /// given the missing table structure (`<tbody>`, `<tr>`, `<td>`).
    fn table_recovery(
        &mut self,
        node: NodeId,
        id: TagId,
        flat: bool,
        depth: usize,
    ) -> TableRecovery {
        let current = self.current;
        let current_tag = self.current_tag();
        let Some(parent) = self.tree.parent(current) else {
            return TableRecovery::Failed;
        };
        let parent_tag = self.tree.tag(parent);
        let grandparent = self.tree.parent(parent);
        let grandparent_tag = grandparent.map_or(TagId::NONE, |g| self.tree.tag(g));
        let strict = self.tree.in_strict_mode();

        let foster = self.is_text_like(node)
            || (current_tag == TagId::TR
                && parent_tag.is_table_section()
                && grandparent_tag == TagId::TABLE)
            || (!check_child(TagId::TR, id, strict)
                && current_tag.is_table_section()
                && parent_tag == TagId::TABLE);

        if foster {
            let table = match current_tag {
                TagId::TABLE => Some(current),
                TagId::TR => grandparent,
                _ => Some(parent),
            };
            let Some(table) = table else {
                return TableRecovery::Failed;
            };
            let Some(table_parent) = self.tree.parent(table) else {
                return TableRecovery::Failed;
            };
            if self.tree.insert_before(table_parent, node, table).is_err() {
                return TableRecovery::NotMoved;
            }
            self.parse_warning(&format!("{id} moved out of <table>"));
            self.tree.attach(node);

            let pushable = self.tree.as_element(node).is_some()
                && tag_priority(id) != 0
                && !flat
                && end_tag_requirement(id) != EndTag::Forbidden;
            if pushable {
                self.push_block(id, tag_priority(id));
                self.current = node;
                self.stray_table_content_depth += 1;
                if let Some(top) = self.stack.last_mut() {
                    top.in_stray_table_content = true;
                }
            } else {
                self.tree.close(node);
            }
            return TableRecovery::Fostered;
        }

        let implied = match current_tag {
            TagId::TR => TagId::TD,
            TagId::TABLE => TagId::TBODY,
            _ => TagId::TR,
        };
        let implied = self.create_implied(implied);
        TableRecovery::Synthesized(self.insert_with_recovery(implied, false, depth))
    }
}

/// Outcome of [`HTMLParser::table_recovery`].
enum TableRecovery {
    /// The node now sits in front of the table.
    Fostered,
    /// Moving the node in front of the table was rejected.
    NotMoved,
    /// The table structure is broken beyond repair.
    Failed,
    /// A missing table part was inserted (or not); retry the node.
    Synthesized(bool),
}
