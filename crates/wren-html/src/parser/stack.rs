//! The stack of open elements.
//!
//! [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
//!
//! Closing works by priority: a close tag pops every open element above the
//! matching one, as long as none of them has a higher priority than the
//! element being closed. Formatting elements that get popped on the way are
//! re-opened afterwards, and a formatting close tag that crosses a block
//! ("residual style", e.g. `<b><p>Foo</b>Goo</p>`) is repaired by moving the
//! block out of the formatting element.

use wren_dom::NodeId;
use wren_dom::dtd::{
    EndTag, TagId, end_tag_requirement, is_affected_by_residual_style, is_residual_style,
    is_scope_boundary, tag_priority,
};

use super::core::{HTMLParser, StackElem};

/// A formatting element that was popped and has to be opened again.
#[derive(Debug, Clone, Copy)]
struct Reopen {
    tag: TagId,
    level: u16,
    /// The element that was open; its shallow clone takes its place.
    element: NodeId,
}

impl HTMLParser {
    // =========================================================================
    // Push and pop
    // =========================================================================

    /// Push the current node's tag. The entry remembers the insertion point
    /// that was current before the push.
    pub(super) fn push_block(&mut self, tag: TagId, level: u16) {
        self.stack.push(StackElem {
            tag,
            level,
            node: self.current,
            was_inline: self.inline,
            in_stray_table_content: false,
        });
        self.forbidden.add(tag);
    }

    /// Pop the top entry and make its insertion point current again.
    pub(super) fn pop_one_block(&mut self) {
        let Some(elem) = self.stack.pop() else {
            return;
        };
        if elem.node != self.current {
            self.tree.close(self.current);
        }
        self.forbidden.remove(elem.tag);
        // Only closing a block resets the inline flag; <p><b>a</b> <b>b</b>
        // keeps its space.
        self.inline = elem.was_inline;
        self.current = elem.node;
        if elem.in_stray_table_content {
            self.stray_table_content_depth = self.stray_table_content_depth.saturating_sub(1);
        }
    }

    /// Pop formatting elements until a block (or a `<font>`) is current.
    pub(super) fn pop_inline_blocks(&mut self) {
        while !self.stack.is_empty()
            && self.is_inline_node(self.current)
            && self.current_tag() != TagId::FONT
        {
            self.pop_one_block();
        }
    }

    /// Pop elements with an optional end tag that sit above `tag`, as long as
    /// their priority does not exceed its own.
    ///
    /// Stops at the first open `tag`, at an element whose end tag is required,
    /// or at an element of higher priority. `tag` itself is left open.
    pub(super) fn generate_implied_end_tags(&mut self, tag: TagId) {
        let level = tag_priority(tag);
        while let Some(top) = self.stack.last() {
            if top.tag == tag
                || end_tag_requirement(top.tag) != EndTag::Optional
                || top.level > level
            {
                break;
            }
            self.pop_one_block();
        }
    }

    /// Close an open `tag` if only optional-end-tag or formatting elements
    /// of no higher priority are open above it.
    pub(super) fn pop_optional_block(&mut self, tag: TagId) {
        let level = tag_priority(tag);
        let found = self
            .stack
            .iter()
            .rev()
            .take_while(|elem| {
                elem.tag == tag
                    || (elem.level <= level
                        && (end_tag_requirement(elem.tag) == EndTag::Optional
                            || is_residual_style(elem.tag)))
            })
            .any(|elem| elem.tag == tag);

        if found {
            self.generate_implied_end_tags(tag);
            self.pop_block(tag);
        }
    }

    // =========================================================================
    // Scope
    // =========================================================================

    /// Whether `tag` is open below the nearest scope boundary.
    ///
    /// Walks the stack from the current node down and gives up at the first
    /// boundary element (`<table>`, `<td>`, `<button>`, ...), so a close tag
    /// inside a table cell cannot reach an element opened outside it.
    pub(super) fn is_element_in_scope(&self, tag: TagId) -> bool {
        for elem in self.stack.iter().rev() {
            if elem.tag == tag {
                return true;
            }
            if is_scope_boundary(elem.tag) {
                return false;
            }
        }
        false
    }

    /// Whether any heading is open in scope.
    pub(super) fn is_heading_in_scope(&self) -> bool {
        for elem in self.stack.iter().rev() {
            if elem.tag.is_heading() {
                return true;
            }
            if is_scope_boundary(elem.tag) {
                return false;
            }
        }
        false
    }

    // =========================================================================
    // Closing a tag
    // =========================================================================

    /// Close the innermost open `tag`.
    ///
    /// Nothing happens if the tag is not open, or if an element of higher
    /// priority is open above it (unless `tag` is a formatting tag, in which
    /// case the residual style repair runs). Formatting elements popped on
    /// the way are re-opened inside the element that becomes current.
    pub(super) fn pop_block(&mut self, tag: TagId) {
        let Some(index) = self.stack.iter().rposition(|elem| elem.tag == tag) else {
            return;
        };
        let max_level = self.stack[index + 1..]
            .iter()
            .map(|elem| elem.level)
            .max()
            .unwrap_or(0);

        if max_level > self.stack[index].level {
            // <b><p>Foo</b>: the close tag crosses a block.
            if is_residual_style(tag) {
                self.handle_residual_style_across_blocks(index);
            }
            return;
        }

        let affected = is_affected_by_residual_style(tag);
        let mut reopen = Vec::new();
        let mut malformed_table_parent = None;

        while let Some(top) = self.stack.last().copied() {
            if top.tag == tag {
                let stray_before = self.stray_table_content_depth;
                self.pop_one_block();
                // The closed element was the root of content moved out of a
                // table: re-opened tags go in front of that table too.
                if stray_before > 0
                    && self.stray_table_content_depth < stray_before
                    && !reopen.is_empty()
                {
                    malformed_table_parent = self
                        .tree
                        .ancestors(self.current)
                        .find(|&node| self.tree.tag(node) == TagId::TABLE)
                        .and_then(|table| self.tree.parent(table));
                }
                break;
            }

            if affected && is_residual_style(top.tag) {
                reopen.push(Reopen {
                    tag: top.tag,
                    level: top.level,
                    element: self.current,
                });
            }
            self.pop_one_block();
        }

        reopen.reverse();
        self.reopen_residual_style_tags(reopen, malformed_table_parent);
    }

    /// Open shallow clones of popped formatting elements, outermost first.
    fn reopen_residual_style_tags(
        &mut self,
        tags: Vec<Reopen>,
        mut malformed_table_parent: Option<NodeId>,
    ) {
        for entry in tags {
            let clone = self.tree.clone_shallow(entry.element);
            log::trace!(target: "wren::parser", "re-opening <{}>", entry.tag);

            match malformed_table_parent {
                // The table is the last child of its parent.
                Some(parent) => match self.tree.last_child(parent) {
                    Some(table) if self.tree.insert_before(parent, clone, table).is_ok() => {}
                    _ => self.tree.append_child(parent, clone),
                },
                None => self.tree.append_child(self.current, clone),
            }
            self.tree.attach(clone);

            self.push_block(entry.tag, entry.level);
            if malformed_table_parent.take().is_some() {
                self.stray_table_content_depth += 1;
                if let Some(top) = self.stack.last_mut() {
                    top.in_stray_table_content = true;
                }
            }
            self.current = clone;
        }
    }

    // =========================================================================
    // Residual style
    // =========================================================================

    /// A formatting element (at `index`) is closed while blocks opened inside
    /// it are still open.
    ///
    /// The outermost such block is moved out of the formatting element and
    /// appended after it; its content is wrapped in a clone of the formatting
    /// element so the style still applies. Formatting elements between the
    /// two are cloned as well. So `<b>A<p>B</b>C</p>` becomes
    /// `<b>A</b><p><b>B</b>C</p>`.
    fn handle_residual_style_across_blocks(&mut self, index: usize) {
        let elem = self.stack[index];

        // Entries above `elem` with a higher priority. All of them must be
        // blocks that carry residual style; `max_index` is the lowest one,
        // `end_index` the innermost.
        let mut max_index = None;
        let mut end_index = None;
        let mut advanced = false;
        for i in (index + 1..self.stack.len()).rev() {
            let entry = self.stack[i];
            if entry.level > elem.level {
                if !is_affected_by_residual_style(entry.tag) {
                    return;
                }
                if max_index.is_some() {
                    // More than one block: only the residual style is closed.
                    advanced = true;
                } else {
                    end_index = Some(i);
                }
                max_index = Some(i);
            }
        }
        let (Some(mut max_index), Some(end_index)) = (max_index, end_index) else {
            return;
        };
        let above_end = self.stack.len() - 1 - end_index;

        let residual_elem = self.stack[index + 1].node;
        let block_elem = self
            .stack
            .get(max_index + 1)
            .map_or(self.current, |entry| entry.node);
        let mut parent_elem = elem.node;

        if !self.tree.child_allowed(parent_elem, block_elem) {
            log::trace!(target: "wren::parser", "residual style repair not allowed here");
            return;
        }
        self.parse_warning(&format!("</{}> closes across a block", elem.tag));

        let block_parent = self.stack[max_index].node;
        if self.tree.parent(block_parent) != Some(elem.node) && !advanced {
            // Non-formatting elements between the two are just closed.
            // <font><span>Moo<p>Goo</font></p>: the span is not re-opened.
            let mut i = max_index - 1;
            while i > index {
                if !is_residual_style(self.stack[i].tag) {
                    let removed = self.stack.remove(i);
                    self.tree.close(self.stack[i].node);
                    self.stack[i].node = removed.node;
                    self.forget_entry(&removed);
                    max_index -= 1;
                }
                i -= 1;
            }

            // Formatting elements between the two are cloned, so
            // <font><i>Moo<p>Foo</font> keeps Foo italic: the clones form a
            // chain after the closed element and the block moves into the
            // innermost clone.
            let mut outer_clone = None;
            let mut i = max_index;
            while i > index && self.stack[i].node != residual_elem {
                let node = self.stack[i].node;
                if is_residual_style(self.tree.tag(node)) {
                    let clone = self.tree.clone_shallow(node);
                    self.tree.close(node);
                    self.stack[i].node = clone;
                    match outer_clone {
                        Some(inner) => self.tree.append_child(clone, inner),
                        None => parent_elem = clone,
                    }
                    outer_clone = Some(clone);
                }
                i -= 1;
            }
            if let Some(chain) = outer_clone {
                self.tree.append_child(elem.node, chain);
            }
        }

        // STEP 1: Take the block out of the tree.
        self.tree.detach(block_elem);

        if !advanced {
            // STEP 2: Clone the formatting element and move the block's
            // children into the clone.
            let clone = self.tree.clone_shallow(residual_elem);
            self.tree.move_children(block_elem, clone);
            // STEP 3: The clone becomes the block's only child.
            self.tree.append_child(block_elem, clone);
        }

        // STEP 4: Put the block back after the formatting element.
        self.tree.append_child(parent_elem, block_elem);

        // STEP 5: The formatting element is no longer open. The entry above
        // it now restores to its insertion point.
        let removed = self.stack.remove(index);
        if let Some(next) = self.stack.get_mut(index) {
            next.node = removed.node;
        }
        self.tree.close(residual_elem);
        self.forget_entry(&removed);

        // STEP 6: Close what is open inside the block, re-opening formatting
        // elements. <b><p><i>Foo</b>Goo</p>: Goo stays italic.
        let mut reopen = Vec::new();
        for _ in 0..above_end {
            let Some(top) = self.stack.last().copied() else {
                break;
            };
            if is_residual_style(top.tag) {
                reopen.push(Reopen {
                    tag: top.tag,
                    level: top.level,
                    element: self.current,
                });
            }
            self.pop_one_block();
        }
        reopen.reverse();
        self.reopen_residual_style_tags(reopen, None);
    }

    /// Undo the counters of an entry removed from the middle of the stack.
    fn forget_entry(&mut self, removed: &StackElem) {
        self.forbidden.remove(removed.tag);
        if removed.in_stray_table_content {
            self.stray_table_content_depth = self.stray_table_content_depth.saturating_sub(1);
        }
    }
}
