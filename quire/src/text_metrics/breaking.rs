// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The line breaking loop.

use core::slice;

use crate::row::{needs_row_break, Element, ElementKind, Row, RowFlags, SplitType};

use super::LayoutEnv;

/// Elements of a tokenized paragraph still to be placed on rows.
///
/// Pieces produced by splitting or shortening are put back in front of the
/// remaining elements.
struct PendingElements<'a> {
    pile: Vec<Element>,
    rest: slice::Iter<'a, Element>,
}

impl<'a> PendingElements<'a> {
    fn new(elements: &'a [Element]) -> Self {
        Self {
            pile: Vec::new(),
            rest: elements.iter(),
        }
    }

    fn peek(&self) -> Option<&Element> {
        self.pile.last().or_else(|| self.rest.as_slice().first())
    }

    /// Puts `elements`, in order, in front of the pending ones.
    fn put(&mut self, elements: Vec<Element>) {
        self.pile.extend(elements.into_iter().rev());
    }
}

impl Iterator for PendingElements<'_> {
    type Item = Element;

    fn next(&mut self) -> Option<Element> {
        self.pile.pop().or_else(|| self.rest.next().cloned())
    }
}

impl LayoutEnv<'_> {
    /// Breaks the single row produced by tokenization into rows that fit the
    /// text width.
    pub(super) fn break_paragraph(&self, bigrow: &Row) -> Vec<Row> {
        let pit = bigrow.pit();
        let is_rtl = self.doc.paragraph(pit).is_rtl();
        let end_label = self.doc.has_end_label(pit);
        let max_width = self.settings.max_width;
        let next_width =
            max_width - self.left_margin(pit, bigrow.endpos()) - self.right_margin(pit);

        let mut rows: Vec<Row> = Vec::new();
        let mut width = 0;
        let mut pending = PendingElements::new(bigrow.elements());
        loop {
            // Without a previous element, refuse a break so that no empty row
            // comes before a display element.
            let f1 = match rows.last().and_then(Row::back) {
                Some(e) => e.flags,
                None => RowFlags::NO_BREAK_AFTER,
            };
            // At the end, an empty last row only makes sense for an end label.
            let f2 = match pending.peek() {
                Some(e) => e.flags,
                None if end_label => RowFlags::INLINE,
                None => RowFlags::NO_BREAK_BEFORE,
            };
            if rows.is_empty() || needs_row_break(f1, f2) {
                let pos = match rows.last_mut() {
                    Some(last) => {
                        last.set_flushed(
                            f1.contains(RowFlags::FLUSH) || f2.contains(RowFlags::FLUSH_BEFORE),
                        );
                        cleanup_row(last, false);
                        last.endpos()
                    }
                    None => 0,
                };
                let row = self.new_row(pit, pos, is_rtl);
                width = max_width - row.right_margin;
                rows.push(row);
            }

            // Checked here because the end may need a new empty row.
            let Some(mut elt) = pending.next() else {
                break;
            };
            let Some(row) = rows.last_mut() else {
                break;
            };

            let mut split_tail = Vec::new();
            elt.split_at(
                width - row.width(),
                next_width,
                SplitType::Fit,
                &mut split_tail,
                self.fm,
            );
            if elt.kind == ElementKind::MarginSpace {
                elt.dim.width = elt
                    .dim
                    .width
                    .max(self.left_margin_default(pit) - row.width());
            }
            row.push(elt);
            row.finalize_last();

            pending.put(split_tail);
            if row.width() > width {
                // Whatever leaves the row comes before the rest of the split
                // element.
                let tail = row.shorten_if_needed(width, next_width, self.fm);
                pending.put(tail);
            }
        }

        if let Some(last) = rows.last_mut() {
            last.set_flushed(true);
            cleanup_row(last, true);
            if bigrow.needs_change_bar() {
                last.set_needs_change_bar(true);
            }
        }

        log::trace!("paragraph {pit} broken into {} rows", rows.len());
        rows
    }

    /// An empty row of paragraph `pit` starting at `pos`, with its margins.
    fn new_row(&self, pit: usize, pos: usize, is_rtl: bool) -> Row {
        let mut row = Row::new(pit, pos);
        row.left_margin = self.left_margin(pit, pos);
        row.right_margin = self.right_margin(pit);
        row.set_rtl(is_rtl);
        if is_rtl {
            core::mem::swap(&mut row.left_margin, &mut row.right_margin);
        }
        // The row width counts the left margin but not the right one.
        row.dim_mut().width = row.left_margin;
        row
    }
}

/// Completes a row once no element will be added to it.
fn cleanup_row(row: &mut Row, at_end: bool) {
    let Some(back_end) = row.back().map(|e| e.endpos) else {
        row.set_endpos(row.pos());
        return;
    };
    row.set_endpos(back_end);
    // Spaces at a row break are invisible.
    if !at_end && !row.flushed() {
        row.rtrim();
    }
    // Without a trailing space, the end position is also the start of the next row.
    let end_boundary = !at_end && row.back().is_some_and(|e| e.endpos == row.endpos());
    row.set_end_boundary(end_boundary);
    row.reverse_rtl();
}
