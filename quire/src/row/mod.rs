// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rows: the visual lines of a paragraph.
//!
//! A [`Row`] is an ordered sequence of [`Element`]s covering a range of paragraph
//! positions, together with the geometry of the line. It owns the primitives used
//! by line breaking: splitting string elements, shortening an overflowing row,
//! justification and bidi reordering.

mod element;
mod flags;
mod selection;

use core::fmt;

pub use element::{Element, ElementKind, SplitType};
pub use flags::{needs_row_break, RowFlags};
pub use selection::{CursorPos, RowSelection};

use crate::document::{Change, Inset, InsetId, InsetKind};
use crate::font::{Font, FontMetrics};
use crate::util::{iround, itrunc};
use crate::Dimension;

/// Maximum stretch of one expansion point by justification, in ems.
pub const MAX_SPACE_STRETCH: f64 = 1.5;

/// One visual line of a paragraph.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    elements: Vec<Element>,
    pit: usize,
    pos: usize,
    endpos: usize,
    start_boundary: bool,
    end_boundary: bool,
    flushed: bool,
    dim: Dimension,
    rtl: bool,
    changebar: bool,
    dirty: bool,
    selection: RowSelection,
    /// Width of the space between words added by justification, in pixels.
    pub separator: f64,
    /// Width of each fill in the label of a manual margin paragraph.
    pub label_hfill: f64,
    /// Space before the first element. Already counted in the row width.
    pub left_margin: i32,
    /// Space after the last element. Not counted in the row width.
    pub right_margin: i32,
}

impl Default for Row {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl Row {
    /// Creates an empty row of paragraph `pit` starting at `pos`.
    pub fn new(pit: usize, pos: usize) -> Self {
        Self {
            elements: Vec::new(),
            pit,
            pos,
            endpos: pos,
            start_boundary: false,
            end_boundary: false,
            flushed: false,
            dim: Dimension::default(),
            rtl: false,
            changebar: false,
            dirty: true,
            selection: RowSelection::default(),
            separator: 0.0,
            label_hfill: 0.0,
            left_margin: 0,
            right_margin: 0,
        }
    }

    /// Index of the paragraph.
    pub fn pit(&self) -> usize {
        self.pit
    }

    /// First position of the row.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Sets the first position of the row.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Position after the last one of the row.
    pub fn endpos(&self) -> usize {
        self.endpos
    }

    /// Sets the position after the last one of the row.
    pub fn set_endpos(&mut self, endpos: usize) {
        self.endpos = endpos;
    }

    /// Whether the cursor can sit at the start of the row with a boundary.
    pub fn start_boundary(&self) -> bool {
        self.start_boundary
    }

    /// Sets the start boundary.
    pub fn set_start_boundary(&mut self, b: bool) {
        self.start_boundary = b;
    }

    /// Whether the row was broken without a separator, so that its end
    /// position is also the start of the next row.
    pub fn end_boundary(&self) -> bool {
        self.end_boundary
    }

    /// Sets the end boundary.
    pub fn set_end_boundary(&mut self, b: bool) {
        self.end_boundary = b;
    }

    /// Whether the row must not be justified.
    pub fn flushed(&self) -> bool {
        self.flushed
    }

    /// Sets whether the row must not be justified.
    pub fn set_flushed(&mut self, b: bool) {
        self.flushed = b;
    }

    /// Extent of the row. The width includes the left margin.
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    /// Mutable extent of the row.
    pub fn dim_mut(&mut self) -> &mut Dimension {
        &mut self.dim
    }

    /// Width of the row, left margin included.
    pub fn width(&self) -> i32 {
        self.dim.width
    }

    /// Height of the row.
    pub fn height(&self) -> i32 {
        self.dim.height()
    }

    /// Ascent of the row.
    pub fn ascent(&self) -> i32 {
        self.dim.ascent
    }

    /// Descent of the row.
    pub fn descent(&self) -> i32 {
        self.dim.descent
    }

    /// Whether the row belongs to a right-to-left paragraph.
    pub fn is_rtl(&self) -> bool {
        self.rtl
    }

    /// Sets the paragraph direction.
    pub fn set_rtl(&mut self, rtl: bool) {
        self.rtl = rtl;
    }

    /// Whether a change bar is drawn next to the row.
    pub fn needs_change_bar(&self) -> bool {
        self.changebar
    }

    /// Sets whether a change bar is drawn next to the row.
    pub fn set_needs_change_bar(&mut self, b: bool) {
        self.changebar = b;
    }

    /// Whether the row must be repainted.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Marks the row for repaint.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Called by the painter once the row is on screen.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// The elements, in visual order once the row is complete.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub(crate) fn elements_mut(&mut self) -> &mut [Element] {
        &mut self.elements
    }

    /// Whether the row has no element.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// First element.
    pub fn front(&self) -> Option<&Element> {
        self.elements.first()
    }

    /// Last element.
    pub fn back(&self) -> Option<&Element> {
        self.elements.last()
    }

    /// Mutable last element.
    pub fn back_mut(&mut self) -> Option<&mut Element> {
        self.elements.last_mut()
    }

    /// Appends an element and adds its width to the row.
    pub fn push(&mut self, e: Element) {
        self.dim.width += e.dim.width;
        self.changebar |= e.change.changed();
        self.elements.push(e);
    }

    /// Removes the last element and its width.
    pub fn pop(&mut self) -> Option<Element> {
        let e = self.elements.pop()?;
        self.dim.width -= e.dim.width;
        Some(e)
    }

    /// Horizontal position of the first element that is not virtual.
    pub fn left_x(&self) -> i32 {
        let x = f64::from(self.left_margin)
            + self
                .elements
                .iter()
                .take_while(|e| e.is_virtual())
                .map(Element::full_width)
                .sum::<f64>();
        iround(x)
    }

    /// Horizontal position of the end of the last element that is not virtual.
    pub fn right_x(&self) -> i32 {
        let x = f64::from(self.dim.width)
            - self
                .elements
                .iter()
                .rev()
                .take_while(|e| e.is_virtual())
                .map(Element::full_width)
                .sum::<f64>();
        iround(x)
    }

    /// Justifies the row by distributing `w` pixels over the expansion points
    /// of its strings, proportionally to their em size.
    ///
    /// Returns `false`, without changing anything, when there is nothing to
    /// stretch or when spaces would grow by more than [`MAX_SPACE_STRETCH`] ems.
    pub fn set_extra_width(&mut self, w: i32, fm: &dyn FontMetrics) -> bool {
        if w < 0 {
            return false;
        }
        let amount: i32 = self
            .elements
            .iter()
            .map(|e| e.expansion_amount(fm))
            .sum();
        if amount == 0 {
            return false;
        }
        let extra_per_em = f64::from(w) / f64::from(amount);
        if extra_per_em > MAX_SPACE_STRETCH {
            return false;
        }
        for e in &mut self.elements {
            if e.kind == ElementKind::String {
                e.set_extra(extra_per_em, fm);
            }
        }
        self.dim.width += w;
        true
    }

    /// Cursor position closest to the horizontal position `x`, which is moved
    /// to the actual position of the cursor.
    pub fn x2pos(&self, x: &mut i32, fm: &dyn FontMetrics) -> CursorPos {
        let (Some(front), Some(back)) = (self.elements.first(), self.elements.last()) else {
            *x = self.left_margin;
            return CursorPos::with_boundary(self.pos, self.end_boundary);
        };

        let (index, mut retpos) = if *x <= self.left_margin {
            *x = self.left_margin;
            (0, front.left_pos())
        } else if *x < self.width() {
            let xf = f64::from(*x);
            let mut w = f64::from(self.left_margin);
            let mut found = None;
            for (i, e) in self.elements.iter().enumerate() {
                let fw = e.full_width();
                if w <= xf && w + fw > xf {
                    let mut offset = itrunc(xf - w);
                    let pos = e.x2pos(&mut offset, fm);
                    *x = iround(f64::from(offset) + w);
                    found = Some((i, pos));
                    break;
                }
                w += fw;
            }
            found.unwrap_or_else(|| self.rightmost(x, fm))
        } else {
            self.rightmost(x, fm)
        };

        // The same position is also displayed elsewhere, at a direction change
        // or at the other end of the row: stick to the element on the left.
        let e = &self.elements[index];
        let mut boundary = retpos == e.endpos
            && e.pos < e.endpos
            && !e.is_virtual()
            && (self.pos2x(retpos, false, fm) - f64::from(*x)).abs() > 1.0;

        // At the end of a row broken by something else than a separator, the
        // end position belongs to the next row unless the break is explicit.
        if retpos == back.endpos && back.endpos == self.endpos {
            if matches!(
                back.inset_kind(),
                Some(InsetKind::Newline | InsetKind::Separator | InsetKind::EnvSeparator)
            ) {
                retpos = back.pos;
                *x = iround(self.pos2x(retpos, boundary, fm));
            } else {
                boundary |= self.end_boundary;
            }
        }

        CursorPos::with_boundary(retpos, boundary)
    }

    /// Position at the right edge of the row, skipping trimmed elements.
    fn rightmost(&self, x: &mut i32, fm: &dyn FontMetrics) -> (usize, usize) {
        let last = self.elements.len().saturating_sub(1);
        let index = self
            .elements
            .iter()
            .rposition(|e| e.pos < e.endpos || e.is_virtual())
            .unwrap_or(last);
        let e = &self.elements[index];
        let pos = e.right_pos();
        *x = if e.is_virtual() {
            iround(self.pos2x(pos, false, fm))
        } else {
            self.width()
        };
        (index, pos)
    }

    /// Index of the element holding the cursor position, and the horizontal
    /// position of the cursor.
    fn find_element_helper(
        &self,
        pos: usize,
        boundary: bool,
        fm: &dyn FontMetrics,
    ) -> (Option<usize>, f64) {
        // With a boundary, `pos` belongs to the element when `e.pos < pos <= e.endpos`.
        let p = if boundary && pos > 0 { pos - 1 } else { pos };
        let mut x = f64::from(self.left_margin);

        let Some(front) = self.elements.first() else {
            return (None, x);
        };
        let holder = self.elements.iter().position(|e| e.holds(p));
        // The left end of a leading right to left element, when no other
        // element displays the position. A leading virtual element (end of
        // paragraph marker) needs a closer look.
        if pos == front.left_pos() && !boundary && !front.is_virtual() && holder.is_none() {
            return (Some(0), x);
        }

        let Some(i) = holder else {
            x += self.elements.iter().map(Element::full_width).sum::<f64>();
            return (Some(self.elements.len() - 1), x);
        };
        x += self.elements[..i].iter().map(Element::full_width).sum::<f64>();
        x += self.elements[i].pos2x(pos, fm);
        (Some(i), x)
    }

    /// Element holding the cursor position.
    pub fn find_element(&self, pos: usize, boundary: bool, fm: &dyn FontMetrics) -> Option<&Element> {
        let (i, _) = self.find_element_helper(pos, boundary, fm);
        self.elements.get(i?)
    }

    /// Horizontal position of the cursor at `pos`.
    pub fn pos2x(&self, pos: usize, boundary: bool, fm: &dyn FontMetrics) -> f64 {
        self.find_element_helper(pos, boundary, fm).1
    }

    fn same_string(&self, font: &Font, change: &Change) -> bool {
        self.elements.last().is_some_and(|e| {
            e.kind == ElementKind::String && !e.sealed && e.font == *font && e.change == *change
        })
    }

    /// Seals the last element: no character is merged into it anymore.
    pub fn finalize_last(&mut self) {
        let Some(e) = self.elements.last_mut() else {
            return;
        };
        if e.sealed {
            return;
        }
        e.sealed = true;
        if e.change.changed() {
            self.changebar = true;
        }
    }

    /// Appends a character, merging it into the last string element when
    /// possible. Strings are measured later, when the row is broken.
    pub fn add_char(&mut self, pos: usize, c: char, font: Font, change: Change) {
        if !self.same_string(&font, &change) {
            self.finalize_last();
            let mut e = Element::new(ElementKind::String, pos, font, change);
            e.flags = RowFlags::CAN_BREAK_INSIDE;
            self.elements.push(e);
        }
        if let Some(e) = self.elements.last_mut() {
            e.text.push(c);
            e.endpos = pos + 1;
        }
    }

    /// Appends an inset of the given size.
    pub fn add_inset(
        &mut self,
        pos: usize,
        id: InsetId,
        inset: &dyn Inset,
        dim: Dimension,
        font: Font,
        change: Change,
    ) {
        self.finalize_last();
        let kind = ElementKind::Inset {
            id,
            kind: inset.kind(),
        };
        let mut e = Element::new(kind, pos, font, change);
        e.flags = inset.row_flags();
        e.dim = dim;
        self.push(e);
        self.changebar |= inset.is_changed();
    }

    /// Appends displayed text that is not part of the paragraph. It sticks to
    /// the previous element.
    pub fn add_virtual(
        &mut self,
        pos: usize,
        text: &str,
        font: Font,
        change: Change,
        fm: &dyn FontMetrics,
    ) {
        self.finalize_last();
        let mut e = Element::new(ElementKind::Virtual, pos, font, change);
        e.text = text.to_owned();
        e.dim = fm.dimension(text, &font);
        e.endpos = pos;
        let prev = self.elements.last().map_or(RowFlags::INLINE, |e| e.flags);
        let inherited = RowFlags::AFTER_FLAGS - RowFlags::ALWAYS_BREAK_AFTER;
        e.flags = (prev & inherited) | RowFlags::NO_BREAK_BEFORE;
        self.push(e);
        self.finalize_last();
    }

    /// Appends input method composition text.
    pub fn add_preedit(
        &mut self,
        pos: usize,
        text: &str,
        font: Font,
        change: Change,
        wrap_anywhere: bool,
        fm: &dyn FontMetrics,
    ) {
        self.finalize_last();
        let mut e = Element::new(ElementKind::Preedit, pos, font, change);
        e.text = text.to_owned();
        e.dim.width = fm.width(text, &font);
        e.endpos = pos;
        e.wrap_anywhere = wrap_anywhere;
        e.flags = RowFlags::CAN_BREAK_INSIDE | RowFlags::CAN_BREAK_BEFORE | RowFlags::CAN_BREAK_AFTER;
        self.push(e);
        self.finalize_last();
    }

    /// Appends a blank of the given width.
    pub fn add_space(&mut self, pos: usize, width: i32, font: Font, change: Change) {
        self.finalize_last();
        let mut e = Element::new(ElementKind::Space, pos, font, change);
        e.dim.width = width;
        self.push(e);
    }

    /// Appends the separator between a label and the paragraph body. It grows
    /// up to the left margin when the row is broken.
    pub fn add_margin_space(&mut self, pos: usize, width: i32, font: Font, change: Change) {
        self.finalize_last();
        let mut e = Element::new(ElementKind::MarginSpace, pos, font, change);
        e.dim.width = width;
        e.flags = RowFlags::NO_BREAK_BEFORE;
        self.push(e);
    }

    /// Moves the elements from index `at` to the end of `tail`. When `tail` is
    /// not empty, the row must then be broken after its new last element.
    fn move_elements(&mut self, at: usize, tail: &mut Vec<Element>) {
        tail.extend(self.elements.drain(at..));
        if tail.is_empty() {
            return;
        }
        if let Some(e) = self.elements.last_mut() {
            e.flags = (e.flags - RowFlags::AFTER_FLAGS) | RowFlags::ALWAYS_BREAK_AFTER;
        }
    }

    /// Shortens a row that is wider than `max_width`, preferably at a break
    /// opportunity. Returns the elements that no longer belong to the row; the
    /// following rows are `next_width` wide.
    ///
    /// Candidates are examined backwards from the first element that overflows:
    /// a cut after it, a cut before it, then a split of the element itself. When
    /// nothing works, the row is cut before the overflowing element, or its
    /// first element is split at any character. A row made of a single
    /// unbreakable element stays wider than `max_width`.
    pub fn shorten_if_needed(
        &mut self,
        max_width: i32,
        next_width: i32,
        fm: &dyn FontMetrics,
    ) -> Vec<Element> {
        self.finalize_last();
        let mut tail = Vec::new();
        if self.elements.is_empty() || self.width() <= max_width {
            return tail;
        }

        let mut wid = self.left_margin;
        // The smallest row width known to be achievable by breaking a string.
        let mut min_row_wid = self.dim.width;

        // First element that goes beyond the right margin.
        let mut cit = None;
        for (i, e) in self.elements.iter().enumerate() {
            if wid + e.dim.width > max_width {
                cit = Some(i);
                break;
            }
            wid += e.dim.width;
        }
        let Some(mut cit) = cit else {
            log::warn!("cannot shorten row: {self}");
            return tail;
        };

        let mut wid_brk = wid + self.elements[cit].dim.width;
        let mut i = cit + 1;
        while i > 0 {
            i -= 1;
            let mut brk = self.elements[i].clone();
            if wid_brk <= max_width && brk.flags.contains(RowFlags::CAN_BREAK_AFTER) {
                self.endpos = brk.endpos;
                self.dim.width = wid_brk;
                self.move_elements(i + 1, &mut tail);
                return tail;
            }
            // From now on, assume that the element is not there.
            wid_brk -= brk.dim.width;
            if wid_brk <= max_width && brk.flags.contains(RowFlags::CAN_BREAK_BEFORE) && i != 0 {
                self.endpos = self.elements[i - 1].endpos;
                self.dim.width = wid_brk;
                self.move_elements(i, &mut tail);
                return tail;
            }
            // Split at a width that both fits and is shorter than the element.
            let split_width = (max_width - wid_brk).min(brk.dim.width - 2);
            if brk.split_at(split_width, next_width, SplitType::BestEffort, &mut tail, fm) {
                let original_width = self.elements[i].dim.width;
                if split_would_overflow_next(
                    wid_brk,
                    original_width,
                    brk.dim.width,
                    min_row_wid,
                    max_width,
                    next_width,
                ) {
                    tail.clear();
                    break;
                }
                // No part of the element fits: remember that the row can be
                // made that short.
                if brk.dim.width > split_width {
                    min_row_wid = wid_brk + brk.dim.width;
                    tail.clear();
                    continue;
                }
                self.endpos = brk.endpos;
                self.dim.width = wid_brk + brk.dim.width;
                self.elements[i] = brk;
                self.move_elements(i + 1, &mut tail);
                return tail;
            }
            debug_assert!(tail.is_empty(), "failed split left a tail");
        }

        // An element that cannot be separated from its predecessor (virtual
        // elements) goes with it.
        if cit != 0 && self.elements[cit].flags.contains(RowFlags::NO_BREAK_BEFORE) {
            cit -= 1;
            wid -= self.elements[cit].dim.width;
        }

        if cit != 0 {
            // No usable separator, but several elements: cut right here.
            self.endpos = self.elements[cit].pos;
            self.dim.width = wid;
            self.move_elements(cit, &mut tail);
            return tail;
        }

        // Last resort: split the first element anywhere.
        let forced = self.elements[0].split_at(
            max_width - wid,
            next_width,
            SplitType::Force,
            &mut tail,
            fm,
        );
        if !forced {
            log::warn!(
                "row of paragraph {} starts with an unbreakable element of width {}",
                self.pit,
                self.elements[0].dim.width
            );
        }
        self.endpos = self.elements[0].endpos;
        self.dim.width = wid + self.elements[0].dim.width;
        self.move_elements(1, &mut tail);
        tail
    }

    /// Removes a trailing space of the last element, which is invisible at a
    /// row break. The row width shrinks accordingly.
    pub fn rtrim(&mut self) {
        let Some(last) = self.elements.last_mut() else {
            return;
        };
        let old_width = last.dim.width;
        last.rtrim();
        self.dim.width += last.dim.width - old_width;
    }

    /// Puts the elements in visual order: runs whose direction differs from the
    /// paragraph direction are reversed, then the whole row is reversed for
    /// right-to-left paragraphs. Called once, when the row is complete.
    pub fn reverse_rtl(&mut self) {
        let mut i = 0;
        let end = self.elements.len();
        while i < end {
            let rtl = self.elements[i].is_rtl();
            let j = i + self.elements[i..]
                .iter()
                .take_while(|e| e.is_rtl() == rtl)
                .count();
            if rtl != self.rtl {
                self.elements[i..j].reverse();
            }
            i = j;
        }
        if self.rtl {
            self.elements.reverse();
        }
    }

    /// Selection drawn on the row.
    pub fn selection(&self) -> RowSelection {
        self.selection
    }

    /// Whether part of the row is selected.
    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// Computes the part of the selection `beg..end` drawn on the row, margins
    /// included. The row is not modified; see [`commit_selection`](Self::commit_selection).
    pub fn selection_for(&self, beg: CursorPos, end: CursorPos) -> RowSelection {
        let mut sel = RowSelection::range(self.pos, self.endpos, beg.pos, end.pos);
        sel.end_margin = sel.is_margin_selected(false, self.endpos, beg, end);
        sel.begin_margin = sel.is_margin_selected(true, self.pos, beg, end);
        sel
    }

    /// Stores the selection, marking the row dirty when it changed.
    pub fn commit_selection(&mut self, sel: RowSelection) {
        if self.selection != sel {
            self.dirty = true;
        }
        self.selection = sel;
    }

    /// Removes any selection from the row.
    pub fn clear_selection(&mut self) {
        self.commit_selection(RowSelection::default());
    }
}

/// Whether splitting an element that did not overflow by itself would leave a
/// remainder too wide for the next row. Cutting before the element is then
/// preferred.
fn split_would_overflow_next(
    wid_before: i32,
    original_width: i32,
    split_width: i32,
    min_row_wid: i32,
    max_width: i32,
    next_width: i32,
) -> bool {
    wid_before + original_width < max_width
        && min_row_wid - (wid_before + split_width) >= next_width
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "pit: {} pos: {} end: {} left_margin: {} width: {} right_margin: {} \
             ascent: {} descent: {} end_boundary: {} flushed: {} rtl: {}",
            self.pit,
            self.pos,
            self.endpos,
            self.left_margin,
            self.dim.width,
            self.right_margin,
            self.dim.ascent,
            self.dim.descent,
            self.end_boundary,
            self.flushed,
            self.rtl
        )?;
        let mut x = f64::from(self.left_margin);
        for e in &self.elements {
            let (from, to) = if e.is_rtl() {
                (e.endpos, e.pos)
            } else {
                (e.pos, e.endpos)
            };
            writeln!(
                f,
                "x={x} => {from}..{to} {:?} {:?} width={} flags={:?}",
                e.kind,
                e.text,
                e.full_width(),
                e.flags
            )?;
            x += e.full_width();
        }
        Ok(())
    }
}
