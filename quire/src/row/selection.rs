// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Selection state of a row, computed in a pure query and committed separately.

/// A cursor position inside a paragraph.
///
/// `boundary` disambiguates positions that are displayed at two places: at a
/// change of direction, or at the end of a row that is continued on the next one.
/// When set, the cursor sits after the previous position rather than before the
/// next one.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CursorPos {
    /// Logical position.
    pub pos: usize,
    /// The cursor is attached to the preceding position.
    pub boundary: bool,
}

impl CursorPos {
    /// A position without boundary.
    pub const fn new(pos: usize) -> Self {
        Self {
            pos,
            boundary: false,
        }
    }

    /// A position with the given boundary flag.
    pub const fn with_boundary(pos: usize, boundary: bool) -> Self {
        Self { pos, boundary }
    }
}

/// Part of a selection drawn on a row.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RowSelection {
    /// First selected position of the row.
    pub sel_beg: Option<usize>,
    /// Last selected position of the row.
    pub sel_end: Option<usize>,
    /// The left margin (right margin for RTL rows) is drawn selected.
    pub begin_margin: bool,
    /// The margin at the row end is drawn selected.
    pub end_margin: bool,
}

impl RowSelection {
    /// Whether part of the row is selected.
    pub fn is_some(&self) -> bool {
        self.sel_beg.is_some() && self.sel_end.is_some()
    }

    /// Intersection of the selection `beg..=end` with the row range
    /// `pos..=endpos`.
    pub(crate) fn range(pos: usize, endpos: usize, beg: usize, end: usize) -> Self {
        let sel_beg = if pos >= beg && pos <= end {
            Some(pos)
        } else if beg > pos && beg <= endpos {
            Some(beg)
        } else {
            None
        };
        let sel_end = if endpos >= beg && endpos <= end {
            Some(endpos)
        } else if end < endpos && end >= pos {
            Some(end)
        } else {
            None
        };
        Self {
            sel_beg,
            sel_end,
            ..Self::default()
        }
    }

    /// Whether the margin at the row start (`margin_begin`) or end, located at
    /// `margin_pos`, is selected by the selection `beg..end`.
    pub(crate) fn is_margin_selected(
        &self,
        margin_begin: bool,
        margin_pos: usize,
        beg: CursorPos,
        end: CursorPos,
    ) -> bool {
        let sel_pos = if margin_begin {
            self.sel_beg
        } else {
            self.sel_end
        };
        if !self.is_some() || sel_pos != Some(margin_pos) {
            false
        } else if beg.pos == end.pos {
            // Only the gap between two positions is selected: the margins.
            beg.boundary && !end.boundary
        } else if end.pos == margin_pos {
            !end.boundary
        } else if beg.pos == margin_pos {
            beg.boundary
        } else {
            true
        }
    }
}
