// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cached layout of one paragraph.

use crate::row::Row;
use crate::Dimension;

/// Rows and extent of a laid out paragraph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphMetrics {
    rows: Vec<Row>,
    dim: Dimension,
    position: Option<i32>,
}

impl ParagraphMetrics {
    /// Creates empty metrics with unknown position.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of the paragraph, in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    /// Extent of the paragraph; the ascent is the one of the first row.
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    pub(crate) fn dim_mut(&mut self) -> &mut Dimension {
        &mut self.dim
    }

    /// Total height.
    pub fn height(&self) -> i32 {
        self.dim.height()
    }

    /// Width, which may differ from the available width.
    pub fn width(&self) -> i32 {
        self.dim.width
    }

    /// Height above the baseline of the first row.
    pub fn ascent(&self) -> i32 {
        self.dim.ascent
    }

    /// Height below the baseline of the first row.
    pub fn descent(&self) -> i32 {
        self.dim.descent
    }

    /// Vertical position of the baseline of the first row, once placed.
    pub fn position(&self) -> Option<i32> {
        self.position
    }

    /// Places the paragraph.
    pub fn set_position(&mut self, y: i32) {
        self.position = Some(y);
    }

    /// Forgets the position.
    pub fn reset_position(&mut self) {
        self.position = None;
    }

    /// Whether the paragraph has been placed.
    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    /// Vertical position of the top of the paragraph.
    pub fn top(&self) -> Option<i32> {
        self.position.map(|y| y - self.dim.ascent)
    }

    /// Vertical position of the bottom of the paragraph.
    pub fn bottom(&self) -> Option<i32> {
        self.position.map(|y| y + self.dim.descent)
    }

    /// Index of the row holding `pos`.
    ///
    /// With `boundary`, the row holding the position before `pos`.
    pub fn pos2row(&self, pos: usize, boundary: bool) -> usize {
        let pos = if boundary && pos > 0 { pos - 1 } else { pos };
        self.rows
            .iter()
            .rposition(|row| row.pos() <= pos)
            .unwrap_or(0)
    }

    /// Row holding the cursor position, if the paragraph has rows.
    pub fn get_row(&self, pos: usize, boundary: bool) -> Option<&Row> {
        self.rows.get(self.pos2row(pos, boundary))
    }

    /// Logs the rows.
    pub fn dump(&self) {
        for row in &self.rows {
            log::trace!("{row}");
        }
    }
}
