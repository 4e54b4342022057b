// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping between screen coordinates and positions in the text.
//!
//! Horizontal coordinates passed to these queries are screen coordinates: the
//! origin of the text and the horizontal scroll offset of the row are taken into
//! account. Vertical coordinates are compared with the positions set by
//! [`TextMetrics::update_positions`] or [`TextMetrics::update_metrics`].

use crate::document::{Document, InsetId};
use crate::font::{Font, FontMetrics};
use crate::geometry::CoordCache;
use crate::paragraph_metrics::ParagraphMetrics;
use crate::row::{CursorPos, Row};
use crate::util::itrunc;
use crate::{Error, Result};

use super::{display_font, TextMetrics};

/// A cursor position in a text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextPos {
    /// Paragraph.
    pub pit: usize,
    /// Position inside the paragraph.
    pub cursor: CursorPos,
}

impl TextPos {
    /// A position without boundary.
    pub const fn new(pit: usize, pos: usize) -> Self {
        Self {
            pit,
            cursor: CursorPos::new(pos),
        }
    }

    /// A position with the given boundary flag.
    pub const fn with_boundary(pit: usize, pos: usize, boundary: bool) -> Self {
        Self {
            pit,
            cursor: CursorPos::with_boundary(pos, boundary),
        }
    }

    fn key(&self) -> (usize, usize) {
        (self.pit, self.cursor.pos)
    }
}

/// A selection in a text, `begin` coming first.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextSelection {
    /// First selected position.
    pub begin: TextPos,
    /// Position after the last selected one.
    pub end: TextPos,
}

impl TextSelection {
    /// The selection between the anchor and the cursor, in any order.
    pub fn new(anchor: TextPos, cursor: TextPos) -> Self {
        if cursor.key() < anchor.key() {
            Self {
                begin: cursor,
                end: anchor,
            }
        } else {
            Self {
                begin: anchor,
                end: cursor,
            }
        }
    }
}

/// What lies under a point of the screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EditHit {
    /// Paragraph under the point.
    pub pit: usize,
    /// Closest cursor position.
    pub cursor: CursorPos,
    /// The inset covering the point. The caller may look for a position inside it.
    pub inset: Option<InsetId>,
    /// Horizontal position of the cursor, to keep when moving up and down.
    pub target_x: i32,
}

impl TextMetrics {
    /// Cursor position on `row` closest to the screen coordinate `x`, which is
    /// moved to the actual position of the cursor.
    pub fn get_pos_near_x(&self, row: &Row, x: &mut i32, fm: &dyn FontMetrics) -> CursorPos {
        let xo = self.origin.x;
        let offset = self.horiz_scroll_offset(row.pit(), row.pos());
        let mut local = *x - xo + offset;
        let cursor = row.x2pos(&mut local, fm);
        *x = local + xo - offset;
        cursor
    }

    /// Position on row `row` of paragraph `pit` closest to the screen
    /// coordinate `x`.
    pub fn x2pos(&self, pit: usize, row: usize, x: i32, fm: &dyn FontMetrics) -> Result<usize> {
        let pm = self.metrics_of(pit)?;
        let row = pm.rows().get(row).ok_or(Error::NoSuchRow { pit, row })?;
        let mut x = x;
        Ok(self.get_pos_near_x(row, &mut x, fm).pos)
    }

    /// Paragraph at the vertical position `y`.
    ///
    /// Above the first cached paragraph or below the last one, the neighbour
    /// paragraph is laid out and returned. `None` when nothing is cached.
    pub fn get_pit_near_y(
        &mut self,
        doc: &mut Document,
        y: i32,
        fm: &dyn FontMetrics,
        cache: &mut CoordCache,
    ) -> Option<usize> {
        let (&first_pit, first) = self.par_metrics.first_key_value()?;
        let (&last_pit, last) = self.par_metrics.last_key_value()?;

        if first.top().is_some_and(|top| y < top) {
            if first_pit == 0 {
                return Some(0);
            }
            return self.new_par_metrics_up(doc, fm, cache);
        }
        if last.bottom().is_some_and(|bottom| y >= bottom) {
            if last_pit + 1 >= doc.len() {
                return Some(last_pit);
            }
            return self.new_par_metrics_down(doc, fm, cache);
        }

        let pit = self
            .par_metrics
            .iter()
            .filter(|(_, pm)| pm.top().is_some_and(|top| top <= y))
            .map(|(&pit, _)| pit)
            .last();
        log::trace!("y {y} is in paragraph {pit:?}");
        pit
    }

    /// Row of a laid out paragraph at the vertical position `y`. The last row
    /// is returned below the paragraph.
    pub fn get_row_near_y(&self, pit: usize, y: i32) -> Result<usize> {
        let pm = self.metrics_of(pit)?;
        Ok(row_near_y(pm, y).0)
    }

    /// Row at the vertical position `y` of paragraph `pit`.
    ///
    /// With `assert_in_view`, the row next to it is returned when moving down
    /// (`up` false) or up, crossing paragraphs if needed, and `pit` and `y` are
    /// updated accordingly.
    pub fn get_pit_and_row_near_y(
        &mut self,
        doc: &mut Document,
        y: &mut i32,
        pit: &mut usize,
        assert_in_view: bool,
        up: bool,
        fm: &dyn FontMetrics,
        cache: &mut CoordCache,
    ) -> Result<usize> {
        let pm = self.metrics_of(*pit)?;
        let (mut r, yy) = row_near_y(pm, *y);
        let nrows = pm.rows().len();
        let height = pm.rows()[r].height();
        if !assert_in_view {
            return Ok(r);
        }

        if !up && yy + height > *y {
            if r > 0 {
                *y = yy;
                r -= 1;
            } else if *pit > 0 {
                *pit -= 1;
                if !self.contains(*pit) {
                    self.new_par_metrics_up(doc, fm, cache);
                }
                r = self.metrics_of(*pit)?.rows().len() - 1;
                *y = yy;
            }
        } else if up && yy != *y {
            if r + 1 < nrows {
                *y = yy + height;
                r += 1;
            } else if *pit + 1 < doc.len() {
                *pit += 1;
                if !self.contains(*pit) {
                    self.new_par_metrics_down(doc, fm, cache);
                }
                let pm = self.metrics_of(*pit)?;
                r = 0;
                *y = pm.position().unwrap_or(*y);
            }
        }
        Ok(r)
    }

    /// Inset of paragraph `pit` covering the screen point, with its position.
    pub fn check_inset_hit(
        &self,
        doc: &Document,
        pit: usize,
        x: i32,
        y: i32,
        cache: &CoordCache,
    ) -> Option<(usize, InsetId)> {
        let hit = doc
            .get(pit)?
            .insets()
            .find(|&(_, id)| cache.insets().covers(id, x, y));
        log::trace!("inset hit at ({x}, {y}) in paragraph {pit}: {hit:?}");
        hit
    }

    /// What lies under the screen point: the closest cursor position and the
    /// inset covering the point, if any.
    pub fn edit_xy(
        &mut self,
        doc: &mut Document,
        x: i32,
        y: i32,
        assert_in_view: bool,
        up: bool,
        fm: &dyn FontMetrics,
        cache: &mut CoordCache,
    ) -> Option<EditHit> {
        if log::log_enabled!(log::Level::Trace) {
            cache.dump();
        }
        let mut y = y;
        let mut pit = self.get_pit_near_y(doc, y, fm, cache)?;
        let r = self
            .get_pit_and_row_near_y(doc, &mut y, &mut pit, assert_in_view, up, fm, cache)
            .ok()?;
        let row = self.metrics_of(pit).ok()?.rows().get(r)?;

        let inset = self.check_inset_hit(doc, pit, x, y, cache).map(|(_, id)| id);
        // Over an inset, the cursor goes to the closest side of it.
        let mut target_x = x;
        let cursor = self.get_pos_near_x(row, &mut target_x, fm);
        Some(EditHit {
            pit,
            cursor,
            inset,
            target_x,
        })
    }

    /// Cursor position closest to the screen point.
    pub fn set_cursor_from_coordinates(
        &mut self,
        doc: &mut Document,
        x: i32,
        y: i32,
        fm: &dyn FontMetrics,
        cache: &mut CoordCache,
    ) -> Option<TextPos> {
        let pit = self.get_pit_near_y(doc, y, fm, cache)?;
        let pm = self.metrics_of(pit).ok()?;
        let (r, _) = row_near_y(pm, y);
        let row = pm.rows().get(r)?;
        let mut xx = x;
        let cursor = self.get_pos_near_x(row, &mut xx, fm);
        log::trace!("cursor set at {pit}:{} from ({x}, {y})", cursor.pos);
        Some(TextPos { pit, cursor })
    }

    /// Horizontal position of the cursor relative to the text.
    pub fn cursor_x(&self, pos: TextPos, fm: &dyn FontMetrics) -> Result<i32> {
        let pm = self.metrics_of(pos.pit)?;
        Ok(pm
            .get_row(pos.cursor.pos, pos.cursor.boundary)
            .map_or(0, |row| {
                itrunc(row.pos2x(pos.cursor.pos, pos.cursor.boundary, fm))
            }))
    }

    /// Baseline of the cursor relative to the first baseline of the text. Every
    /// paragraph up to the cursor must be laid out.
    pub fn cursor_y(&self, pos: TextPos) -> Result<i32> {
        let pm = self.metrics_of(pos.pit)?;
        let mut h = -self.metrics_of(0)?.rows().first().map_or(0, Row::ascent);
        for pit in 0..pos.pit {
            h += self.metrics_of(pit)?.height();
        }
        let rend = pm.pos2row(pos.cursor.pos, pos.cursor.boundary);
        h += pm.rows()[..rend].iter().map(Row::height).sum::<i32>();
        h += pm.rows().get(rend).map_or(0, Row::ascent);
        Ok(h)
    }

    /// Start of the row holding the cursor.
    pub fn row_home(&self, pos: TextPos) -> Result<TextPos> {
        let pm = self.metrics_of(pos.pit)?;
        let start = pm
            .get_row(pos.cursor.pos, pos.cursor.boundary)
            .map_or(0, Row::pos);
        Ok(TextPos::new(pos.pit, start))
    }

    /// End of the row holding the cursor. A row continued on the next one ends
    /// before its trailing separator, or with a boundary when it has none.
    pub fn row_end(&self, doc: &Document, pos: TextPos) -> Result<TextPos> {
        let pit = pos.pit;
        let pm = self.metrics_of(pit)?;
        let Some(row) = pm.get_row(pos.cursor.pos, pos.cursor.boundary) else {
            return Ok(pos);
        };
        let mut end = row.endpos();
        if end == 0 {
            return Ok(pos);
        }
        let mut boundary = false;
        if end != doc.paragraph(pit).size() {
            if !doc.is_line_separator(pit, end - 1)
                && !doc.is_newline(pit, end - 1)
                && !doc.is_env_separator(pit, end - 1)
            {
                boundary = true;
            } else {
                end -= 1;
            }
        } else if doc.is_env_separator(pit, end - 1) {
            end -= 1;
        }
        Ok(TextPos::with_boundary(pit, end, boundary))
    }

    /// Whether the cursor is displayed in right-to-left text.
    pub fn is_rtl(&self, doc: &Document, pos: TextPos) -> bool {
        let mut p = pos.cursor.pos;
        if pos.cursor.boundary && p > 0 {
            p -= 1;
        }
        display_font(doc, pos.pit, p).rtl
    }

    /// Whether the direction changes at `pos`, so that the position is
    /// displayed at two places.
    pub fn is_rtl_boundary(&self, doc: &Document, pit: usize, pos: usize) -> bool {
        if pos == 0 {
            return false;
        }
        let font = display_font(doc, pit, pos - 1);
        self.is_rtl_boundary_with_font(doc, pit, pos, &font)
    }

    /// Like [`is_rtl_boundary`](Self::is_rtl_boundary), with the font on the
    /// left side of the position given. A row break is never a direction
    /// boundary.
    pub fn is_rtl_boundary_with_font(
        &self,
        doc: &Document,
        pit: usize,
        pos: usize,
        font: &Font,
    ) -> bool {
        // Paragraphs that are not laid out are not on screen.
        if pos == 0 {
            return false;
        }
        let Ok(pm) = self.metrics_of(pit) else {
            return false;
        };
        let endpos = pm.get_row(pos - 1, false).map_or(0, Row::endpos);
        let startpos = pm.get_row(pos, false).map_or(0, Row::pos);
        // Start of a row that is also the end of the previous one.
        if pos == startpos && pos == endpos {
            return false;
        }

        let par = doc.paragraph(pit);
        let right = if pos == par.size() {
            par.is_rtl()
        } else {
            display_font(doc, pit, pos).rtl
        };
        font.rtl != right
    }

    /// Computes and stores the part of `selection` drawn on each row of
    /// paragraph `pit`. `None` clears the selection.
    pub fn update_selection(&mut self, doc: &Document, pit: usize, selection: Option<&TextSelection>) {
        let size = doc.get(pit).map_or(0, |par| par.size());
        if let Some(pm) = self.par_metrics.get_mut(&pit) {
            select_rows(pm, pit, size, selection);
        }
    }

    /// Like [`update_selection`](Self::update_selection) for every cached
    /// paragraph.
    pub fn update_selections(&mut self, doc: &Document, selection: Option<&TextSelection>) {
        for (&pit, pm) in &mut self.par_metrics {
            let size = doc.get(pit).map_or(0, |par| par.size());
            select_rows(pm, pit, size, selection);
        }
    }
}

/// Index of the row of `pm` at `y`, and the top of that row.
fn row_near_y(pm: &ParagraphMetrics, y: i32) -> (usize, i32) {
    let mut yy = pm.top().unwrap_or(0);
    let mut r = 0;
    let rows = pm.rows();
    while r + 1 < rows.len() {
        let h = rows[r].height();
        if yy + h > y {
            break;
        }
        yy += h;
        r += 1;
    }
    (r, yy)
}

fn select_rows(pm: &mut ParagraphMetrics, pit: usize, size: usize, selection: Option<&TextSelection>) {
    let selection = selection.filter(|s| s.begin.pit <= pit && pit <= s.end.pit);
    for row in pm.rows_mut() {
        let Some(s) = selection else {
            row.clear_selection();
            continue;
        };
        // Relative to the paragraph.
        let beg = if s.begin.pit == pit {
            s.begin.cursor
        } else {
            CursorPos::new(0)
        };
        let end = if s.end.pit == pit {
            s.end.cursor
        } else {
            CursorPos::new(size)
        };
        let mut sel = row.selection_for(beg, end);
        // Margins at the paragraph edges are selected when the selection goes on.
        if sel.is_some() {
            if sel.sel_beg == Some(0) {
                sel.begin_margin = s.begin.pit < pit;
            }
            if sel.sel_end == Some(size) {
                sel.end_margin = s.end.pit > pit;
            }
        }
        row.commit_selection(sel);
    }
}
