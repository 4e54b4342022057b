// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout of the paragraphs of a text.
//!
//! [`TextMetrics`] owns the cache of [`ParagraphMetrics`] of one text: the main
//! text of a document or the text of an inset. It turns paragraphs into rows
//! (tokenize, break, align), stacks them vertically and answers the queries that
//! map screen coordinates back to cursor positions.
//!
//! Laying out is explicit: [`TextMetrics::ensure_laid_out`] and the other
//! `&mut self` methods compute, while [`TextMetrics::metrics_of`] and the other
//! queries only read the cache.

mod align;
mod breaking;
mod coords;
mod margins;
mod spacing;
mod tokenize;

use std::collections::BTreeMap;

use hashbrown::HashMap;

pub use coords::{EditHit, TextPos, TextSelection};

use crate::document::{Document, InsetId, MarginType, MeasureInfo};
use crate::font::{Font, FontMetrics};
use crate::geometry::CoordCache;
use crate::paragraph_metrics::ParagraphMetrics;
use crate::row::Row;
use crate::settings::LayoutSettings;
use crate::util::itrunc;
use crate::{Dimension, Error, Point, Result};

/// Width used in place of an invalid viewport width.
pub const MIN_TEXT_WIDTH: i32 = 10;

/// End of paragraph marker, ¶.
const PILCROW: &str = "\u{b6}";

/// A bookmark displayed inside the text.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bookmark {
    /// Number of the bookmark, from 1 to 9.
    pub number: u32,
    /// Paragraph of the bookmark.
    pub pit: usize,
    /// Position of the bookmark.
    pub pos: usize,
}

/// A completion proposed at the cursor and displayed before it is accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineCompletion {
    /// Paragraph of the cursor.
    pub pit: usize,
    /// Position of the cursor. The completion is displayed in front of it.
    pub pos: usize,
    /// Completion text.
    pub text: String,
    /// Number of leading characters shared by no other candidate.
    pub unique_chars: usize,
}

/// Input method composition text, displayed at the cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preedit {
    /// Paragraph of the cursor.
    pub pit: usize,
    /// Position of the cursor.
    pub pos: usize,
    /// Composed text.
    pub text: String,
    /// The text may be broken between any two characters.
    pub wrap_anywhere: bool,
}

/// Displayed content that is not part of the document.
#[derive(Clone, Debug, Default)]
struct Overlays {
    bookmarks: Vec<Bookmark>,
    completion: Option<InlineCompletion>,
    preedit: Option<Preedit>,
}

/// Everything the layout of a paragraph depends on, besides the cache.
#[derive(Clone, Copy)]
struct LayoutEnv<'a> {
    doc: &'a Document,
    fm: &'a dyn FontMetrics,
    settings: &'a LayoutSettings,
    overlays: &'a Overlays,
}

impl LayoutEnv<'_> {
    fn display_font(&self, pit: usize, pos: usize) -> Font {
        display_font(self.doc, pit, pos)
    }

    fn label_font(&self, pit: usize) -> Font {
        label_font(self.doc, pit)
    }

    /// Font of the end of paragraph marker.
    fn layout_font(&self, pit: usize) -> Font {
        let par = self.doc.paragraph(pit);
        par.layout().font.with_rtl(par.is_rtl())
    }

    /// Nesting depth of paragraph `pit`.
    fn depth(&self, pit: usize) -> i32 {
        i32::try_from(self.doc.paragraph(pit).params().depth).unwrap_or(i32::MAX)
    }

    /// Whether paragraph `pit` ends with a visible ¶.
    fn shows_end_marker(&self, pit: usize) -> bool {
        let par = self.doc.paragraph(pit);
        (self.settings.paragraph_markers || par.change_at(par.size()).changed())
            && pit + 1 < self.doc.len()
    }
}

/// Font used to display position `pos`: the label font inside a manual label,
/// the paragraph font elsewhere.
fn display_font(doc: &Document, pit: usize, pos: usize) -> Font {
    let font = doc.paragraph(pit).font_at(pos);
    if pos < doc.begin_of_body(pit) {
        label_font(doc, pit).with_rtl(font.rtl)
    } else {
        font
    }
}

fn label_font(doc: &Document, pit: usize) -> Font {
    let par = doc.paragraph(pit);
    par.layout().label_font.with_rtl(par.is_rtl())
}

/// Layout cache and coordinate queries of one text.
#[derive(Clone, Debug)]
pub struct TextMetrics {
    par_metrics: BTreeMap<usize, ParagraphMetrics>,
    dim: Dimension,
    settings: LayoutSettings,
    origin: Point,
    overlays: Overlays,
    scroll_offsets: HashMap<(usize, usize), i32>,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::new(LayoutSettings::default())
    }
}

impl TextMetrics {
    /// Creates an empty cache.
    pub fn new(settings: LayoutSettings) -> Self {
        let settings = sanitize(settings);
        Self {
            par_metrics: BTreeMap::new(),
            dim: Dimension::new(settings.max_width, 10, 10),
            settings,
            origin: Point::default(),
            overlays: Overlays::default(),
            scroll_offsets: HashMap::new(),
        }
    }

    /// Current settings.
    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Replaces the settings. Returns whether they changed, in which case every
    /// cached paragraph is dropped.
    pub fn set_settings(&mut self, settings: LayoutSettings) -> bool {
        let settings = sanitize(settings);
        if settings == self.settings {
            return false;
        }
        log::debug!(
            "layout settings changed (width {} -> {}), dropping {} paragraphs",
            self.settings.max_width,
            settings.max_width,
            self.par_metrics.len()
        );
        if settings.max_width != self.settings.max_width {
            self.dim = Dimension::new(settings.max_width, 10, 10);
        }
        self.settings = settings;
        self.par_metrics.clear();
        true
    }

    /// Extent of the whole text, as computed by [`metrics`](Self::metrics).
    pub fn dim(&self) -> Dimension {
        self.dim
    }

    /// Width of the text.
    pub fn width(&self) -> i32 {
        self.dim.width
    }

    /// Height of the text.
    pub fn height(&self) -> i32 {
        self.dim.height()
    }

    /// Screen position of the text, set by [`update_positions`](Self::update_positions).
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Whether paragraph `pit` is in the cache.
    pub fn contains(&self, pit: usize) -> bool {
        self.par_metrics.contains_key(&pit)
    }

    /// Drops paragraph `pit` from the cache. Call it whenever the paragraph
    /// changes.
    pub fn forget(&mut self, pit: usize) {
        self.par_metrics.remove(&pit);
    }

    /// Drops every paragraph.
    pub fn clear(&mut self) {
        self.par_metrics.clear();
    }

    /// Cached paragraphs, in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ParagraphMetrics)> + '_ {
        self.par_metrics.iter().map(|(pit, pm)| (*pit, pm))
    }

    /// First cached paragraph.
    pub fn first(&self) -> Option<(usize, &ParagraphMetrics)> {
        self.par_metrics.first_key_value().map(|(pit, pm)| (*pit, pm))
    }

    /// Last cached paragraph.
    pub fn last(&self) -> Option<(usize, &ParagraphMetrics)> {
        self.par_metrics.last_key_value().map(|(pit, pm)| (*pit, pm))
    }

    /// Whether `row` is the first row of the text.
    pub fn is_first_row(&self, row: &Row) -> bool {
        row.pos() == 0 && row.pit() == 0
    }

    /// Whether `row` is the last row of the text.
    pub fn is_last_row(&self, doc: &Document, row: &Row) -> bool {
        row.pit() + 1 == doc.len() && row.endpos() >= doc.paragraph(row.pit()).size()
    }

    /// Marks the row of paragraph `pit` starting at `pos` for repaint.
    pub fn set_row_changed(&mut self, pit: usize, pos: usize) {
        if let Some(pm) = self.par_metrics.get_mut(&pit) {
            for row in pm.rows_mut().iter_mut().filter(|row| row.pos() == pos) {
                row.mark_dirty();
            }
        }
    }

    /// Lays out paragraph `pit` unless it is cached with rows. Returns whether
    /// it had to be laid out.
    pub fn ensure_laid_out(
        &mut self,
        doc: &mut Document,
        pit: usize,
        fm: &dyn FontMetrics,
        cache: &mut CoordCache,
    ) -> Result<bool> {
        if pit >= doc.len() {
            return Err(Error::NoSuchParagraph {
                pit,
                len: doc.len(),
            });
        }
        if self
            .par_metrics
            .get(&pit)
            .is_some_and(|pm| !pm.rows().is_empty())
        {
            return Ok(false);
        }
        self.redo_paragraph(doc, pit, true, fm, cache);
        Ok(true)
    }

    /// Metrics of a laid out paragraph.
    pub fn metrics_of(&self, pit: usize) -> Result<&ParagraphMetrics> {
        self.par_metrics
            .get(&pit)
            .filter(|pm| !pm.rows().is_empty())
            .ok_or(Error::NotLaidOut { pit })
    }

    /// Shows `bookmarks` inside the text when the settings ask for it.
    pub fn set_bookmarks(&mut self, bookmarks: Vec<Bookmark>) {
        let old = core::mem::replace(&mut self.overlays.bookmarks, bookmarks);
        for pit in old.iter().chain(&self.overlays.bookmarks).map(|b| b.pit) {
            self.par_metrics.remove(&pit);
        }
    }

    /// Shows or hides an inline completion.
    pub fn set_inline_completion(&mut self, completion: Option<InlineCompletion>) {
        let old = core::mem::replace(&mut self.overlays.completion, completion);
        for pit in old.iter().chain(&self.overlays.completion).map(|c| c.pit) {
            self.par_metrics.remove(&pit);
        }
    }

    /// Shows or hides input method composition text.
    pub fn set_preedit(&mut self, preedit: Option<Preedit>) {
        let old = core::mem::replace(&mut self.overlays.preedit, preedit);
        for pit in old.iter().chain(&self.overlays.preedit).map(|p| p.pit) {
            self.par_metrics.remove(&pit);
        }
    }

    /// Horizontal scroll offset of the row of `pit` starting at `pos`.
    pub fn horiz_scroll_offset(&self, pit: usize, pos: usize) -> i32 {
        self.scroll_offsets.get(&(pit, pos)).copied().unwrap_or(0)
    }

    /// Scrolls a row that is wider than the view. A zero offset removes it.
    pub fn set_horiz_scroll_offset(&mut self, pit: usize, pos: usize, offset: i32) {
        if offset == 0 {
            self.scroll_offsets.remove(&(pit, pos));
        } else {
            self.scroll_offsets.insert((pit, pos), offset);
        }
        self.set_row_changed(pit, pos);
    }

    /// Single row holding every element of paragraph `pit`, before breaking.
    ///
    /// Insets get the dimension recorded in `cache`.
    pub fn tokenize_paragraph(
        &self,
        doc: &Document,
        pit: usize,
        fm: &dyn FontMetrics,
        cache: &CoordCache,
    ) -> Row {
        self.env(doc, fm).tokenize_paragraph(pit, cache.insets())
    }

    /// Breaks a tokenized paragraph into rows that fit the text width.
    pub fn break_paragraph(&self, doc: &Document, bigrow: &Row, fm: &dyn FontMetrics) -> Vec<Row> {
        self.env(doc, fm).break_paragraph(bigrow)
    }

    /// Left margin of position `pos` of paragraph `pit`.
    pub fn left_margin(&self, doc: &Document, pit: usize, pos: usize, fm: &dyn FontMetrics) -> i32 {
        self.env(doc, fm).left_margin(pit, pos)
    }

    /// Right margin of paragraph `pit`.
    pub fn right_margin(&self, doc: &Document, pit: usize, fm: &dyn FontMetrics) -> i32 {
        self.env(doc, fm).right_margin(pit)
    }

    fn env<'a>(&'a self, doc: &'a Document, fm: &'a dyn FontMetrics) -> LayoutEnv<'a> {
        LayoutEnv {
            doc,
            fm,
            settings: &self.settings,
            overlays: &self.overlays,
        }
    }

    /// Lays out paragraph `pit` again: measures its insets, tokenizes and breaks
    /// it, then computes the height and, with `align_rows`, the alignment of
    /// every row.
    ///
    /// Returns whether the height of the paragraph or the dimension of one of
    /// its insets changed, that is whether the following paragraphs move.
    pub fn redo_paragraph(
        &mut self,
        doc: &mut Document,
        pit: usize,
        align_rows: bool,
        fm: &dyn FontMetrics,
        cache: &mut CoordCache,
    ) -> bool {
        if pit >= doc.len() {
            log::warn!("cannot lay out paragraph {pit} of {}", doc.len());
            return false;
        }
        if doc.fix_biblio(pit) {
            log::warn!("repaired bibliography markup of paragraph {pit}");
        }
        let doc = &*doc;
        let env = LayoutEnv {
            doc,
            fm,
            settings: &self.settings,
            overlays: &self.overlays,
        };
        let max_width = self.settings.max_width;
        let tight = self.settings.tight;
        let old_dim = self
            .par_metrics
            .get(&pit)
            .map(ParagraphMetrics::dim)
            .unwrap_or_default();
        let par = doc.paragraph(pit);
        let right_margin = env.right_margin(pit);
        let mut changed = false;

        // Insets first: the rows need their size.
        let eop = if env.shows_end_marker(pit) {
            fm.width(PILCROW, &env.layout_font(pit))
        } else {
            0
        };
        let mut extra_widths: HashMap<InsetId, i32> = HashMap::new();
        for (pos, id) in par.insets() {
            let Some(inset) = doc.inset(id) else {
                log::warn!("paragraph {pit} refers to a dead inset at {pos}");
                continue;
            };
            let eop = if pos + 1 == par.size() { eop } else { 0 };
            let font = if inset.inherit_font() {
                env.display_font(pit, pos)
            } else {
                doc.params().font
            };
            let mut mi = MeasureInfo {
                width: max_width - env.left_margin(pit, pos) - right_margin - eop,
                font,
                fm,
                coord_cache: &mut *cache,
                tight,
                extra_width: 0,
            };
            let dim = inset.measure(&mut mi);
            extra_widths.insert(id, mi.extra_width);
            changed |= cache.insets_mut().add_dim(id, dim);
        }

        let bigrow = env.tokenize_paragraph(pit, cache.insets());
        let mut rows = env.break_paragraph(&bigrow);

        // Room requested by insets beyond their own width.
        for row in &mut rows {
            for i in 0..row.len() {
                let Some(id) = row.elements()[i].inset() else {
                    continue;
                };
                if row.width() < max_width || tight {
                    row.dim_mut().width += extra_widths.get(&id).copied().unwrap_or(0);
                }
            }
        }

        // Several rows fill the whole width.
        if rows.len() > 1 && !tight && self.dim.width < max_width {
            self.dim.width = max_width;
        }

        let mut dim = Dimension::default();
        for row in &mut rows {
            env.set_row_height(row);
            if align_rows {
                env.set_row_alignment(row, self.dim.width.max(row.width()), cache.insets_mut());
            }
            dim.width = dim.width.max(row.width() + row.right_margin);
            dim.descent += row.height();
        }

        if par.layout().margin_type == MarginType::RightAddressBox {
            let offset = if par.is_rtl() {
                let min_left = rows
                    .iter()
                    .map(|row| row.left_margin)
                    .fold(max_width, i32::min);
                right_margin - min_left
            } else {
                let max_row = rows.iter().map(Row::width).fold(0, i32::max);
                max_width - right_margin - max_row
            };
            for row in &mut rows {
                row.left_margin += offset;
                row.dim_mut().width += offset;
            }
        }

        let mut top = env.par_top_spacing(pit);
        let mut bottom = env.par_bottom_spacing(pit);
        if self.settings.main_text {
            if pit == 0 {
                top += self.settings.view_margins.top;
            }
            if pit + 1 == doc.len() {
                bottom += self.settings.view_margins.bottom;
            }
        }
        if let Some(first) = rows.first_mut() {
            first.dim_mut().ascent += top;
        }
        if let Some(last) = rows.last_mut() {
            last.dim_mut().descent += bottom;
        }
        dim.descent += top + bottom;
        // The ascent of the paragraph is the one of its first row.
        let first_ascent = rows.first().map_or(0, Row::ascent);
        dim.ascent += first_ascent;
        dim.descent -= first_ascent;

        changed |= old_dim.height() != dim.height();
        log::debug!(
            "paragraph {pit}: {} rows, height {} -> {}",
            rows.len(),
            old_dim.height(),
            dim.height()
        );

        let pm = self.par_metrics.entry(pit).or_default();
        *pm.rows_mut() = rows;
        *pm.dim_mut() = dim;
        if log::log_enabled!(log::Level::Trace) {
            pm.dump();
        }
        changed
    }

    /// Lays out the whole text for a width of at least `min_width`: every
    /// paragraph is broken first, then all rows are aligned against the widest
    /// one. Returns whether the dimension of the text or of an inset changed.
    pub fn metrics(
        &mut self,
        doc: &mut Document,
        min_width: i32,
        fm: &dyn FontMetrics,
        cache: &mut CoordCache,
    ) -> bool {
        let old_dim = self.dim;
        let npar = doc.len();
        self.dim = Dimension::new(min_width, 0, 0);
        if npar > 1 && !self.settings.tight {
            self.dim.width = self.settings.max_width;
        }

        let mut changed = false;
        let mut height = 0;
        for pit in 0..npar {
            changed |= self.redo_paragraph(doc, pit, false, fm, cache);
            if let Some(pm) = self.par_metrics.get(&pit) {
                height += pm.height();
                self.dim.width = self.dim.width.max(pm.width());
            }
        }
        self.par_metrics.retain(|&pit, _| pit < npar);

        // The width is known only now.
        let env = LayoutEnv {
            doc: &*doc,
            fm,
            settings: &self.settings,
            overlays: &self.overlays,
        };
        let width = self.dim.width;
        for pm in self.par_metrics.values_mut() {
            for row in pm.rows_mut() {
                env.set_row_alignment(row, width, cache.insets_mut());
            }
        }

        self.dim.ascent = self.par_metrics.get(&0).map_or(0, ParagraphMetrics::ascent);
        self.dim.descent = height - self.dim.ascent;
        changed || self.dim != old_dim
    }

    /// Lays out the paragraphs visible in a view `view_height` pixels high, the
    /// paragraph `anchor_pit` having its first baseline at `anchor_ypos`.
    /// Paragraphs outside the view are dropped from the cache.
    ///
    /// Only meaningful for the main text.
    pub fn update_metrics(
        &mut self,
        doc: &mut Document,
        anchor_pit: usize,
        anchor_ypos: i32,
        view_height: i32,
        fm: &dyn FontMetrics,
        cache: &mut CoordCache,
    ) {
        if !self.settings.main_text {
            log::warn!("update_metrics called on a text that is not the main text");
            return;
        }
        if anchor_pit >= doc.len() {
            log::warn!("anchor paragraph {anchor_pit} out of range");
            return;
        }
        let npit = doc.len();
        if !self.contains(anchor_pit) {
            self.redo_paragraph(doc, anchor_pit, true, fm, cache);
        }
        let (ascent, descent) = {
            let pm = self.par_metrics.entry(anchor_pit).or_default();
            pm.set_position(anchor_ypos);
            (pm.ascent(), pm.descent())
        };

        // Above the anchor.
        let mut y1 = anchor_ypos - ascent;
        let mut first = anchor_pit;
        while first > 0 && y1 > 0 {
            let pit = first - 1;
            if !self.contains(pit) {
                self.redo_paragraph(doc, pit, true, fm, cache);
            }
            let pm = self.par_metrics.entry(pit).or_default();
            y1 -= pm.descent();
            pm.set_position(y1);
            y1 -= pm.ascent();
            first = pit;
        }

        // Below the anchor.
        let mut y2 = anchor_ypos + descent;
        let mut last = anchor_pit;
        while last + 1 < npit && y2 < view_height {
            let pit = last + 1;
            if !self.contains(pit) {
                self.redo_paragraph(doc, pit, true, fm, cache);
            }
            let pm = self.par_metrics.entry(pit).or_default();
            y2 += pm.ascent();
            pm.set_position(y2);
            y2 += pm.descent();
            last = pit;
        }

        self.par_metrics
            .retain(|pit, _| (first..=last).contains(pit));
        for pit in first..=last {
            self.update_pos_cache(pit, cache);
        }
        log::debug!(
            "update_metrics: anchor {anchor_pit} at {anchor_ypos}, paragraphs {first}..={last}, y {y1}..{y2}"
        );
    }

    /// Lays out the paragraph after the last cached one and places it below.
    /// Returns its index, or `None` at the end of the text.
    pub fn new_par_metrics_down(
        &mut self,
        doc: &mut Document,
        fm: &dyn FontMetrics,
        cache: &mut CoordCache,
    ) -> Option<usize> {
        let (&last_pit, last) = self.par_metrics.last_key_value()?;
        let bottom = last.bottom().unwrap_or(last.descent());
        let pit = last_pit + 1;
        if pit >= doc.len() {
            return None;
        }
        self.redo_paragraph(doc, pit, true, fm, cache);
        let pm = self.par_metrics.get_mut(&pit)?;
        let y = bottom + pm.ascent();
        pm.set_position(y);
        self.update_pos_cache(pit, cache);
        Some(pit)
    }

    /// Lays out the paragraph before the first cached one and places it above.
    /// Returns its index, or `None` at the start of the text.
    pub fn new_par_metrics_up(
        &mut self,
        doc: &mut Document,
        fm: &dyn FontMetrics,
        cache: &mut CoordCache,
    ) -> Option<usize> {
        let (&first_pit, first) = self.par_metrics.first_key_value()?;
        let top = first.top().unwrap_or(-first.ascent());
        let pit = first_pit.checked_sub(1)?;
        self.redo_paragraph(doc, pit, true, fm, cache);
        let pm = self.par_metrics.get_mut(&pit)?;
        let y = top - pm.descent();
        pm.set_position(y);
        self.update_pos_cache(pit, cache);
        Some(pit)
    }

    /// Places the text at `(x, y)`, the baseline of its first cached row: every
    /// cached paragraph gets its vertical position and every inset its screen
    /// position in `cache`.
    pub fn update_positions(&mut self, x: i32, y: i32, cache: &mut CoordCache) {
        self.origin = Point::new(x, y);
        let Some((_, first)) = self.par_metrics.first_key_value() else {
            return;
        };
        let mut y = y - first.ascent();
        for pm in self.par_metrics.values_mut() {
            y += pm.ascent();
            pm.set_position(y);
            y += pm.descent();
        }
        for &pit in self.par_metrics.keys() {
            self.update_pos_cache(pit, cache);
        }
    }

    /// Records the screen position of the insets of a placed paragraph.
    fn update_pos_cache(&self, pit: usize, cache: &mut CoordCache) {
        let Some(pm) = self.par_metrics.get(&pit) else {
            return;
        };
        let Some(mut y) = pm.position() else {
            return;
        };
        for (i, row) in pm.rows().iter().enumerate() {
            let row_x = self.origin.x - self.horiz_scroll_offset(pit, row.pos());
            if i > 0 {
                y += row.ascent();
            }
            let mut x = f64::from(row_x + row.left_margin);
            for e in row.elements() {
                if let Some(id) = e.inset() {
                    cache.insets_mut().add_position(id, itrunc(x), y);
                }
                x += e.full_width();
            }
            y += row.descent();
        }
    }
}

fn sanitize(mut settings: LayoutSettings) -> LayoutSettings {
    if let Err(err) = settings.validate() {
        log::warn!("{err}, using {MIN_TEXT_WIDTH} instead");
        settings.max_width = MIN_TEXT_WIDTH;
    }
    settings
}
