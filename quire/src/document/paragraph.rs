// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use unicode_bidi::{BidiInfo, Level};

use super::{Alignment, Change, InsetId, Layout, Length};
use crate::Font;

/// Content of one position of a paragraph.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    /// A character.
    Char(char),
    /// An embedded object.
    Inset(InsetId),
}

/// Character used in place of an inset when resolving directions.
const OBJECT_REPLACEMENT: char = '\u{fffc}';

/// Per-paragraph settings chosen by the author.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParagraphParams {
    /// Nesting depth.
    pub depth: usize,
    /// Suppress the first row indentation.
    pub noindent: bool,
    /// Additional left indentation.
    pub left_indent: Option<Length>,
    /// Label width for manual margins.
    pub label_width_string: String,
    /// Alignment overriding the layout's.
    pub align: Option<Alignment>,
    /// Line spacing overriding the document's.
    pub spacing: Option<f64>,
    /// The appendix starts with this paragraph.
    pub start_of_appendix: bool,
    /// Main direction of the paragraph.
    pub rtl: bool,
}

/// A paragraph: a flat sequence of characters and insets, each with a font and a
/// change annotation.
#[derive(Clone, Debug)]
pub struct Paragraph {
    slots: Vec<Slot>,
    fonts: Vec<Font>,
    changes: Vec<Change>,
    end_change: Change,
    layout: Arc<Layout>,
    params: ParagraphParams,
    label_string: String,
}

impl Paragraph {
    /// Creates an empty paragraph with the given style.
    pub fn new(layout: Arc<Layout>) -> Self {
        Self {
            slots: Vec::new(),
            fonts: Vec::new(),
            changes: Vec::new(),
            end_change: Change::default(),
            layout,
            params: ParagraphParams::default(),
            label_string: String::new(),
        }
    }

    /// Creates a paragraph holding `text` in the layout's font.
    pub fn with_text(layout: Arc<Layout>, text: &str) -> Self {
        let font = layout.font;
        let mut par = Self::new(layout);
        par.push_str(text, font);
        par
    }

    /// Number of positions.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Whether the paragraph has no position at all.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Appends characters with the given font.
    pub fn push_str(&mut self, text: &str, font: Font) {
        for c in text.chars() {
            self.push(Slot::Char(c), font);
        }
    }

    /// Appends an inset with the given font.
    pub fn push_inset(&mut self, inset: InsetId, font: Font) {
        self.push(Slot::Inset(inset), font);
    }

    fn push(&mut self, slot: Slot, font: Font) {
        self.slots.push(slot);
        self.fonts.push(font);
        self.changes.push(Change::default());
    }

    pub(crate) fn insert(&mut self, pos: usize, slot: Slot, font: Font, change: Change) {
        self.slots.insert(pos, slot);
        self.fonts.insert(pos, font);
        self.changes.insert(pos, change);
    }

    pub(crate) fn erase(&mut self, pos: usize) -> Slot {
        self.fonts.remove(pos);
        self.changes.remove(pos);
        self.slots.remove(pos)
    }

    /// Content at `pos`.
    pub fn slot(&self, pos: usize) -> Option<Slot> {
        self.slots.get(pos).copied()
    }

    /// Character at `pos`, `None` for insets and past the end.
    pub fn char_at(&self, pos: usize) -> Option<char> {
        match self.slot(pos)? {
            Slot::Char(c) => Some(c),
            Slot::Inset(_) => None,
        }
    }

    /// Inset at `pos`, if any.
    pub fn inset_at(&self, pos: usize) -> Option<InsetId> {
        match self.slot(pos)? {
            Slot::Inset(id) => Some(id),
            Slot::Char(_) => None,
        }
    }

    /// Iterates over the insets and their positions.
    pub fn insets(&self) -> impl Iterator<Item = (usize, InsetId)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(pos, slot)| match slot {
                Slot::Inset(id) => Some((pos, *id)),
                Slot::Char(_) => None,
            })
    }

    /// Font at `pos`. Past the end, the font of the last position, or the
    /// layout font for an empty paragraph.
    pub fn font_at(&self, pos: usize) -> Font {
        self.fonts
            .get(pos)
            .or_else(|| self.fonts.last())
            .copied()
            .unwrap_or_else(|| self.layout.font.with_rtl(self.params.rtl))
    }

    /// Sets the font of a range of positions.
    pub fn set_font(&mut self, range: core::ops::Range<usize>, font: Font) {
        let end = range.end.min(self.fonts.len());
        for f in &mut self.fonts[range.start.min(end)..end] {
            *f = font;
        }
    }

    /// Change annotation at `pos`; `pos == size()` is the paragraph end.
    pub fn change_at(&self, pos: usize) -> Change {
        self.changes.get(pos).copied().unwrap_or(self.end_change)
    }

    /// Sets the change annotation of a range of positions.
    pub fn set_change(&mut self, range: core::ops::Range<usize>, change: Change) {
        let end = range.end.min(self.changes.len());
        for c in &mut self.changes[range.start.min(end)..end] {
            *c = change;
        }
        if range.end > self.changes.len() {
            self.end_change = change;
        }
    }

    /// Paragraph style.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Replaces the paragraph style.
    pub fn set_layout(&mut self, layout: Arc<Layout>) {
        self.layout = layout;
    }

    /// Author settings.
    pub fn params(&self) -> &ParagraphParams {
        &self.params
    }

    /// Mutable author settings.
    pub fn params_mut(&mut self) -> &mut ParagraphParams {
        &mut self.params
    }

    /// Label text computed by the document (counters, bullets).
    pub fn label_string(&self) -> &str {
        &self.label_string
    }

    /// Sets the label text.
    pub fn set_label_string(&mut self, label: impl Into<String>) {
        self.label_string = label.into();
    }

    /// Main direction of the paragraph.
    pub fn is_rtl(&self) -> bool {
        self.params.rtl
    }

    /// Alignment of the paragraph, with left and right exchanged for
    /// right-to-left paragraphs.
    pub fn align(&self) -> Alignment {
        let align = self.params.align.unwrap_or(self.layout.align);
        match (align, self.is_rtl()) {
            (Alignment::Left, true) => Alignment::Right,
            (Alignment::Right, true) => Alignment::Left,
            (align, _) => align,
        }
    }

    /// Whether some position in `start..end` carries a change.
    pub fn is_changed(&self, start: usize, end: usize) -> bool {
        (start..end).any(|pos| self.change_at(pos).changed())
    }

    /// Resolves the display direction of every position with the Unicode
    /// bidirectional algorithm, using the paragraph direction as base level.
    pub fn resolve_directions(&mut self) {
        if self.slots.is_empty() {
            return;
        }
        let text: String = self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Char(c) => *c,
                Slot::Inset(_) => OBJECT_REPLACEMENT,
            })
            .collect();
        let base = if self.params.rtl {
            Level::rtl()
        } else {
            Level::ltr()
        };
        let info = BidiInfo::new(&text, Some(base));
        for (font, (byte, _)) in self.fonts.iter_mut().zip(text.char_indices()) {
            font.rtl = info.levels[byte].is_rtl();
        }
    }
}
