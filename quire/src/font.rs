// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fonts and the font metrics service.

use smallvec::SmallVec;

use crate::Dimension;

/// Generic font family.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub enum FontFamily {
    /// Proportional serif text.
    #[default]
    Roman,
    /// Proportional sans-serif text.
    Sans,
    /// Monospace text. Never stretched by justification.
    Typewriter,
    /// Symbol font.
    Symbol,
}

/// Logical color of a text run, resolved to pixels by the painter.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    /// Regular text.
    #[default]
    Foreground,
    /// Paragraph labels.
    Label,
    /// End of paragraph and line separator markers.
    ParagraphMarker,
    /// Inline bookmark numbers.
    Bookmark,
    /// The unique part of an inline completion.
    InlineCompletion,
    /// The part of an inline completion shared by several candidates.
    NonUniqueCompletion,
    /// Input method composition text.
    Preedit,
}

/// A fully realized font for a run of text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Font {
    /// Generic family.
    pub family: FontFamily,
    /// Pixel size at 100% zoom.
    pub size: u16,
    /// Bold weight.
    pub bold: bool,
    /// Italic or slanted shape.
    pub italic: bool,
    /// Logical color.
    pub color: Color,
    /// The run is displayed right-to-left.
    pub rtl: bool,
    /// The script of the run may be broken between any two characters.
    pub wrap_anywhere: bool,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: FontFamily::Roman,
            size: 12,
            bold: false,
            italic: false,
            color: Color::Foreground,
            rtl: false,
            wrap_anywhere: false,
        }
    }
}

impl Font {
    /// Returns a copy with the given direction.
    #[must_use]
    pub fn with_rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }

    /// Returns a copy with the given color.
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Returns a copy with the given family.
    #[must_use]
    pub fn with_family(mut self, family: FontFamily) -> Self {
        self.family = family;
        self
    }

    /// Returns a copy with the given pixel size.
    #[must_use]
    pub fn with_size(mut self, size: u16) -> Self {
        self.size = size;
        self
    }
}

/// A candidate line produced by [`FontMetrics::break_string`].
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub struct Break {
    /// Number of characters in the line, trailing spaces included.
    pub len: usize,
    /// Width of the line. Trailing spaces count only on the last line.
    pub width: i32,
    /// Width of the line without trailing spaces.
    pub nspc_width: i32,
}

/// Lines returned by [`FontMetrics::break_string`].
pub type Breaks = SmallVec<[Break; 4]>;

/// Font metrics service used by every layout call.
///
/// Positions are counted in `char`s and pixel offsets are relative to the visual
/// left edge of the string.
pub trait FontMetrics {
    /// Maximum ascent of the font.
    fn max_ascent(&self, font: &Font) -> i32;

    /// Maximum descent of the font.
    fn max_descent(&self, font: &Font) -> i32;

    /// Maximum height of the font.
    fn max_height(&self, font: &Font) -> i32 {
        self.max_ascent(font) + self.max_descent(font)
    }

    /// Size of the em unit.
    fn em(&self, font: &Font) -> i32;

    /// Advance width of `text`.
    fn width(&self, text: &str, font: &Font) -> i32;

    /// Like [`width`](Self::width), but a leading `-` makes the result negative.
    fn signed_width(&self, text: &str, font: &Font) -> i32 {
        match text.strip_prefix('-') {
            Some(rest) => -self.width(rest, font),
            None => self.width(text, font),
        }
    }

    /// Advance width of a single character.
    fn char_width(&self, c: char, font: &Font) -> i32 {
        self.width(c.encode_utf8(&mut [0; 4]), font)
    }

    /// Width of `text` together with the font's ascent and descent.
    fn dimension(&self, text: &str, font: &Font) -> Dimension {
        Dimension::new(
            self.width(text, font),
            self.max_ascent(font),
            self.max_descent(font),
        )
    }

    /// Breaks `text` into lines: the first one at most `first_width` wide, the
    /// following ones at most `next_width` wide.
    ///
    /// A line that cannot be made narrow enough at a break opportunity overflows.
    /// With `wrap_anywhere`, every character boundary is an opportunity.
    fn break_string(
        &self,
        text: &str,
        first_width: i32,
        next_width: i32,
        rtl: bool,
        wrap_anywhere: bool,
        font: &Font,
    ) -> Breaks;

    /// Pixel offset of position `pos` in `text`, with `extra` pixels added to each
    /// expansion point.
    fn pos2x(&self, text: &str, pos: usize, rtl: bool, extra: f64, font: &Font) -> i32;

    /// Position in `text` closest to the pixel offset `x`. `x` is updated to the
    /// offset of the returned position.
    fn x2pos(&self, text: &str, x: &mut i32, rtl: bool, extra: f64, font: &Font) -> usize;
}
