// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Embedded objects.

use core::fmt::Debug;

use crate::font::{Font, FontMetrics};
use crate::geometry::CoordCache;
use crate::row::RowFlags;
use crate::Dimension;

/// What the layout engine needs to know about an inset beyond its size.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub enum InsetKind {
    /// Any other embedded object.
    #[default]
    Generic,
    /// Forced line break.
    Newline,
    /// Paragraph separator that keeps the paragraph together.
    Separator,
    /// Separator between two environments of the same style.
    EnvSeparator,
    /// Explicit horizontal fill.
    Hfill,
    /// Bibliography entry key.
    Bibitem,
}

/// Input and output of [`Inset::measure`].
pub struct MeasureInfo<'a> {
    /// Width available to the inset.
    pub width: i32,
    /// Font of the surrounding text, or the document font for insets that do not
    /// inherit it.
    pub font: Font,
    /// Font metrics service.
    pub fm: &'a dyn FontMetrics,
    /// Geometry of nested objects may be recorded here.
    pub coord_cache: &'a mut CoordCache,
    /// Whether the surrounding layout asks for a tight fit.
    pub tight: bool,
    /// Width the inset wants to occupy beyond its own dimension, set by the inset.
    pub extra_width: i32,
}

impl Debug for MeasureInfo<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MeasureInfo")
            .field("width", &self.width)
            .field("font", &self.font)
            .field("tight", &self.tight)
            .field("extra_width", &self.extra_width)
            .finish_non_exhaustive()
    }
}

/// An embedded object occupying one position of a paragraph.
///
/// The engine treats insets as black boxes: it asks for their size, caches it in
/// the [`CoordCache`] and places them on rows.
pub trait Inset: Debug {
    /// Computes the dimension of the inset for the given constraints.
    fn measure(&self, mi: &mut MeasureInfo<'_>) -> Dimension;

    /// Breaking policy around the inset.
    fn row_flags(&self) -> RowFlags {
        RowFlags::INLINE
    }

    /// Structural role of the inset.
    fn kind(&self) -> InsetKind {
        InsetKind::Generic
    }

    /// Whether the inset is measured with the font of the surrounding text.
    fn inherit_font(&self) -> bool {
        true
    }

    /// Indentation of a display inset that is flushed left or right.
    fn indent(&self, _fm: &dyn FontMetrics, _font: &Font) -> i32 {
        0
    }

    /// Whether the contents carry a tracked change.
    fn is_changed(&self) -> bool {
        false
    }

    /// Whether a paragraph following this inset at the end of its own paragraph
    /// is not indented.
    fn next_no_indent(&self) -> bool {
        false
    }
}

/// A box of fixed size.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedBox {
    /// Size of the box.
    pub dim: Dimension,
    /// Breaking policy around the box.
    pub flags: RowFlags,
    /// Indentation when displayed flushed left or right.
    pub indent: i32,
}

impl FixedBox {
    /// An inline box of the given size.
    pub fn new(dim: Dimension) -> Self {
        Self {
            dim,
            flags: RowFlags::INLINE,
            indent: 0,
        }
    }

    /// A box displayed on a row of its own.
    pub fn display(dim: Dimension) -> Self {
        Self {
            dim,
            flags: RowFlags::DISPLAY,
            indent: 0,
        }
    }

    /// Returns a copy with the given breaking policy.
    #[must_use]
    pub fn with_flags(mut self, flags: RowFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl Inset for FixedBox {
    fn measure(&self, _mi: &mut MeasureInfo<'_>) -> Dimension {
        self.dim
    }

    fn row_flags(&self) -> RowFlags {
        self.flags
    }

    fn indent(&self, _fm: &dyn FontMetrics, _font: &Font) -> i32 {
        self.indent
    }
}

/// Forced line break.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Newline {
    /// The row before the break is still justified.
    pub justify: bool,
}

impl Inset for Newline {
    fn measure(&self, mi: &mut MeasureInfo<'_>) -> Dimension {
        mi.fm.dimension("\u{21b5}", &mi.font)
    }

    fn row_flags(&self) -> RowFlags {
        if self.justify {
            RowFlags::ALWAYS_BREAK_AFTER
        } else {
            RowFlags::ALWAYS_BREAK_AFTER | RowFlags::FLUSH
        }
    }

    fn kind(&self) -> InsetKind {
        InsetKind::Newline
    }
}

/// Paragraph separator, kept inside one paragraph.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Separator {
    /// Separates two environments of the same style.
    pub environment: bool,
    /// The next paragraph is not indented.
    pub next_no_indent: bool,
}

impl Inset for Separator {
    fn measure(&self, mi: &mut MeasureInfo<'_>) -> Dimension {
        mi.fm.dimension("\u{21b5}", &mi.font)
    }

    fn row_flags(&self) -> RowFlags {
        RowFlags::BREAK_AFTER | RowFlags::FLUSH
    }

    fn next_no_indent(&self) -> bool {
        self.next_no_indent
    }

    fn kind(&self) -> InsetKind {
        if self.environment {
            InsetKind::EnvSeparator
        } else {
            InsetKind::Separator
        }
    }
}

/// Horizontal fill. Its width is set by row alignment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Hfill;

impl Inset for Hfill {
    fn measure(&self, mi: &mut MeasureInfo<'_>) -> Dimension {
        Dimension::new(
            0,
            mi.fm.max_ascent(&mi.font),
            mi.fm.max_descent(&mi.font),
        )
    }

    fn row_flags(&self) -> RowFlags {
        RowFlags::CAN_BREAK_AFTER
    }

    fn kind(&self) -> InsetKind {
        InsetKind::Hfill
    }
}

/// Bibliography entry key, displayed as `[label]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bibitem {
    /// Displayed label.
    pub label: String,
}

impl Inset for Bibitem {
    fn measure(&self, mi: &mut MeasureInfo<'_>) -> Dimension {
        mi.fm.dimension(&format!("[{}]", self.label), &mi.font)
    }

    fn kind(&self) -> InsetKind {
        InsetKind::Bibitem
    }
}
