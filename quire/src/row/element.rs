// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::document::{Change, InsetId, InsetKind};
use crate::font::{Font, FontFamily, FontMetrics};
use crate::util::{byte_offset, char_len, count_expanders, is_space, itrunc};
use crate::Dimension;

use super::RowFlags;

/// Content of a row element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// A run of characters sharing font and change.
    String,
    /// Displayed text that does not belong to the paragraph (markers, completion).
    Virtual,
    /// Input method composition text, not yet part of the paragraph.
    Preedit,
    /// An embedded object.
    Inset {
        /// Handle of the inset.
        id: InsetId,
        /// Structural role of the inset.
        kind: InsetKind,
    },
    /// Blank space given by its width.
    Space,
    /// Space extending up to the paragraph's left margin, with a minimum width.
    MarginSpace,
}

/// How hard [`Element::split_at`] tries to break a string.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SplitType {
    /// Fail if the first piece is still wider than requested.
    Fit,
    /// Accept the first break opportunity even if it is too wide.
    BestEffort,
    /// Break between any two characters if needed.
    Force,
}

/// One chunk of a [`Row`](super::Row).
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    /// Content type.
    pub kind: ElementKind,
    /// First paragraph position covered.
    pub pos: usize,
    /// Position after the last one covered. Equal to `pos` for virtual and
    /// preedit elements.
    pub endpos: usize,
    /// Natural extent, without justification stretch.
    pub dim: Dimension,
    /// Width without trailing spaces.
    pub nspc_width: i32,
    /// Stretch added to each expansion point by justification.
    pub extra: f64,
    /// Text of string, virtual and preedit elements.
    pub text: String,
    /// Font of the element.
    pub font: Font,
    /// Change annotation.
    pub change: Change,
    /// Breaking policy.
    pub flags: RowFlags,
    /// Preedit text may be broken between any two characters.
    pub wrap_anywhere: bool,
    pub(crate) sealed: bool,
}

impl Element {
    /// Creates an empty element covering one position.
    pub fn new(kind: ElementKind, pos: usize, font: Font, change: Change) -> Self {
        Self {
            kind,
            pos,
            endpos: pos + 1,
            dim: Dimension::default(),
            nspc_width: 0,
            extra: 0.0,
            text: String::new(),
            font,
            change,
            flags: RowFlags::INLINE,
            wrap_anywhere: false,
            sealed: false,
        }
    }

    fn is_stretchable(&self) -> bool {
        self.kind == ElementKind::String && self.font.family != FontFamily::Typewriter
    }

    /// Width including justification stretch.
    pub fn full_width(&self) -> f64 {
        f64::from(self.dim.width) + self.extra * self.count_expanders() as f64
    }

    /// Number of characters stretched by justification.
    pub fn count_expanders(&self) -> usize {
        if !self.is_stretchable() {
            return 0;
        }
        count_expanders(&self.text)
    }

    /// Expansion points weighted by the em size of the font.
    pub fn expansion_amount(&self, fm: &dyn FontMetrics) -> i32 {
        let count = i32::try_from(self.count_expanders()).unwrap_or(i32::MAX);
        count.saturating_mul(fm.em(&self.font))
    }

    /// Sets the stretch of each expansion point to `extra_per_em` ems.
    pub fn set_extra(&mut self, extra_per_em: f64, fm: &dyn FontMetrics) {
        if !self.is_stretchable() {
            return;
        }
        self.extra = extra_per_em * f64::from(fm.em(&self.font));
    }

    /// Whether the element is displayed right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.font.rtl
    }

    /// Whether the element covers no paragraph position.
    pub fn is_virtual(&self) -> bool {
        matches!(self.kind, ElementKind::Virtual | ElementKind::Preedit)
    }

    /// Inset displayed by the element, if any.
    pub fn inset(&self) -> Option<InsetId> {
        match self.kind {
            ElementKind::Inset { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Structural role of the inset displayed by the element, if any.
    pub fn inset_kind(&self) -> Option<InsetKind> {
        match self.kind {
            ElementKind::Inset { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Position at the visual left edge.
    pub fn left_pos(&self) -> usize {
        if self.is_rtl() {
            self.endpos
        } else {
            self.pos
        }
    }

    /// Position at the visual right edge.
    pub fn right_pos(&self) -> usize {
        if self.is_rtl() {
            self.pos
        } else {
            self.endpos
        }
    }

    /// Whether the cursor at `p`, without boundary, is displayed in the element.
    pub(crate) fn holds(&self, p: usize) -> bool {
        (p >= self.pos && p < self.endpos) || (self.is_virtual() && p == self.pos)
    }

    /// Horizontal offset of position `i` from the left edge of the element.
    pub fn pos2x(&self, i: usize, fm: &dyn FontMetrics) -> f64 {
        // Happens with inline completion when clicking after it.
        if i < self.pos || i > self.endpos {
            return 0.0;
        }
        if i == self.endpos && !self.is_virtual() {
            if self.is_rtl() {
                0.0
            } else {
                self.full_width()
            }
        } else if i == self.pos || self.kind != ElementKind::String {
            if self.is_rtl() {
                self.full_width()
            } else {
                0.0
            }
        } else {
            f64::from(fm.pos2x(
                &self.text,
                i - self.pos,
                self.is_rtl(),
                self.extra,
                &self.font,
            ))
        }
    }

    /// Position closest to the offset `x` from the left edge of the element.
    /// `x` is moved to the offset of that position.
    pub fn x2pos(&self, x: &mut i32, fm: &dyn FontMetrics) -> usize {
        let i = match self.kind {
            ElementKind::String => fm.x2pos(&self.text, x, self.is_rtl(), self.extra, &self.font),
            ElementKind::Virtual | ElementKind::Preedit => {
                *x = if self.is_rtl() {
                    itrunc(self.full_width())
                } else {
                    0
                };
                0
            }
            ElementKind::Inset { .. } | ElementKind::Space | ElementKind::MarginSpace => {
                // One position: round to the closest side.
                if f64::from(*x) > (self.full_width() + 1.0) / 2.0 {
                    *x = itrunc(self.full_width());
                    usize::from(!self.is_rtl())
                } else {
                    *x = 0;
                    usize::from(self.is_rtl())
                }
            }
        };
        self.pos + i
    }

    /// Computes the natural size of the text.
    pub(crate) fn measure(&mut self, fm: &dyn FontMetrics) {
        self.dim = fm.dimension(&self.text, &self.font);
        self.nspc_width = fm.width(self.text.trim_end_matches(is_space), &self.font);
    }

    /// Breaks a string or preedit element so that its first piece fits in
    /// `width`; the following pieces, meant for rows `next_width` wide, are
    /// appended to `tail`.
    ///
    /// Returns `false`, leaving the element as it is, when the element cannot be
    /// broken or is already short enough. The element is measured in passing if
    /// needed.
    pub fn split_at(
        &mut self,
        width: i32,
        next_width: i32,
        split_type: SplitType,
        tail: &mut Vec<Self>,
        fm: &dyn FontMetrics,
    ) -> bool {
        let wrap_any = if self.kind == ElementKind::Preedit {
            self.wrap_anywhere
        } else {
            self.font.wrap_anywhere
        };

        if !matches!(self.kind, ElementKind::String | ElementKind::Preedit)
            || (self.dim.width > 0 && self.dim.width < width)
        {
            return false;
        }

        if !self.flags.contains(RowFlags::CAN_BREAK_INSIDE) {
            if self.dim.width == 0 {
                self.measure(fm);
            }
            return false;
        }

        let breaks = fm.break_string(
            &self.text,
            width,
            next_width,
            self.is_rtl(),
            wrap_any || split_type == SplitType::Force,
            &self.font,
        );

        // Breaking did not really work: nothing at all, a first piece that is
        // too wide for a fit, or a break at the very front of the string.
        let failed = match breaks.first() {
            None => true,
            Some(first) => {
                (split_type == SplitType::Fit && first.nspc_width > width)
                    || (breaks.len() > 1 && first.len == 0)
            }
        };
        if failed {
            if self.dim.width == 0 {
                self.measure(fm);
            }
            return false;
        }

        let ascent = fm.max_ascent(&self.font);
        let descent = fm.max_descent(&self.font);
        let after_flags = self.flags & RowFlags::AFTER_FLAGS;
        let tail_start = tail.len();
        let mut first = None;
        let mut rest = self.text.as_str();
        let mut curpos = self.pos;
        for brk in &breaks {
            let (piece, remainder) = rest.split_at(byte_offset(rest, brk.len));
            rest = remainder;
            let mut e = Self::new(self.kind, curpos, self.font, self.change);
            e.text = piece.to_owned();
            e.dim = Dimension::new(brk.width, ascent, descent);
            e.nspc_width = brk.nspc_width;
            e.flags = RowFlags::CAN_BREAK_INSIDE | RowFlags::BREAK_AFTER;
            e.wrap_anywhere = self.wrap_anywhere;
            e.endpos = if self.kind == ElementKind::Preedit {
                e.pos
            } else {
                e.pos + brk.len
            };
            curpos = e.endpos;
            if first.is_none() {
                e.flags |= self.flags - RowFlags::AFTER_FLAGS;
                first = Some(e);
            } else {
                tail.push(e);
            }
        }
        let Some(mut first) = first else {
            return false;
        };

        if tail.len() > tail_start {
            // Breaking at the trailing space of a string leaves an empty piece.
            if tail.last().is_some_and(|e| e.text.is_empty()) {
                tail.pop();
            } else if let Some(last) = tail.last_mut() {
                last.flags.remove(RowFlags::BREAK_AFTER);
                last.flags |= after_flags;
            }
            first.flags |= RowFlags::BREAK_AFTER;
        } else {
            first.flags.remove(RowFlags::BREAK_AFTER);
            first.flags |= after_flags;
        }

        *self = first;
        true
    }

    /// Removes one trailing space from a string element. Spaces at a row break
    /// are invisible.
    pub fn rtrim(&mut self) {
        if self.kind != ElementKind::String || !self.text.ends_with(is_space) {
            return;
        }
        self.text.pop();
        self.endpos = self.pos + char_len(&self.text);
        self.dim.width = self.nspc_width;
    }
}
