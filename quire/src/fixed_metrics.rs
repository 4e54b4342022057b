// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A font metrics provider where every character has the same advance.
//!
//! Line break opportunities follow the Unicode line breaking algorithm. The provider
//! is deterministic, which makes it the natural choice for tests and for terminal
//! style front ends.

use icu_segmenter::options::LineBreakOptions;
use icu_segmenter::{LineSegmenter, LineSegmenterBorrowed};

use crate::font::{Break, Breaks, Font, FontMetrics};
use crate::util::{iround, is_expander, is_space};

/// Fixed advance font metrics, scaled linearly with the font size.
#[derive(Clone, Debug)]
pub struct FixedMetrics {
    advance: i32,
    ascent: i32,
    descent: i32,
    em: i32,
    reference_size: u16,
    line_segmenter: LineSegmenterBorrowed<'static>,
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self::new(10, 9, 3)
    }
}

impl FixedMetrics {
    /// Metrics for fonts of the default size; other sizes scale proportionally.
    pub fn new(advance: i32, ascent: i32, descent: i32) -> Self {
        Self {
            advance,
            ascent,
            descent,
            em: advance,
            reference_size: Font::default().size.max(1),
            line_segmenter: LineSegmenter::new_auto(LineBreakOptions::default()),
        }
    }

    /// Overrides the em size, which defaults to the advance.
    #[must_use]
    pub fn with_em(mut self, em: i32) -> Self {
        self.em = em;
        self
    }

    fn scale(&self, v: i32, font: &Font) -> i32 {
        v * i32::from(font.size) / i32::from(self.reference_size)
    }

    fn advance(&self, font: &Font) -> i32 {
        self.scale(self.advance, font)
    }

    /// Width of `chars` without trailing spaces.
    fn nspc_width(&self, chars: &[char], font: &Font) -> i32 {
        let trailing = chars.iter().rev().take_while(|&&c| is_space(c)).count();
        self.chars_width(&chars[..chars.len() - trailing], font)
    }

    fn chars_width(&self, chars: &[char], font: &Font) -> i32 {
        let n = i32::try_from(chars.len()).unwrap_or(i32::MAX);
        n.saturating_mul(self.advance(font))
    }

    /// Break opportunities as character offsets, in increasing order, excluding 0.
    fn opportunities(&self, text: &str, wrap_anywhere: bool) -> Vec<usize> {
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(core::iter::once(text.len()))
            .collect();
        if wrap_anywhere {
            return (1..bounds.len()).collect();
        }
        self.line_segmenter
            .segment_str(text)
            .filter_map(|byte| bounds.binary_search(&byte).ok())
            .filter(|&i| i > 0)
            .collect()
    }
}

impl FontMetrics for FixedMetrics {
    fn max_ascent(&self, font: &Font) -> i32 {
        self.scale(self.ascent, font)
    }

    fn max_descent(&self, font: &Font) -> i32 {
        self.scale(self.descent, font)
    }

    fn em(&self, font: &Font) -> i32 {
        self.scale(self.em, font)
    }

    fn width(&self, text: &str, font: &Font) -> i32 {
        let chars: Vec<char> = text.chars().collect();
        self.chars_width(&chars, font)
    }

    fn break_string(
        &self,
        text: &str,
        first_width: i32,
        next_width: i32,
        _rtl: bool,
        wrap_anywhere: bool,
        font: &Font,
    ) -> Breaks {
        let chars: Vec<char> = text.chars().collect();
        let n = chars.len();
        let opportunities = self.opportunities(text, wrap_anywhere);
        let mut breaks = Breaks::new();
        let mut start = 0;
        let mut limit = first_width;
        while start < n {
            let mut end = None;
            for &o in opportunities.iter().filter(|&&o| o > start) {
                if self.nspc_width(&chars[start..o], font) <= limit {
                    end = Some(o);
                } else {
                    // Nothing fits: the first opportunity overflows.
                    end.get_or_insert(o);
                    break;
                }
            }
            let end = end.unwrap_or(n);
            let nspc_width = self.nspc_width(&chars[start..end], font);
            let width = if end == n {
                self.chars_width(&chars[start..end], font)
            } else {
                nspc_width
            };
            breaks.push(Break {
                len: end - start,
                width,
                nspc_width,
            });
            start = end;
            limit = next_width;
        }
        breaks
    }

    fn pos2x(&self, text: &str, pos: usize, rtl: bool, extra: f64, font: &Font) -> i32 {
        let advance = self.advance(font);
        let offset = |n: usize| -> i32 {
            let (count, expanders) = text
                .chars()
                .take(n)
                .fold((0, 0), |(c, e), ch| (c + 1, e + usize::from(is_expander(ch))));
            let count = i32::try_from(count).unwrap_or(i32::MAX);
            count.saturating_mul(advance) + iround(extra * expanders as f64)
        };
        let x = offset(pos);
        if rtl {
            offset(usize::MAX) - x
        } else {
            x
        }
    }

    fn x2pos(&self, text: &str, x: &mut i32, rtl: bool, extra: f64, font: &Font) -> usize {
        let n = text.chars().count();
        let mut best = (0, i32::MAX, 0);
        for i in 0..=n {
            let xi = self.pos2x(text, i, rtl, extra, font);
            let distance = (xi - *x).abs();
            if distance < best.1 {
                best = (i, distance, xi);
            }
        }
        *x = best.2;
        best.0
    }
}
