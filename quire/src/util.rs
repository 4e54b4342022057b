// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Misc helpers.

/// Rounds to the nearest pixel.
#[expect(
    clippy::cast_possible_truncation,
    reason = "pixel coordinates are far inside the i32 range"
)]
pub(crate) fn iround(x: f64) -> i32 {
    x.round() as i32
}

/// Truncates towards zero.
#[expect(
    clippy::cast_possible_truncation,
    reason = "pixel coordinates are far inside the i32 range"
)]
pub(crate) fn itrunc(x: f64) -> i32 {
    x as i32
}

/// Number of characters stretched by inter-word spacing.
///
/// These are the blank characters, except for control characters and the line and
/// paragraph separators.
pub(crate) fn count_expanders(s: &str) -> usize {
    s.chars().filter(|&c| is_expander(c)).count()
}

pub(crate) fn is_expander(c: char) -> bool {
    c.is_whitespace() && !c.is_control() && c != '\u{2028}' && c != '\u{2029}'
}

/// Number of `char`s in `s`.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the `n`th `char` of `s`, or `s.len()` when out of range.
pub(crate) fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

pub(crate) fn is_space(c: char) -> bool {
    c == ' '
}
