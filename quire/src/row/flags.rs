// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use bitflags::bitflags;

bitflags! {
    /// Breaking policy of a row element with respect to its neighbours.
    ///
    /// When two adjacent elements disagree, the precedence is:
    /// `ALWAYS_BREAK_AFTER`, then `NO_BREAK_AFTER`/`NO_BREAK_BEFORE`, then
    /// `BREAK_AFTER`/`BREAK_BEFORE`. The `CAN_BREAK_*` flags only mark
    /// opportunities used when a row overflows.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RowFlags: u16 {
        /// No opinion: the element flows with the text.
        const INLINE = 0;
        /// Start a new row before the element.
        const BREAK_BEFORE = 1 << 0;
        /// A new row may start before the element.
        const CAN_BREAK_BEFORE = 1 << 1;
        /// The element must stay on the row of its predecessor.
        const NO_BREAK_BEFORE = 1 << 2;
        /// The row before the element is not justified.
        const FLUSH_BEFORE = 1 << 3;
        /// Start a new row after the element, whatever the next one says.
        const ALWAYS_BREAK_AFTER = 1 << 4;
        /// Start a new row after the element.
        const BREAK_AFTER = 1 << 5;
        /// A new row may start after the element.
        const CAN_BREAK_AFTER = 1 << 6;
        /// The next element must stay on the same row.
        const NO_BREAK_AFTER = 1 << 7;
        /// The element is text that may be broken into several rows.
        const CAN_BREAK_INSIDE = 1 << 8;
        /// The row ending with the element is not justified.
        const FLUSH = 1 << 9;
        /// A display element flushed left.
        const ALIGN_LEFT = 1 << 10;
        /// A display element flushed right.
        const ALIGN_RIGHT = 1 << 11;
        /// An element on a row of its own.
        const DISPLAY = Self::FLUSH_BEFORE.bits()
            | Self::BREAK_BEFORE.bits()
            | Self::BREAK_AFTER.bits();
        /// Every flag describing what happens after an element.
        const AFTER_FLAGS = Self::ALWAYS_BREAK_AFTER.bits()
            | Self::BREAK_AFTER.bits()
            | Self::CAN_BREAK_AFTER.bits()
            | Self::NO_BREAK_AFTER.bits();
    }
}

/// Whether a new row must start between an element with flags `f1` and the
/// following one with flags `f2`.
pub fn needs_row_break(f1: RowFlags, f2: RowFlags) -> bool {
    if f1.contains(RowFlags::ALWAYS_BREAK_AFTER) {
        return true;
    }
    if f1.contains(RowFlags::NO_BREAK_AFTER) || f2.contains(RowFlags::NO_BREAK_BEFORE) {
        return false;
    }
    f1.contains(RowFlags::BREAK_AFTER) || f2.contains(RowFlags::BREAK_BEFORE)
}
