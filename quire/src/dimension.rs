// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box extents and screen points.

/// Extent of a box relative to its baseline, in pixels.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct Dimension {
    /// Horizontal advance.
    pub width: i32,
    /// Distance from the baseline to the top.
    pub ascent: i32,
    /// Distance from the baseline to the bottom.
    pub descent: i32,
}

impl Dimension {
    /// Creates a new dimension.
    pub const fn new(width: i32, ascent: i32, descent: i32) -> Self {
        Self {
            width,
            ascent,
            descent,
        }
    }

    /// Total vertical extent.
    pub const fn height(&self) -> i32 {
        self.ascent + self.descent
    }

    /// Returns `true` if all three components are zero.
    pub const fn is_empty(&self) -> bool {
        self.width == 0 && self.ascent == 0 && self.descent == 0
    }
}

/// A point in screen coordinates. `y` grows downwards.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Creates a new point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
