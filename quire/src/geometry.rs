// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Last known on-screen geometry of insets and math sub-expressions.
//!
//! Entries are overwritten by every measurement and positioning pass. The absence
//! of an entry means "not measured since the last clear", never "zero-sized".

use core::fmt::Debug;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::document::{CellId, InsetId};
use crate::{Dimension, Point};

/// Squared distance reported for objects that are not in the cache.
pub const UNKNOWN_DISTANCE: i32 = 1_000_000;

/// Position of an object that has been measured but not placed yet.
pub const UNKNOWN_POSITION: Point = Point::new(-10000, -10000);

/// Baseline origin and extent of an object.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Left end of the baseline.
    pub pos: Point,
    /// Extent around the baseline.
    pub dim: Dimension,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            pos: UNKNOWN_POSITION,
            dim: Dimension::default(),
        }
    }
}

impl Geometry {
    /// Whether the object has been placed.
    pub fn has_position(&self) -> bool {
        self.pos.x != UNKNOWN_POSITION.x
    }

    /// Whether the point lies inside the box, borders included.
    pub fn covers(&self, x: i32, y: i32) -> bool {
        x >= self.pos.x
            && x <= self.pos.x + self.dim.width
            && y >= self.pos.y - self.dim.ascent
            && y <= self.pos.y + self.dim.descent
    }

    /// Squared distance from the point to the box; zero inside.
    pub fn square_distance(&self, x: i32, y: i32) -> i32 {
        let xx = if x < self.pos.x {
            self.pos.x - x
        } else if x > self.pos.x + self.dim.width {
            x - self.pos.x - self.dim.width
        } else {
            0
        };
        let yy = if y < self.pos.y - self.dim.ascent {
            self.pos.y - self.dim.ascent - y
        } else if y > self.pos.y + self.dim.descent {
            y - self.pos.y - self.dim.descent
        } else {
            0
        };
        xx.saturating_mul(xx).saturating_add(yy.saturating_mul(yy))
    }
}

/// Recorded geometry of one object. The dimension is `None` for an object
/// placed before being measured.
#[derive(Copy, Clone, Debug, Default)]
struct Entry {
    pos: Option<Point>,
    dim: Option<Dimension>,
}

impl Entry {
    fn geometry(&self) -> Geometry {
        Geometry {
            pos: self.pos.unwrap_or(UNKNOWN_POSITION),
            dim: self.dim.unwrap_or_default(),
        }
    }
}

/// Geometry of objects addressed by handles of type `K`.
#[derive(Clone, Debug)]
pub struct GeometryMap<K> {
    data: HashMap<K, Entry>,
}

impl<K> Default for GeometryMap<K> {
    fn default() -> Self {
        Self {
            data: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash + Debug> GeometryMap<K> {
    /// Records the dimension of an object. Returns whether it differs from the
    /// previously recorded one; always `true` the first time.
    pub fn add_dim(&mut self, key: K, dim: Dimension) -> bool {
        let entry = self.data.entry(key).or_default();
        let changed = entry.dim != Some(dim);
        entry.dim = Some(dim);
        changed
    }

    /// Records the position of an object.
    pub fn add_position(&mut self, key: K, x: i32, y: i32) {
        self.data.entry(key).or_default().pos = Some(Point::new(x, y));
    }

    /// Whether the object has been measured and placed.
    pub fn has(&self, key: K) -> bool {
        self.data
            .get(&key)
            .is_some_and(|e| e.dim.is_some() && e.pos.is_some())
    }

    /// Whether the object has been measured.
    pub fn has_dim(&self, key: K) -> bool {
        self.data.get(&key).is_some_and(|e| e.dim.is_some())
    }

    /// Full geometry of the object, if anything is known about it.
    pub fn get(&self, key: K) -> Option<Geometry> {
        self.data.get(&key).map(Entry::geometry)
    }

    fn check(&self, key: K, what: &str) -> Geometry {
        let entry = self.data.get(&key).copied();
        debug_assert!(
            entry.is_some_and(|e| e.dim.is_some()),
            "{what}: {key:?} has not been measured"
        );
        let entry = entry.unwrap_or_default();
        if what != "dim" {
            debug_assert!(entry.pos.is_some(), "{what}: {key:?} has no position");
        }
        entry.geometry()
    }

    /// Dimension of the object; empty if it has not been measured.
    pub fn dim(&self, key: K) -> Dimension {
        self.check(key, "dim").dim
    }

    /// Position of the object; [`UNKNOWN_POSITION`] if it has not been placed.
    pub fn position(&self, key: K) -> Point {
        self.check(key, "position").pos
    }

    /// Horizontal position of the object.
    pub fn x(&self, key: K) -> i32 {
        self.check(key, "x").pos.x
    }

    /// Vertical position of the object.
    pub fn y(&self, key: K) -> i32 {
        self.check(key, "y").pos.y
    }

    /// Whether the object covers the point. `false` for unknown objects.
    pub fn covers(&self, key: K, x: i32, y: i32) -> bool {
        self.get(key).is_some_and(|g| g.covers(x, y))
    }

    /// Squared distance from the point to the object, or
    /// [`UNKNOWN_DISTANCE`] for unknown objects.
    pub fn square_distance(&self, key: K, x: i32, y: i32) -> i32 {
        self.get(key)
            .map_or(UNKNOWN_DISTANCE, |g| g.square_distance(x, y))
    }

    /// Forgets one object.
    pub fn remove(&mut self, key: K) {
        self.data.remove(&key);
    }

    /// Iterates over the recorded objects, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (K, Geometry)> + '_ {
        self.data.iter().map(|(k, e)| (*k, e.geometry()))
    }

    /// Number of recorded objects.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

/// Geometry of everything that has been measured or drawn on screen.
#[derive(Clone, Debug, Default)]
pub struct CoordCache {
    insets: GeometryMap<InsetId>,
    cells: GeometryMap<CellId>,
}

impl CoordCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Geometry of insets.
    pub fn insets(&self) -> &GeometryMap<InsetId> {
        &self.insets
    }

    /// Mutable geometry of insets.
    pub fn insets_mut(&mut self) -> &mut GeometryMap<InsetId> {
        &mut self.insets
    }

    /// Geometry of math sub-expressions.
    pub fn cells(&self) -> &GeometryMap<CellId> {
        &self.cells
    }

    /// Mutable geometry of math sub-expressions.
    pub fn cells_mut(&mut self) -> &mut GeometryMap<CellId> {
        &mut self.cells
    }

    /// Forgets everything. Call once before a full metrics pass.
    pub fn clear(&mut self) {
        log::debug!(
            "clearing geometry of {} insets and {} cells",
            self.insets.len(),
            self.cells.len()
        );
        self.insets.clear();
        self.cells.clear();
    }

    /// Logs the whole content of the cache.
    pub fn dump(&self) {
        for (id, g) in self.insets.iter() {
            log::trace!("inset {id:?}: {:?} {:?}", g.pos, g.dim);
        }
        for (id, g) in self.cells.iter() {
            log::trace!("cell {id:?}: {:?} {:?}", g.pos, g.dim);
        }
    }
}
