// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paragraph layout and line breaking for a WYSIWYM document editor.
//!
//! A [`Document`](document::Document) is a sequence of paragraphs holding
//! characters and insets. [`TextMetrics`] turns each paragraph into rows of
//! [`Element`](row::Element)s that fit the available width, aligns them, stacks
//! the paragraphs vertically and maps screen coordinates back to cursor
//! positions.
//!
//! All measurements are in integer pixels and go through a [`FontMetrics`]
//! provider. [`FixedMetrics`] is a deterministic provider where every character
//! has the same advance.
//!
//! ```
//! use std::sync::Arc;
//!
//! use quire::document::{Document, DocumentParams, Layout, Paragraph};
//! use quire::{CoordCache, FixedMetrics, LayoutSettings, TextMetrics};
//!
//! let mut doc = Document::new(DocumentParams::default());
//! let layout = Arc::new(Layout::default());
//! doc.push(Paragraph::with_text(layout, "Hello world, this is a paragraph."));
//!
//! let fm = FixedMetrics::default();
//! let mut cache = CoordCache::new();
//! let mut tm = TextMetrics::new(LayoutSettings::new(100));
//! tm.metrics(&mut doc, 0, &fm, &mut cache);
//! assert!(tm.metrics_of(0).unwrap().rows().len() > 1);
//! ```

mod dimension;
pub mod document;
mod error;
mod fixed_metrics;
mod font;
pub mod geometry;
mod paragraph_metrics;
pub mod row;
mod settings;
mod text_metrics;
mod util;

#[cfg(test)]
mod tests;

pub use dimension::{Dimension, Point};
pub use error::{Error, Result};
pub use fixed_metrics::FixedMetrics;
pub use font::{Break, Breaks, Color, Font, FontFamily, FontMetrics};
pub use geometry::{CoordCache, Geometry, GeometryMap};
pub use paragraph_metrics::ParagraphMetrics;
pub use settings::{LayoutSettings, ViewMargins};
pub use text_metrics::{
    Bookmark, EditHit, InlineCompletion, Preedit, TextMetrics, TextPos, TextSelection,
    MIN_TEXT_WIDTH,
};
