// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors reported by the query surface of the layout engine.
///
/// Layout itself never fails: inconsistent input degrades to best-effort rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Metrics were requested for a paragraph that has not been laid out.
    #[error("paragraph {pit} has not been laid out")]
    NotLaidOut {
        /// Index of the paragraph.
        pit: usize,
    },
    /// A paragraph index is past the end of the document.
    #[error("paragraph {pit} out of range (document has {len} paragraphs)")]
    NoSuchParagraph {
        /// Index of the paragraph.
        pit: usize,
        /// Number of paragraphs in the document.
        len: usize,
    },
    /// A row index is past the last row of a paragraph.
    #[error("paragraph {pit} has no row {row}")]
    NoSuchRow {
        /// Index of the paragraph.
        pit: usize,
        /// Index of the row.
        row: usize,
    },
    /// The available width must be positive.
    #[error("invalid text width {0}")]
    InvalidWidth(i32),
}

/// Result type for fallible layout queries.
pub type Result<T, E = Error> = core::result::Result<T, E>;
