// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared setup: a document, deterministic metrics and a text to lay out.

use std::sync::Arc;

use crate::document::{Document, DocumentParams, InsetId, Layout, Paragraph};
use crate::row::Row;
use crate::{CoordCache, FixedMetrics, Font, LayoutSettings, ParagraphMetrics, TextMetrics};

/// Everything a layout call needs. Characters are 10 pixels wide, fonts 9
/// pixels above and 3 pixels below the baseline.
pub(crate) struct TestEnv {
    pub(crate) doc: Document,
    pub(crate) fm: FixedMetrics,
    pub(crate) cache: CoordCache,
    pub(crate) tm: TextMetrics,
    pub(crate) layout: Arc<Layout>,
}

impl TestEnv {
    pub(crate) fn new(max_width: i32) -> Self {
        Self::with_settings(LayoutSettings::new(max_width))
    }

    pub(crate) fn with_settings(settings: LayoutSettings) -> Self {
        Self {
            doc: Document::new(DocumentParams::default()),
            fm: FixedMetrics::default(),
            cache: CoordCache::new(),
            tm: TextMetrics::new(settings),
            layout: Arc::new(Layout::default()),
        }
    }

    /// Appends a paragraph of the standard layout.
    pub(crate) fn push_text(&mut self, text: &str) -> usize {
        self.doc
            .push(Paragraph::with_text(self.layout.clone(), text))
    }

    /// Appends a paragraph made of text and insets of the document, in order.
    pub(crate) fn push_mixed(&mut self, parts: Vec<Part>) -> usize {
        let mut par = Paragraph::new(self.layout.clone());
        let font = self.layout.font;
        for part in parts {
            match part {
                Part::Text(text) => par.push_str(text, font),
                Part::Inset(id) => par.push_inset(id, font),
            }
        }
        self.doc.push(par)
    }

    /// Lays out the whole text.
    pub(crate) fn metrics(&mut self) -> bool {
        self.tm.metrics(&mut self.doc, 0, &self.fm, &mut self.cache)
    }

    /// Lays out the whole text and places it with its first baseline at `y = 0`.
    pub(crate) fn place(&mut self) {
        self.metrics();
        self.tm.update_positions(0, 0, &mut self.cache);
    }

    pub(crate) fn redo(&mut self, pit: usize) -> bool {
        self.tm
            .redo_paragraph(&mut self.doc, pit, true, &self.fm, &mut self.cache)
    }

    pub(crate) fn pm(&self, pit: usize) -> &ParagraphMetrics {
        match self.tm.metrics_of(pit) {
            Ok(pm) => pm,
            Err(err) => panic!("{err}"),
        }
    }

    pub(crate) fn rows(&self, pit: usize) -> &[Row] {
        self.pm(pit).rows()
    }

    /// Tokenizes and breaks a paragraph without touching the cache.
    pub(crate) fn break_rows(&self, pit: usize) -> Vec<Row> {
        let bigrow = self
            .tm
            .tokenize_paragraph(&self.doc, pit, &self.fm, &self.cache);
        self.tm.break_paragraph(&self.doc, &bigrow, &self.fm)
    }

    pub(crate) fn par_mut(&mut self, pit: usize) -> &mut Paragraph {
        match self.doc.get_mut(pit) {
            Some(par) => par,
            None => panic!("no paragraph {pit}"),
        }
    }

    pub(crate) fn inset_ids(&self, pit: usize) -> Vec<InsetId> {
        self.doc.paragraph(pit).insets().map(|(_, id)| id).collect()
    }
}

/// A piece of a paragraph built by [`TestEnv::push_mixed`].
pub(crate) enum Part {
    Text(&'static str),
    Inset(InsetId),
}

/// `(pos, endpos)` of every row.
pub(crate) fn ranges(rows: &[Row]) -> Vec<(usize, usize)> {
    rows.iter().map(|row| (row.pos(), row.endpos())).collect()
}

pub(crate) fn widths(rows: &[Row]) -> Vec<i32> {
    rows.iter().map(Row::width).collect()
}

/// Checks that the rows cover the paragraph once, in order.
pub(crate) fn assert_covers(rows: &[Row], size: usize, case: &str) {
    assert!(!rows.is_empty(), "{case}: no row");
    assert_eq!(rows[0].pos(), 0, "{case}: first row does not start the paragraph");
    for pair in rows.windows(2) {
        assert_eq!(
            pair[0].endpos(),
            pair[1].pos(),
            "{case}: gap or overlap between rows"
        );
    }
    let last = &rows[rows.len() - 1];
    assert_eq!(last.endpos(), size, "{case}: last row does not end the paragraph");
}

/// Sum of the widths of the elements of a row, justification included.
pub(crate) fn content_width(row: &Row) -> f64 {
    row.elements().iter().map(|e| e.full_width()).sum()
}

pub(crate) fn font() -> Font {
    Font::default()
}
