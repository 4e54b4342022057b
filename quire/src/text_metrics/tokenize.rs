// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::document::{Change, InsetId, Slot};
use crate::font::Color;
use crate::geometry::GeometryMap;
use crate::row::Row;
use crate::util::byte_offset;

use super::{LayoutEnv, PILCROW};

/// Displayed in place of U+2028 LINE SEPARATOR.
const LINE_SEPARATOR_MARK: char = '\u{2936}';

/// First inline bookmark glyph, minus one: bookmark `n` is U+2775 + `n`.
const BOOKMARK_BASE: u32 = 0x2775;

impl LayoutEnv<'_> {
    /// Turns paragraph `pit` into one row holding all of its elements.
    pub(super) fn tokenize_paragraph(&self, pit: usize, insets: &GeometryMap<InsetId>) -> Row {
        let doc = self.doc;
        let fm = self.fm;
        let par = doc.paragraph(pit);
        let end = par.size();
        let body_pos = doc.begin_of_body(pit);

        let mut row = Row::new(pit, 0);
        row.set_rtl(par.is_rtl());

        let completion = self
            .overlays
            .completion
            .as_ref()
            .filter(|c| c.pit == pit && !c.text.is_empty());
        let preedit = self
            .overlays
            .preedit
            .as_ref()
            .filter(|p| p.pit == pit && !p.text.is_empty());

        let mut i = 0;
        loop {
            if self.settings.bookmarks_inline {
                for bookmark in self
                    .overlays
                    .bookmarks
                    .iter()
                    .filter(|b| b.pit == pit && b.pos == i)
                {
                    let Some(c) = char::from_u32(BOOKMARK_BASE + bookmark.number) else {
                        continue;
                    };
                    let font = self.display_font(pit, i).with_color(Color::Bookmark);
                    row.add_virtual(i, c.encode_utf8(&mut [0; 4]), font, Change::default(), fm);
                }
            }
            if let Some(preedit) = preedit.filter(|p| p.pos == i) {
                let font = self.display_font(pit, i).with_color(Color::Preedit);
                row.add_preedit(
                    i,
                    &preedit.text,
                    font,
                    Change::default(),
                    preedit.wrap_anywhere,
                    fm,
                );
            }

            // Checked here so that a bookmark can show at the paragraph end.
            if i >= end {
                break;
            }

            let font = self.display_font(pit, i);
            let change = par.change_at(i);
            match par.slot(i) {
                Some(Slot::Inset(id)) => match doc.inset(id) {
                    Some(inset) => {
                        let dim = insets.get(id).map(|g| g.dim).unwrap_or_default();
                        row.add_inset(i, id, inset, dim, font, change);
                    }
                    None => log::warn!("paragraph {pit} refers to a dead inset at {i}"),
                },
                // The separator after a manual label. It grows up to the body
                // margin when the row is broken.
                Some(Slot::Char(' ')) if i + 1 == body_pos => {
                    let width = fm.width(&par.layout().label_sep, &self.label_font(pit));
                    row.add_margin_space(i, width, font, change);
                }
                Some(Slot::Char('\t')) => {
                    row.add_space(i, fm.width("    ", &font), font, change);
                }
                Some(Slot::Char(c @ ('\u{2028}' | '\u{2029}'))) => {
                    let mark = if c == '\u{2028}' {
                        LINE_SEPARATOR_MARK
                    } else {
                        '\u{b6}'
                    };
                    row.finalize_last();
                    row.add_char(i, mark, font, change);
                    row.finalize_last();
                }
                Some(Slot::Char(c)) => row.add_char(i, c, font, change),
                None => break,
            }

            // The completion is displayed behind the character before the cursor.
            if let Some(completion) = completion.filter(|c| c.pos == i + 1) {
                let split = byte_offset(&completion.text, completion.unique_chars);
                let (unique, rest) = completion.text.split_at(split);
                if !unique.is_empty() {
                    let font = font.with_color(Color::InlineCompletion);
                    row.add_virtual(i + 1, unique, font, Change::default(), fm);
                }
                if !rest.is_empty() {
                    let font = font.with_color(Color::NonUniqueCompletion);
                    row.add_virtual(i + 1, rest, font, Change::default(), fm);
                }
            }

            i += 1;
        }
        row.finalize_last();
        row.set_endpos(end);

        let end_change = par.change_at(end);
        if end_change.changed() {
            row.set_needs_change_bar(true);
        }
        if self.shows_end_marker(pit) {
            let font = self.layout_font(pit).with_color(Color::ParagraphMarker);
            row.add_virtual(end, PILCROW, font, end_change, fm);
        }

        log::trace!("paragraph {pit} tokenized into {} elements", row.len());
        row
    }
}
