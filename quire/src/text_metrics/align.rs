// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Horizontal alignment of rows.

use crate::document::{Alignment, InsetId, LabelType, MarginType};
use crate::geometry::GeometryMap;
use crate::row::{ElementKind, Row, RowFlags};
use crate::util::itrunc;

use super::LayoutEnv;

fn count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

impl LayoutEnv<'_> {
    /// Effective alignment of a row.
    pub(super) fn get_align(&self, row: &Row) -> Alignment {
        let doc = self.doc;
        let par = doc.paragraph(row.pit());
        let mut align = par.align();

        // Inside a container that imposes its alignment.
        let mut forced_block = false;
        if let Some(content) = self.settings.content_alignment {
            forced_block = content == Alignment::Block;
            if align == Alignment::Block {
                align = content;
            }
        }

        // Display insets sit on a centered row.
        if let Some((_, inset)) = doc.inset_at(row.pit(), row.pos()) {
            let flags = inset.row_flags();
            if flags.contains(RowFlags::DISPLAY) {
                align = if flags.contains(RowFlags::ALIGN_LEFT) {
                    Alignment::Left
                } else if flags.contains(RowFlags::ALIGN_RIGHT) {
                    Alignment::Right
                } else {
                    Alignment::Center
                };
            }
        }

        // Rows broken by a display inset, the last row and documents without
        // justification are not stretched. Only the latter overrides a forced
        // block alignment.
        if align == Alignment::Block
            && ((row.flushed() && !forced_block) || !doc.params().justification)
        {
            align = if row.is_rtl() {
                Alignment::Right
            } else {
                Alignment::Left
            };
        }
        align
    }

    /// Aligns a row in a text `width` pixels wide: justification, shift to the
    /// right or center, or expansion of the fills. Fills are recorded with
    /// their new size in `insets`.
    pub(super) fn set_row_alignment(
        &self,
        row: &mut Row,
        width: i32,
        insets: &mut GeometryMap<InsetId>,
    ) {
        row.label_hfill = 0.0;
        row.separator = 0.0;

        let doc = self.doc;
        let fm = self.fm;
        let pit = row.pit();
        let par = doc.paragraph(pit);
        let layout = par.layout();
        let w = width - row.right_margin - row.width();

        // A manual label has an implicit fill between label and body.
        let mut nlh = 0;
        if layout.margin_type == MarginType::Manual && layout.label_type == LabelType::Manual {
            nlh = self.number_of_label_hfills(row);
            if !par.is_empty() {
                nlh += 1;
            }
            if nlh > 0 && !par.params().label_width_string.is_empty() {
                row.label_hfill = f64::from(self.label_fill(row)) / f64::from(nlh);
            }
        }

        let body_pos = doc.begin_of_body(pit);
        let expands: Vec<bool> = row
            .elements()
            .iter()
            .map(|e| e.inset().is_some() && self.hfill_expansion(row, e.pos))
            .collect();
        let mut nh = count(
            row.elements()
                .iter()
                .zip(&expands)
                .filter(|&(e, &expand)| expand && e.pos >= body_pos)
                .count(),
        );

        // An overflowing row is left aligned.
        if row.width() >= self.settings.max_width {
            return;
        }

        if nh == 0 {
            let align = self.get_align(row);
            let row_pos = row.pos();
            let indent = || {
                doc.inset_at(pit, row_pos)
                    .map(|(_, inset)| inset.indent(fm, &self.display_font(pit, row_pos)))
            };
            let shift = match align {
                Alignment::Block => {
                    // Failed justification of right-to-left text: align right.
                    if !row.set_extra_width(w, fm) && row.is_rtl() {
                        w
                    } else {
                        0
                    }
                }
                // A flushed display inset.
                Alignment::Left => indent().unwrap_or(0),
                Alignment::Right => match indent() {
                    Some(indent) => (w - indent).max(0),
                    None => w,
                },
                Alignment::Center => w / 2,
            };
            row.left_margin += shift;
            row.dim_mut().width += shift;
            log::trace!("row {pit}:{row_pos} aligned {align:?}, shift {shift}");
            return;
        }

        // Explicit fills take all the room.
        let hfill = w / nh;
        let hfill_rem = w % nh;
        row.dim_mut().width += w;

        let mut label_body_pos = body_pos;
        if body_pos > 0 && (body_pos > row.endpos() || !doc.is_line_separator(pit, body_pos - 1)) {
            label_body_pos = 0;
        }
        let label_hfill = row.label_hfill;
        for (e, expand) in row.elements_mut().iter_mut().zip(expands) {
            if label_hfill != 0.0
                && e.endpos == label_body_pos
                && e.kind == ElementKind::MarginSpace
            {
                e.dim.width -= itrunc(label_hfill * f64::from(nlh - 1));
            }
            if !expand {
                continue;
            }
            if e.pos >= label_body_pos {
                e.dim.width += hfill;
                nh -= 1;
                if nh == 0 {
                    e.dim.width += hfill_rem;
                }
            } else {
                e.dim.width += itrunc(label_hfill);
            }
            if let Some(id) = e.inset() {
                insets.add_dim(id, e.dim);
            }
        }
        log::trace!("row {pit}:{} filled, {hfill} per fill", row.pos());
    }

    /// Whether the fill at `pos` takes room on `row`.
    pub(super) fn hfill_expansion(&self, row: &Row, pos: usize) -> bool {
        let doc = self.doc;
        let pit = row.pit();
        if !doc.is_hfill(pit, pos) {
            return false;
        }
        // At the start of a row, only on the first row of the paragraph.
        if pos == row.pos() {
            return pos == 0;
        }
        let par = doc.paragraph(pit);
        if par.layout().margin_type != MarginType::Manual && pos < doc.begin_of_body(pit) {
            return false;
        }
        // Something other than breaks and fills must come before it.
        (row.pos()..pos).any(|i| {
            !doc.is_newline(pit, i) && !doc.is_env_separator(pit, i) && !doc.is_hfill(pit, i)
        })
    }

    /// Number of fills inside the label of a row.
    pub(super) fn number_of_label_hfills(&self, row: &Row) -> i32 {
        let doc = self.doc;
        let pit = row.pit();
        let Some(last) = row.endpos().checked_sub(1) else {
            return 0;
        };
        let mut first = row.pos();
        // Fills count at the paragraph start.
        if first > 0 {
            while first < last && doc.is_hfill(pit, first) {
                first += 1;
            }
        }
        let last = last.min(doc.begin_of_body(pit));
        count((first..last).filter(|&pos| doc.is_hfill(pit, pos)).count())
    }

    /// Room left in a manual label for its fills to reach the label width.
    pub(super) fn label_fill(&self, row: &Row) -> i32 {
        let doc = self.doc;
        let pit = row.pit();
        let label = &doc.paragraph(pit).params().label_width_string;
        if label.is_empty() {
            return 0;
        }
        let body_pos = doc.begin_of_body(pit);
        let w: i32 = row
            .elements()
            .iter()
            .take_while(|e| e.endpos < body_pos)
            .map(|e| e.dim.width)
            .sum();
        (self.fm.width(label, &self.label_font(pit)) - w).max(0)
    }
}
