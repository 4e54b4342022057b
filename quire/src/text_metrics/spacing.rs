// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Vertical metrics: row heights and the space between paragraphs.

use crate::document::{Paragraph, ParagraphSeparation};
use crate::font::Font;
use crate::row::Row;
use crate::util::itrunc;

use super::LayoutEnv;

impl LayoutEnv<'_> {
    /// Height of a row in the default font, the unit of paragraph separations.
    pub(super) fn default_row_height(&self) -> i32 {
        itrunc(f64::from(self.fm.max_height(&self.doc.params().font)) * 1.2)
    }

    /// Computes the ascent and descent of a row from its contents.
    pub(super) fn set_row_height(&self, row: &mut Row) {
        let doc = self.doc;
        let pit = row.pit();
        let par = doc.paragraph(pit);
        let layout = par.layout();

        let mut spacing = layout.spacing * doc.spacing(pit);
        // The first row keeps the spacing of the previous paragraph if it is larger.
        if row.pos() == 0 && pit > 0 {
            let prev_spacing = doc.paragraph(pit - 1).layout().spacing * doc.spacing(pit - 1);
            spacing = spacing.max(prev_spacing);
        }
        let extent = |font: &Font| {
            let leading = f64::from(self.fm.max_height(font)) * (spacing - 1.0);
            (
                itrunc(f64::from(self.fm.max_ascent(font)) + leading),
                self.fm.max_descent(font),
            )
        };

        // Empty rows get the height of their font.
        let (mut ascent, mut descent) = extent(&self.display_font(pit, row.pos()));
        if row.pos() == 0 && layout.label_is_inline() {
            let (a, d) = extent(&self.label_font(pit));
            ascent = ascent.max(a);
            descent = descent.max(d);
        }
        for e in row.elements() {
            let (a, d) = if e.inset().is_some() {
                (e.dim.ascent, e.dim.descent)
            } else {
                extent(&e.font)
            };
            ascent = ascent.max(a);
            descent = descent.max(d);
        }

        let dim = row.dim_mut();
        dim.ascent = ascent + 1;
        dim.descent = descent + 1;
    }

    /// Space above paragraph `pit`.
    pub(super) fn par_top_spacing(&self, pit: usize) -> i32 {
        let doc = self.doc;
        let params = doc.params();
        let par = doc.paragraph(pit);
        let layout = par.layout();
        let depth = par.params().depth;
        let dh = f64::from(self.default_row_height());
        let mut asc = 0;

        if params.paragraph_separation == ParagraphSeparation::Skip
            && !layout.parbreak_is_newline
            && pit > 0
        {
            let prev = doc.paragraph(pit - 1);
            if (layout.is_paragraph() && depth == 0)
                || (prev.layout().is_paragraph() && prev.params().depth == 0)
            {
                asc += params.default_skip;
            }
        }

        if par.params().start_of_appendix {
            asc += itrunc(3.0 * dh);
        }

        if layout.label_is_above()
            && (!layout.par_group || doc.is_first_in_sequence(pit))
            && !par.label_string().is_empty()
        {
            let lheight = f64::from(self.fm.max_height(&self.label_font(pit)));
            asc += itrunc(
                lheight * layout.spacing * doc.spacing(pit)
                    + (layout.top_sep + layout.label_bottom_sep) * dh,
            );
        }

        // Separation between items of a list, or between different layouts.
        let prev = doc.depth_hook(pit, depth);
        let prev_par = doc.paragraph(prev);
        let layout_asc = if prev != pit
            && prev_par.layout() == layout
            && prev_par.params().depth == depth
            && prev_par.params().label_width_string == par.params().label_width_string
        {
            layout.item_sep * dh
        } else if pit != 0 && layout.top_sep > 0.0 {
            let sep = if prev_par.params().depth != depth {
                layout.top_sep
            } else {
                layout.top_sep - prev_par.layout().bottom_sep
            };
            sep.max(0.0) * dh
        } else {
            0.0
        };
        asc += itrunc(layout_asc * 2.0 / (2.0 + f64::from(self.depth(pit))));

        match doc.outer_hook(pit) {
            Some(outer) => asc += itrunc(doc.paragraph(outer).layout().par_sep * dh),
            None if pit != 0 => {
                let prev = doc.paragraph(pit - 1);
                if prev.params().depth != 0 || prev.layout() == layout {
                    asc += itrunc(layout.par_sep * dh);
                }
            }
            None => {}
        }

        asc
    }

    /// Space below paragraph `pit`.
    pub(super) fn par_bottom_spacing(&self, pit: usize) -> i32 {
        let doc = self.doc;
        let dh = f64::from(self.default_row_height());
        let mut layout_desc = 0.0;

        if let Some(next) = doc.get(pit + 1) {
            let cur = doc.paragraph(pit);
            let next_depth = next.params().depth;
            let differs = |p: &Paragraph| {
                p.layout() != next.layout()
                    || p.params().label_width_string != next.params().label_width_string
            };
            if cur.params().depth > next_depth {
                let usual = cur.layout().bottom_sep * dh;
                let hook = doc.paragraph(doc.depth_hook(pit, next_depth));
                let unusual = if differs(hook) {
                    hook.layout().bottom_sep * dh
                } else {
                    0.0
                };
                layout_desc = usual.max(unusual);
            } else if cur.params().depth == next_depth && differs(cur) {
                layout_desc = f64::from(itrunc(cur.layout().bottom_sep * dh));
            }
        }

        itrunc(layout_desc * 2.0 / (2.0 + f64::from(self.depth(pit))))
    }
}
