// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Horizontal margins of paragraphs.

use crate::document::{Alignment, LabelType, LatexType, MarginType, ParagraphSeparation};
use crate::row::RowFlags;

use super::LayoutEnv;

impl LayoutEnv<'_> {
    /// Left margin of the rows of paragraph `pit` that do not start it.
    pub(super) fn left_margin_default(&self, pit: usize) -> i32 {
        self.left_margin(pit, self.doc.paragraph(pit).size())
    }

    /// Left margin of the row of paragraph `pit` starting at `pos`.
    pub(super) fn left_margin(&self, pit: usize, pos: usize) -> i32 {
        let doc = self.doc;
        let fm = self.fm;
        let params = doc.params();
        let bfont = params.font;
        let par = doc.paragraph(pit);
        let layout = par.layout();
        let depth = self.depth(pit);

        let mut parindent = layout.par_indent.as_str();
        let mut l_margin = 0;

        if self.settings.main_text {
            l_margin += self.settings.view_margins.left;
            l_margin += fm.signed_width(&params.class_left_margin, &bfont);
        }

        if depth != 0 {
            if let Some(outer) = doc.outer_hook(pit) {
                let outer_par = doc.paragraph(outer);
                if outer_par.layout().is_environment() {
                    let nest_margin = depth.saturating_mul(self.settings.nest_margin);
                    l_margin = self.left_margin_default(outer).max(nest_margin);
                    // An empty environment paragraph got its indentation.
                    if outer_par.is_empty()
                        && params.paragraph_separation == ParagraphSeparation::Indent
                    {
                        l_margin -= fm.signed_width(&outer_par.layout().par_indent, &bfont);
                    }
                }
                if doc.is_default_or_plain(layout) {
                    parindent = if outer_par.params().noindent {
                        ""
                    } else {
                        outer_par.layout().par_indent.as_str()
                    };
                }
            }
        }

        // Reasons to drop the indentation.
        if params.paragraph_separation == ParagraphSeparation::Skip {
            parindent = "";
        } else if pit > 0 && doc.paragraph(pit - 1).params().depth >= par.params().depth {
            // After sections or environments, look at the previous layout at
            // the same depth.
            let prev = doc.depth_hook(pit, par.params().depth);
            let prev_layout = doc.paragraph(prev).layout();
            if layout == prev_layout {
                if prev != pit - 1 && doc.paragraph(pit - 1).layout().next_no_indent {
                    parindent = "";
                }
            } else if prev_layout.next_no_indent {
                parindent = "";
            }
        }
        if pit > 0 {
            let prev = doc.paragraph(pit - 1);
            let ends_with_no_indent = prev
                .size()
                .checked_sub(1)
                .and_then(|last| doc.inset_at(pit - 1, last))
                .is_some_and(|(_, inset)| inset.next_no_indent());
            if ends_with_no_indent {
                parindent = "";
            }
        }

        let lfont = self.label_font(pit);
        match layout.margin_type {
            MarginType::Dynamic => {
                if !layout.left_margin.is_empty() {
                    l_margin += fm.signed_width(&layout.left_margin, &bfont);
                }
                if !par.label_string().is_empty() {
                    l_margin += fm.signed_width(&layout.label_indent, &lfont);
                    l_margin += fm.width(par.label_string(), &lfont);
                    l_margin += fm.width(&layout.label_sep, &lfont);
                }
            }
            MarginType::Manual => {
                l_margin += fm.signed_width(&layout.label_indent, &lfont);
                // An empty paragraph has no body.
                let label_width = &par.params().label_width_string;
                if !par.is_empty() && pos >= doc.begin_of_body(pit) && !label_width.is_empty() {
                    l_margin += fm.width(label_width, &lfont);
                    l_margin += fm.width(&layout.label_sep, &lfont);
                }
            }
            MarginType::Static => {
                l_margin += fm.signed_width(&layout.left_margin, &bfont) * 4
                    / depth.saturating_add(4);
            }
            MarginType::FirstDynamic => {
                if layout.label_type == LabelType::Manual {
                    // Position 0 is never in the body.
                    if pos > 0 && pos >= doc.begin_of_body(pit) {
                        l_margin += fm.signed_width(&layout.left_margin, &lfont);
                    } else {
                        l_margin += fm.signed_width(&layout.label_indent, &lfont);
                    }
                } else if pos != 0 || self.is_continued_static_environment(pit) {
                    l_margin += fm.signed_width(&layout.left_margin, &lfont);
                } else if !layout.label_is_above() {
                    l_margin += fm.signed_width(&layout.label_indent, &lfont);
                    l_margin += fm.width(&layout.label_sep, &lfont);
                    l_margin += fm.width(par.label_string(), &lfont);
                }
            }
            // Applied to the whole paragraph once its rows are known.
            MarginType::RightAddressBox => {}
        }

        if let Some(indent) = par.params().left_indent.filter(|l| !l.is_zero()) {
            l_margin += indent.in_pixels(self.settings.max_width, fm.em(&lfont));
        }

        let align = par.params().align.unwrap_or(layout.align);
        let starts_with_display = doc
            .inset_at(pit, 0)
            .is_some_and(|(_, inset)| inset.row_flags().contains(RowFlags::DISPLAY));
        let indented = pos == 0
            && (matches!(
                layout.label_type,
                LabelType::NoLabel | LabelType::Above | LabelType::Centered
            ) || self.is_continued_static_environment(pit))
            && matches!(align, Alignment::Block | Alignment::Left)
            && !par.params().noindent
            && !self.settings.never_indent
            && !starts_with_display
            && (!doc.is_default_or_plain(layout)
                || params.paragraph_separation == ParagraphSeparation::Indent);
        if indented {
            l_margin += match params.par_indent {
                Some(indent) => indent.in_pixels(self.settings.max_width, fm.em(&bfont)),
                None => fm.signed_width(parindent, &bfont),
            };
        }

        l_margin
    }

    /// Whether `pit` continues an environment with a static label, like the
    /// second paragraph of a theorem.
    fn is_continued_static_environment(&self, pit: usize) -> bool {
        let layout = self.doc.paragraph(pit).layout();
        layout.label_type == LabelType::Static
            && layout.latex_type == LatexType::Environment
            && !self.doc.is_first_in_sequence(pit)
    }

    /// Right margin of paragraph `pit`. Only the main text has one.
    pub(super) fn right_margin(&self, pit: usize) -> i32 {
        if !self.settings.main_text {
            return 0;
        }
        let params = self.doc.params();
        let bfont = params.font;
        let layout = self.doc.paragraph(pit).layout();
        self.settings.view_margins.right
            + self.fm.signed_width(&params.class_right_margin, &bfont)
            + self.fm.signed_width(&layout.right_margin, &bfont) * 4
                / self.depth(pit).saturating_add(4)
    }
}
