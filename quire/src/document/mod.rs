// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The document model seen by the layout engine.
//!
//! A [`Document`] owns its paragraphs and an arena of insets. Insets are addressed by
//! generational [`InsetId`] handles, which stay valid while the inset lives and never
//! alias a later inset.

mod inset;
mod layout;
mod paragraph;

pub use inset::{Bibitem, FixedBox, Hfill, Inset, InsetKind, MeasureInfo, Newline, Separator};
pub use layout::{Alignment, LabelType, LatexType, Layout, MarginType};
pub use paragraph::{Paragraph, ParagraphParams, Slot};

use slotmap::{new_key_type, SlotMap};

use crate::util::{iround, is_space};
use crate::Font;

new_key_type! {
    /// Handle of an inset in a [`Document`].
    pub struct InsetId;
    /// Handle of a math sub-expression.
    pub struct CellId;
}

/// Kind of a tracked change.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Not changed.
    #[default]
    Unchanged,
    /// Inserted text.
    Inserted,
    /// Deleted text, still displayed.
    Deleted,
}

/// Change tracking annotation of a position.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct Change {
    /// Kind of change.
    pub kind: ChangeKind,
    /// Author of the change.
    pub author: u32,
}

impl Change {
    /// An insertion by `author`.
    pub fn inserted(author: u32) -> Self {
        Self {
            kind: ChangeKind::Inserted,
            author,
        }
    }

    /// A deletion by `author`.
    pub fn deleted(author: u32) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            author,
        }
    }

    /// Whether this is an actual change.
    pub fn changed(&self) -> bool {
        self.kind != ChangeKind::Unchanged
    }
}

/// A length given by the author.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Length {
    /// Screen pixels.
    Px(i32),
    /// Multiple of the em size.
    Em(f64),
    /// Fraction of the text width.
    TextWidth(f64),
}

impl Length {
    /// Converts to pixels.
    pub fn in_pixels(&self, text_width: i32, em: i32) -> i32 {
        match *self {
            Self::Px(px) => px,
            Self::Em(n) => iround(n * f64::from(em)),
            Self::TextWidth(f) => iround(f * f64::from(text_width)),
        }
    }

    /// Whether the length is zero.
    pub fn is_zero(&self) -> bool {
        match *self {
            Self::Px(px) => px == 0,
            Self::Em(n) | Self::TextWidth(n) => n == 0.0,
        }
    }
}

/// How consecutive paragraphs are separated.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
pub enum ParagraphSeparation {
    /// First rows are indented.
    #[default]
    Indent,
    /// Vertical space is added between paragraphs.
    Skip,
}

/// Document-wide settings.
#[derive(Clone, Debug)]
pub struct DocumentParams {
    /// Default font of the document.
    pub font: Font,
    /// Paragraph separation.
    pub paragraph_separation: ParagraphSeparation,
    /// Space between paragraphs in skip mode, in pixels.
    pub default_skip: i32,
    /// Paragraph indentation replacing the layouts' when set.
    pub par_indent: Option<Length>,
    /// Whether block alignment justifies rows on screen.
    pub justification: bool,
    /// Left margin of the document class.
    pub class_left_margin: String,
    /// Right margin of the document class.
    pub class_right_margin: String,
    /// Default line spacing.
    pub spacing: f64,
    /// Name of the default layout.
    pub default_layout: String,
    /// Name of the plain layout used in insets.
    pub plain_layout: String,
}

impl Default for DocumentParams {
    fn default() -> Self {
        Self {
            font: Font::default(),
            paragraph_separation: ParagraphSeparation::Indent,
            default_skip: 0,
            par_indent: None,
            justification: true,
            class_left_margin: String::new(),
            class_right_margin: String::new(),
            spacing: 1.0,
            default_layout: "Standard".into(),
            plain_layout: "Plain Layout".into(),
        }
    }
}

/// Paragraphs, insets and document settings.
#[derive(Debug, Default)]
pub struct Document {
    paragraphs: Vec<Paragraph>,
    insets: SlotMap<InsetId, Box<dyn Inset>>,
    cells: SlotMap<CellId, ()>,
    params: DocumentParams,
}

impl Document {
    /// Creates an empty document.
    pub fn new(params: DocumentParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    /// Document settings.
    pub fn params(&self) -> &DocumentParams {
        &self.params
    }

    /// Mutable document settings.
    pub fn params_mut(&mut self) -> &mut DocumentParams {
        &mut self.params
    }

    /// Number of paragraphs.
    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    /// Whether there is no paragraph.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// All paragraphs.
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    /// Paragraph `pit`.
    ///
    /// # Panics
    ///
    /// If `pit` is out of range.
    pub fn paragraph(&self, pit: usize) -> &Paragraph {
        &self.paragraphs[pit]
    }

    /// Paragraph `pit`, if it exists.
    pub fn get(&self, pit: usize) -> Option<&Paragraph> {
        self.paragraphs.get(pit)
    }

    /// Mutable paragraph `pit`, if it exists.
    pub fn get_mut(&mut self, pit: usize) -> Option<&mut Paragraph> {
        self.paragraphs.get_mut(pit)
    }

    /// Appends a paragraph and returns its index.
    pub fn push(&mut self, par: Paragraph) -> usize {
        self.paragraphs.push(par);
        self.paragraphs.len() - 1
    }

    /// Inserts a paragraph at `pit`.
    pub fn insert(&mut self, pit: usize, par: Paragraph) {
        self.paragraphs.insert(pit, par);
    }

    /// Removes paragraph `pit` together with its insets.
    pub fn remove(&mut self, pit: usize) -> Paragraph {
        let par = self.paragraphs.remove(pit);
        for (_, id) in par.insets() {
            self.insets.remove(id);
        }
        par
    }

    /// Adds an inset to the arena. Its handle can then be placed in a paragraph.
    pub fn add_inset(&mut self, inset: impl Inset + 'static) -> InsetId {
        self.insets.insert(Box::new(inset))
    }

    /// Inset with handle `id`, if it is alive.
    pub fn inset(&self, id: InsetId) -> Option<&dyn Inset> {
        self.insets.get(id).map(|inset| &**inset)
    }

    /// Issues a handle for a math sub-expression.
    pub fn new_cell(&mut self) -> CellId {
        self.cells.insert(())
    }

    /// Releases a math sub-expression handle.
    pub fn remove_cell(&mut self, cell: CellId) {
        self.cells.remove(cell);
    }

    /// Inset at a position together with its handle.
    pub fn inset_at(&self, pit: usize, pos: usize) -> Option<(InsetId, &dyn Inset)> {
        let id = self.get(pit)?.inset_at(pos)?;
        Some((id, self.inset(id)?))
    }

    /// Kind of the inset at a position.
    pub fn inset_kind(&self, pit: usize, pos: usize) -> Option<InsetKind> {
        self.inset_at(pit, pos).map(|(_, inset)| inset.kind())
    }

    /// Whether there is a forced line break at a position.
    pub fn is_newline(&self, pit: usize, pos: usize) -> bool {
        self.inset_kind(pit, pos) == Some(InsetKind::Newline)
    }

    /// Whether there is an environment separator at a position.
    pub fn is_env_separator(&self, pit: usize, pos: usize) -> bool {
        self.inset_kind(pit, pos) == Some(InsetKind::EnvSeparator)
    }

    /// Whether there is a paragraph separator at a position.
    pub fn is_separator(&self, pit: usize, pos: usize) -> bool {
        self.inset_kind(pit, pos) == Some(InsetKind::Separator)
    }

    /// Whether there is an inter-word space at a position.
    pub fn is_line_separator(&self, pit: usize, pos: usize) -> bool {
        self.get(pit)
            .and_then(|par| par.char_at(pos))
            .is_some_and(is_space)
    }

    /// Whether there is an horizontal fill at a position.
    pub fn is_hfill(&self, pit: usize, pos: usize) -> bool {
        self.inset_kind(pit, pos) == Some(InsetKind::Hfill)
    }

    /// Whether the layout is the default one or the plain one.
    pub fn is_default_or_plain(&self, layout: &Layout) -> bool {
        layout.name == self.params.default_layout || layout.name == self.params.plain_layout
    }

    /// First position of the paragraph body, after a manual label.
    ///
    /// The label extends to the first space after its first character, or to a
    /// line break.
    pub fn begin_of_body(&self, pit: usize) -> usize {
        let par = self.paragraph(pit);
        if par.layout().label_type != LabelType::Manual {
            return 0;
        }
        let is_break = |pos| self.is_newline(pit, pos) || self.is_env_separator(pit, pos);
        if par.is_empty() || is_break(0) {
            return 0;
        }
        for pos in 1..par.size() {
            if is_break(pos) {
                return pos;
            }
            if par.char_at(pos).is_some_and(is_space) {
                return pos + 1;
            }
        }
        par.size()
    }

    /// Nearest paragraph before `pit` whose depth is at most `depth`, or `pit`
    /// itself if there is none.
    pub fn depth_hook(&self, pit: usize, depth: usize) -> usize {
        let mut newpit = pit.saturating_sub(1);
        while newpit != 0 && self.paragraphs[newpit].params().depth > depth {
            newpit -= 1;
        }
        if self.paragraphs[newpit].params().depth > depth {
            return pit;
        }
        newpit
    }

    /// Paragraph in which `pit` is nested, if any.
    pub fn outer_hook(&self, pit: usize) -> Option<usize> {
        let depth = self.paragraphs[pit].params().depth;
        if depth == 0 {
            return None;
        }
        Some(self.depth_hook(pit, depth - 1))
    }

    /// Whether `pit` starts a sequence of paragraphs of the same layout and depth.
    pub fn is_first_in_sequence(&self, pit: usize) -> bool {
        let par = &self.paragraphs[pit];
        let dhook = self.depth_hook(pit, par.params().depth);
        let hook = &self.paragraphs[dhook];
        dhook == pit
            || hook.layout() != par.layout()
            || hook.params().depth != par.params().depth
    }

    /// Whether `pit` ends a sequence whose layout shows an end label.
    pub fn has_end_label(&self, p: usize) -> bool {
        let mut pit = p;
        let mut depth = self.paragraphs[p].params().depth;
        loop {
            let layout = self.paragraphs[pit].layout();
            if layout.end_label {
                let Some(next) = self.paragraphs.get(p + 1) else {
                    return true;
                };
                let next_depth = next.params().depth;
                return depth > next_depth || (depth == next_depth && layout != next.layout());
            }
            if depth == 0 {
                return false;
            }
            match self.outer_hook(pit) {
                Some(outer) => {
                    pit = outer;
                    depth = self.paragraphs[pit].params().depth;
                }
                None => return false,
            }
        }
    }

    /// Line spacing of paragraph `pit`.
    pub fn spacing(&self, pit: usize) -> f64 {
        self.paragraphs[pit]
            .params()
            .spacing
            .unwrap_or(self.params.spacing)
    }

    fn bibitems(&self, pit: usize) -> Vec<(usize, InsetId)> {
        self.paragraphs[pit]
            .insets()
            .filter(|&(_, id)| {
                self.inset(id)
                    .is_some_and(|inset| inset.kind() == InsetKind::Bibitem)
            })
            .collect()
    }

    /// Whether the bibliography markup of `pit` is invalid: a bibliography
    /// paragraph must start with exactly one bibitem, and no other paragraph
    /// may contain one.
    pub fn broken_biblio(&self, pit: usize) -> bool {
        let items = self.bibitems(pit);
        if self.paragraphs[pit].layout().label_type == LabelType::Bibliography {
            items.len() != 1 || items[0].0 != 0
        } else {
            !items.is_empty()
        }
    }

    /// Repairs the bibliography markup of `pit`. Returns whether something
    /// changed.
    pub fn fix_biblio(&mut self, pit: usize) -> bool {
        if !self.broken_biblio(pit) {
            return false;
        }
        let is_biblio = self.paragraphs[pit].layout().label_type == LabelType::Bibliography;
        let items = self.bibitems(pit);
        let keep = if is_biblio { items.first().copied() } else { None };
        // Erase from the back so that positions stay valid.
        for &(pos, id) in items.iter().rev() {
            if keep.is_some_and(|(_, kept)| kept == id) {
                continue;
            }
            self.paragraphs[pit].erase(pos);
            self.insets.remove(id);
        }
        if is_biblio {
            let par = &mut self.paragraphs[pit];
            let font = par.font_at(0);
            let change = par.change_at(0);
            let id = match keep {
                Some((0, _)) => return true,
                Some((pos, id)) => {
                    par.erase(pos);
                    id
                }
                None => self.insets.insert(Box::new(Bibitem {
                    label: (pit + 1).to_string(),
                })),
            };
            self.paragraphs[pit].insert(0, Slot::Inset(id), font, change);
        }
        true
    }
}
