// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paragraph styles.

use crate::Font;

/// Horizontal alignment of the rows of a paragraph.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Justified: inter-word space is stretched to fill the row.
    #[default]
    Block,
    /// Flush left.
    Left,
    /// Flush right.
    Right,
    /// Centered.
    Center,
}

/// How the left margin of a paragraph is computed.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub enum MarginType {
    /// Fixed margin, shrinking with nesting depth.
    #[default]
    Static,
    /// The label width determines the margin.
    Dynamic,
    /// The margin is given by the paragraph's label width string.
    Manual,
    /// Like [`Dynamic`](Self::Dynamic), but only for the first row.
    FirstDynamic,
    /// The paragraph is pushed to the right edge as a block.
    RightAddressBox,
}

/// Kind of label shown in front of (or above) a paragraph.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub enum LabelType {
    /// No label.
    #[default]
    NoLabel,
    /// The label is the paragraph text up to the first space.
    Manual,
    /// Fixed label text, inline.
    Static,
    /// Label computed from references, inline.
    Sensitive,
    /// Enumeration counter, inline.
    Enumerate,
    /// Item bullet, inline.
    Itemize,
    /// Label on its own line above the paragraph.
    Above,
    /// Centered label above the paragraph.
    Centered,
    /// Bibliography entry key.
    Bibliography,
}

/// Structural role of a paragraph style.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, Hash)]
pub enum LatexType {
    /// A plain paragraph.
    #[default]
    Paragraph,
    /// A sectioning-like command.
    Command,
    /// A generic environment.
    Environment,
    /// An environment whose paragraphs are items.
    ItemEnvironment,
    /// A list with a label width.
    ListEnvironment,
    /// A bibliography.
    BibEnvironment,
}

/// A paragraph style: everything the layout engine needs to know about it.
///
/// Margins and indents are strings measured with the relevant font, so that
/// they follow the zoom and the font size.
#[derive(Clone, Debug)]
pub struct Layout {
    /// Name of the style. Two layouts are equal when their names are.
    pub name: String,
    /// Default alignment.
    pub align: Alignment,
    /// Left margin computation.
    pub margin_type: MarginType,
    /// Label kind.
    pub label_type: LabelType,
    /// Structural role.
    pub latex_type: LatexType,
    /// Left margin string.
    pub left_margin: String,
    /// Right margin string.
    pub right_margin: String,
    /// Left margin of the label.
    pub label_indent: String,
    /// Space between the label and the text.
    pub label_sep: String,
    /// First row indentation.
    pub par_indent: String,
    /// Body font.
    pub font: Font,
    /// Label font.
    pub label_font: Font,
    /// Line spacing factor.
    pub spacing: f64,
    /// Space above, in default row heights.
    pub top_sep: f64,
    /// Space below, in default row heights.
    pub bottom_sep: f64,
    /// Space between items, in default row heights.
    pub item_sep: f64,
    /// Space between paragraphs of the style, in default row heights.
    pub par_sep: f64,
    /// Space below an above-label, in default row heights.
    pub label_bottom_sep: f64,
    /// The following paragraph is not indented.
    pub next_no_indent: bool,
    /// Paragraph breaks inside the style behave as newlines.
    pub parbreak_is_newline: bool,
    /// The last paragraph of a sequence of this style shows an end label.
    pub end_label: bool,
    /// Consecutive paragraphs of the style form one group.
    pub par_group: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            name: "Standard".into(),
            align: Alignment::Block,
            margin_type: MarginType::Static,
            label_type: LabelType::NoLabel,
            latex_type: LatexType::Paragraph,
            left_margin: String::new(),
            right_margin: String::new(),
            label_indent: String::new(),
            label_sep: "x".into(),
            par_indent: String::new(),
            font: Font::default(),
            label_font: Font::default(),
            spacing: 1.0,
            top_sep: 0.0,
            bottom_sep: 0.0,
            item_sep: 0.0,
            par_sep: 0.0,
            label_bottom_sep: 0.0,
            next_no_indent: false,
            parbreak_is_newline: false,
            end_label: false,
            par_group: false,
        }
    }
}

impl PartialEq for Layout {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Layout {
    /// Creates a default layout with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether the style is an environment of some kind.
    pub fn is_environment(&self) -> bool {
        matches!(
            self.latex_type,
            LatexType::Environment
                | LatexType::ItemEnvironment
                | LatexType::ListEnvironment
                | LatexType::BibEnvironment
        )
    }

    /// Whether the style is a plain paragraph.
    pub fn is_paragraph(&self) -> bool {
        self.latex_type == LatexType::Paragraph
    }

    /// Whether the label is on the same row as the text.
    pub fn label_is_inline(&self) -> bool {
        matches!(
            self.label_type,
            LabelType::Static | LabelType::Sensitive | LabelType::Enumerate | LabelType::Itemize
        )
    }

    /// Whether the label sits above the text.
    pub fn label_is_above(&self) -> bool {
        matches!(
            self.label_type,
            LabelType::Above | LabelType::Centered | LabelType::Bibliography
        )
    }
}
