// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Viewport inputs and display preferences of a text.

use crate::document::Alignment;
use crate::{Error, Result};

/// Space around the main text inside the view, in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewMargins {
    /// Left margin.
    pub left: i32,
    /// Right margin.
    pub right: i32,
    /// Space above the first paragraph.
    pub top: i32,
    /// Space below the last paragraph.
    pub bottom: i32,
}

/// Settings of a [`TextMetrics`](crate::TextMetrics).
///
/// Any change invalidates every cached paragraph. `zoom` is not applied by the
/// engine itself: the [`FontMetrics`](crate::FontMetrics) provider is expected to
/// measure fonts at the current zoom.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSettings {
    /// Width available to the text, margins included.
    pub max_width: i32,
    /// Do not widen a multi-row text to `max_width`.
    pub tight: bool,
    /// Zoom factor in percent.
    pub zoom: u32,
    /// The text is the outermost text of the document.
    pub main_text: bool,
    /// Margins of the view, used by the main text only.
    pub view_margins: ViewMargins,
    /// Indentation per nesting level.
    pub nest_margin: i32,
    /// Show a marker at the end of every paragraph.
    pub paragraph_markers: bool,
    /// Show bookmarks as numbers inside the text.
    pub bookmarks_inline: bool,
    /// Alignment imposed by an enclosing container.
    pub content_alignment: Option<Alignment>,
    /// The paragraphs are never indented.
    pub never_indent: bool,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            max_width: 600,
            tight: false,
            zoom: 100,
            main_text: false,
            view_margins: ViewMargins::default(),
            nest_margin: 15,
            paragraph_markers: false,
            bookmarks_inline: false,
            content_alignment: None,
            never_indent: false,
        }
    }
}

impl LayoutSettings {
    /// Settings for a text `max_width` pixels wide.
    pub fn new(max_width: i32) -> Self {
        Self {
            max_width,
            ..Self::default()
        }
    }

    /// Checks that the settings can be used for layout.
    pub fn validate(&self) -> Result<()> {
        if self.max_width <= 0 {
            return Err(Error::InvalidWidth(self.max_width));
        }
        Ok(())
    }

    /// Returns a copy for the main text, with the given view margins.
    #[must_use]
    pub fn with_main_text(mut self, margins: ViewMargins) -> Self {
        self.main_text = true;
        self.view_margins = margins;
        self
    }

    /// Returns a copy with the tight flag set.
    #[must_use]
    pub fn with_tight(mut self, tight: bool) -> Self {
        self.tight = tight;
        self
    }

    /// Returns a copy with paragraph end markers shown or hidden.
    #[must_use]
    pub fn with_paragraph_markers(mut self, show: bool) -> Self {
        self.paragraph_markers = show;
        self
    }

    /// Returns a copy with the alignment imposed by a container.
    #[must_use]
    pub fn with_content_alignment(mut self, align: Option<Alignment>) -> Self {
        self.content_alignment = align;
        self
    }
}
