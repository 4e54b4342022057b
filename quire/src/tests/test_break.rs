// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use crate::document::{FixedBox, LabelType, Layout, MarginType, Newline, Paragraph};
use crate::row::ElementKind;
use crate::{Dimension, LayoutSettings, ViewMargins};

use super::utils::{assert_covers, ranges, widths, Part, TestEnv};

#[test]
fn two_hundred_characters_in_four_rows() {
    let mut env = TestEnv::new(650);
    let text = "abcd ".repeat(40);
    env.push_text(&text);
    let rows = env.break_rows(0);
    assert_eq!(
        ranges(&rows),
        [(0, 65), (65, 130), (130, 195), (195, 200)],
        "row ranges"
    );
    assert_eq!(widths(&rows), [640, 640, 640, 50], "row widths");
    let par = env.doc.paragraph(0);
    for row in &rows[..3] {
        assert_eq!(
            par.char_at(row.endpos() - 1),
            Some(' '),
            "rows end at a word separator"
        );
        assert!(!row.end_boundary(), "broken at a separator");
    }
}

#[test]
fn rows_cover_the_paragraph_at_any_width() {
    let text = "the quick brown fox jumps over the lazy dog";
    for max_width in (60..=450).step_by(10) {
        let mut env = TestEnv::new(max_width);
        env.push_text(text);
        let rows = env.break_rows(0);
        let case = format!("width {max_width}");
        assert_covers(&rows, text.len(), &case);
        for row in &rows {
            assert!(row.width() <= max_width, "{case}: row {row} too wide");
        }
    }
}

#[test]
fn long_word_is_broken_anywhere() {
    let mut env = TestEnv::new(50);
    env.push_text("abcdefghijklmnop");
    let rows = env.break_rows(0);
    assert_eq!(
        ranges(&rows),
        [(0, 5), (5, 10), (10, 15), (15, 16)],
        "forced rows"
    );
    assert_eq!(widths(&rows), [50, 50, 50, 10], "every row fits");
    assert!(rows[0].end_boundary(), "row broken inside a word");
    assert!(!rows[3].end_boundary(), "last row");
}

#[test]
fn wide_inset_overflows_its_row() {
    let mut env = TestEnv::new(650);
    let id = env.doc.add_inset(FixedBox::new(Dimension::new(800, 20, 5)));
    env.push_mixed(vec![Part::Inset(id)]);
    env.metrics();
    let rows = env.rows(0);
    assert_eq!(ranges(rows), [(0, 1)], "a single row");
    assert_eq!(rows[0].width(), 800, "as wide as the inset");
}

#[test]
fn display_inset_gets_a_centered_row() {
    let mut env = TestEnv::new(100);
    let id = env.doc.add_inset(FixedBox::display(Dimension::new(50, 9, 3)));
    env.push_mixed(vec![Part::Text("ab"), Part::Inset(id), Part::Text("cd")]);
    env.metrics();
    let rows = env.rows(0);
    assert_eq!(ranges(rows), [(0, 2), (2, 3), (3, 5)], "row ranges");
    assert!(rows[0].flushed(), "row before a display is not justified");
    assert_eq!(rows[1].left_margin, 25, "centered");
    assert_eq!(rows[1].width(), 75, "margin and inset");
    assert_eq!(rows[2].left_margin, 0, "text after the display");
}

#[test]
fn newline_breaks_and_flushes() {
    let mut env = TestEnv::new(300);
    let flush = env.doc.add_inset(Newline { justify: false });
    let justify = env.doc.add_inset(Newline { justify: true });
    env.push_mixed(vec![Part::Text("ab"), Part::Inset(flush), Part::Text("cd")]);
    env.push_mixed(vec![Part::Text("ab"), Part::Inset(justify), Part::Text("cd")]);
    env.metrics();

    let rows = env.rows(0);
    assert_eq!(ranges(rows), [(0, 3), (3, 5)], "break after the newline");
    assert!(rows[0].flushed(), "newline flushes the row");
    assert_eq!(rows[0].width(), 30, "newline marker is measured");

    let rows = env.rows(1);
    assert_eq!(ranges(rows), [(0, 3), (3, 5)], "break after the newline");
    assert!(!rows[0].flushed(), "justified newline");
}

#[test]
fn trailing_newline_opens_an_empty_row() {
    let mut env = TestEnv::new(300);
    let id = env.doc.add_inset(Newline::default());
    env.push_mixed(vec![Part::Text("ab"), Part::Inset(id)]);
    env.metrics();
    assert_eq!(ranges(env.rows(0)), [(0, 3), (3, 3)], "empty last row");
}

#[test]
fn empty_paragraph_has_one_row() {
    let mut env = TestEnv::new(300);
    env.push_text("");
    env.metrics();
    let rows = env.rows(0);
    assert_eq!(ranges(rows), [(0, 0)], "one empty row");
    assert_eq!(rows[0].height(), 14, "height of the font");
}

#[test]
fn margin_space_reaches_the_body() {
    let mut env = TestEnv::new(300);
    let layout = Arc::new(Layout {
        margin_type: MarginType::Manual,
        label_type: LabelType::Manual,
        ..Layout::named("Description")
    });
    let mut par = Paragraph::with_text(layout, "Label: body text");
    par.params_mut().label_width_string = "MMMMMMMM".into();
    env.doc.push(par);

    let rows = env.break_rows(0);
    assert_eq!(rows.len(), 1, "fits on one row");
    let elements = rows[0].elements();
    assert_eq!(elements[1].kind, ElementKind::MarginSpace, "label separator");
    assert_eq!(elements[1].dim.width, 30, "grown up to the body margin");
    let body_x: i32 = elements[..2].iter().map(|e| e.dim.width).sum();
    assert_eq!(
        body_x,
        env.tm.left_margin(&env.doc, 0, 16, &env.fm),
        "body starts at the left margin of the paragraph"
    );
}

#[test]
fn rtl_rows_swap_margins() {
    let margins = ViewMargins {
        left: 20,
        right: 30,
        ..ViewMargins::default()
    };
    let mut env = TestEnv::with_settings(LayoutSettings::new(200).with_main_text(margins));
    let mut par = Paragraph::with_text(env.layout.clone(), "\u{5d0}\u{5d1}\u{5d2} \u{5d3}\u{5d4}\u{5d5}");
    par.params_mut().rtl = true;
    par.resolve_directions();
    env.doc.push(par);
    env.redo(0);

    let rows = env.rows(0);
    assert_eq!(rows.len(), 1, "fits on one row");
    let row = &rows[0];
    assert!(row.is_rtl(), "rtl row");
    assert!(row.elements()[0].is_rtl(), "rtl text");
    assert_eq!(row.right_margin, 20, "left view margin on the right");
    assert_eq!(row.left_margin, 110, "flushed right");
    assert_eq!(row.width() + row.right_margin, 200, "row ends at the right edge");
}
