// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::document::{Change, Document, DocumentParams, FixedBox};
use crate::row::{needs_row_break, CursorPos, Element, ElementKind, Row, RowFlags};
use crate::util::iround;
use crate::{Dimension, FixedMetrics, FontFamily, FontMetrics};

use super::utils::font;

/// A measured string element.
fn string(pos: usize, text: &str, rtl: bool, fm: &dyn FontMetrics) -> Element {
    let mut e = Element::new(ElementKind::String, pos, font().with_rtl(rtl), Change::default());
    e.text = text.to_owned();
    e.endpos = pos + text.chars().count();
    e.flags = RowFlags::CAN_BREAK_INSIDE;
    e.measure(fm);
    e
}

fn row_of(elements: Vec<Element>) -> Row {
    let mut row = Row::new(0, 0);
    for e in elements {
        row.push(e);
        row.finalize_last();
    }
    let end = row.back().map_or(0, |e| e.endpos.max(e.pos));
    row.set_endpos(end);
    row
}

#[test]
fn flag_precedence() {
    assert!(
        needs_row_break(RowFlags::ALWAYS_BREAK_AFTER, RowFlags::NO_BREAK_BEFORE),
        "always break wins over no break"
    );
    assert!(
        !needs_row_break(RowFlags::NO_BREAK_AFTER, RowFlags::BREAK_BEFORE),
        "no break wins over break"
    );
    assert!(
        !needs_row_break(RowFlags::BREAK_AFTER, RowFlags::NO_BREAK_BEFORE),
        "no break before wins over break after"
    );
    assert!(
        needs_row_break(RowFlags::BREAK_AFTER, RowFlags::INLINE),
        "break after"
    );
    assert!(
        needs_row_break(RowFlags::INLINE, RowFlags::DISPLAY),
        "display starts a row"
    );
    assert!(
        !needs_row_break(RowFlags::CAN_BREAK_AFTER, RowFlags::CAN_BREAK_BEFORE),
        "opportunities do not force a break"
    );
}

#[test]
fn push_and_pop_track_width() {
    let fm = FixedMetrics::default();
    let mut row = Row::new(0, 0);
    row.left_margin = 15;
    row.dim_mut().width = 15;
    row.push(string(0, "abc", false, &fm));
    assert_eq!(row.width(), 45, "margin and text");
    let e = row.pop();
    assert_eq!(e.map(|e| e.text), Some("abc".to_owned()), "popped element");
    assert_eq!(row.width(), 15, "only the margin left");
}

#[test]
fn change_sets_change_bar() {
    let fm = FixedMetrics::default();
    let mut e = string(0, "ab", false, &fm);
    e.change = Change::inserted(1);
    let mut row = Row::new(0, 0);
    assert!(!row.needs_change_bar(), "fresh row");
    row.push(e);
    assert!(row.needs_change_bar(), "changed element");
}

#[test]
fn extra_width_goes_to_expansion_points() {
    let fm = FixedMetrics::default();
    let mut row = row_of(vec![string(0, "hello world", false, &fm)]);
    assert_eq!(row.width(), 110, "natural width");
    assert!(row.set_extra_width(10, &fm), "justified");
    assert_eq!(row.width(), 120, "width grew by the extra");
    let e = &row.elements()[0];
    assert_eq!(e.extra, 10.0, "all the extra on the single space");
    assert_eq!(e.full_width(), 120.0, "element width with stretch");
}

#[test]
fn extra_width_has_limits() {
    let fm = FixedMetrics::default();
    let mut row = row_of(vec![string(0, "hello world", false, &fm)]);
    assert!(!row.set_extra_width(16, &fm), "more than 1.5 em per space");
    assert_eq!(row.width(), 110, "unchanged after refusal");
    assert!(!row.set_extra_width(-3, &fm), "negative extra");

    let mut tt = string(0, "hello world", false, &fm);
    tt.font = tt.font.with_family(FontFamily::Typewriter);
    let mut row = row_of(vec![tt]);
    assert!(!row.set_extra_width(5, &fm), "typewriter text is never stretched");

    let mut row = row_of(vec![string(0, "hello", false, &fm)]);
    assert!(!row.set_extra_width(5, &fm), "no space to stretch");
}

#[test]
fn shorten_at_word_boundary() {
    let fm = FixedMetrics::default();
    let mut row = row_of(vec![string(0, "aaa bbb ccc", false, &fm)]);
    let tail = row.shorten_if_needed(50, 100, &fm);
    assert_eq!(row.width(), 30, "first word and its space");
    assert_eq!(row.endpos(), 4, "row ends after the space");
    assert_eq!(tail.len(), 1, "one remaining piece");
    assert_eq!(tail[0].pos, 4, "tail starts where the row ends");
    assert_eq!(tail[0].text, "bbb ccc", "tail text");
    let last = row.back().map(|e| e.flags).unwrap_or_default();
    assert!(
        last.contains(RowFlags::ALWAYS_BREAK_AFTER),
        "row must end after its last element"
    );
}

#[test]
fn shorten_leaves_fitting_row_alone() {
    let fm = FixedMetrics::default();
    let mut row = row_of(vec![string(0, "aaa", false, &fm)]);
    let before = row.clone();
    assert!(row.shorten_if_needed(50, 50, &fm).is_empty(), "nothing to move");
    assert_eq!(row, before, "row unchanged");
}

#[test]
fn shorten_moves_whole_elements() {
    let fm = FixedMetrics::default();
    let mut first = string(0, "aaa ", false, &fm);
    first.flags |= RowFlags::CAN_BREAK_AFTER;
    let second = string(4, "bbbbbb", false, &fm);
    let mut row = row_of(vec![first, second]);
    assert_eq!(row.width(), 100, "two elements");
    let tail = row.shorten_if_needed(60, 100, &fm);
    assert_eq!(row.len(), 1, "second element moved");
    assert_eq!(row.width(), 40, "width of the first element");
    assert_eq!(row.endpos(), 4, "end of the first element");
    assert_eq!(tail.len(), 1, "moved element");
    assert_eq!(tail[0].text, "bbbbbb", "moved text");
}

#[test]
fn unbreakable_inset_overflows() {
    let fm = FixedMetrics::default();
    let mut doc = Document::new(DocumentParams::default());
    let inset = FixedBox::new(Dimension::new(800, 20, 5));
    let id = doc.add_inset(inset.clone());
    let mut row = Row::new(0, 0);
    row.add_inset(0, id, &inset, inset.dim, font(), Change::default());
    row.set_endpos(1);

    let tail = row.shorten_if_needed(650, 650, &fm);
    assert!(tail.is_empty(), "nothing can leave the row");
    assert_eq!(row.width(), 800, "row as wide as the inset");
    assert_eq!(row.endpos(), 1, "inset still on the row");
}

/// A breakable string followed by an unbreakable one that overflows.
fn breakable_then_stuck(fm: &dyn FontMetrics) -> Row {
    let first = string(0, "aa bbbbbbbbbb", false, fm);
    let mut stuck = string(13, "ccc", false, fm);
    stuck.flags = RowFlags::empty();
    row_of(vec![first, stuck])
}

#[test]
fn shorten_gives_up_split_that_overflows_next_row() {
    let fm = FixedMetrics::default();
    let mut row = breakable_then_stuck(&fm);
    assert_eq!(row.width(), 160, "both elements");
    // Splitting after "aa " would leave 140 pixels for rows of 100.
    let tail = row.shorten_if_needed(150, 100, &fm);
    assert_eq!(row.len(), 1, "first element kept whole");
    assert_eq!(row.width(), 130, "cut before the overflowing element");
    assert_eq!(row.endpos(), 13, "row ends before it");
    let texts: Vec<&str> = tail.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, ["ccc"], "only the overflowing element moves");
}

#[test]
fn shorten_splits_when_next_row_is_wide_enough() {
    let fm = FixedMetrics::default();
    let mut row = breakable_then_stuck(&fm);
    let tail = row.shorten_if_needed(150, 150, &fm);
    assert_eq!(row.width(), 20, "first word only");
    assert_eq!(row.endpos(), 3, "split after the space");
    let texts: Vec<&str> = tail.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, ["bbbbbbbbbb", "ccc"], "split remainder, then the rest");
}

#[test]
fn long_word_is_cut_anywhere() {
    let fm = FixedMetrics::default();
    let mut row = row_of(vec![string(0, "abcdefghijklmnop", false, &fm)]);
    let tail = row.shorten_if_needed(50, 50, &fm);
    assert_eq!(row.width(), 50, "forced cut fits");
    assert_eq!(row.endpos(), 5, "five characters kept");
    let texts: Vec<&str> = tail.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, ["fghij", "klmno", "p"], "pieces for the next rows");
}

#[test]
fn trailing_space_width_agrees_with_breaks() {
    let fm = FixedMetrics::default();
    for text in ["ab ", "ab\u{a0}", "ab\t"] {
        let e = string(0, text, false, &fm);
        let breaks = fm.break_string(text, 500, 500, false, false, &font());
        assert_eq!(breaks.len(), 1, "{text:?}: one piece");
        assert_eq!(e.nspc_width, breaks[0].nspc_width, "{text:?}: width without spaces");
    }
}

#[test]
fn rtrim_hides_trailing_space() {
    let fm = FixedMetrics::default();
    let mut row = row_of(vec![string(0, "ab ", false, &fm)]);
    assert_eq!(row.width(), 30, "with the space");
    row.rtrim();
    assert_eq!(row.width(), 20, "without the space");
    assert_eq!(row.elements()[0].endpos, 2, "space no longer displayed");
    row.rtrim();
    assert_eq!(row.width(), 20, "nothing more to trim");
}

#[test]
fn x2pos_at_direction_change() {
    let fm = FixedMetrics::default();
    // Left to right, then right to left.
    let row = row_of(vec![
        string(0, "abcde", false, &fm),
        string(5, "fghij", true, &fm),
    ]);
    let mut x = 49;
    let cursor = row.x2pos(&mut x, &fm);
    assert_eq!(cursor, CursorPos::with_boundary(5, true), "end of the ltr run");
    assert_eq!(x, 50, "snapped to the run edge");
    assert_eq!(row.pos2x(5, true, &fm), 50.0, "boundary position at the run edge");
    assert_eq!(row.pos2x(5, false, &fm), 100.0, "start of the rtl run");

    // Right to left, then left to right.
    let row = row_of(vec![
        string(0, "abcde", true, &fm),
        string(5, "fghij", false, &fm),
    ]);
    let mut x = 51;
    let cursor = row.x2pos(&mut x, &fm);
    assert_eq!(cursor, CursorPos::new(5), "start of the ltr run");
    assert_eq!(x, 50, "snapped to the run edge");
}

#[test]
fn x2pos_and_pos2x_agree() {
    let fm = FixedMetrics::default();
    let mut row = row_of(vec![string(0, "ab cd ef", false, &fm)]);
    row.left_margin = 10;
    row.dim_mut().width += 10;
    assert!(row.set_extra_width(8, &fm), "justified");
    for x in 0..=110 {
        let mut snapped = x;
        let cursor = row.x2pos(&mut snapped, &fm);
        let back = row.pos2x(cursor.pos, cursor.boundary, &fm);
        assert_eq!(iround(back), snapped, "x = {x}");
        assert!(
            cursor.pos >= row.pos() && cursor.pos <= row.endpos(),
            "position outside the row for x = {x}"
        );
    }
}

#[test]
fn x2pos_outside_the_row() {
    let fm = FixedMetrics::default();
    let row = row_of(vec![string(0, "abc", false, &fm)]);
    let mut x = -20;
    assert_eq!(row.x2pos(&mut x, &fm), CursorPos::new(0), "left of the row");
    assert_eq!(x, 0, "clamped to the margin");
    let mut x = 500;
    assert_eq!(row.x2pos(&mut x, &fm).pos, 3, "right of the row");
    assert_eq!(x, 30, "clamped to the row end");

    let mut empty = Row::new(0, 7);
    let mut x = 40;
    assert_eq!(empty.x2pos(&mut x, &fm), CursorPos::new(7), "empty row");
    empty.set_end_boundary(true);
    assert_eq!(
        empty.x2pos(&mut x, &fm),
        CursorPos::with_boundary(7, true),
        "empty row keeps its end boundary"
    );
}

fn assert_round_trip(row: &Row, fm: &dyn FontMetrics, case: &str) {
    for x in -10..=row.width() + 10 {
        let mut snapped = x;
        let cursor = row.x2pos(&mut snapped, fm);
        let back = row.pos2x(cursor.pos, cursor.boundary, fm);
        assert_eq!(iround(back), snapped, "{case}: x = {x} gives {cursor:?}");
    }
}

/// Rows given in logical order, put in visual order for a paragraph of the
/// given direction.
fn mixed_rows(rtl: bool, fm: &dyn FontMetrics) -> Vec<(&'static str, Row)> {
    let cases: [(&str, Vec<(&str, bool)>); 5] = [
        ("ltr then rtl", vec![("abcde", false), ("fghij", true)]),
        ("rtl then ltr", vec![("abcde", true), ("fghij", false)]),
        ("rtl inside ltr", vec![("ab", false), ("cd", true), ("ef", false)]),
        ("ltr inside rtl", vec![("ab", true), ("cd", false), ("ef", true)]),
        ("rtl after ltr", vec![("abc", false), ("de", true)]),
    ];
    let mut rows = Vec::new();
    for (name, runs) in cases {
        for end_boundary in [false, true] {
            let mut pos = 0;
            let mut elements = Vec::new();
            for (text, run_rtl) in &runs {
                elements.push(string(pos, text, *run_rtl, fm));
                pos += text.len();
            }
            let mut row = row_of(elements);
            row.set_rtl(rtl);
            row.set_end_boundary(end_boundary);
            row.reverse_rtl();
            rows.push((name, row));
        }
    }
    rows
}

#[test]
fn x2pos_and_pos2x_agree_on_mixed_directions() {
    let fm = FixedMetrics::default();
    for rtl in [false, true] {
        for (name, row) in mixed_rows(rtl, &fm) {
            let case = format!(
                "{name}, rtl paragraph: {rtl}, end boundary: {}",
                row.end_boundary()
            );
            assert_round_trip(&row, &fm, &case);
        }
    }
}

#[test]
fn x2pos_and_pos2x_agree_after_trimmed_space() {
    let fm = FixedMetrics::default();
    let mut row = row_of(vec![
        string(10, "\u{5d3}\u{5d4}", true, &fm),
        string(12, " ", false, &fm),
    ]);
    row.set_pos(10);
    row.rtrim();
    assert_eq!(row.width(), 20, "space trimmed");
    assert_eq!(row.endpos(), 13, "row still ends after the space");
    assert_round_trip(&row, &fm, "trimmed space");

    let mut x = 500;
    assert_eq!(row.x2pos(&mut x, &fm), CursorPos::new(10), "right end of the rtl run");
    assert_eq!(x, 20, "snapped to the row end");
    let mut x = -5;
    assert_eq!(row.x2pos(&mut x, &fm), CursorPos::new(12), "left end of the rtl run");
}

#[test]
fn leading_rtl_run_has_a_boundary() {
    let fm = FixedMetrics::default();
    let row = row_of(vec![
        string(0, "abcde", true, &fm),
        string(5, "fghij", false, &fm),
    ]);
    let mut x = 0;
    assert_eq!(
        row.x2pos(&mut x, &fm),
        CursorPos::with_boundary(5, true),
        "end of the rtl run, at the left edge"
    );
    assert_eq!(row.pos2x(5, true, &fm), 0.0, "with boundary: left edge");
    assert_eq!(row.pos2x(5, false, &fm), 50.0, "without boundary: start of the ltr run");
}

#[test]
fn rtl_end_of_row_keeps_direction_boundary() {
    let fm = FixedMetrics::default();
    let row = row_of(vec![
        string(0, "abcde", false, &fm),
        string(5, "fghij", true, &fm),
    ]);
    assert!(!row.end_boundary(), "paragraph end");
    let mut x = 52;
    let cursor = row.x2pos(&mut x, &fm);
    assert_eq!(cursor, CursorPos::with_boundary(10, true), "end of the rtl run");
    assert_eq!(x, 50, "snapped to the left edge of the run");
    assert_eq!(row.pos2x(10, true, &fm), 50.0, "same place");
}

#[test]
fn reverse_rtl_orders_runs() {
    let fm = FixedMetrics::default();
    let mut row = row_of(vec![
        string(0, "a", false, &fm),
        string(1, "b", true, &fm),
        string(2, "c", true, &fm),
        string(3, "d", false, &fm),
        string(4, "e", false, &fm),
    ]);
    row.set_rtl(true);
    let logical = row.clone();
    row.reverse_rtl();
    let order: Vec<usize> = row.elements().iter().map(|e| e.pos).collect();
    assert_eq!(order, [3, 4, 2, 1, 0], "visual order of a rtl paragraph");

    row.reverse_rtl();
    assert_eq!(row, logical, "reordering twice gives the logical order back");

    let mut ltr = logical;
    ltr.set_rtl(false);
    ltr.reverse_rtl();
    let order: Vec<usize> = ltr.elements().iter().map(|e| e.pos).collect();
    assert_eq!(order, [0, 2, 1, 3, 4], "visual order of a ltr paragraph");
}

#[test]
fn selection_is_computed_then_committed() {
    let fm = FixedMetrics::default();
    let mut row = row_of(vec![string(0, "abcdef", false, &fm)]);
    row.clear_dirty();

    let sel = row.selection_for(CursorPos::new(2), CursorPos::new(10));
    assert_eq!(sel.sel_beg, Some(2), "selection start");
    assert_eq!(sel.sel_end, Some(6), "selection clipped to the row");
    assert!(sel.end_margin, "selection goes on after the row");
    assert!(!sel.begin_margin, "selection starts inside the row");
    assert!(!row.has_selection(), "query does not store");
    assert!(!row.is_dirty(), "query does not mark the row");

    row.commit_selection(sel);
    assert!(row.has_selection(), "stored");
    assert!(row.is_dirty(), "changed selection needs a repaint");

    row.clear_dirty();
    row.commit_selection(sel);
    assert!(!row.is_dirty(), "same selection, no repaint");

    let outside = row.selection_for(CursorPos::new(8), CursorPos::new(10));
    assert!(!outside.is_some(), "selection after the row");
}

#[test]
fn virtual_elements_stick_to_their_predecessor() {
    let fm = FixedMetrics::default();
    let mut row = Row::new(0, 0);
    row.add_char(0, 'a', font(), Change::default());
    row.add_char(1, 'b', font(), Change::default());
    row.add_virtual(2, "\u{b6}", font(), Change::default(), &fm);
    assert_eq!(row.len(), 2, "characters merged into one string");
    assert_eq!(row.elements()[0].text, "ab", "merged text");
    let marker = &row.elements()[1];
    assert!(marker.is_virtual(), "marker is virtual");
    assert_eq!((marker.pos, marker.endpos), (2, 2), "virtual covers no position");
    assert!(
        marker.flags.contains(RowFlags::NO_BREAK_BEFORE),
        "cannot start a row"
    );
}
