// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use crate::document::{
    Bibitem, Change, InsetKind, LabelType, LatexType, Layout, Paragraph, ParagraphSeparation,
};
use crate::row::{ElementKind, Row};
use crate::{
    Bookmark, Color, Error, InlineCompletion, LayoutSettings, Preedit, TextMetrics, ViewMargins,
    MIN_TEXT_WIDTH,
};

use super::utils::{assert_covers, font, Part, TestEnv};

fn texts(row: &Row) -> Vec<(ElementKind, &str)> {
    row.elements()
        .iter()
        .map(|e| (e.kind, e.text.as_str()))
        .collect()
}

fn main_text(pars: usize) -> TestEnv {
    let settings = LayoutSettings::new(300).with_main_text(ViewMargins::default());
    let mut env = TestEnv::with_settings(settings);
    for _ in 0..pars {
        env.push_text("aa");
    }
    env
}

fn positions(env: &TestEnv) -> Vec<(usize, Option<i32>)> {
    env.tm.iter().map(|(pit, pm)| (pit, pm.position())).collect()
}

#[test]
fn paragraphs_are_laid_out_on_demand() {
    let mut env = TestEnv::new(100);
    env.push_text("aa bb");
    assert_eq!(env.tm.metrics_of(0), Err(Error::NotLaidOut { pit: 0 }), "empty cache");
    let laid_out = env
        .tm
        .ensure_laid_out(&mut env.doc, 0, &env.fm, &mut env.cache);
    assert_eq!(laid_out, Ok(true), "first call lays out");
    let laid_out = env
        .tm
        .ensure_laid_out(&mut env.doc, 0, &env.fm, &mut env.cache);
    assert_eq!(laid_out, Ok(false), "second call uses the cache");
    let missing = env
        .tm
        .ensure_laid_out(&mut env.doc, 5, &env.fm, &mut env.cache);
    assert_eq!(
        missing,
        Err(Error::NoSuchParagraph { pit: 5, len: 1 }),
        "past the end"
    );

    env.tm.forget(0);
    assert!(!env.tm.contains(0), "forgotten");
    assert!(env.tm.metrics_of(0).is_err(), "must be laid out again");
}

#[test]
fn redo_is_idempotent() {
    let mut env = TestEnv::new(100);
    env.push_text("aa bb cc dd ee ff gg");
    assert!(env.redo(0), "new paragraph changes the height");
    let rows = env.rows(0).to_vec();
    assert!(!env.redo(0), "nothing changed");
    assert_eq!(env.rows(0), rows.as_slice(), "same rows");

    let pm = env.pm(0);
    let heights: i32 = pm.rows().iter().map(Row::height).sum();
    assert_eq!(pm.height(), heights, "paragraph height is the sum of its rows");
    assert_eq!(pm.ascent(), pm.rows()[0].ascent(), "ascent of the first row");
}

#[test]
fn settings_changes_drop_the_cache() {
    let mut env = TestEnv::new(100);
    env.push_text("aa bb cc dd ee ff gg");
    env.metrics();
    assert!(!env.tm.set_settings(LayoutSettings::new(100)), "same settings");
    assert!(env.tm.contains(0), "cache kept");

    assert!(env.tm.set_settings(LayoutSettings::new(200)), "wider");
    assert!(!env.tm.contains(0), "cache dropped");
    assert_eq!(env.tm.width(), 200, "width follows the settings");
    env.metrics();
    assert_eq!(env.rows(0).len(), 1, "fits on one row now");

    let zoomed = LayoutSettings {
        zoom: 150,
        ..LayoutSettings::new(200)
    };
    assert!(env.tm.set_settings(zoomed), "zoom invalidates");
    assert!(!env.tm.contains(0), "cache dropped");
}

#[test]
fn invalid_width_is_replaced() {
    assert_eq!(
        LayoutSettings::new(0).validate(),
        Err(Error::InvalidWidth(0)),
        "zero width"
    );
    assert!(LayoutSettings::new(1).validate().is_ok(), "one pixel");
    let tm = TextMetrics::new(LayoutSettings::new(-5));
    assert_eq!(tm.settings().max_width, MIN_TEXT_WIDTH, "minimum width");

    let mut env = TestEnv::new(-5);
    env.push_text("ab cd");
    env.metrics();
    let rows = env.rows(0);
    assert!(rows.len() >= 4, "at most one character per row");
    assert!(
        rows.iter().all(|row| row.width() <= MIN_TEXT_WIDTH),
        "rows fit the minimum width"
    );
}

#[test]
fn tight_text_keeps_its_natural_width() {
    let mut env = TestEnv::with_settings(LayoutSettings::new(100).with_tight(true));
    env.push_text("aa bb cc dd ee ff gg");
    env.metrics();
    assert_eq!(env.tm.width(), 80, "widest row");

    let mut env = TestEnv::new(100);
    env.push_text("aa bb cc dd ee ff gg");
    env.metrics();
    assert_eq!(env.tm.width(), 100, "several rows take the whole width");

    let mut env = TestEnv::new(100);
    env.push_text("aa");
    env.metrics();
    assert_eq!(env.tm.width(), 20, "a single short row");
}

#[test]
fn skip_separation_adds_space() {
    let mut env = TestEnv::new(100);
    env.doc.params_mut().paragraph_separation = ParagraphSeparation::Skip;
    env.doc.params_mut().default_skip = 7;
    env.push_text("aa");
    env.push_text("bb");
    env.metrics();
    assert_eq!(env.rows(0)[0].ascent(), 10, "first paragraph");
    assert_eq!(env.rows(1)[0].ascent(), 17, "skip above the second");
    assert_eq!(env.pm(1).height(), 21, "skip included in the height");
    assert_eq!(env.tm.height(), 35, "height of the text");
}

#[test]
fn paragraph_markers() {
    let settings = LayoutSettings::new(300).with_paragraph_markers(true);
    let mut env = TestEnv::with_settings(settings);
    env.push_text("ab");
    env.push_text("cd");
    env.metrics();

    let row = &env.rows(0)[0];
    let marker = &row.elements()[1];
    assert_eq!(marker.kind, ElementKind::Virtual, "marker is not in the text");
    assert_eq!(marker.text, "\u{b6}", "pilcrow");
    assert_eq!(marker.font.color, Color::ParagraphMarker, "marker color");
    assert_eq!((marker.pos, marker.endpos), (2, 2), "covers no position");
    assert_eq!(row.width(), 30, "marker takes room");
    assert!(
        env.rows(1)[0].elements().iter().all(|e| !e.is_virtual()),
        "no marker on the last paragraph"
    );
}

#[test]
fn tracked_changes_show_a_change_bar() {
    let mut env = TestEnv::new(300);
    env.push_text("ab");
    env.push_text("cd");
    env.push_text("ef");
    env.par_mut(0).set_change(0..1, Change::inserted(1));
    env.par_mut(1).set_change(2..3, Change::deleted(1));
    env.metrics();

    assert!(env.rows(0)[0].needs_change_bar(), "changed character");
    let row = &env.rows(1)[0];
    assert!(row.needs_change_bar(), "changed paragraph break");
    assert_eq!(
        row.back().map(|e| e.text.as_str()),
        Some("\u{b6}"),
        "changed paragraph break is shown"
    );
    assert!(!env.rows(2)[0].needs_change_bar(), "unchanged paragraph");
}

#[test]
fn inline_completion_follows_the_cursor() {
    let mut env = TestEnv::new(300);
    env.push_text("hel");
    env.metrics();
    env.tm.set_inline_completion(Some(InlineCompletion {
        pit: 0,
        pos: 3,
        text: "lo world".into(),
        unique_chars: 2,
    }));
    assert!(!env.tm.contains(0), "paragraph invalidated");
    env.metrics();

    let row = &env.rows(0)[0];
    assert_eq!(
        texts(row),
        [
            (ElementKind::String, "hel"),
            (ElementKind::Virtual, "lo"),
            (ElementKind::Virtual, " world"),
        ],
        "completion after the cursor"
    );
    assert_eq!(row.elements()[1].font.color, Color::InlineCompletion, "unique part");
    assert_eq!(row.elements()[2].font.color, Color::NonUniqueCompletion, "shared part");
    assert_eq!(row.width(), 110, "completion takes room");
    assert_eq!(row.endpos(), 3, "paragraph unchanged");

    env.tm.set_inline_completion(None);
    env.metrics();
    assert_eq!(env.rows(0)[0].len(), 1, "completion removed");
}

#[test]
fn preedit_is_shown_at_its_position() {
    let mut env = TestEnv::new(300);
    env.push_text("abcd");
    env.tm.set_preedit(Some(Preedit {
        pit: 0,
        pos: 2,
        text: "xy".into(),
        wrap_anywhere: false,
    }));
    env.metrics();
    let row = &env.rows(0)[0];
    assert_eq!(
        texts(row),
        [
            (ElementKind::String, "ab"),
            (ElementKind::Preedit, "xy"),
            (ElementKind::String, "cd"),
        ],
        "composition inside the text"
    );
    assert_eq!(row.elements()[1].font.color, Color::Preedit, "preedit color");
    assert_eq!(row.width(), 60, "composition takes room");
}

#[test]
fn inline_bookmarks() {
    let bookmarks = vec![
        Bookmark {
            number: 1,
            pit: 0,
            pos: 1,
        },
        Bookmark {
            number: 3,
            pit: 0,
            pos: 2,
        },
    ];
    let mut env = TestEnv::new(300);
    env.push_text("ab");
    env.tm.set_bookmarks(bookmarks.clone());
    env.metrics();
    assert_eq!(env.rows(0)[0].len(), 1, "bookmarks hidden by default");

    let settings = LayoutSettings {
        bookmarks_inline: true,
        ..LayoutSettings::new(300)
    };
    let mut env = TestEnv::with_settings(settings);
    env.push_text("ab");
    env.tm.set_bookmarks(bookmarks);
    env.metrics();
    let row = &env.rows(0)[0];
    assert_eq!(
        texts(row),
        [
            (ElementKind::String, "a"),
            (ElementKind::Virtual, "\u{2776}"),
            (ElementKind::String, "b"),
            (ElementKind::Virtual, "\u{2778}"),
        ],
        "numbers before their positions"
    );
    assert_eq!(row.elements()[1].font.color, Color::Bookmark, "bookmark color");
}

#[test]
fn special_characters() {
    let mut env = TestEnv::new(300);
    env.push_text("a\tb");
    env.push_text("a\u{2028}b");
    env.metrics();

    let row = &env.rows(0)[0];
    assert_eq!(row.elements()[1].kind, ElementKind::Space, "tab is a blank");
    assert_eq!(row.elements()[1].dim.width, 40, "four spaces wide");
    assert_eq!(row.width(), 60, "tab takes room");

    let row = &env.rows(1)[0];
    assert_eq!(
        texts(row),
        [
            (ElementKind::String, "a"),
            (ElementKind::String, "\u{2936}"),
            (ElementKind::String, "b"),
        ],
        "line separator is shown as an arrow"
    );
    assert_eq!(row.elements()[1].font, font(), "paragraph font");
}

#[test]
fn view_window_is_filled_around_the_anchor() {
    let mut env = main_text(10);
    env.tm
        .update_metrics(&mut env.doc, 0, 10, 50, &env.fm, &mut env.cache);
    assert_eq!(
        positions(&env),
        [(0, Some(10)), (1, Some(24)), (2, Some(38)), (3, Some(52))],
        "paragraphs down to the bottom of the view"
    );

    env.tm
        .update_metrics(&mut env.doc, 5, 30, 50, &env.fm, &mut env.cache);
    assert_eq!(
        positions(&env),
        [
            (3, Some(2)),
            (4, Some(16)),
            (5, Some(30)),
            (6, Some(44)),
            (7, Some(58)),
        ],
        "paragraphs above and below, the others dropped"
    );

    assert_eq!(
        env.tm.new_par_metrics_down(&mut env.doc, &env.fm, &mut env.cache),
        Some(8),
        "next paragraph"
    );
    assert_eq!(env.pm(8).position(), Some(72), "below the last one");
    assert_eq!(
        env.tm.new_par_metrics_up(&mut env.doc, &env.fm, &mut env.cache),
        Some(2),
        "previous paragraph"
    );
    assert_eq!(env.pm(2).position(), Some(-12), "above the first one");
}

#[test]
fn new_paragraphs_stop_at_the_text_ends() {
    let mut env = main_text(2);
    assert_eq!(
        env.tm.new_par_metrics_down(&mut env.doc, &env.fm, &mut env.cache),
        None,
        "nothing cached"
    );
    env.tm
        .update_metrics(&mut env.doc, 0, 10, 500, &env.fm, &mut env.cache);
    assert_eq!(env.tm.first().map(|(pit, _)| pit), Some(0), "first paragraph");
    assert_eq!(env.tm.last().map(|(pit, _)| pit), Some(1), "last paragraph");
    assert_eq!(
        env.tm.new_par_metrics_up(&mut env.doc, &env.fm, &mut env.cache),
        None,
        "start of the text"
    );
    assert_eq!(
        env.tm.new_par_metrics_down(&mut env.doc, &env.fm, &mut env.cache),
        None,
        "end of the text"
    );
    let last = &env.rows(1)[0];
    assert!(env.tm.is_last_row(&env.doc, last), "last row of the text");
    assert!(env.tm.is_first_row(&env.rows(0)[0]), "first row of the text");
}

#[test]
fn view_window_only_for_the_main_text() {
    let mut env = TestEnv::new(300);
    env.push_text("aa");
    env.tm
        .update_metrics(&mut env.doc, 0, 10, 50, &env.fm, &mut env.cache);
    assert!(!env.tm.contains(0), "insets are laid out with metrics");
}

#[test]
fn rows_are_marked_for_repaint() {
    let mut env = TestEnv::new(100);
    env.push_text("aa bb cc dd ee ff gg");
    env.metrics();
    let dirty = |env: &TestEnv| -> Vec<bool> { env.rows(0).iter().map(Row::is_dirty).collect() };
    let before = dirty(&env);
    env.tm.set_row_changed(0, 9);
    let after = dirty(&env);
    assert!(after[1], "second row marked");
    assert_eq!((after[0], after[2]), (before[0], before[2]), "other rows untouched");

    env.tm.clear();
    assert!(env.tm.iter().next().is_none(), "cache cleared");
}

fn bibliography() -> Arc<Layout> {
    Arc::new(Layout {
        label_type: LabelType::Bibliography,
        latex_type: LatexType::BibEnvironment,
        ..Layout::named("Bibliography")
    })
}

fn inset_kinds(env: &TestEnv, pit: usize) -> Vec<(usize, InsetKind)> {
    env.doc
        .paragraph(pit)
        .insets()
        .filter_map(|(pos, id)| Some((pos, env.doc.inset(id)?.kind())))
        .collect()
}

#[test]
fn bibliography_entry_gets_its_key() {
    let mut env = TestEnv::new(300);
    env.doc.push(Paragraph::with_text(bibliography(), "Knuth"));
    env.redo(0);
    assert_eq!(env.doc.paragraph(0).size(), 6, "key inserted");
    assert_eq!(inset_kinds(&env, 0), [(0, InsetKind::Bibitem)], "key in front");
    assert_eq!(env.doc.paragraph(0).char_at(1), Some('K'), "text moved after the key");
    let rows = env.rows(0);
    assert_covers(rows, 6, "repaired entry");
    let id = env.doc.paragraph(0).inset_at(0);
    assert!(id.is_some(), "key at the front");
    assert_eq!(rows[0].elements()[0].inset(), id, "key displayed first");
}

#[test]
fn bibliography_key_moves_to_the_front() {
    let mut env = TestEnv::new(300);
    let id = env.doc.add_inset(Bibitem {
        label: "knuth".into(),
    });
    let layout = bibliography();
    let mut par = Paragraph::new(layout.clone());
    par.push_str("ab", layout.font);
    par.push_inset(id, layout.font);
    par.push_str("cd", layout.font);
    env.doc.push(par);

    env.redo(0);
    let par = env.doc.paragraph(0);
    assert_eq!(par.size(), 5, "nothing added");
    assert_eq!(par.inset_at(0), Some(id), "same key, in front");
    let text: String = (1..5).filter_map(|pos| par.char_at(pos)).collect();
    assert_eq!(text, "abcd", "text kept in order");
    let rows = env.rows(0);
    assert_covers(rows, 5, "moved key");
    assert_eq!(rows[0].elements()[0].inset(), Some(id), "key displayed first");

    // A valid entry is left alone.
    assert!(!env.doc.broken_biblio(0), "entry repaired");
    assert!(!env.doc.fix_biblio(0), "nothing left to repair");
    assert_eq!(env.doc.paragraph(0).inset_at(0), Some(id), "key still in front");
}

#[test]
fn extra_bibliography_keys_are_dropped() {
    let mut env = TestEnv::new(300);
    let first = env.doc.add_inset(Bibitem::default());
    let second = env.doc.add_inset(Bibitem::default());
    let layout = bibliography();
    let mut par = Paragraph::new(layout.clone());
    par.push_inset(first, layout.font);
    par.push_str("ab", layout.font);
    par.push_inset(second, layout.font);
    env.doc.push(par);

    env.redo(0);
    assert_eq!(env.doc.paragraph(0).size(), 3, "second key erased");
    assert_eq!(env.doc.paragraph(0).inset_at(0), Some(first), "first key kept");
    assert!(env.doc.inset(second).is_none(), "second key deleted");
    assert_covers(env.rows(0), 3, "entry with one key");
}

#[test]
fn bibliography_key_outside_bibliography_is_removed() {
    let mut env = TestEnv::new(300);
    let id = env.doc.add_inset(Bibitem::default());
    env.push_mixed(vec![Part::Text("ab"), Part::Inset(id), Part::Text("cd")]);

    env.redo(0);
    assert_eq!(env.doc.paragraph(0).size(), 4, "key erased");
    assert!(inset_kinds(&env, 0).is_empty(), "no inset left");
    assert!(env.doc.inset(id).is_none(), "key deleted");
    let rows = env.rows(0);
    assert_covers(rows, 4, "plain paragraph");
    assert!(
        rows.iter()
            .flat_map(|row| row.elements())
            .all(|e| e.inset().is_none()),
        "no key displayed"
    );
}
