//! Acceptance tests for the reconciliation pipeline
//!
//! Drives the public controller API against the in-memory host, checking the
//! behaviour a host application relies on: identity across passes, sort toggling,
//! FLIP deltas, pass serialization and fail-fast errors.

use fluent_grid::grid::{
    compute_geometry, AnimationFrame, GapSpec, GridOptions, HeadlessHost, JustifyMode,
    LayoutInput, PassPhase, ReconciliationController, SortKind, SortSpec, ViewRegistry,
};
use fluent_grid::model::{GridError, Translate};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

type Letters = ReconciliationController<char, char, HeadlessHost<char>>;
type Records = ReconciliationController<Value, String, HeadlessHost<Value>>;

fn letters(width: f64) -> Letters {
    ReconciliationController::with_identity_keys(HeadlessHost::new(width), GridOptions::default())
}

fn records() -> Records {
    ReconciliationController::new(
        HeadlessHost::new(1000.0),
        GridOptions::default(),
        |item: &Value| item["name"].as_str().unwrap_or_default().to_string(),
    )
}

fn names(grid: &Records) -> Vec<String> {
    grid.items()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect()
}

fn frame(grid: &Letters, key: char) -> AnimationFrame {
    grid.registry().get(&key).unwrap().view().frame
}

// ===== Round trips and idempotence =====

#[test]
fn push_then_pop_twice_restores_collection_and_keys() {
    let mut grid = letters(1000.0);
    let now = Instant::now();
    grid.apply(vec!['x', 'y']).unwrap();
    grid.settle(now).unwrap();

    grid.push(['a', 'b']).unwrap();
    grid.settle(now).unwrap();
    assert_eq!(grid.pop().unwrap(), Some('b'));
    grid.settle(now).unwrap();
    assert_eq!(grid.pop().unwrap(), Some('a'));
    grid.settle(now).unwrap();

    assert_eq!(grid.items(), &['x', 'y']);
    assert_eq!(grid.keys(), vec!['x', 'y']);
    assert_eq!(grid.host().created - grid.host().destroyed, 2);
}

#[test]
fn push_then_pop_twice_round_trips_under_reversal() {
    let mut grid = letters(1000.0);
    let now = Instant::now();
    grid.apply(vec!['x', 'y']).unwrap();
    grid.reverse().unwrap();
    grid.settle(now).unwrap();
    assert_eq!(grid.items(), &['y', 'x']);

    grid.push(['a', 'b']).unwrap();
    grid.settle(now).unwrap();
    assert_eq!(grid.items(), &['b', 'a', 'y', 'x']);
    assert_eq!(grid.pop().unwrap(), Some('b'));
    assert_eq!(grid.pop().unwrap(), Some('a'));
    grid.settle(now).unwrap();

    assert_eq!(grid.items(), &['y', 'x']);
    assert_eq!(grid.keys(), vec!['y', 'x']);
    assert!(grid.is_reversed());
}

#[test]
fn push_then_pop_twice_round_trips_under_a_field_sort() {
    let mut grid = records();
    let now = Instant::now();
    grid.apply(vec![json!({ "name": "m" }), json!({ "name": "z" })])
        .unwrap();
    grid.sort_by(SortSpec::new("name", SortKind::String)).unwrap();
    grid.settle(now).unwrap();

    grid.push([json!({ "name": "a" }), json!({ "name": "b" })])
        .unwrap();
    grid.settle(now).unwrap();
    assert_eq!(names(&grid), ["a", "b", "m", "z"]);
    assert_eq!(grid.pop().unwrap(), Some(json!({ "name": "b" })));
    assert_eq!(grid.pop().unwrap(), Some(json!({ "name": "a" })));
    grid.settle(now).unwrap();

    assert_eq!(names(&grid), ["m", "z"]);
    assert_eq!(grid.keys(), vec!["m".to_string(), "z".to_string()]);
}

#[test]
fn second_identical_apply_has_no_animation_delta() {
    let mut grid = letters(1000.0);
    let now = Instant::now();
    grid.apply(vec!['a', 'b', 'c']).unwrap();
    grid.settle(now).unwrap();

    let summary_before = grid.last_summary().copied();
    grid.apply(vec!['a', 'b', 'c']).unwrap();
    grid.tick(now).unwrap();

    for key in ['a', 'b', 'c'] {
        let id = grid.registry().get(&key).unwrap().id();
        assert!(!grid.is_animating(id), "{key} did not move");
        assert_eq!(frame(&grid, key), AnimationFrame::IDENTITY);
    }
    let summary = grid.last_summary().unwrap();
    assert_ne!(Some(summary.ticket), summary_before.map(|s| s.ticket));
    assert_eq!((summary.added, summary.removed, summary.relocated), (0, 0, 0));
}

// ===== Sorting =====

#[test]
fn sorting_by_the_same_field_twice_reverses_the_first_sort() {
    let mut grid = records();
    let now = Instant::now();
    grid.apply(vec![
        json!({ "name": "neon" }),
        json!({ "name": "Argon" }),
        json!({ "name": "helium" }),
        json!({ "name": "Krypton" }),
    ])
    .unwrap();

    grid.sort_by(SortSpec::new("name", SortKind::String)).unwrap();
    grid.settle(now).unwrap();
    let ascending = names(&grid);
    assert_eq!(ascending, ["Argon", "helium", "Krypton", "neon"]);

    grid.sort_by(SortSpec::new("name", SortKind::String)).unwrap();
    grid.settle(now).unwrap();
    let mut expected = ascending.clone();
    expected.reverse();
    assert_eq!(names(&grid), expected);
    assert_eq!(grid.host().created, 4, "sorting never recreates views");
}

#[test]
fn date_sort_puts_unparseable_values_last() {
    let mut grid = records();
    grid.apply(vec![
        json!({ "name": "Carbon" }),
        json!({ "name": "Oxygen", "discovered": "1774-08-01" }),
        json!({ "name": "Hydrogen", "discovered": "1766-05-01" }),
    ])
    .unwrap();
    grid.sort_by(SortSpec::new("discovered", SortKind::Date)).unwrap();
    grid.settle(Instant::now()).unwrap();
    assert_eq!(names(&grid), ["Hydrogen", "Oxygen", "Carbon"]);
}

// ===== Geometry =====

#[test]
fn fixed_gap_geometry_fits_nine_columns_in_1000px() {
    let geometry = compute_geometry(&LayoutInput {
        container_width_px: 1000.0,
        item_width_px: 100.0,
        item_height_px: 100.0,
        x_gap: GapSpec::Fixed(10.0),
        y_gap_px: 10.0,
        justify: JustifyMode::None,
    })
    .unwrap();
    assert_eq!(geometry.column_count, 9);
    assert_eq!(geometry.column_gap_px, 10.0);
}

#[test]
fn justify_geometry_fills_1000px_with_ten_columns_and_no_gap() {
    let geometry = compute_geometry(&LayoutInput {
        container_width_px: 1000.0,
        item_width_px: 100.0,
        item_height_px: 100.0,
        x_gap: GapSpec::Justify,
        y_gap_px: 10.0,
        justify: JustifyMode::None,
    })
    .unwrap();
    assert_eq!(geometry.column_count, 10);
    assert_eq!(geometry.column_gap_px, 0.0);
    assert_eq!(geometry.occupied_width(), 1000.0);
}

// ===== FLIP =====

#[test]
fn view_moving_two_rows_down_starts_inverted_by_220px() {
    // 100px container: one column, 110px row pitch
    let mut grid = letters(100.0);
    let t0 = Instant::now();
    grid.apply(vec!['a', 'b', 'c']).unwrap();
    grid.settle(t0).unwrap();

    grid.reverse().unwrap();
    assert_eq!(grid.phase(), PassPhase::LayingOut);
    grid.tick(t0).unwrap();

    assert_eq!(frame(&grid, 'a').translate, Translate::new(0.0, -220.0));
    assert_eq!(frame(&grid, 'c').translate, Translate::new(0.0, 220.0));
    assert_eq!(frame(&grid, 'b'), AnimationFrame::IDENTITY);

    let halfway = t0 + Duration::from_millis(100);
    grid.tick(halfway).unwrap();
    let dy = frame(&grid, 'a').translate.dy;
    assert!(dy > -220.0 && dy < 0.0, "mid-flight translate {dy}");

    grid.tick(t0 + Duration::from_millis(200)).unwrap();
    assert_eq!(frame(&grid, 'a'), AnimationFrame::IDENTITY);
    assert_eq!(grid.phase(), PassPhase::Idle);
}

// ===== Scheduling =====

#[test]
fn updates_during_a_pass_wait_for_it_to_settle() {
    let mut grid = letters(1000.0);
    let t0 = Instant::now();
    let first = grid.apply(vec!['a', 'b']).unwrap();

    let second = grid.push(['c']).unwrap();
    let third = grid.unshift(['z']).unwrap();
    assert_eq!(second, third, "queued requests share one follow-up pass");
    assert_eq!(grid.keys(), vec!['a', 'b'], "no diff against a pass in flight");

    grid.tick(t0).unwrap();
    assert_eq!(grid.tick(t0 + Duration::from_millis(500)).unwrap(), Some(first));
    assert_eq!(grid.keys(), vec!['z', 'a', 'b', 'c']);

    grid.settle(t0 + Duration::from_millis(500)).unwrap();
    assert!(grid.is_complete(third));
}

#[test]
fn dispose_mid_animation_leaves_nothing_running() {
    let mut grid = letters(1000.0);
    let t0 = Instant::now();
    grid.apply(vec!['a', 'b', 'c']).unwrap();
    grid.tick(t0).unwrap();
    let id = grid.registry().get(&'b').unwrap().id();
    assert!(grid.is_animating(id));

    grid.dispose();

    assert!(!grid.is_animating(id));
    assert_eq!(grid.host().destroyed, 3);
    assert_eq!(grid.phase(), PassPhase::Idle);
    assert!(grid.registry().is_empty());
}

// ===== Errors =====

#[test]
fn releasing_an_unregistered_key_is_an_error() {
    let mut host: HeadlessHost<u8> = HeadlessHost::new(500.0);
    let mut registry = ViewRegistry::new();
    registry.acquire(&mut host, 1u8, &1, 0, 1).unwrap();

    let err = registry.release(&mut host, &7).unwrap_err();
    assert_eq!(err, GridError::UnknownKey { key: "7".to_string() });
    assert_eq!(host.destroyed, 0);
}

#[test]
fn duplicate_keys_abort_the_pass_with_zero_mutations() {
    let mut grid = letters(1000.0);
    let now = Instant::now();
    grid.apply(vec!['a', 'b']).unwrap();
    grid.settle(now).unwrap();
    let ops = grid.host().container_ops;

    let err = grid.apply(vec!['c', 'a', 'c']).unwrap_err();

    assert!(matches!(
        err,
        GridError::DuplicateKey {
            first_index: 0,
            second_index: 2,
            ..
        }
    ));
    assert_eq!(grid.host().container_ops, ops);
    assert_eq!(grid.host().created, 2);
    assert_eq!(grid.keys(), vec!['a', 'b']);
    assert_eq!(grid.phase(), PassPhase::Idle);

    // the next valid update recovers from the source of truth
    grid.apply(vec!['b', 'c']).unwrap();
    grid.settle(now).unwrap();
    assert_eq!(grid.keys(), vec!['b', 'c']);
}

#[test]
fn pushing_a_present_key_leaves_the_source_intact() {
    let mut grid = letters(1000.0);
    let now = Instant::now();
    grid.apply(vec!['a', 'b']).unwrap();
    grid.settle(now).unwrap();

    let err = grid.push(['a']).unwrap_err();

    assert_eq!(err, GridError::duplicate_key(&'a', 0, 2));
    assert_eq!(grid.data(), &['a', 'b']);
    assert_eq!(grid.items(), &['a', 'b']);
    grid.reverse().unwrap();
    grid.settle(now).unwrap();
    assert_eq!(grid.keys(), vec!['b', 'a']);
}
