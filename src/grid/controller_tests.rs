//! Tests for the reconciliation controller.

use super::*;
use crate::grid::headless::HeadlessHost;
use crate::grid::sort::SortKind;
use crate::model::Translate;
use serde_json::{json, Value};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type NumberGrid = ReconciliationController<u32, u32, HeadlessHost<u32>>;
type RecordGrid = ReconciliationController<Value, u64, HeadlessHost<Value>>;

fn number_grid(width: f64) -> NumberGrid {
    ReconciliationController::with_identity_keys(HeadlessHost::new(width), GridOptions::default())
}

fn record_grid() -> RecordGrid {
    ReconciliationController::new(
        HeadlessHost::new(1000.0),
        GridOptions::default(),
        |item: &Value| item["id"].as_u64().unwrap_or_default(),
    )
}

/// Formatted log output collected in memory.
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CapturedLog {
    fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_owned)
            .collect()
    }
}

fn frame_of(grid: &NumberGrid, key: u32) -> AnimationFrame {
    grid.registry()
        .get(&key)
        .map(|handle| handle.view().frame)
        .expect("key should own a view")
}

#[test]
fn first_apply_creates_views_and_waits_a_frame_before_animating() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();

    let ticket = grid.apply(vec![1, 2, 3]).unwrap();

    assert_eq!(grid.host().created, 3);
    assert_eq!(grid.keys(), vec![1, 2, 3]);
    assert_eq!(grid.phase(), PassPhase::LayingOut);
    assert!(!grid.is_complete(ticket));

    assert_eq!(grid.tick(t0).unwrap(), None);
    assert_eq!(grid.phase(), PassPhase::Animating);
    assert_eq!(frame_of(&grid, 2).opacity, 0.0);
    assert_eq!(frame_of(&grid, 2).translate, Translate::new(0.0, 100.0));

    assert_eq!(grid.tick(t0 + Duration::from_millis(500)).unwrap(), Some(ticket));
    assert!(grid.is_complete(ticket));
    assert_eq!(grid.phase(), PassPhase::Idle);
    assert_eq!(frame_of(&grid, 2), AnimationFrame::IDENTITY);
}

#[test]
fn applying_the_same_collection_twice_touches_nothing() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply(vec![1, 2, 3]).unwrap();
    grid.settle(t0).unwrap();
    let ops = grid.host().container_ops;

    let ticket = grid.apply(vec![1, 2, 3]).unwrap();

    assert_eq!(
        grid.tick(t0).unwrap(),
        Some(ticket),
        "nothing moved, so the pass should settle on its first frame"
    );
    assert_eq!(grid.host().created, 3);
    assert_eq!(grid.host().destroyed, 0);
    assert_eq!(grid.host().container_ops, ops);
}

#[test]
fn reversing_keeps_view_identity() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply(vec![1, 2, 3]).unwrap();
    grid.settle(t0).unwrap();
    let id_of_one = grid.registry().get(&1).unwrap().id();

    grid.reverse().unwrap();
    grid.settle(t0).unwrap();

    assert_eq!(grid.keys(), vec![3, 2, 1]);
    assert_eq!(grid.items(), &[3, 2, 1]);
    assert_eq!(grid.registry().get(&1).unwrap().id(), id_of_one);
    assert_eq!(grid.host().created, 3);

    let first = grid.registry().get(&3).unwrap();
    assert!(first.context().first);
    assert!(first.view().context.first);
    assert!(grid.registry().get(&1).unwrap().context().last);
}

#[test]
fn removal_destroys_the_view_and_flips_survivors() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply((1..=10).collect()).unwrap();
    grid.settle(t0).unwrap();

    grid.remove_keys(&[1]).unwrap();
    assert_eq!(grid.host().destroyed, 1);
    grid.tick(t0).unwrap();

    // 10 wrapped to the second row; it now fills the ninth column of the first row
    assert_eq!(frame_of(&grid, 10).translate, Translate::new(-880.0, 110.0));
    assert_eq!(frame_of(&grid, 2).translate, Translate::new(110.0, 0.0));
    assert!(grid.is_animating(grid.registry().get(&10).unwrap().id()));

    grid.tick(t0 + Duration::from_millis(200)).unwrap();
    assert_eq!(grid.phase(), PassPhase::Idle);
    assert_eq!(frame_of(&grid, 10), AnimationFrame::IDENTITY);
}

#[test]
fn added_views_enter_while_survivors_flip() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply(vec![1, 2]).unwrap();
    grid.settle(t0).unwrap();

    grid.unshift([0]).unwrap();
    grid.tick(t0).unwrap();

    assert_eq!(grid.keys(), vec![0, 1, 2]);
    assert_eq!(frame_of(&grid, 0).opacity, 0.0);
    assert_eq!(frame_of(&grid, 1).translate, Translate::new(-110.0, 0.0));
    assert_eq!(grid.last_summary().map(|s| (s.added, s.relocated)), Some((1, 2)));
}

#[test]
fn requests_during_a_pass_are_coalesced_into_one_follow_up() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    let first = grid.apply(vec![1, 2, 3]).unwrap();

    let second = grid.push([4]).unwrap();
    let third = grid.push([5]).unwrap();

    assert!(second > first);
    assert_eq!(second, third, "queued requests share the follow-up pass");
    assert_eq!(grid.data().len(), 5);
    assert_eq!(grid.len(), 3, "ordered collection lags until the follow-up runs");
    assert!(grid.is_busy());

    grid.settle(t0).unwrap();

    assert!(grid.is_complete(first));
    assert!(grid.is_complete(third));
    assert_eq!(grid.keys(), vec![1, 2, 3, 4, 5]);
    let summary = grid.last_summary().unwrap();
    assert_eq!((summary.ticket, summary.added), (second, 2));
}

#[test]
fn queued_pass_starts_on_the_tick_that_completes_the_current_one() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    let first = grid.apply(vec![1]).unwrap();
    let second = grid.push([2]).unwrap();

    grid.tick(t0).unwrap();
    let done = grid.tick(t0 + Duration::from_millis(500)).unwrap();

    assert_eq!(done, Some(first));
    assert_eq!(grid.phase(), PassPhase::LayingOut);
    assert!(!grid.is_complete(second));
    assert_eq!(grid.keys(), vec![1, 2]);
}

#[test]
fn duplicate_keys_abort_before_any_mutation() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply(vec![1, 2, 3]).unwrap();
    grid.settle(t0).unwrap();

    let err = grid.apply(vec![3, 3]).unwrap_err();

    assert!(matches!(
        err,
        GridError::DuplicateKey {
            first_index: 0,
            second_index: 1,
            ..
        }
    ));
    assert_eq!(grid.keys(), vec![1, 2, 3]);
    assert_eq!(grid.host().destroyed, 0);
    assert_eq!(grid.phase(), PassPhase::Idle);
    assert_eq!(grid.data(), &[1, 2, 3]);
    assert!(grid.last_failure().is_none(), "a rejected source never reaches a pass");
}

#[test]
fn invalid_geometry_aborts_before_any_mutation() {
    let mut grid = number_grid(0.0);

    let err = grid.apply(vec![1, 2]).unwrap_err();

    assert!(matches!(err, GridError::InvalidGeometryInput { .. }));
    assert!(err.is_pre_mutation());
    assert_eq!(grid.host().created, 0);
    assert!(grid.geometry().is_none());
}

#[test]
fn pop_and_shift_take_from_the_source_ends() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply(vec![1, 2, 3]).unwrap();
    grid.settle(t0).unwrap();

    assert_eq!(grid.pop().unwrap(), Some(3));
    assert_eq!(grid.shift().unwrap(), Some(1));
    grid.settle(t0).unwrap();
    assert_eq!(grid.keys(), vec![2]);
    assert_eq!(grid.data(), &[2]);

    grid.clear().unwrap();
    grid.settle(t0).unwrap();
    assert_eq!(grid.pop().unwrap(), None);
    assert!(!grid.is_busy(), "popping an empty grid runs no pass");
    assert_eq!(grid.host().destroyed, 3);
}

#[test]
fn pop_and_shift_ignore_the_active_sort() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply(vec![2, 3, 1]).unwrap();
    grid.set_sort_fn(|a, b| a.cmp(b)).unwrap();
    grid.settle(t0).unwrap();
    assert_eq!(grid.items(), &[1, 2, 3]);

    assert_eq!(grid.pop().unwrap(), Some(1));
    assert_eq!(grid.shift().unwrap(), Some(2));
    grid.settle(t0).unwrap();
    assert_eq!(grid.keys(), vec![3]);
}

#[test]
fn rejected_push_keeps_the_source_and_later_updates_succeed() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply(vec![1, 2]).unwrap();
    grid.settle(t0).unwrap();

    let err = grid.push([1]).unwrap_err();
    assert_eq!(err, GridError::duplicate_key(&1, 0, 2));
    let err = grid.unshift([2]).unwrap_err();
    assert_eq!(err, GridError::duplicate_key(&2, 0, 2));
    assert_eq!(grid.data(), &[1, 2]);
    assert!(!grid.is_busy());

    grid.reverse().unwrap();
    grid.settle(t0).unwrap();
    assert_eq!(grid.keys(), vec![2, 1]);
}

#[test]
fn duplicate_source_is_rejected_while_a_pass_is_in_flight() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply(vec![1]).unwrap();
    assert!(grid.is_busy());

    assert!(grid.push([1]).is_err());
    grid.settle(t0).unwrap();
    assert_eq!(grid.keys(), vec![1]);
    assert_eq!(grid.last_summary().map(|s| s.total), Some(1));
}

#[test]
fn released_views_stop_animating_before_they_are_destroyed() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply(vec![1, 2, 3]).unwrap();
    grid.settle(t0).unwrap();
    let id = grid.registry().get(&2).unwrap().id();
    grid.animator.enter(id, 100.0, t0);

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, || grid.remove_keys(&[2]).unwrap());

    assert!(!grid.is_animating(id));
    assert_eq!(grid.host().destroyed, 1);
    let lines = log.lines();
    let cancelled = lines
        .iter()
        .position(|line| line.contains("cancelled animation of released view"))
        .expect("cancellation is logged");
    let released = lines
        .iter()
        .position(|line| line.contains("released view key=2"))
        .expect("release is logged");
    assert!(cancelled < released, "{lines:#?}");
}

#[test]
fn filter_hides_items_without_touching_the_source() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply((1..=6).collect()).unwrap();
    grid.settle(t0).unwrap();

    grid.set_filter_fn(|n| n % 2 == 0).unwrap();
    grid.settle(t0).unwrap();
    assert_eq!(grid.keys(), vec![2, 4, 6]);
    assert_eq!(grid.data().len(), 6);
    assert!(grid.registry().get(&6).unwrap().context().last);

    grid.clear_filter().unwrap();
    grid.settle(t0).unwrap();
    assert_eq!(grid.keys(), (1..=6).collect::<Vec<_>>());
    assert!(!grid.is_filtered());
}

#[test]
fn reversal_survives_filter_changes() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply(vec![1, 2, 3, 4]).unwrap();
    grid.reverse().unwrap();
    grid.set_filter_fn(|n| *n > 1).unwrap();
    grid.settle(t0).unwrap();

    assert!(grid.is_reversed());
    assert_eq!(grid.keys(), vec![4, 3, 2]);
}

#[test]
fn sort_by_same_field_twice_reverses() {
    let mut grid = record_grid();
    let t0 = Instant::now();
    grid.apply(vec![
        json!({"id": 1, "name": "carbon", "weight": 12.011}),
        json!({"id": 2, "name": "argon", "weight": 39.95}),
        json!({"id": 3, "name": "boron", "weight": 10.81}),
    ])
    .unwrap();
    grid.settle(t0).unwrap();

    grid.sort_by(SortSpec::new("name", SortKind::String)).unwrap();
    grid.settle(t0).unwrap();
    assert_eq!(grid.keys(), vec![2, 3, 1]);

    grid.sort_by(SortSpec::new("name", SortKind::String)).unwrap();
    grid.settle(t0).unwrap();
    assert_eq!(grid.keys(), vec![1, 3, 2]);
    assert!(grid.is_reversed());

    grid.sort_by(SortSpec::new("weight", SortKind::Number)).unwrap();
    grid.settle(t0).unwrap();
    assert_eq!(grid.keys(), vec![3, 1, 2]);
    assert!(!grid.is_reversed());
    assert_eq!(grid.host().created, 3);
}

#[test]
fn unshift_and_remove_by_item() {
    let mut grid = record_grid();
    let t0 = Instant::now();
    grid.apply(vec![json!({"id": 3})]).unwrap();
    grid.unshift([json!({"id": 1}), json!({"id": 2})]).unwrap();
    grid.unshift_range(vec![json!({"id": 0})]).unwrap();
    grid.settle(t0).unwrap();
    assert_eq!(grid.keys(), vec![0, 1, 2, 3]);

    grid.remove(&[json!({"id": 2, "name": "ignored"})]).unwrap();
    grid.settle(t0).unwrap();
    assert_eq!(grid.keys(), vec![0, 1, 3]);
}

#[test]
fn resize_relayout_flips_into_new_columns() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply(vec![1, 2, 3]).unwrap();
    grid.settle(t0).unwrap();

    grid.host_mut().set_width(230.0);
    grid.relayout().unwrap();
    grid.tick(t0).unwrap();

    assert_eq!(grid.geometry().map(|g| g.column_count), Some(2));
    assert_eq!(frame_of(&grid, 3).translate, Translate::new(220.0, -110.0));
    assert_eq!(grid.host().created, 3);
}

#[test]
fn dispose_tears_down_every_view() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.apply(vec![1, 2, 3]).unwrap();
    grid.tick(t0).unwrap();
    assert_eq!(grid.phase(), PassPhase::Animating);

    grid.dispose();

    assert_eq!(grid.host().destroyed, 3);
    assert!(grid.registry().is_empty());
    assert!(grid.host().is_empty());
    assert_eq!(grid.phase(), PassPhase::Idle);
    assert_eq!(grid.data().len(), 3);

    grid.relayout().unwrap();
    grid.settle(t0).unwrap();
    assert_eq!(grid.keys(), vec![1, 2, 3]);
    assert_eq!(grid.host().created, 6);
}

#[test]
fn justify_gap_spreads_columns() {
    let mut grid = number_grid(1000.0);
    let t0 = Instant::now();
    grid.set_options(GridOptions {
        x_gap: GapSpec::Justify,
        ..GridOptions::default()
    })
    .unwrap();
    grid.apply((1..=12).collect()).unwrap();
    grid.settle(t0).unwrap();

    let geometry = grid.geometry().copied().unwrap();
    assert_eq!(geometry.column_count, 10);
    assert_eq!(geometry.column_gap_px, 0.0);
}
