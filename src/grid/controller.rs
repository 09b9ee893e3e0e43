//! Reconciliation controller: the pass state machine driving the grid.
//!
//! A pass runs `Idle → Diffing → Mutating → LayingOut → Animating → Idle`:
//!
//! 1. **Diffing** derives the ordered collection from the source (filter, stable sort,
//!    optional reversal), diffs its keys against the container order and computes the
//!    grid geometry. Failures here abort before anything is touched.
//! 2. **Mutating** releases removed views, acquires added ones, walks the new order to
//!    reposition children and refreshes positional metadata of survivors.
//! 3. **LayingOut** hands the geometry to the host and waits for the next frame so the
//!    host can lay views out before they are measured.
//! 4. **Animating** measures every live view, starts FLIP and entrance animations and
//!    advances them on each [`tick`](ReconciliationController::tick) until all settle.
//!
//! Requests made while a pass is in flight are serialized: they update the source
//! immediately and a single follow-up pass runs once the current one settles.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::grid::diff::{diff, ensure_unique_keys, DiffResult};
use crate::grid::flip::{AnimationFrame, AnimationTimings, FlipAnimator, FlipStart};
use crate::grid::layout::{compute_geometry, GapSpec, GridGeometry, JustifyMode, LayoutInput};
use crate::grid::registry::{
    GeometrySink, GridView, ViewContainer, ViewFactory, ViewHandle, ViewId, ViewRegistry,
};
use crate::grid::sort::{Comparator, FieldAccess, SortSpec};
use crate::model::{BoundingBox, GridError};

/// Item predicate used as the filter.
pub type Predicate<T> = Box<dyn Fn(&T) -> bool>;

/// Extracts the identity key of an item.
pub type KeySelector<T, K> = Box<dyn Fn(&T) -> K>;

/// Grid configuration consumed by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOptions {
    /// Width of every item.
    pub item_width_px: f64,
    /// Height of every item; also the entrance slide distance.
    pub item_height_px: f64,
    /// Horizontal gap policy.
    pub x_gap: GapSpec,
    /// Vertical gap.
    pub y_gap_px: f64,
    /// Free space distribution.
    pub justify: JustifyMode,
    /// Animation durations.
    pub timings: AnimationTimings,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            item_width_px: 100.0,
            item_height_px: 100.0,
            x_gap: GapSpec::Fixed(10.0),
            y_gap_px: 10.0,
            justify: JustifyMode::None,
            timings: AnimationTimings::default(),
        }
    }
}

/// Where the controller is in its pass cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassPhase {
    /// No pass in flight.
    #[default]
    Idle,
    /// Deriving the new order and diffing it.
    Diffing,
    /// Applying removals, additions and moves.
    Mutating,
    /// Geometry applied; waiting one frame before measuring.
    LayingOut,
    /// Animations running.
    Animating,
}

/// Completion signal for a requested update.
///
/// Every request returns the ticket of the pass that will reflect it; requests made while
/// a pass is busy share the ticket of the follow-up pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassTicket(u64);

impl PassTicket {
    /// Sequence number of the pass.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// What the most recent successful pass changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassSummary {
    /// The pass.
    pub ticket: PassTicket,
    /// Views created.
    pub added: usize,
    /// Views destroyed.
    pub removed: usize,
    /// Surviving views whose index changed.
    pub relocated: usize,
    /// Collection length after the pass.
    pub total: usize,
    /// Geometry applied by the pass.
    pub geometry: GridGeometry,
}

#[derive(Debug)]
struct InFlightPass {
    ticket: PassTicket,
    from_boxes: HashMap<ViewId, BoundingBox>,
    entered: HashSet<ViewId>,
}

/// Orchestrates diffing, view mutation, layout and animation for one grid.
pub struct ReconciliationController<T, K, H>
where
    H: ViewFactory<Item = T>,
{
    host: H,
    registry: ViewRegistry<K, H::View>,
    animator: FlipAnimator,
    options: GridOptions,
    key_selector: KeySelector<T, K>,
    data: Vec<T>,
    items: Vec<T>,
    filter: Option<Predicate<T>>,
    sort: Option<Comparator<T>>,
    sort_spec: Option<SortSpec>,
    reversed: bool,
    phase: PassPhase,
    pending: bool,
    next_ticket: u64,
    completed_through: u64,
    in_flight: Option<InFlightPass>,
    geometry: Option<GridGeometry>,
    last_summary: Option<PassSummary>,
    last_failure: Option<(PassTicket, GridError)>,
}

impl<T, K, H> ReconciliationController<T, K, H>
where
    T: Clone,
    K: Clone + Eq + Hash + Debug,
    H: ViewFactory<Item = T> + ViewContainer + GeometrySink,
{
    /// Controller over `host` with an explicit key selector. No pass runs until the first
    /// update.
    pub fn new(host: H, options: GridOptions, key_selector: impl Fn(&T) -> K + 'static) -> Self {
        Self {
            host,
            registry: ViewRegistry::new(),
            animator: FlipAnimator::new(options.timings),
            options,
            key_selector: Box::new(key_selector),
            data: Vec::new(),
            items: Vec::new(),
            filter: None,
            sort: None,
            sort_spec: None,
            reversed: false,
            phase: PassPhase::Idle,
            pending: false,
            next_ticket: 1,
            completed_through: 0,
            in_flight: None,
            geometry: None,
            last_summary: None,
            last_failure: None,
        }
    }

    // ===== Accessors =====

    /// The ordered collection as of the last successful pass.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// The authoritative source collection.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Length of the ordered collection.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the ordered collection is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Current pass phase.
    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    /// A pass is in flight or queued.
    pub fn is_busy(&self) -> bool {
        self.phase != PassPhase::Idle || self.pending
    }

    /// Whether the pass identified by `ticket` has finished (successfully or not).
    pub fn is_complete(&self, ticket: PassTicket) -> bool {
        ticket.0 <= self.completed_through
    }

    /// Geometry applied by the last pass.
    pub fn geometry(&self) -> Option<&GridGeometry> {
        self.geometry.as_ref()
    }

    /// Summary of the last pass that reached the layout phase.
    pub fn last_summary(&self) -> Option<&PassSummary> {
        self.last_summary.as_ref()
    }

    /// Most recent failed pass and its error.
    pub fn last_failure(&self) -> Option<&(PassTicket, GridError)> {
        self.last_failure.as_ref()
    }

    /// Active `sort_by` request, if the comparator came from one.
    pub fn sort_spec(&self) -> Option<&SortSpec> {
        self.sort_spec.as_ref()
    }

    /// Whether the derived order is reversed.
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Whether a filter is active.
    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }

    /// Current options.
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably. Container order must only be changed through the controller.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The view registry.
    pub fn registry(&self) -> &ViewRegistry<K, H::View> {
        &self.registry
    }

    /// Live views in container order.
    pub fn views(&self) -> impl Iterator<Item = &ViewHandle<H::View>> + '_ {
        self.registry.ordered_handles(&self.host)
    }

    /// Keys in container order.
    pub fn keys(&self) -> Vec<K> {
        self.registry.ordered_keys(&self.host)
    }

    /// Key of `item` under this controller's selector.
    pub fn key_of(&self, item: &T) -> K {
        (self.key_selector)(item)
    }

    /// Whether the view `id` has a running animation.
    pub fn is_animating(&self, id: ViewId) -> bool {
        self.animator.is_animating(id)
    }

    // ===== Source updates =====

    /// Replace the source collection wholesale and reconcile.
    ///
    /// # Errors
    ///
    /// [`GridError::DuplicateKey`] when `source` repeats a key; the previous source is kept
    /// and no pass runs. Otherwise any [`GridError`] raised by an immediately started pass.
    pub fn apply(&mut self, source: Vec<T>) -> Result<PassTicket, GridError> {
        self.commit_source(source)?;
        self.request_pass()
    }

    /// Replace source, filter and sort together and reconcile once.
    ///
    /// `None` resets the filter to accept-all and the sort to source order. A source with a
    /// repeated key leaves source, filter and sort untouched.
    ///
    /// # Errors
    ///
    /// [`GridError::DuplicateKey`] for a repeated key, or any [`GridError`] raised by an
    /// immediately started pass.
    pub fn apply_with(
        &mut self,
        source: Vec<T>,
        filter: Option<Predicate<T>>,
        sort: Option<Comparator<T>>,
    ) -> Result<PassTicket, GridError> {
        self.commit_source(source)?;
        self.filter = filter;
        self.sort = sort;
        self.sort_spec = None;
        self.reversed = false;
        self.request_pass()
    }

    /// Set the filter predicate and reconcile.
    ///
    /// # Errors
    ///
    /// Any [`GridError`] raised by an immediately started pass.
    pub fn set_filter_fn(
        &mut self,
        filter: impl Fn(&T) -> bool + 'static,
    ) -> Result<PassTicket, GridError> {
        self.filter = Some(Box::new(filter));
        self.request_pass()
    }

    /// Remove the filter and reconcile.
    ///
    /// # Errors
    ///
    /// Any [`GridError`] raised by an immediately started pass.
    pub fn clear_filter(&mut self) -> Result<PassTicket, GridError> {
        self.filter = None;
        self.request_pass()
    }

    /// Set an explicit comparator and reconcile. Clears any reversal.
    ///
    /// # Errors
    ///
    /// Any [`GridError`] raised by an immediately started pass.
    pub fn set_sort_fn(
        &mut self,
        compare: impl Fn(&T, &T) -> Ordering + 'static,
    ) -> Result<PassTicket, GridError> {
        self.sort = Some(Box::new(compare));
        self.sort_spec = None;
        self.reversed = false;
        self.request_pass()
    }

    /// Reverse the current order and reconcile.
    ///
    /// # Errors
    ///
    /// Any [`GridError`] raised by an immediately started pass.
    pub fn reverse(&mut self) -> Result<PassTicket, GridError> {
        self.reversed = !self.reversed;
        self.request_pass()
    }

    /// Append items to the source and reconcile.
    ///
    /// # Errors
    ///
    /// [`GridError::DuplicateKey`] when an item's key is already present; nothing is
    /// appended. Otherwise any [`GridError`] raised by an immediately started pass.
    pub fn push(&mut self, items: impl IntoIterator<Item = T>) -> Result<PassTicket, GridError> {
        let mut source = self.data.clone();
        source.extend(items);
        self.commit_source(source)?;
        self.request_pass()
    }

    /// Prepend items to the source, keeping their relative order, and reconcile.
    ///
    /// # Errors
    ///
    /// [`GridError::DuplicateKey`] when an item's key is already present; nothing is
    /// prepended. Otherwise any [`GridError`] raised by an immediately started pass.
    pub fn unshift(&mut self, items: impl IntoIterator<Item = T>) -> Result<PassTicket, GridError> {
        let mut source: Vec<T> = items.into_iter().collect();
        source.extend(self.data.iter().cloned());
        self.commit_source(source)?;
        self.request_pass()
    }

    /// Prepend a batch of items to the source and reconcile.
    ///
    /// # Errors
    ///
    /// Any [`GridError`] raised by an immediately started pass.
    pub fn unshift_range(&mut self, items: Vec<T>) -> Result<PassTicket, GridError> {
        self.unshift(items)
    }

    /// Remove the last item of the source and reconcile.
    ///
    /// Takes from the same end [`push`](Self::push) appends to, whatever the active sort,
    /// filter or reversal. Returns `None` (and runs no pass) when the source is empty.
    ///
    /// # Errors
    ///
    /// Any [`GridError`] raised by an immediately started pass.
    pub fn pop(&mut self) -> Result<Option<T>, GridError> {
        let Some(item) = self.data.pop() else {
            return Ok(None);
        };
        self.request_pass()?;
        Ok(Some(item))
    }

    /// Remove the first item of the source and reconcile.
    ///
    /// Takes from the same end [`unshift`](Self::unshift) prepends to.
    ///
    /// # Errors
    ///
    /// Any [`GridError`] raised by an immediately started pass.
    pub fn shift(&mut self) -> Result<Option<T>, GridError> {
        if self.data.is_empty() {
            return Ok(None);
        }
        let item = self.data.remove(0);
        self.request_pass()?;
        Ok(Some(item))
    }

    /// Remove every source item whose key matches one of `items` and reconcile.
    ///
    /// # Errors
    ///
    /// Any [`GridError`] raised by an immediately started pass.
    pub fn remove(&mut self, items: &[T]) -> Result<PassTicket, GridError> {
        let keys: Vec<K> = items.iter().map(|item| (self.key_selector)(item)).collect();
        self.remove_keys(&keys)
    }

    /// Remove every source item whose key is in `keys` and reconcile.
    ///
    /// # Errors
    ///
    /// Any [`GridError`] raised by an immediately started pass.
    pub fn remove_keys(&mut self, keys: &[K]) -> Result<PassTicket, GridError> {
        let doomed: HashSet<&K> = keys.iter().collect();
        let selector = &self.key_selector;
        self.data.retain(|item| !doomed.contains(&selector(item)));
        self.request_pass()
    }

    /// Empty the source and reconcile.
    ///
    /// # Errors
    ///
    /// Any [`GridError`] raised by an immediately started pass.
    pub fn clear(&mut self) -> Result<PassTicket, GridError> {
        self.data.clear();
        self.request_pass()
    }

    /// Replace the options and reconcile so the new geometry is applied.
    ///
    /// # Errors
    ///
    /// Any [`GridError`] raised by an immediately started pass.
    pub fn set_options(&mut self, options: GridOptions) -> Result<PassTicket, GridError> {
        self.options = options;
        self.request_pass()
    }

    /// Reconcile without changing the source, e.g. after the container was resized.
    ///
    /// # Errors
    ///
    /// Any [`GridError`] raised by an immediately started pass.
    pub fn relayout(&mut self) -> Result<PassTicket, GridError> {
        self.request_pass()
    }

    // ===== Frame driving =====

    /// Advance the in-flight pass to `now`.
    ///
    /// Moves `LayingOut` to `Animating` by measuring every view, advances running
    /// animations, completes the pass once they all settled and then starts a queued pass.
    /// Returns the ticket of a pass that completed during this tick.
    ///
    /// # Errors
    ///
    /// Failure of a queued pass started by this tick.
    pub fn tick(&mut self, now: Instant) -> Result<Option<PassTicket>, GridError> {
        let mut completed = None;
        match self.phase {
            PassPhase::LayingOut => self.begin_animations(now),
            PassPhase::Animating => self.advance_animations(now),
            _ => {}
        }
        if self.phase == PassPhase::Animating && self.animator.is_idle() {
            completed = self.complete_pass();
        }
        if self.phase == PassPhase::Idle && self.pending {
            self.start_queued_pass()?;
        }
        Ok(completed)
    }

    /// Drive the in-flight pass and any queued pass to completion immediately, finishing
    /// animations at their final frame.
    ///
    /// # Errors
    ///
    /// Failure of a queued pass.
    pub fn settle(&mut self, now: Instant) -> Result<(), GridError> {
        loop {
            match self.phase {
                PassPhase::LayingOut => self.begin_animations(now),
                PassPhase::Animating => {
                    for id in self.animator.finish_all() {
                        if let Some(handle) = self.registry.get_by_id_mut(id) {
                            handle.view_mut().apply_frame(&AnimationFrame::IDENTITY);
                        }
                    }
                    self.complete_pass();
                }
                PassPhase::Idle if self.pending => self.start_queued_pass()?,
                _ => return Ok(()),
            }
        }
    }

    /// Tear down every view, cancelling animations first. The source is kept; the next
    /// update recreates views from it.
    pub fn dispose(&mut self) {
        let cancelled = self.animator.finish_all();
        if !cancelled.is_empty() {
            debug!(count = cancelled.len(), "cancelled animations on dispose");
        }
        for key in self.registry.ordered_keys(&self.host) {
            if let Err(err) = self.registry.release(&mut self.host, &key) {
                warn!(error = %err, "failed to release view on dispose");
            }
        }
        self.items.clear();
        self.in_flight = None;
        self.pending = false;
        self.phase = PassPhase::Idle;
    }

    // ===== Pass internals =====

    /// Replace `data` only when every key in `source` is unique.
    fn commit_source(&mut self, source: Vec<T>) -> Result<(), GridError> {
        let keys: Vec<K> = source.iter().map(|item| (self.key_selector)(item)).collect();
        if let Err(err) = ensure_unique_keys(&keys) {
            warn!(error = %err, len = source.len(), "source update rejected");
            return Err(err);
        }
        self.data = source;
        Ok(())
    }

    fn request_pass(&mut self) -> Result<PassTicket, GridError> {
        if self.phase != PassPhase::Idle {
            self.pending = true;
            trace!(phase = ?self.phase, "pass queued behind in-flight pass");
            return Ok(PassTicket(self.next_ticket));
        }
        let ticket = self.issue_ticket();
        self.run_pass(ticket)?;
        Ok(ticket)
    }

    fn start_queued_pass(&mut self) -> Result<(), GridError> {
        self.pending = false;
        let ticket = self.issue_ticket();
        self.run_pass(ticket)
    }

    fn issue_ticket(&mut self) -> PassTicket {
        let ticket = PassTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }

    /// Filter, stable sort, optional reversal.
    fn derive_items(&self) -> Vec<T> {
        let mut items: Vec<T> = match &self.filter {
            Some(keep) => self.data.iter().filter(|item| keep(item)).cloned().collect(),
            None => self.data.clone(),
        };
        if let Some(compare) = &self.sort {
            items.sort_by(|a, b| compare(a, b));
        }
        if self.reversed {
            items.reverse();
        }
        items
    }

    fn layout_input(&self) -> LayoutInput {
        LayoutInput {
            container_width_px: self.host.width_px(),
            item_width_px: self.options.item_width_px,
            item_height_px: self.options.item_height_px,
            x_gap: self.options.x_gap,
            y_gap_px: self.options.y_gap_px,
            justify: self.options.justify,
        }
    }

    fn run_pass(&mut self, ticket: PassTicket) -> Result<(), GridError> {
        self.phase = PassPhase::Diffing;
        let items = self.derive_items();
        let new_keys: Vec<K> = items.iter().map(|item| (self.key_selector)(item)).collect();
        let old_keys = self.registry.ordered_keys(&self.host);

        let prepared = diff(&old_keys, &new_keys)
            .and_then(|changes| Ok((changes, compute_geometry(&self.layout_input())?)));
        let (changes, geometry) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => return Err(self.fail(ticket, err)),
        };

        // First: where survivors are on screen before anything moves
        let from_boxes: HashMap<ViewId, BoundingBox> = changes
            .moved
            .iter()
            .filter_map(|moved| {
                let handle = self.registry.get(&moved.key)?;
                Some((handle.id(), handle.previous_box()?))
            })
            .collect();

        self.phase = PassPhase::Mutating;
        let entered = match self.mutate(&changes, &items, &new_keys) {
            Ok(entered) => entered,
            Err(err) => return Err(self.fail(ticket, err)),
        };

        debug!(
            pass = ticket.0,
            added = changes.added.len(),
            removed = changes.removed.len(),
            relocated = changes.relocated_count(),
            total = items.len(),
            columns = geometry.column_count,
            "reconciled"
        );

        self.last_summary = Some(PassSummary {
            ticket,
            added: changes.added.len(),
            removed: changes.removed.len(),
            relocated: changes.relocated_count(),
            total: items.len(),
            geometry,
        });
        self.items = items;

        self.phase = PassPhase::LayingOut;
        self.host.apply_geometry(&geometry);
        self.geometry = Some(geometry);
        self.in_flight = Some(InFlightPass {
            ticket,
            from_boxes,
            entered,
        });
        Ok(())
    }

    /// Removed, then added, then every position in new order, then metadata.
    fn mutate(
        &mut self,
        changes: &DiffResult<K>,
        items: &[T],
        new_keys: &[K],
    ) -> Result<HashSet<ViewId>, GridError> {
        let total = items.len();

        for key in &changes.removed {
            if let Some(id) = self.registry.get(key).map(|handle| handle.id()) {
                if self.animator.cancel(id) {
                    trace!(%id, "cancelled animation of released view");
                }
            }
            self.registry.release(&mut self.host, key)?;
        }

        let mut entered = HashSet::with_capacity(changes.added.len());
        for added in &changes.added {
            let handle = self.registry.acquire(
                &mut self.host,
                added.key.clone(),
                &items[added.new_index],
                added.new_index,
                total,
            )?;
            entered.insert(handle.id());
        }

        // Ascending walk: positions before `index` already hold their final keys, so the
        // key for `index` is always found at or after it.
        for (index, key) in new_keys.iter().enumerate() {
            self.registry.reorder(&mut self.host, key, index)?;
        }

        for moved in &changes.moved {
            self.registry.reindex(&moved.key, moved.new_index, total)?;
        }

        Ok(entered)
    }

    fn fail(&mut self, ticket: PassTicket, err: GridError) -> GridError {
        warn!(pass = ticket.0, phase = ?self.phase, error = %err, "pass failed");
        self.phase = PassPhase::Idle;
        self.in_flight = None;
        self.completed_through = self.completed_through.max(ticket.0);
        self.last_failure = Some((ticket, err.clone()));
        err
    }

    /// Last: measure, Invert + Play: start animations.
    fn begin_animations(&mut self, now: Instant) {
        let Some(pass) = self.in_flight.as_ref() else {
            self.phase = PassPhase::Idle;
            return;
        };
        let offset_y = self.options.item_height_px;

        for (_, handle) in self.registry.handles_mut() {
            let id = handle.id();
            let to = handle.measure();
            let frame = if pass.entered.contains(&id) {
                Some(self.animator.enter(id, offset_y, now))
            } else {
                match self.animator.flip(id, pass.from_boxes.get(&id).copied(), to, now) {
                    FlipStart::Started(invert) => Some(AnimationFrame {
                        translate: invert,
                        opacity: 1.0,
                    }),
                    FlipStart::NoPreviousBox | FlipStart::InPlace => None,
                }
            };
            if let Some(frame) = frame {
                handle.view_mut().apply_frame(&frame);
            }
        }

        trace!(active = self.animator.active_count(), "animations started");
        self.phase = PassPhase::Animating;
    }

    fn advance_animations(&mut self, now: Instant) {
        for update in self.animator.advance(now) {
            if let Some(handle) = self.registry.get_by_id_mut(update.id) {
                handle.view_mut().apply_frame(&update.frame);
            }
        }
    }

    fn complete_pass(&mut self) -> Option<PassTicket> {
        self.phase = PassPhase::Idle;
        let pass = self.in_flight.take()?;
        self.completed_through = self.completed_through.max(pass.ticket.0);
        trace!(pass = pass.ticket.0, "pass settled");
        Some(pass.ticket)
    }
}

impl<T, H> ReconciliationController<T, T, H>
where
    T: Clone + Eq + Hash + Debug + 'static,
    H: ViewFactory<Item = T> + ViewContainer + GeometrySink,
{
    /// Controller keyed by the items themselves.
    pub fn with_identity_keys(host: H, options: GridOptions) -> Self {
        Self::new(host, options, T::clone)
    }
}

impl<T, K, H> ReconciliationController<T, K, H>
where
    T: Clone + FieldAccess + 'static,
    K: Clone + Eq + Hash + Debug,
    H: ViewFactory<Item = T> + ViewContainer + GeometrySink,
{
    /// Sort by a named field. Requesting the same `(field, kind)` as the active sort
    /// reverses the order instead of sorting again.
    ///
    /// # Errors
    ///
    /// Any [`GridError`] raised by an immediately started pass.
    pub fn sort_by(&mut self, spec: SortSpec) -> Result<PassTicket, GridError> {
        if self.sort_spec.as_ref() == Some(&spec) {
            return self.reverse();
        }
        self.sort = Some(spec.comparator());
        self.sort_spec = Some(spec);
        self.reversed = false;
        self.request_pass()
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
