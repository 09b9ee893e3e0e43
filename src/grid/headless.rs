//! In-memory hosting: a child list that lays views out with plain arithmetic.
//!
//! [`ChildList`] is the container half of a host; [`HeadlessHost`] adds a trivial view
//! factory and is used by `--print`, the benches and the test suites. Boxes are only
//! recomputed when geometry is applied, like a browser that lays out once per frame, so
//! boxes read between mutation and [`GeometrySink::apply_geometry`] still describe the
//! previous layout.

use std::cell::Cell;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::rc::Rc;

use crate::grid::flip::AnimationFrame;
use crate::grid::layout::GridGeometry;
use crate::grid::registry::{
    GeometrySink, GridView, ItemContext, ViewContainer, ViewFactory, ViewId,
};
use crate::model::BoundingBox;

/// Live box of a view, shared between the view and the container that lays it out.
pub type BoxSlot = Rc<Cell<BoundingBox>>;

/// Ordered children plus the box slot of each.
#[derive(Debug, Default)]
pub struct ChildList {
    width_px: f64,
    order: Vec<ViewId>,
    slots: HashMap<ViewId, BoxSlot>,
    geometry: Option<GridGeometry>,
}

impl ChildList {
    /// Empty list for a container `width_px` wide.
    pub fn new(width_px: f64) -> Self {
        Self {
            width_px,
            ..Self::default()
        }
    }

    /// Register `id` and hand out its box slot. The child is not placed until inserted.
    pub fn attach(&mut self, id: ViewId) -> BoxSlot {
        let slot = Rc::new(Cell::new(BoundingBox::ZERO));
        self.slots.insert(id, Rc::clone(&slot));
        slot
    }

    /// Forget the slot of `id`.
    pub fn detach(&mut self, id: ViewId) {
        self.slots.remove(&id);
    }

    /// Resize. Boxes keep their old values until geometry is applied again.
    pub fn set_width(&mut self, width_px: f64) {
        self.width_px = width_px;
    }

    /// Container width.
    pub fn width_px(&self) -> f64 {
        self.width_px
    }

    /// Last geometry applied.
    pub fn geometry(&self) -> Option<&GridGeometry> {
        self.geometry.as_ref()
    }

    /// Child ids in order.
    pub fn order(&self) -> &[ViewId] {
        &self.order
    }

    /// Current box of every child, in order.
    pub fn layout(&self) -> Vec<(ViewId, BoundingBox)> {
        self.order
            .iter()
            .map(|id| (*id, self.slots.get(id).map(|s| s.get()).unwrap_or_default()))
            .collect()
    }

    /// Insert at `index`, clamped to the end.
    pub fn insert(&mut self, index: usize, id: ViewId) {
        self.order.insert(index.min(self.order.len()), id);
    }

    /// Remove the child at `index`.
    pub fn remove(&mut self, index: usize) -> Option<ViewId> {
        (index < self.order.len()).then(|| self.order.remove(index))
    }

    /// Move the child at `from` to `to`. Returns false when `from` is out of range.
    pub fn move_child(&mut self, from: usize, to: usize) -> bool {
        if from >= self.order.len() {
            return false;
        }
        let id = self.order.remove(from);
        self.order.insert(to.min(self.order.len()), id);
        true
    }

    /// Position of `id`.
    pub fn index_of(&self, id: ViewId) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == id)
    }

    /// Child at `index`.
    pub fn id_at(&self, index: usize) -> Option<ViewId> {
        self.order.get(index).copied()
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True when there are no children.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Store `geometry` and move every slot to its cell.
    pub fn apply_geometry(&mut self, geometry: &GridGeometry) {
        self.geometry = Some(*geometry);
        let offsets = geometry.track_offsets(self.width_px);
        for (index, id) in self.order.iter().enumerate() {
            if let Some(slot) = self.slots.get(id) {
                slot.set(geometry.place(index, &offsets));
            }
        }
    }
}

/// View produced by [`HeadlessHost`].
#[derive(Debug)]
pub struct HeadlessView {
    /// Container identity.
    pub id: ViewId,
    /// Rendered label of the item.
    pub label: String,
    /// Latest positional metadata.
    pub context: ItemContext,
    /// Latest animation frame.
    pub frame: AnimationFrame,
    /// Number of frames applied so far.
    pub frames_applied: usize,
    slot: BoxSlot,
}

impl GridView for HeadlessView {
    fn bounding_box(&self) -> BoundingBox {
        self.slot.get()
    }

    fn update_context(&mut self, context: &ItemContext) {
        self.context = *context;
    }

    fn apply_frame(&mut self, frame: &AnimationFrame) {
        self.frame = *frame;
        self.frames_applied += 1;
    }
}

/// Container, factory and layout engine in one, with operation counters.
pub struct HeadlessHost<T> {
    children: ChildList,
    label: Box<dyn Fn(&T) -> String>,
    /// Views created so far.
    pub created: usize,
    /// Views destroyed so far.
    pub destroyed: usize,
    /// Insert, remove and move operations performed on the child list.
    pub container_ops: usize,
}

impl<T: Debug> HeadlessHost<T> {
    /// Host `width_px` wide labelling items by their `Debug` output.
    pub fn new(width_px: f64) -> Self {
        Self::with_label(width_px, |item: &T| format!("{item:?}"))
    }
}

impl<T> HeadlessHost<T> {
    /// Host `width_px` wide with a custom label function.
    pub fn with_label(width_px: f64, label: impl Fn(&T) -> String + 'static) -> Self {
        Self {
            children: ChildList::new(width_px),
            label: Box::new(label),
            created: 0,
            destroyed: 0,
            container_ops: 0,
        }
    }

    /// Resize the container. Boxes keep their old values until geometry is applied again.
    pub fn set_width(&mut self, width_px: f64) {
        self.children.set_width(width_px);
    }

    /// Last geometry applied.
    pub fn geometry(&self) -> Option<&GridGeometry> {
        self.children.geometry()
    }

    /// Child ids in order.
    pub fn order(&self) -> &[ViewId] {
        self.children.order()
    }

    /// Current box of every child, in order.
    pub fn layout(&self) -> Vec<(ViewId, BoundingBox)> {
        self.children.layout()
    }
}

impl<T> Debug for HeadlessHost<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessHost")
            .field("children", &self.children)
            .field("created", &self.created)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl<T> ViewFactory for HeadlessHost<T> {
    type Item = T;
    type View = HeadlessView;

    fn create(&mut self, id: ViewId, item: &T, context: &ItemContext) -> HeadlessView {
        self.created += 1;
        HeadlessView {
            id,
            label: (self.label)(item),
            context: *context,
            frame: AnimationFrame::IDENTITY,
            frames_applied: 0,
            slot: self.children.attach(id),
        }
    }

    fn destroy(&mut self, view: HeadlessView) {
        self.children.detach(view.id);
        self.destroyed += 1;
    }
}

impl<T> ViewContainer for HeadlessHost<T> {
    fn insert(&mut self, index: usize, id: ViewId) {
        self.children.insert(index, id);
        self.container_ops += 1;
    }

    fn remove(&mut self, index: usize) -> Option<ViewId> {
        let removed = self.children.remove(index);
        if removed.is_some() {
            self.container_ops += 1;
        }
        removed
    }

    fn move_child(&mut self, from: usize, to: usize) {
        if self.children.move_child(from, to) {
            self.container_ops += 1;
        }
    }

    fn index_of(&self, id: ViewId) -> Option<usize> {
        self.children.index_of(id)
    }

    fn id_at(&self, index: usize) -> Option<ViewId> {
        self.children.id_at(index)
    }

    fn len(&self) -> usize {
        self.children.len()
    }

    fn width_px(&self) -> f64 {
        self.children.width_px()
    }
}

impl<T> GeometrySink for HeadlessHost<T> {
    fn apply_geometry(&mut self, geometry: &GridGeometry) {
        self.children.apply_geometry(geometry);
    }
}
