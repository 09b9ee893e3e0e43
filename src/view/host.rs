//! The terminal as a grid host.
//!
//! [`TerminalHost`] owns the container child list and builds a [`CardView`] per item.
//! Boxes live in shared slots the renderer reads every frame, so the host can lay views
//! out without reaching into the registry that owns them.

use serde_json::Value;

use crate::grid::{
    AnimationFrame, BoxSlot, ChildList, GeometrySink, GridGeometry, GridView, ItemContext,
    ViewContainer, ViewFactory, ViewId,
};
use crate::model::BoundingBox;
use crate::source::{field_text, item_key};

use super::constants::{DIM_OPACITY, width_px};

/// One item drawn as a bordered card.
#[derive(Debug)]
pub struct CardView {
    id: ViewId,
    title: String,
    detail: Option<String>,
    context: ItemContext,
    frame: AnimationFrame,
    slot: BoxSlot,
}

impl CardView {
    /// Container identity.
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// Main label.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Secondary line, from the filter field.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Positional metadata.
    pub fn context(&self) -> &ItemContext {
        &self.context
    }

    /// Current animation frame.
    pub fn frame(&self) -> &AnimationFrame {
        &self.frame
    }

    /// Mostly transparent; drawn dimmed.
    pub fn is_dimmed(&self) -> bool {
        self.frame.opacity < DIM_OPACITY
    }
}

impl GridView for CardView {
    fn bounding_box(&self) -> BoundingBox {
        self.slot.get()
    }

    fn update_context(&mut self, context: &ItemContext) {
        self.context = *context;
    }

    fn apply_frame(&mut self, frame: &AnimationFrame) {
        self.frame = *frame;
    }
}

/// Grid container backed by the terminal.
#[derive(Debug)]
pub struct TerminalHost {
    children: ChildList,
    label_field: String,
    detail_field: String,
}

impl TerminalHost {
    /// Host `columns` cells wide labelling cards by `label_field` and `detail_field`.
    pub fn new(columns: u16, label_field: impl Into<String>, detail_field: impl Into<String>) -> Self {
        Self {
            children: ChildList::new(width_px(columns)),
            label_field: label_field.into(),
            detail_field: detail_field.into(),
        }
    }

    /// The terminal was resized to `columns` cells.
    pub fn set_columns(&mut self, columns: u16) {
        self.children.set_width(width_px(columns));
    }

    /// Last geometry applied.
    pub fn geometry(&self) -> Option<&GridGeometry> {
        self.children.geometry()
    }
}

impl ViewFactory for TerminalHost {
    type Item = Value;
    type View = CardView;

    fn create(&mut self, id: ViewId, item: &Value, context: &ItemContext) -> CardView {
        let title = field_text(item, &self.label_field)
            .unwrap_or_else(|| item_key(item, &self.label_field));
        CardView {
            id,
            title,
            detail: field_text(item, &self.detail_field),
            context: *context,
            frame: AnimationFrame::IDENTITY,
            slot: self.children.attach(id),
        }
    }

    fn destroy(&mut self, view: CardView) {
        self.children.detach(view.id);
    }
}

impl ViewContainer for TerminalHost {
    fn insert(&mut self, index: usize, id: ViewId) {
        self.children.insert(index, id);
    }

    fn remove(&mut self, index: usize) -> Option<ViewId> {
        self.children.remove(index)
    }

    fn move_child(&mut self, from: usize, to: usize) {
        self.children.move_child(from, to);
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

impl GeometrySink for TerminalHost {
    fn apply_geometry(&mut self, geometry: &GridGeometry) {
        self.children.apply_geometry(geometry);
    }
}
