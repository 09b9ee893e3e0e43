//! Key → view ownership and the collaborator interfaces a host implements.
//!
//! The registry is the only owner of views. It creates them through a [`ViewFactory`],
//! keeps exactly one [`ViewHandle`] per live key, and mirrors every create/destroy/reorder
//! onto the host's [`ViewContainer`], which is the single source of truth for child order.

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::hash::Hash;

use tracing::trace;

use crate::grid::flip::AnimationFrame;
use crate::grid::layout::GridGeometry;
use crate::model::{BoundingBox, GridError};

/// Stable identity of a view inside the host container.
///
/// Handed to the container instead of the view itself so the registry stays the sole owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(u64);

impl ViewId {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "view-{}", self.0)
    }
}

/// Positional metadata of a view within the ordered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemContext {
    /// 0-based position.
    pub index: usize,
    /// Collection length.
    pub total: usize,
    /// `index == 0`.
    pub first: bool,
    /// `index == total - 1`.
    pub last: bool,
    /// Odd 0-based position.
    pub odd: bool,
    /// Even 0-based position.
    pub even: bool,
}

impl ItemContext {
    /// Metadata for position `index` out of `total`.
    pub fn new(index: usize, total: usize) -> Self {
        let odd = index % 2 == 1;
        Self {
            index,
            total,
            first: index == 0,
            last: total > 0 && index == total - 1,
            odd,
            even: !odd,
        }
    }

    /// 1-based rank for display.
    pub fn rank(&self) -> usize {
        self.index + 1
    }
}

/// A rendered representation of one item, as seen by the core.
pub trait GridView {
    /// Current laid-out box. Must return a value even before the first paint.
    fn bounding_box(&self) -> BoundingBox;

    /// Positional metadata changed.
    fn update_context(&mut self, context: &ItemContext);

    /// Visual state for the current animation frame.
    fn apply_frame(&mut self, frame: &AnimationFrame);
}

/// Creates and destroys views for items.
pub trait ViewFactory {
    /// Item type this factory renders.
    type Item;

    /// View type produced by this factory.
    type View: GridView;

    /// Build the view for `item`.
    fn create(&mut self, id: ViewId, item: &Self::Item, context: &ItemContext) -> Self::View;

    /// Tear a view down. Called exactly once per created view.
    fn destroy(&mut self, view: Self::View);
}

/// Ordered child list of the grid container.
pub trait ViewContainer {
    /// Insert `id` at `index`, shifting later children.
    fn insert(&mut self, index: usize, id: ViewId);

    /// Remove the child at `index`.
    fn remove(&mut self, index: usize) -> Option<ViewId>;

    /// Move the child at `from` so it ends up at `to`.
    fn move_child(&mut self, from: usize, to: usize);

    /// Position of `id`, if it is a child.
    fn index_of(&self, id: ViewId) -> Option<usize>;

    /// Child at `index`.
    fn id_at(&self, index: usize) -> Option<ViewId>;

    /// Number of children.
    fn len(&self) -> usize;

    /// True when the container has no children.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current container width in pixels.
    fn width_px(&self) -> f64;
}

/// Receives the computed grid template.
pub trait GeometrySink {
    /// Apply `geometry` to the container's visual layout.
    fn apply_geometry(&mut self, geometry: &GridGeometry);
}

/// The registry's record of one live view.
#[derive(Debug)]
pub struct ViewHandle<V> {
    id: ViewId,
    view: V,
    context: ItemContext,
    measured: Option<BoundingBox>,
}

impl<V: GridView> ViewHandle<V> {
    /// Container identity.
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The host view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// The host view, mutably.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Current positional metadata.
    pub fn context(&self) -> &ItemContext {
        &self.context
    }

    /// Box recorded when the last pass settled; `None` for views never laid out.
    pub fn measured(&self) -> Option<BoundingBox> {
        self.measured
    }

    /// Read the live box and remember it as this view's settled position.
    pub fn measure(&mut self) -> BoundingBox {
        let bbox = self.view.bounding_box();
        self.measured = Some(bbox);
        bbox
    }

    /// Live box if this view has been laid out before, for use as a FLIP origin.
    pub fn previous_box(&self) -> Option<BoundingBox> {
        self.measured.map(|_| self.view.bounding_box())
    }
}

/// Mapping from item key to its owned view.
#[derive(Debug)]
pub struct ViewRegistry<K, V> {
    views: HashMap<K, ViewHandle<V>>,
    keys_by_id: HashMap<ViewId, K>,
    next_id: u64,
}

impl<K, V> Default for ViewRegistry<K, V> {
    fn default() -> Self {
        Self {
            views: HashMap::new(),
            keys_by_id: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<K, V> ViewRegistry<K, V>
where
    K: Clone + Eq + Hash + Debug,
    V: GridView,
{
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// True when no views are live.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Whether `key` owns a view.
    pub fn contains(&self, key: &K) -> bool {
        self.views.contains_key(key)
    }

    /// Create, register and insert the view for `key` at `index`.
    ///
    /// # Errors
    ///
    /// [`GridError::DuplicateAcquire`] if `key` already owns a view; nothing is created.
    pub fn acquire<H>(
        &mut self,
        host: &mut H,
        key: K,
        item: &H::Item,
        index: usize,
        total: usize,
    ) -> Result<&mut ViewHandle<V>, GridError>
    where
        H: ViewFactory<View = V> + ViewContainer,
    {
        if self.views.contains_key(&key) {
            return Err(GridError::duplicate_acquire(&key));
        }

        let id = ViewId(self.next_id);
        self.next_id += 1;
        let context = ItemContext::new(index, total);
        let view = host.create(id, item, &context);
        host.insert(index.min(host.len()), id);
        trace!(key = ?key, %id, index, "acquired view");

        self.keys_by_id.insert(id, key.clone());
        Ok(self.views.entry(key).or_insert(ViewHandle {
            id,
            view,
            context,
            measured: None,
        }))
    }

    /// Remove the view for `key` from the container, deregister and destroy it.
    ///
    /// Returns the id the view had so callers can drop state attached to it.
    ///
    /// # Errors
    ///
    /// [`GridError::UnknownKey`] if `key` owns no view.
    pub fn release<H>(&mut self, host: &mut H, key: &K) -> Result<ViewId, GridError>
    where
        H: ViewFactory<View = V> + ViewContainer,
    {
        let handle = self
            .views
            .remove(key)
            .ok_or_else(|| GridError::unknown_key(key))?;
        self.keys_by_id.remove(&handle.id);

        if let Some(index) = host.index_of(handle.id) {
            host.remove(index);
        }
        trace!(key = ?key, id = %handle.id, "released view");

        let id = handle.id;
        host.destroy(handle.view);
        Ok(id)
    }

    /// Move the view for `key` to `new_index` in the container.
    ///
    /// # Errors
    ///
    /// [`GridError::UnknownKey`] if `key` owns no view or its view is not a container child.
    pub fn reorder<C: ViewContainer>(
        &self,
        container: &mut C,
        key: &K,
        new_index: usize,
    ) -> Result<(), GridError> {
        let id = self
            .views
            .get(key)
            .map(|handle| handle.id)
            .ok_or_else(|| GridError::unknown_key(key))?;
        let from = container
            .index_of(id)
            .ok_or_else(|| GridError::unknown_key(key))?;
        if from != new_index {
            container.move_child(from, new_index);
            trace!(key = ?key, from, to = new_index, "reordered view");
        }
        Ok(())
    }

    /// Refresh positional metadata without touching the container.
    ///
    /// # Errors
    ///
    /// [`GridError::UnknownKey`] if `key` owns no view.
    pub fn reindex(&mut self, key: &K, new_index: usize, new_total: usize) -> Result<(), GridError> {
        let handle = self
            .views
            .get_mut(key)
            .ok_or_else(|| GridError::unknown_key(key))?;
        let context = ItemContext::new(new_index, new_total);
        if handle.context != context {
            handle.context = context;
            handle.view.update_context(&context);
        }
        Ok(())
    }

    /// Handle for `key`.
    pub fn get(&self, key: &K) -> Option<&ViewHandle<V>> {
        self.views.get(key)
    }

    /// Handle for `key`, mutably.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut ViewHandle<V>> {
        self.views.get_mut(key)
    }

    /// Key owning the view with `id`.
    pub fn key_of(&self, id: ViewId) -> Option<&K> {
        self.keys_by_id.get(&id)
    }

    /// Handle for the view with `id`, mutably.
    pub fn get_by_id_mut(&mut self, id: ViewId) -> Option<&mut ViewHandle<V>> {
        let key = self.keys_by_id.get(&id)?;
        self.views.get_mut(key)
    }

    /// Keys in container order. Children the registry does not own are skipped.
    pub fn ordered_keys<C: ViewContainer>(&self, container: &C) -> Vec<K> {
        (0..container.len())
            .filter_map(|index| container.id_at(index))
            .filter_map(|id| self.keys_by_id.get(&id).cloned())
            .collect()
    }

    /// Handles in container order.
    pub fn ordered_handles<'a, C: ViewContainer>(
        &'a self,
        container: &'a C,
    ) -> impl Iterator<Item = &'a ViewHandle<V>> + 'a {
        (0..container.len())
            .filter_map(move |index| container.id_at(index))
            .filter_map(move |id| self.keys_by_id.get(&id))
            .filter_map(move |key| self.views.get(key))
    }

    /// Every handle, in no particular order.
    pub fn handles_mut(&mut self) -> impl Iterator<Item = (&K, &mut ViewHandle<V>)> {
        self.views.iter_mut()
    }
}
