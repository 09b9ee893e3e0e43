//! Keyed grid reconciliation core.
//!
//! Pure logic plus the host-facing traits in [`registry`]. Nothing in this module touches a
//! terminal; hosts plug in through [`ViewFactory`], [`ViewContainer`] and [`GeometrySink`].

pub mod controller;
pub mod diff;
pub mod flip;
pub mod headless;
pub mod layout;
pub mod registry;
pub mod sort;

pub use controller::{
    GridOptions, KeySelector, PassPhase, PassSummary, PassTicket, Predicate,
    ReconciliationController,
};
pub use diff::{diff, Added, DiffResult, Moved};
pub use flip::{AnimationFrame, AnimationTimings, FlipAnimator, FlipStart, FrameUpdate};
pub use headless::{BoxSlot, ChildList, HeadlessHost, HeadlessView};
pub use layout::{compute_geometry, GapSpec, GridGeometry, JustifyMode, LayoutInput};
pub use registry::{
    GeometrySink, GridView, ItemContext, ViewContainer, ViewFactory, ViewHandle, ViewId,
    ViewRegistry,
};
pub use sort::{Comparator, FieldAccess, FieldValue, SortKind, SortSpec};
