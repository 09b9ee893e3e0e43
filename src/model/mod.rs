//! Domain model types (pure).
//!
//! Plain data shared by the grid core and the terminal host.

pub mod error;
pub mod geometry;
pub mod key_action;

// Re-export for convenience
pub use error::{AppError, GridError, InputError};
pub use geometry::{BoundingBox, Translate};
pub use key_action::KeyAction;
