//! fluent-grid
//!
//! Animated keyed grid reconciliation. The [`grid`] core diffs keyed collections,
//! keeps one view per key, lays views out on a CSS-like grid and animates every
//! reorder with FLIP transitions. The [`view`] module hosts the core in a terminal.
//!
//! The core is pure and host-agnostic; terminal, file and logging concerns live in
//! the outer modules.

pub mod config;
pub mod grid;
pub mod logging;
pub mod model;
pub mod source;
pub mod view;
