//! # sadm-flatten
//!
//! Profile flattening for ADM graphs.
//!
//! A programme may leave choices open: complementary object groups offer
//! one of several objects, and alternative value sets override parts of an
//! object. Flattening resolves every such choice into its own programme so
//! that a renderer without interactivity can play each one directly.
//!
//! This crate provides:
//! - `ProfileFlattener` (the two expansion strategies over a `GraphContainer`)
//! - `FlattenConfig` (TOML-loadable knobs: strategy, fallback label, minting floor)
//! - `Odometer` (enumerates one choice per group)
//!
//! ## Strategies
//!
//! ```text
//! Emission       programme ids kept where nothing expands;
//!                AVS baked into new content/object pairs;
//!                one programme label per chosen group member
//! Combinatorial  every programme renumbered from the minting floor;
//!                AVS referenced as-is; full product of group choices
//! ```

pub mod config;
pub mod error;
pub mod flattener;
pub mod odometer;

pub use config::{FlattenConfig, FlattenStrategy};
pub use error::FlattenError;
pub use flattener::{FlattenReport, Flattened, ProfileFlattener, flatten};
pub use odometer::Odometer;
