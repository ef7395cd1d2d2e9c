//! Breadcrumb Trail - Append-Only Path Storage and Incremental Rendering
//!
//! This library tracks a device's movement as a growing "breadcrumb trail" of
//! Web Mercator points and turns it into cheap move/line drawing instructions
//! for a map overlay. It is the model half of a location-tracking display: the
//! map surface, the location source and the settings screen are external
//! collaborators that feed it samples and viewports.
//!
//! # Architecture
//!
//! - **[`BreadcrumbPath`]**: append-only, lock-guarded point buffer with a
//!   hysteresis-grown bounding rectangle
//! - **[`PathRenderer`]**: stateless simplify-and-clip conversion of a point
//!   snapshot into [`PathOp`] drawing instructions
//! - **[`Config`]**: the filtering and rendering constants a settings store
//!   supplies
//! - **[`utils`]**: Web Mercator projection and axis-aligned rect helpers
//!
//! # Performance Characteristics
//!
//! - **Ingest**: O(1) per sample, and the dominant too-close-to-care rejection
//!   path does no allocation at all
//! - **Draw**: single O(n) forward pass over the snapshot, emitting far fewer
//!   instructions than points at low zoom
//! - **Memory**: O(n) in accepted points; rejected samples cost nothing

mod path;
mod renderer;
pub mod utils;

// Public API exports
pub use path::{BreadcrumbPath, Config, CoordinateUpdate};
pub use renderer::{Drawable, PathOp, PathRenderer};

/// Error types for the trail module
#[derive(Debug, thiserror::Error)]
pub enum TrailError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, TrailError>;
