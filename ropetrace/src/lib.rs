//! Two-level acceleration structures for a path tracer: a BVH over scene
//! objects whose leaves hold either clusters of triangles or per-object
//! roped k-d trees, plus the code flattening them into GPU-ready arrays.
//!
//! ```no_run
//! use ropetrace::{build, serialize, BuildConfig, Geometry};
//!
//! # fn run(geometry: Geometry) -> Result<(), ropetrace::BuildError> {
//! let build = build(&geometry, &BuildConfig::default())?;
//! let flat = serialize(&build.accel, &geometry)?;
//!
//! // upload `flat.bvh_nodes_bytes()`, `flat.kd_nodes_bytes()` etc.
//! # Ok(())
//! # }
//! ```

#![allow(clippy::len_without_is_empty)]

mod accel_structure;
mod bvh;
mod config;
mod diagnostics;
mod error;
mod geometry;
mod kd_tree;
mod serializer;
mod triangle;
mod utils;
mod visualizer;

#[cfg(test)]
mod test_utils;

pub use ropetrace_gpu as gpu;

pub use self::accel_structure::*;
pub use self::bvh::*;
pub use self::config::*;
pub use self::diagnostics::*;
pub use self::error::*;
pub use self::geometry::*;
pub use self::kd_tree::*;
pub use self::serializer::*;
pub use self::triangle::*;
pub use self::utils::*;
pub use self::visualizer::*;
