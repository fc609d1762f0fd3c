//! Flattened acceleration-structure records shared by the builder and the
//! renderer, together with stackless reference traversers that read them the
//! same way a tracing kernel does.

#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]

mod bvh_node;
mod bvh_view;
mod face;
mod hit;
mod kd_node;
mod kd_tree_view;
mod ray;
mod triangles_view;

pub use self::bvh_node::*;
pub use self::bvh_view::*;
pub use self::face::*;
pub use self::hit::*;
pub use self::kd_node::*;
pub use self::kd_tree_view::*;
pub use self::ray::*;
pub use self::triangles_view::*;

/// Marks a missing node, parent or rope in the flattened arrays.
pub const INVALID_ID: u32 = u32::MAX;

/// Maximum number of leaves a single rope walk is allowed to visit.
///
/// Trees built by `ropetrace` never come close to this; it only bounds the
/// walk over a malformed rope graph.
pub const MAX_ROPE_STEPS: u32 = 4096;
