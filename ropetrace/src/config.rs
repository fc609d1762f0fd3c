use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Which acceleration structure gets built.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    /// BVH with SAH-split triangle clusters at the leaves
    #[serde(rename = "bvh")]
    Bvh,

    /// BVH over objects with one roped k-d tree per object
    #[default]
    #[serde(rename = "bvh_kdtree")]
    BvhKdTree,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Bvh => write!(f, "bvh"),
            Variant::BvhKdTree => write!(f, "bvh_kdtree"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    pub accel_struct: Variant,
    pub bvh: BvhConfig,
    pub kd_tree: KdTreeConfig,
}

impl BuildConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Clamps values the builders can't work with.
    pub fn validated(mut self) -> Self {
        self.bvh.max_faces = self.bvh.max_faces.max(1);
        self.kd_tree.min_faces = self.kd_tree.min_faces.max(1);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BvhConfig {
    /// Nodes with at most this many triangles become leaves
    pub max_faces: usize,

    /// Nodes with more triangles than this are split at the mean center
    /// instead of by SAH
    pub sah_faces_limit: usize,

    /// Number of candidate planes per axis tried for spatial splits; zero
    /// disables them
    pub spatial_splits: u32,

    pub skip_ahead: bool,

    /// Minimum `SA(left) / SA(node)` ratio at which a node's left child is
    /// flagged as skippable
    #[serde(alias = "skip_ahead_compare")]
    pub skip_ahead_cmp: f32,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            max_faces: 4,
            sah_faces_limit: 10_000,
            spatial_splits: 0,
            skip_ahead: false,
            skip_ahead_cmp: 0.7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KdTreeConfig {
    /// Nodes with at most this many triangles become leaves; splits leaving
    /// fewer than this on either side are rejected
    pub min_faces: usize,

    /// Deepest level a node may still be split at (root is level 1);
    /// defaults to `round(log2(triangles))`
    pub depth_limit: Option<u32>,

    pub optimize_ropes: bool,

    /// Whether objects without triangles are skipped (with an error
    /// diagnostic) rather than failing the whole build
    pub skip_empty_objects: bool,
}

impl KdTreeConfig {
    pub fn depth_limit_for(&self, triangles: usize) -> u32 {
        self.depth_limit
            .unwrap_or_else(|| (triangles as f32).log2().round().max(0.0) as u32)
    }
}

impl Default for KdTreeConfig {
    fn default() -> Self {
        Self {
            min_faces: 3,
            depth_limit: None,
            optimize_ropes: true,
            skip_empty_objects: true,
        }
    }
}
