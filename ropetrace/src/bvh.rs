mod builder;
mod merger;
mod node;
mod nodes;
mod ordering;
mod skip_ahead;

use std::hash::{Hash, Hasher};
use std::ops;

use fxhash::FxHasher;

pub use self::node::*;
pub use self::nodes::*;
use crate::{
    BoundingBox, BuildError, BvhConfig, DiagnosticKind, Diagnostics, ObjectId,
    Tri,
};

/// Top-level BVH over all scene objects.
///
/// Nodes are stored in traversal order: the root is `BvhNodeId::root()` and
/// every internal node is directly followed by its left child.
#[derive(Clone, Debug, PartialEq)]
pub struct Bvh {
    nodes: BvhNodes,
    containers: Vec<BvhNodeId>,
    leaves: Vec<BvhNodeId>,
    depth_reached: u32,
}

impl Bvh {
    /// Builds the subtree of a single object by splitting its triangles.
    ///
    /// An object without triangles becomes a single empty leaf with an unset
    /// bounding box.
    pub fn build_object(
        object_id: ObjectId,
        object: &str,
        tris: Vec<Tri>,
        config: &BvhConfig,
        diagnostics: &mut Diagnostics,
    ) -> BvhNodes {
        if tris.is_empty() {
            diagnostics.warn(
                DiagnosticKind::EmptySceneObject,
                object,
                "object has no triangles; representing it with an empty leaf",
            );

            return Self::leaf(object_id, BoundingBox::default());
        }

        builder::run(object_id, object, tris, config, diagnostics)
    }

    /// Builds the single-leaf subtree that stands for an object whose
    /// triangles live elsewhere (e.g. in a k-d tree).
    pub fn leaf(object_id: ObjectId, bounds: BoundingBox) -> BvhNodes {
        BvhNodes::from_iter([BvhNode::leaf(bounds, object_id, Vec::new())])
    }

    /// Joins per-object subtrees into the final tree; returns it together
    /// with the ids the subtrees' roots ended up at.
    pub fn build(
        subtrees: Vec<BvhNodes>,
        config: &BvhConfig,
        diagnostics: &mut Diagnostics,
    ) -> Result<(Self, Vec<BvhNodeId>), BuildError> {
        if subtrees.is_empty() {
            return Err(BuildError::NoObjects);
        }

        let (mut nodes, root_id, roots) = merger::run(subtrees, diagnostics);

        ordering::link(&mut nodes, root_id);

        let order = ordering::traversal_order(&nodes, root_id);
        let (mut nodes, new_ids) = ordering::relabel(nodes, &order);

        if config.skip_ahead {
            skip_ahead::run(&mut nodes, config.skip_ahead_cmp);
        }

        let roots = roots
            .into_iter()
            .map(|id| new_ids[id.get() as usize])
            .collect();

        let (leaves, containers): (Vec<_>, Vec<_>) =
            nodes.ids().partition(|&id| nodes[id].is_leaf());

        let depth_reached =
            nodes.iter().map(|(_, node)| node.depth).max().unwrap_or(0);

        let this = Self {
            nodes,
            containers,
            leaves,
            depth_reached,
        };

        Ok((this, roots))
    }

    pub fn root(&self) -> BvhNodeId {
        BvhNodeId::root()
    }

    pub fn nodes(&self) -> &BvhNodes {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bounds(&self) -> BoundingBox {
        self.nodes[self.root()].bounds
    }

    /// Internal nodes, in id order.
    pub fn containers(&self) -> &[BvhNodeId] {
        &self.containers
    }

    /// Leaf nodes, in id order.
    pub fn leaves(&self) -> &[BvhNodeId] {
        &self.leaves
    }

    /// Depth of the deepest node; the root is at depth zero.
    pub fn depth_reached(&self) -> u32 {
        self.depth_reached
    }

    pub fn triangle_count(&self) -> usize {
        self.leaves
            .iter()
            .map(|&id| self.nodes[id].triangles().len())
            .sum()
    }

    /// Hash of the tree's structure, bounds and leaf contents.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();

        for (id, node) in self.nodes.iter() {
            id.hash(&mut hasher);
            node.bounds.hash(&mut hasher);
            node.parent.hash(&mut hasher);
            node.skip_next_left.hash(&mut hasher);

            match &node.kind {
                BvhNodeKind::Internal { left_id, right_id } => {
                    left_id.hash(&mut hasher);
                    right_id.hash(&mut hasher);
                }

                BvhNodeKind::Leaf {
                    object_id,
                    triangles,
                } => {
                    object_id.hash(&mut hasher);

                    for tri in triangles {
                        tri.id().hash(&mut hasher);
                    }
                }
            }
        }

        hasher.finish()
    }
}

impl ops::Index<BvhNodeId> for Bvh {
    type Output = BvhNode;

    fn index(&self, index: BvhNodeId) -> &Self::Output {
        &self.nodes[index]
    }
}
