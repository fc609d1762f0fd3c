mod builder;
mod node;
mod nodes;
mod ropes;

use std::hash::{Hash, Hasher};
use std::ops;

use fxhash::FxHasher;

pub use self::node::*;
pub use self::nodes::*;
use crate::{BoundingBox, BuildError, Diagnostics, KdTreeConfig, ObjectId, Tri};

/// Roped k-d tree over the triangles of a single object.
#[derive(Clone, Debug, PartialEq)]
pub struct KdTree {
    object_id: ObjectId,
    nodes: KdNodes,
    leaves: Vec<KdNodeId>,
    internal_nodes: Vec<KdNodeId>,
    depth_reached: u32,
}

impl KdTree {
    pub fn build(
        object_id: ObjectId,
        object: &str,
        tris: Vec<Tri>,
        config: &KdTreeConfig,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, BuildError> {
        if tris.is_empty() {
            return Err(BuildError::EmptyObject {
                object: object.to_owned(),
            });
        }

        let (mut nodes, depth_reached) =
            builder::run(tris, config, object, diagnostics);

        ropes::run(&mut nodes, config.optimize_ropes);

        let (leaves, internal_nodes) =
            nodes.ids().partition(|&id| nodes[id].is_leaf());

        Ok(Self {
            object_id,
            nodes,
            leaves,
            internal_nodes,
            depth_reached,
        })
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    pub fn root(&self) -> KdNodeId {
        KdNodeId::root()
    }

    pub fn nodes(&self) -> &KdNodes {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaves(&self) -> &[KdNodeId] {
        &self.leaves
    }

    pub fn internal_nodes(&self) -> &[KdNodeId] {
        &self.internal_nodes
    }

    pub fn bounds(&self) -> BoundingBox {
        self.nodes[self.root()].bounds()
    }

    /// Deepest level reached; the root is at level 1.
    pub fn depth_reached(&self) -> u32 {
        self.depth_reached
    }

    /// Number of triangle references stored in leaves (triangles straddling
    /// a split are counted once per leaf).
    pub fn triangle_refs(&self) -> usize {
        self.leaves
            .iter()
            .map(|&id| self.nodes[id].triangles().len())
            .sum()
    }

    pub fn avg_faces_per_leaf(&self) -> f32 {
        (self.triangle_refs() as f32) / (self.leaves.len() as f32)
    }

    /// Hash of the tree's structure, split planes, leaf contents and ropes.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();

        self.object_id.hash(&mut hasher);

        for (id, node) in self.nodes.iter() {
            id.hash(&mut hasher);
            node.bounds().hash(&mut hasher);

            match node {
                KdNode::Internal {
                    axis,
                    split,
                    left_id,
                    right_id,
                    ..
                } => {
                    axis.hash(&mut hasher);
                    split.to_bits().hash(&mut hasher);
                    left_id.hash(&mut hasher);
                    right_id.hash(&mut hasher);
                }

                KdNode::Leaf {
                    triangles, ropes, ..
                } => {
                    for tri in triangles {
                        tri.id().hash(&mut hasher);
                    }

                    ropes.hash(&mut hasher);
                }
            }
        }

        hasher.finish()
    }
}

impl ops::Index<KdNodeId> for KdTree {
    type Output = KdNode;

    fn index(&self, index: KdNodeId) -> &Self::Output {
        &self.nodes[index]
    }
}

#[cfg(test)]
mod tests {
    use glam::{vec3, Vec3};

    use super::*;
    use crate::test_utils::*;
    use crate::{Axis, DiagnosticKind, Geometry, TriId};

    const EPS: f32 = 1e-5;

    fn build(
        geometry: &Geometry,
        config: &KdTreeConfig,
    ) -> (KdTree, Diagnostics) {
        let id = ObjectId::new(0);
        let mut diagnostics = Diagnostics::default();

        let tree = KdTree::build(
            id,
            geometry.object(id).name(),
            triangles(geometry, id),
            config,
            &mut diagnostics,
        )
        .unwrap();

        (tree, diagnostics)
    }

    fn subtree_contains(tree: &KdTree, root: KdNodeId, id: KdNodeId) -> bool {
        let mut stack = vec![root];

        while let Some(node_id) = stack.pop() {
            if node_id == id {
                return true;
            }

            if let Some((left_id, right_id)) = tree[node_id].children() {
                stack.push(left_id);
                stack.push(right_id);
            }
        }

        false
    }

    fn assert_well_formed(tree: &KdTree) {
        let root_bb = tree.bounds();

        for (_, node) in tree.nodes().iter() {
            if let KdNode::Internal {
                bounds,
                axis,
                split,
                left_id,
                right_id,
            } = node
            {
                // No degenerate splits
                assert!(*split > bounds.min()[*axis]);
                assert!(*split < bounds.max()[*axis]);

                for child_id in [*left_id, *right_id] {
                    assert!(bounds.contains(&tree[child_id].bounds(), 0.0));
                }

                assert_eq!(*split, tree[*left_id].bounds().max()[*axis]);
                assert_eq!(*split, tree[*right_id].bounds().min()[*axis]);
            }
        }

        for &leaf_id in tree.leaves() {
            let leaf = &tree[leaf_id];
            let leaf_bb = leaf.bounds();

            assert!(!leaf.triangles().is_empty());

            for tri in leaf.triangles() {
                assert!(leaf_bb.overlaps(&tri.bounds(), EPS));
            }

            for (side, rope) in leaf.ropes().unwrap().iter() {
                let axis = side.axis();

                let (face, outer_face) = if side.is_positive() {
                    (leaf_bb.max()[axis], root_bb.max()[axis])
                } else {
                    (leaf_bb.min()[axis], root_bb.min()[axis])
                };

                let Some(rope) = rope else {
                    assert_eq!(outer_face, face);
                    continue;
                };

                let rope_bb = tree[rope].bounds();

                // Adjacency: the target starts where the leaf ends and
                // covers the leaf's face
                let rope_face = if side.is_positive() {
                    rope_bb.min()[axis]
                } else {
                    rope_bb.max()[axis]
                };

                assert!((rope_face - face).abs() <= EPS);

                for other in Axis::all() {
                    if other != axis {
                        assert!(rope_bb.min()[other] <= leaf_bb.min()[other]);
                        assert!(rope_bb.max()[other] >= leaf_bb.max()[other]);
                    }
                }

                // Symmetry: a neighboring leaf's rope leads back to us
                if let Some(back) = tree[rope].ropes() {
                    let back = back.get(side.opposite()).unwrap();

                    assert!(subtree_contains(tree, back, leaf_id));
                }
            }
        }
    }

    #[test]
    fn single_triangle() {
        let mut geometry = Geometry::default();

        geometry.add_mesh(
            "tri",
            &[Vec3::ZERO, vec3(1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0)],
            &[[0, 1, 2]],
        );

        let (tree, diagnostics) = build(&geometry, &Default::default());

        assert_eq!(1, tree.len());
        assert_eq!(&[tree.root()], tree.leaves());
        assert!(tree.internal_nodes().is_empty());
        assert_eq!(1, tree.depth_reached());
        assert_eq!(TriId::new(0), tree[tree.root()].triangles()[0].id());
        assert_eq!(tree[tree.root()].triangles()[0].bounds(), tree.bounds());

        assert!(tree[tree.root()]
            .ropes()
            .unwrap()
            .iter()
            .all(|(_, rope)| rope.is_none()));

        assert!(diagnostics.is_empty());
    }

    #[test]
    fn cube_grid() {
        let mut geometry = Geometry::default();

        add_cube_grid(&mut geometry, "grid", 2, 3.0);

        let config = KdTreeConfig {
            min_faces: 12,
            ..Default::default()
        };

        let (tree, diagnostics) = build(&geometry, &config);

        assert_well_formed(&tree);
        assert!(diagnostics.is_empty());

        assert_eq!(7, tree.internal_nodes().len());
        assert_eq!(8, tree.leaves().len());
        assert_eq!(4, tree.depth_reached());

        let KdNode::Internal { axis, split, .. } = tree[tree.root()] else {
            panic!("root should be split");
        };

        assert_eq!(Axis::X, axis);
        assert_eq!(1.0, split);

        for &leaf_id in tree.leaves() {
            let leaf = &tree[leaf_id];

            assert_eq!(12, leaf.triangles().len());

            // Each octant borders three others
            let ropes = leaf.ropes().unwrap();

            assert_eq!(
                3,
                ropes.iter().filter(|(_, rope)| rope.is_some()).count()
            );

            for (side, rope) in ropes.iter() {
                if let Some(rope) = rope {
                    assert!(tree[rope].is_leaf());
                    assert_eq!(
                        Some(leaf_id),
                        tree[rope].ropes().unwrap().get(side.opposite())
                    );
                }
            }
        }
    }

    #[test]
    fn identical_triangles() {
        let mut geometry = Geometry::default();

        let positions: Vec<_> = (0..8)
            .flat_map(|_| {
                [Vec3::ZERO, vec3(1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0)]
            })
            .collect();

        let faces: Vec<_> =
            (0..8).map(|i| [3 * i, 3 * i + 1, 3 * i + 2]).collect();

        geometry.add_mesh("pile", &positions, &faces);

        let (tree, diagnostics) = build(&geometry, &Default::default());

        assert_eq!(1, tree.len());
        assert_eq!(8, tree[tree.root()].triangles().len());

        assert!(diagnostics
            .of_kind(DiagnosticKind::StructuralFallback)
            .any(|diagnostic| diagnostic.level == log::Level::Warn
                && diagnostic.message.contains("around (0.33, 0.33, 0.00)")));
    }

    #[test]
    fn empty_object() {
        let mut diagnostics = Diagnostics::default();

        let result = KdTree::build(
            ObjectId::new(0),
            "empty",
            Vec::new(),
            &Default::default(),
            &mut diagnostics,
        );

        assert_eq!(
            Err(BuildError::EmptyObject {
                object: "empty".into()
            }),
            result
        );
    }

    #[test]
    fn triangle_soup() {
        let mut geometry = Geometry::default();

        add_triangle_soup(&mut geometry, "soup", 5, 2000, 30.0);

        for optimize_ropes in [false, true] {
            for min_faces in [1, 3, 8] {
                let config = KdTreeConfig {
                    min_faces,
                    optimize_ropes,
                    ..Default::default()
                };

                let (tree, _) = build(&geometry, &config);

                assert_well_formed(&tree);
                assert!(tree.leaves().len() > 1);
                assert!(
                    tree.depth_reached() <= config.depth_limit_for(2000) + 1
                );

                assert_eq!(
                    tree.len(),
                    tree.leaves().len() + tree.internal_nodes().len()
                );

                assert!(tree.triangle_refs() >= 2000);
            }
        }
    }

    #[test]
    fn depth_limit() {
        let mut geometry = Geometry::default();

        add_triangle_soup(&mut geometry, "soup", 6, 500, 30.0);

        let config = KdTreeConfig {
            min_faces: 1,
            depth_limit: Some(2),
            ..Default::default()
        };

        let (tree, _) = build(&geometry, &config);

        assert_well_formed(&tree);
        assert!(tree.depth_reached() <= 3);
        assert!(tree.leaves().len() <= 4);
    }

    #[test]
    fn optimized_ropes_point_deeper() {
        let mut geometry = Geometry::default();

        add_triangle_soup(&mut geometry, "soup", 8, 1000, 30.0);

        let (plain, _) = build(
            &geometry,
            &KdTreeConfig {
                optimize_ropes: false,
                ..Default::default()
            },
        );

        let (optimized, _) = build(&geometry, &Default::default());

        assert_eq!(plain.leaves(), optimized.leaves());

        let mut deeper = 0;

        for &leaf_id in plain.leaves() {
            let plain_ropes = plain[leaf_id].ropes().unwrap();
            let optimized_ropes = optimized[leaf_id].ropes().unwrap();

            for ((_, plain_rope), (_, optimized_rope)) in
                plain_ropes.iter().zip(optimized_ropes.iter())
            {
                assert_eq!(plain_rope.is_some(), optimized_rope.is_some());

                if let (Some(plain_rope), Some(optimized_rope)) =
                    (plain_rope, optimized_rope)
                {
                    assert!(subtree_contains(
                        &optimized,
                        plain_rope,
                        optimized_rope
                    ));

                    deeper += (plain_rope != optimized_rope) as usize;
                }
            }
        }

        assert!(deeper > 0);
    }

    #[test]
    fn determinism() {
        let mut geometry = Geometry::default();

        add_triangle_soup(&mut geometry, "soup", 9, 800, 20.0);

        let (a, _) = build(&geometry, &Default::default());
        let (b, _) = build(&geometry, &Default::default());

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a, b);
    }
}
