use crate::{Hit, KdNode, Ray, TrianglesView, INVALID_ID, MAX_ROPE_STEPS};

/// Read-only view over the flattened k-d trees of a scene.
#[derive(Clone, Copy, Debug)]
pub struct KdTreeView<'a> {
    nodes: &'a [KdNode],
    ropes: &'a [u32],
    leaf_faces: &'a [u32],
}

impl<'a> KdTreeView<'a> {
    /// How far past a leaf's exit a hit may lie and still be accepted within
    /// that leaf.
    pub const EXIT_EPSILON: f32 = 1e-4;

    pub fn new(
        nodes: &'a [KdNode],
        ropes: &'a [u32],
        leaf_faces: &'a [u32],
    ) -> Self {
        Self {
            nodes,
            ropes,
            leaf_faces,
        }
    }

    pub fn get(&self, id: u32) -> KdNode {
        self.nodes[id as usize]
    }

    pub fn rope(&self, leaf: KdNode, side: u32) -> u32 {
        self.ropes[(leaf.ropes_offset() + side) as usize]
    }

    /// Walks the tree rooted at `root_id` leaf-to-leaf over ropes, updating
    /// `hit` if something nearer than it is found; returns the number of
    /// visited leaves.
    pub fn trace(
        self,
        triangles: TrianglesView,
        root_id: u32,
        ray: Ray,
        hit: &mut Hit,
    ) -> u32 {
        let root = self.get(root_id);

        let Some((entry, exit)) =
            ray.intersect_box(root.bb_min(), root.bb_max())
        else {
            return 0;
        };

        let mut entry = entry.max(0.0);
        let mut node_id = root_id;
        let mut visited = 0;

        while visited < MAX_ROPE_STEPS {
            if entry > exit || entry >= hit.distance {
                break;
            }

            visited += 1;

            // Descend from wherever the last rope pointed us into the leaf
            // containing the entry point
            let point = ray.at(entry);
            let mut node = self.get(node_id);

            while !node.is_leaf() {
                let axis = node.axis() as usize;

                let goes_left = point[axis] < node.split()
                    || (point[axis] == node.split()
                        && ray.direction()[axis] < 0.0);

                node_id = if goes_left {
                    node.left_id()
                } else {
                    node.right_id()
                };

                node = self.get(node_id);
            }

            // ---

            let (leaf_exit, exit_side) =
                ray.exit_box(node.bb_min(), node.bb_max());

            let mut leaf_hit = Hit {
                distance: hit.distance.min(leaf_exit + Self::EXIT_EPSILON),
                ..Hit::none()
            };

            let faces = node.faces_offset() as usize
                ..(node.faces_offset() + node.faces_len()) as usize;

            for &face_id in &self.leaf_faces[faces] {
                triangles.hit(face_id, ray, &mut leaf_hit);
            }

            if leaf_hit.is_some() {
                *hit = leaf_hit;
                break;
            }

            // ---

            let rope = self.rope(node, exit_side);

            if rope == INVALID_ID {
                break;
            }

            node_id = rope;
            entry = leaf_exit;
        }

        visited
    }
}
