use crate::{BvhNode, Hit, KdTreeView, Ray, TrianglesView, INVALID_ID};

/// Read-only view over the flattened BVH.
#[derive(Clone, Copy, Debug)]
pub struct BvhView<'a> {
    nodes: &'a [BvhNode],
    leaf_faces: &'a [u32],
}

impl<'a> BvhView<'a> {
    pub fn new(nodes: &'a [BvhNode], leaf_faces: &'a [u32]) -> Self {
        Self { nodes, leaf_faces }
    }

    pub fn get(&self, id: u32) -> BvhNode {
        self.nodes[id as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Walks the tree left-first without a stack, using parent links to find
    /// the next node; `f` decides whether to descend into a node's children.
    ///
    /// Left children of nodes flagged with `FLAG_SKIP_NEXT_LEFT` are not
    /// handed to `f` - the walk goes straight to their own children.
    pub fn visit(self, mut f: impl FnMut(u32, BvhNode) -> bool) {
        if self.nodes.is_empty() {
            return;
        }

        let mut id = 0;

        loop {
            let node = self.get(id);

            if f(id, node) && !node.is_leaf() {
                id = if node.skip_next_left() {
                    self.get(node.left_id()).left_id()
                } else {
                    node.left_id()
                };

                continue;
            }

            // Either a leaf or a subtree we've decided to skip - now ascend
            // until we're at a left child, then continue with its sibling
            loop {
                let parent_id = self.get(id).parent_id();

                if parent_id == INVALID_ID {
                    return;
                }

                let parent = self.get(parent_id);

                if parent.left_id() == id {
                    id = parent.right_id();
                    break;
                }

                id = parent_id;
            }
        }
    }

    /// Finds the nearest hit; returns the number of visited nodes.
    pub fn trace(
        self,
        triangles: TrianglesView,
        kd_trees: KdTreeView,
        ray: Ray,
        hit: &mut Hit,
    ) -> u32 {
        let mut visited = 0;

        self.visit(|_, node| {
            visited += 1;

            if ray.distance_to_node(node.bb_min(), node.bb_max())
                >= hit.distance
            {
                return false;
            }

            if node.is_kd_leaf() {
                kd_trees.trace(triangles, node.payload_offset(), ray, hit);
            } else if node.is_leaf() {
                let faces = node.payload_offset() as usize
                    ..(node.payload_offset() + node.payload_len()) as usize;

                for &face_id in &self.leaf_faces[faces] {
                    triangles.hit(face_id, ray, hit);
                }
            }

            true
        });

        visited
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{vec3, Vec3};

    use super::*;
    use crate::Face;

    const POSITIONS: [f32; 27] = [
        0.5, 0.0, 0.0, //
        0.5, 1.0, 0.0, //
        0.5, 0.0, 1.0, //
        1.5, 0.0, 0.0, //
        1.5, 1.0, 0.0, //
        1.5, 0.0, 1.0, //
        3.5, 0.0, 0.0, //
        3.5, 1.0, 0.0, //
        3.5, 0.0, 1.0, //
    ];

    fn faces() -> Vec<Face> {
        (0..3)
            .map(|id| Face::new([3 * id, 3 * id + 1, 3 * id + 2], [0; 3], id, 0))
            .collect()
    }

    fn plane(x: f32) -> (Vec3, Vec3) {
        (vec3(x, 0.0, 0.0), vec3(x, 1.0, 1.0))
    }

    //       0
    //     /   \
    //    1     4
    //   / \
    //  2   3
    fn nodes(skip_next_left: bool) -> Vec<BvhNode> {
        let (min2, max2) = plane(0.5);
        let (min3, max3) = plane(1.5);
        let (min4, max4) = plane(3.5);

        vec![
            BvhNode::internal(
                min2,
                max4,
                1,
                4,
                INVALID_ID,
                0,
                skip_next_left,
            ),
            BvhNode::internal(min2, max3, 2, 3, 0, 0, false),
            BvhNode::leaf(min2, max2, 0, 1, 1, 0, 0, false),
            BvhNode::leaf(min3, max3, 1, 1, 1, 0, 0, false),
            BvhNode::leaf(min4, max4, 2, 1, 0, 0, 0, false),
        ]
    }

    fn visit_all(skip_next_left: bool) -> Vec<u32> {
        let nodes = nodes(skip_next_left);
        let mut visited = Vec::new();

        BvhView::new(&nodes, &[]).visit(|id, _| {
            visited.push(id);
            true
        });

        visited
    }

    #[test]
    fn visit() {
        assert_eq!(vec![0, 1, 2, 3, 4], visit_all(false));
        assert_eq!(vec![0, 2, 3, 4], visit_all(true));
    }

    #[test]
    fn visit_without_descending() {
        let nodes = nodes(false);
        let mut visited = Vec::new();

        BvhView::new(&nodes, &[]).visit(|id, _| {
            visited.push(id);
            id != 1
        });

        assert_eq!(vec![0, 1, 4], visited);
    }

    #[test]
    fn trace() {
        let faces = faces();
        let nodes = nodes(false);
        let leaf_faces = [0, 1, 2];
        let triangles = TrianglesView::new(&faces, &POSITIONS);
        let kd_trees = KdTreeView::new(&[], &[], &[]);
        let bvh = BvhView::new(&nodes, &leaf_faces);

        let mut hit = Hit::none();
        let ray = Ray::new(vec3(-1.0, 0.2, 0.2), vec3(1.0, 0.0, 0.0));

        bvh.trace(triangles, kd_trees, ray, &mut hit);

        assert_eq!(0, hit.face_id);
        assert_relative_eq!(1.5, hit.distance);

        // ---

        let mut hit = Hit::none();
        let ray = Ray::new(vec3(5.0, 0.2, 0.2), vec3(-1.0, 0.0, 0.0));

        bvh.trace(triangles, kd_trees, ray, &mut hit);

        assert_eq!(2, hit.face_id);
        assert_relative_eq!(1.5, hit.distance);
        assert_eq!(triangles.trace_brute_force(ray), hit);
    }
}
