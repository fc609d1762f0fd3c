use super::{KdNode, KdNodeId, KdNodes, Ropes, Side};
use crate::BoundingBox;

/// Connects every leaf with its neighbors.
///
/// Ropes are handed down from the root: splitting a node on axis `a` links
/// the left child's `+a` side with the right child (and vice versa), while
/// the remaining sides are inherited from the parent.
pub fn run(nodes: &mut KdNodes, optimize: bool) {
    let mut stack = vec![(KdNodeId::root(), Ropes::default())];

    while let Some((id, mut ropes)) = stack.pop() {
        if optimize {
            let bounds = nodes[id].bounds();

            for side in Side::all() {
                if let Some(rope) = ropes.get(side) {
                    let rope = optimize_rope(nodes, rope, side, bounds);

                    ropes.set(side, Some(rope));
                }
            }
        }

        match &mut nodes[id] {
            KdNode::Internal {
                axis,
                left_id,
                right_id,
                ..
            } => {
                let (axis, left_id, right_id) = (*axis, *left_id, *right_id);

                let mut left_ropes = ropes;
                let mut right_ropes = ropes;

                left_ropes.set(Side::new(axis, true), Some(right_id));
                right_ropes.set(Side::new(axis, false), Some(left_id));

                stack.push((right_id, right_ropes));
                stack.push((left_id, left_ropes));
            }

            KdNode::Leaf {
                ropes: leaf_ropes, ..
            } => {
                *leaf_ropes = ropes;
            }
        }
    }
}

/// Pushes rope down the target's subtree for as long as only one child of
/// the target can be adjacent to `bounds` on given side.
fn optimize_rope(
    nodes: &KdNodes,
    mut rope: KdNodeId,
    side: Side,
    bounds: BoundingBox,
) -> KdNodeId {
    while let KdNode::Internal {
        axis,
        split,
        left_id,
        right_id,
        ..
    } = nodes[rope]
    {
        rope = if axis == side.axis() {
            if side.is_positive() {
                left_id
            } else {
                right_id
            }
        } else if split <= bounds.min()[axis] {
            right_id
        } else if split >= bounds.max()[axis] {
            left_id
        } else {
            break;
        };
    }

    rope
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Axis;

    fn bb(min: [f32; 3], max: [f32; 3]) -> BoundingBox {
        BoundingBox::new(min.into(), max.into())
    }

    fn leaf(nodes: &mut KdNodes, bounds: BoundingBox) -> KdNodeId {
        nodes.add(KdNode::Leaf {
            bounds,
            triangles: Vec::new(),
            ropes: Default::default(),
        })
    }

    /// Builds a 2×2 grid (split on X at 1, then on Y at 1 in both halves):
    ///
    /// ```text
    ///   y
    ///   2 +----+----+
    ///     | 3  | 6  |
    ///   1 +----+----+
    ///     | 2  | 5  |
    ///   0 +----+----+ x
    ///     0    1    2
    /// ```
    fn grid() -> (KdNodes, [KdNodeId; 4]) {
        let mut nodes = KdNodes::default();

        let root = nodes.add(KdNode::default());
        let left = nodes.add(KdNode::default());
        let bottom_left = leaf(&mut nodes, bb([0.0; 3], [1.0, 1.0, 1.0]));
        let top_left = leaf(&mut nodes, bb([0.0, 1.0, 0.0], [1.0, 2.0, 1.0]));
        let right = nodes.add(KdNode::default());
        let bottom_right =
            leaf(&mut nodes, bb([1.0, 0.0, 0.0], [2.0, 1.0, 1.0]));
        let top_right = leaf(&mut nodes, bb([1.0, 1.0, 0.0], [2.0, 2.0, 1.0]));

        nodes[root] = KdNode::Internal {
            bounds: bb([0.0; 3], [2.0, 2.0, 1.0]),
            axis: Axis::X,
            split: 1.0,
            left_id: left,
            right_id: right,
        };

        nodes[left] = KdNode::Internal {
            bounds: bb([0.0; 3], [1.0, 2.0, 1.0]),
            axis: Axis::Y,
            split: 1.0,
            left_id: bottom_left,
            right_id: top_left,
        };

        nodes[right] = KdNode::Internal {
            bounds: bb([1.0, 0.0, 0.0], [2.0, 2.0, 1.0]),
            axis: Axis::Y,
            split: 1.0,
            left_id: bottom_right,
            right_id: top_right,
        };

        (nodes, [bottom_left, top_left, bottom_right, top_right])
    }

    #[test]
    fn unoptimized() {
        let (mut nodes, [bottom_left, top_left, bottom_right, _]) = grid();

        run(&mut nodes, false);

        let ropes = nodes[bottom_left].ropes().unwrap();

        assert_eq!(None, ropes.get(Side::new(Axis::X, false)));
        assert_eq!(Some(top_left), ropes.get(Side::new(Axis::Y, true)));
        assert_eq!(None, ropes.get(Side::new(Axis::Z, true)));

        // Points at the whole right half
        assert_eq!(
            Some(KdNodeId::new(4)),
            ropes.get(Side::new(Axis::X, true))
        );

        let ropes = nodes[bottom_right].ropes().unwrap();

        assert_eq!(
            Some(KdNodeId::new(1)),
            ropes.get(Side::new(Axis::X, false))
        );
    }

    #[test]
    fn optimized() {
        let (mut nodes, [bottom_left, top_left, bottom_right, top_right]) =
            grid();

        run(&mut nodes, true);

        let ropes = nodes[bottom_left].ropes().unwrap();

        assert_eq!(Some(bottom_right), ropes.get(Side::new(Axis::X, true)));
        assert_eq!(Some(top_left), ropes.get(Side::new(Axis::Y, true)));

        let ropes = nodes[top_right].ropes().unwrap();

        assert_eq!(Some(top_left), ropes.get(Side::new(Axis::X, false)));
        assert_eq!(Some(bottom_right), ropes.get(Side::new(Axis::Y, false)));
        assert_eq!(None, ropes.get(Side::new(Axis::Y, true)));
    }

    #[test]
    fn optimize_rope_stops_at_straddled_split() {
        let (nodes, _) = grid();

        let side = Side::new(Axis::X, true);

        // A box spanning both rows can't pick either of them
        let bounds = bb([-1.0, 0.0, 0.0], [0.0, 2.0, 1.0]);
        let rope = optimize_rope(&nodes, KdNodeId::root(), side, bounds);

        assert_eq!(KdNodeId::new(1), rope);

        let bounds = bb([-1.0, 1.0, 0.0], [0.0, 2.0, 1.0]);
        let rope = optimize_rope(&nodes, KdNodeId::root(), side, bounds);

        assert_eq!(KdNodeId::new(3), rope);
    }
}
