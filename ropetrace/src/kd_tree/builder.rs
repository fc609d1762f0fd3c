//! SAH k-d tree builder.
//!
//! Triangles straddling a split plane go to both children, and children get
//! boxes clipped at the plane - so, unlike in the BVH, sibling boxes never
//! overlap.

use std::cmp::Ordering;

use super::{KdNode, KdNodeId, KdNodes};
use crate::{
    centroid_of, Axis, BoundingBox, DiagnosticKind, Diagnostics, KdTreeConfig,
    Tri,
};

struct WorkItem {
    id: KdNodeId,
    bounds: BoundingBox,
    tris: Vec<Tri>,
    depth: u32,
}

/// Builds the tree (without ropes); returns its nodes and the deepest level
/// reached (the root is at level 1).
pub fn run(
    tris: Vec<Tri>,
    config: &KdTreeConfig,
    object: &str,
    diagnostics: &mut Diagnostics,
) -> (KdNodes, u32) {
    let min_faces = config.min_faces.max(1);
    let depth_limit = config.depth_limit_for(tris.len());
    let mut nodes = KdNodes::default();
    let mut depth_reached = 0;

    let root = WorkItem {
        id: nodes.add(KdNode::default()),
        bounds: tris.iter().map(|tri| tri.bounds()).collect(),
        tris,
        depth: 1,
    };

    let mut stack = vec![root];

    while let Some(item) = stack.pop() {
        depth_reached = depth_reached.max(item.depth);

        let plane = if item.tris.len() <= min_faces || item.depth > depth_limit
        {
            None
        } else {
            find_splitting_plane(&item.tris, item.bounds, object, diagnostics)
        };

        let Some(plane) = plane else {
            nodes[item.id] = leaf(item.bounds, item.tris);
            continue;
        };

        let (left, right) = partition(&item.tris, plane.split_by, plane.split_at);

        if left.len().min(right.len()) < min_faces {
            nodes[item.id] = leaf(item.bounds, item.tris);
            continue;
        }

        let left_id = nodes.add(KdNode::default());
        let right_id = nodes.add(KdNode::default());

        nodes[item.id] = KdNode::Internal {
            bounds: item.bounds,
            axis: plane.split_by,
            split: plane.split_at,
            left_id,
            right_id,
        };

        stack.push(WorkItem {
            id: right_id,
            bounds: item.bounds.with_min(plane.split_by, plane.split_at),
            tris: right,
            depth: item.depth + 1,
        });

        stack.push(WorkItem {
            id: left_id,
            bounds: item.bounds.with_max(plane.split_by, plane.split_at),
            tris: left,
            depth: item.depth + 1,
        });
    }

    (nodes, depth_reached)
}

fn leaf(bounds: BoundingBox, triangles: Vec<Tri>) -> KdNode {
    KdNode::Leaf {
        bounds,
        triangles,
        ropes: Default::default(),
    }
}

#[derive(Clone, Copy, Debug)]
struct SplittingPlane {
    split_by: Axis,
    split_at: f32,
    split_cost: f32,
}

fn compare_bounds(axis: Axis, a: &Tri, b: &Tri) -> Ordering {
    let (a_bb, b_bb) = (a.bounds(), b.bounds());

    a_bb.min()[axis]
        .total_cmp(&b_bb.min()[axis])
        .then_with(|| a_bb.max()[axis].total_cmp(&b_bb.max()[axis]))
        .then_with(|| a.id().cmp(&b.id()))
}

/// Returns how many triangles land on the left and right side of given plane;
/// straddling triangles are counted on both.
fn count(tris: &[Tri], axis: Axis, split_at: f32) -> (usize, usize) {
    tris.iter().fold((0, 0), |(left, right), tri| {
        (
            left + (tri.bounds().min()[axis] <= split_at) as usize,
            right + (tri.bounds().max()[axis] > split_at) as usize,
        )
    })
}

fn partition(tris: &[Tri], axis: Axis, split_at: f32) -> (Vec<Tri>, Vec<Tri>) {
    let left = tris
        .iter()
        .filter(|tri| tri.bounds().min()[axis] <= split_at)
        .copied()
        .collect();

    let right = tris
        .iter()
        .filter(|tri| tri.bounds().max()[axis] > split_at)
        .copied()
        .collect();

    (left, right)
}

fn find_splitting_plane(
    tris: &[Tri],
    bounds: BoundingBox,
    object: &str,
    diagnostics: &mut Diagnostics,
) -> Option<SplittingPlane> {
    let len = tris.len();
    let mut best: Option<SplittingPlane> = None;
    let mut sorted = tris.to_vec();
    let mut maxs = vec![0.0; len];
    let mut right_areas = vec![0.0; len];

    for axis in Axis::all() {
        let node_min = bounds.min()[axis];
        let node_max = bounds.max()[axis];

        sorted.sort_by(|a, b| compare_bounds(axis, a, b));

        for (max, tri) in maxs.iter_mut().zip(&sorted) {
            *max = tri.bounds().max()[axis];
        }

        maxs.sort_by(f32::total_cmp);

        // right_areas[i] = area of the box around sorted[i..], clipped to
        // the node
        let mut right_bb = BoundingBox::default();

        for i in (1..len).rev() {
            right_bb += sorted[i].bounds();
            right_areas[i] = right_bb.intersection(&bounds).surface_area();
        }

        let mut left_bb = BoundingBox::default();

        for i in 0..(len - 1) {
            left_bb += sorted[i].bounds();

            let split_at = left_bb.max()[axis];

            if split_at <= node_min || split_at >= node_max {
                continue;
            }

            let left_count = sorted
                .partition_point(|tri| tri.bounds().min()[axis] <= split_at);

            let right_count =
                len - maxs.partition_point(|&max| max <= split_at);

            if left_count == 0
                || left_count == len
                || right_count == 0
                || right_count == len
            {
                continue;
            }

            let split_cost = left_bb.intersection(&bounds).surface_area()
                * (left_count as f32)
                + right_areas[i + 1] * (right_count as f32);

            if best.map_or(true, |best| split_cost < best.split_cost) {
                best = Some(SplittingPlane {
                    split_by: axis,
                    split_at,
                    split_cost,
                });
            }
        }
    }

    if best.is_some() {
        return best;
    }

    // ---

    diagnostics.debug(
        DiagnosticKind::StructuralFallback,
        object,
        format!(
            "no SAH split candidate for node with {} triangles; trying \
             the midpoint",
            len
        ),
    );

    for axis in Axis::all() {
        let split_at = bounds.center()[axis];
        let (left_count, right_count) = count(tris, axis, split_at);

        if left_count > 0
            && left_count < len
            && right_count > 0
            && right_count < len
        {
            return Some(SplittingPlane {
                split_by: axis,
                split_at,
                split_cost: f32::MAX,
            });
        }
    }

    let centroid = centroid_of(tris);

    diagnostics.warn(
        DiagnosticKind::StructuralFallback,
        object,
        format!(
            "couldn't split node with {} triangles around \
             ({:.2}, {:.2}, {:.2}); keeping it as a leaf",
            len, centroid.x, centroid.y, centroid.z,
        ),
    );

    None
}
