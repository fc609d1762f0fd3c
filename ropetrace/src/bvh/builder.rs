//! Per-object BVH builder: SAH over sorted triangle centers, optionally
//! refined with spatial splits, and a mean split for nodes too large for SAH.

use std::cmp::Ordering;

use super::{BvhNode, BvhNodeKind, BvhNodes};
use crate::{
    centroid_of, Axis, BoundingBox, BvhConfig, DiagnosticKind, Diagnostics,
    ObjectId, Tri,
};

/// Spatial splits are only tried when the children of the best object split
/// overlap by more than this share of the object's surface area.
const SPATIAL_SPLIT_MIN_OVERLAP: f32 = 1e-5;

/// Axes shorter than this are never split spatially.
const SPATIAL_SPLIT_MIN_EXTENT: f32 = 1e-5;

pub fn run(
    object_id: ObjectId,
    object: &str,
    tris: Vec<Tri>,
    config: &BvhConfig,
    diagnostics: &mut Diagnostics,
) -> BvhNodes {
    let max_faces = config.max_faces.max(1);

    let root_area = tris
        .iter()
        .map(|tri| tri.bounds())
        .collect::<BoundingBox>()
        .surface_area();

    let mut nodes = BvhNodes::default();
    let root_id = nodes.add(BvhNode::default());
    let mut stack = vec![(root_id, tris)];

    while let Some((id, tris)) = stack.pop() {
        let bounds: BoundingBox = tris.iter().map(|tri| tri.bounds()).collect();

        if tris.len() <= max_faces {
            nodes[id].bounds = bounds;
            nodes[id].kind = BvhNodeKind::Leaf {
                object_id,
                triangles: tris,
            };
            continue;
        }

        let (left, right) = if tris.len() <= config.sah_faces_limit {
            let split = split_by_sah(tris);

            if config.spatial_splits > 0
                && split.overlap() > SPATIAL_SPLIT_MIN_OVERLAP * root_area
            {
                let spatial_split = split_spatially(
                    split.tris(),
                    bounds,
                    config.spatial_splits,
                    split.cost,
                );

                spatial_split.unwrap_or(split).into_sides()
            } else {
                split.into_sides()
            }
        } else {
            diagnostics.debug(
                DiagnosticKind::SahLimitExceeded,
                object,
                format!(
                    "node with {} triangles exceeds the SAH limit; splitting \
                     at the mean center",
                    tris.len()
                ),
            );

            split_by_mean(tris, bounds, object, diagnostics)
        };

        if left.is_empty() || right.is_empty() {
            let mut tris = left;

            tris.extend(right);

            let centroid = centroid_of(&tris);

            diagnostics.warn(
                DiagnosticKind::StructuralFallback,
                object,
                format!(
                    "couldn't split node with {} triangles around \
                     ({:.2}, {:.2}, {:.2}); keeping it as a leaf",
                    tris.len(),
                    centroid.x,
                    centroid.y,
                    centroid.z,
                ),
            );

            nodes[id].bounds = bounds;
            nodes[id].kind = BvhNodeKind::Leaf {
                object_id,
                triangles: tris,
            };
            continue;
        }

        let depth = nodes[id].depth + 1;
        let left_id = nodes.add(BvhNode::default());
        let right_id = nodes.add(BvhNode::default());

        for child_id in [left_id, right_id] {
            nodes[child_id].parent = Some(id);
            nodes[child_id].depth = depth;
        }

        nodes[id].bounds = bounds;
        nodes[id].kind = BvhNodeKind::Internal { left_id, right_id };

        stack.push((right_id, right));
        stack.push((left_id, left));
    }

    nodes
}

fn compare_centers(axis: Axis, a: &Tri, b: &Tri) -> Ordering {
    a.center()[axis]
        .total_cmp(&b.center()[axis])
        .then_with(|| a.id().cmp(&b.id()))
}

#[derive(Clone, Copy, Debug)]
struct SplittingPlane {
    split_by: Axis,
    split_at: usize,
    split_cost: f32,
}

/// Triangles divided between two children, with the SAH cost of doing so.
#[derive(Clone, Debug, PartialEq)]
struct Split {
    left: Vec<Tri>,
    right: Vec<Tri>,
    cost: f32,
}

impl Split {
    /// Surface area of the common part of both children's boxes.
    fn overlap(&self) -> f32 {
        let left: BoundingBox = self.left.iter().map(|tri| tri.bounds()).collect();
        let right: BoundingBox =
            self.right.iter().map(|tri| tri.bounds()).collect();

        left.intersection(&right).surface_area()
    }

    /// All triangles of the split node, left side first.
    fn tris(&self) -> impl Iterator<Item = &Tri> + Clone + '_ {
        self.left.iter().chain(&self.right)
    }

    fn into_sides(self) -> (Vec<Tri>, Vec<Tri>) {
        (self.left, self.right)
    }
}

/// Splits triangles at the boundary with the lowest SAH cost over all three
/// axes.
fn split_by_sah(mut tris: Vec<Tri>) -> Split {
    let len = tris.len();
    let mut best: Option<SplittingPlane> = None;
    let mut right_areas = vec![0.0; len];

    for axis in Axis::all() {
        tris.sort_by(|a, b| compare_centers(axis, a, b));

        // right_areas[i] = area of the box around tris[i..]
        let mut right_bb = BoundingBox::default();

        for i in (1..len).rev() {
            right_bb += tris[i].bounds();
            right_areas[i] = right_bb.surface_area();
        }

        let mut left_bb = BoundingBox::default();

        for i in 0..len.saturating_sub(1) {
            left_bb += tris[i].bounds();

            let split_cost = left_bb.surface_area() * ((i + 1) as f32)
                + right_areas[i + 1] * ((len - i - 1) as f32);

            if best.map_or(true, |best| split_cost < best.split_cost) {
                best = Some(SplittingPlane {
                    split_by: axis,
                    split_at: i + 1,
                    split_cost,
                });
            }
        }
    }

    let (split_by, split_at, cost) = best.map_or(
        (Axis::X, len / 2, f32::MAX),
        |best| (best.split_by, best.split_at, best.split_cost),
    );

    tris.sort_by(|a, b| compare_centers(split_by, a, b));

    let right = tris.split_off(split_at);

    Split {
        left: tris,
        right,
        cost,
    }
}

/// Tries planes spread evenly over each axis of `bounds`, sending
/// triangles that straddle a plane to both sides (with their boxes clipped at
/// the plane); returns the cheapest such split if it beats `best_cost`.
///
/// Each side of the returned split holds fewer triangles than there were
/// before.
fn split_spatially<'a>(
    tris: impl Iterator<Item = &'a Tri> + Clone,
    bounds: BoundingBox,
    planes: u32,
    best_cost: f32,
) -> Option<Split> {
    let len = tris.clone().count();
    let mut best: Option<(Axis, f32, f32)> = None;

    for axis in Axis::all() {
        let node_min = bounds.min()[axis];
        let extent = bounds.extent()[axis];

        if extent < SPATIAL_SPLIT_MIN_EXTENT {
            continue;
        }

        let step = extent / (planes as f32 + 1.0);
        let mut prev_split_at = None;

        for i in 1..=planes {
            let split_at = node_min + step * (i as f32);

            if prev_split_at == Some(split_at) {
                continue;
            }

            prev_split_at = Some(split_at);

            let mut left_bb = BoundingBox::default();
            let mut right_bb = BoundingBox::default();
            let (mut left_count, mut right_count) = (0, 0);

            for tri in tris.clone() {
                if tri.bounds().min()[axis] <= split_at {
                    left_bb += clip_left(tri, axis, split_at).bounds();
                    left_count += 1;
                }

                if tri.bounds().max()[axis] >= split_at {
                    right_bb += clip_right(tri, axis, split_at).bounds();
                    right_count += 1;
                }
            }

            if left_count == 0
                || left_count == len
                || right_count == 0
                || right_count == len
            {
                continue;
            }

            let split_cost = left_bb.surface_area() * (left_count as f32)
                + right_bb.surface_area() * (right_count as f32);

            let best_so_far = best.map_or(best_cost, |(_, _, cost)| cost);

            if split_cost < best_so_far {
                best = Some((axis, split_at, split_cost));
            }
        }
    }

    let (axis, split_at, cost) = best?;

    let left = tris
        .clone()
        .filter(|tri| tri.bounds().min()[axis] <= split_at)
        .map(|tri| clip_left(tri, axis, split_at))
        .collect();

    let right = tris
        .filter(|tri| tri.bounds().max()[axis] >= split_at)
        .map(|tri| clip_right(tri, axis, split_at))
        .collect();

    Some(Split { left, right, cost })
}

fn clip_left(tri: &Tri, axis: Axis, split_at: f32) -> Tri {
    tri.clipped(axis, f32::NEG_INFINITY, split_at)
}

fn clip_right(tri: &Tri, axis: Axis, split_at: f32) -> Tri {
    tri.clipped(axis, split_at, f32::INFINITY)
}

/// Splits triangles at the mean center along the longest axis of `bounds`,
/// falling back to halving the list when that leaves one side empty.
///
/// Returns an empty right side when there's nothing to split.
fn split_by_mean(
    mut tris: Vec<Tri>,
    bounds: BoundingBox,
    object: &str,
    diagnostics: &mut Diagnostics,
) -> (Vec<Tri>, Vec<Tri>) {
    let axis = bounds.longest_axis();

    let mean = tris.iter().map(|tri| tri.center()[axis]).sum::<f32>()
        / (tris.len() as f32);

    let (left, right): (Vec<_>, Vec<_>) = tris
        .iter()
        .copied()
        .partition(|tri| tri.center()[axis] <= mean);

    if !left.is_empty() && !right.is_empty() {
        return (left, right);
    }

    if tris.len() < 2 {
        return (tris, Vec::new());
    }

    diagnostics.warn(
        DiagnosticKind::StructuralFallback,
        object,
        format!(
            "mean split of {} triangles along {} left one side empty; \
             halving the node instead",
            tris.len(),
            axis,
        ),
    );

    let right = tris.split_off(tris.len() / 2);

    (tris, right)
}
