use glam::{BVec3, Vec3};

use crate::{AccelStructure, Axis, BoundingBox, KdNode};

/// Line-list rendering of an acceleration structure, for debugging.
///
/// For the `Bvh` variant it contains the box of every leaf; for the
/// `BvhKdTree` variant it contains the box of every k-d tree together with
/// every split plane (cut down to its node's box).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Wireframe {
    vertices: Vec<f32>,
    indices: Vec<u32>,
}

impl Wireframe {
    pub fn of(accel: &AccelStructure) -> Self {
        let mut this = Self::default();

        match accel {
            AccelStructure::Bvh(bvh) => {
                for &id in bvh.leaves() {
                    this.add_box(bvh[id].bounds);
                }
            }

            AccelStructure::BvhKdTree { kd_trees, .. } => {
                for tree in kd_trees.values() {
                    this.add_box(tree.bounds());

                    for &id in tree.internal_nodes() {
                        if let KdNode::Internal {
                            bounds,
                            axis,
                            split,
                            ..
                        } = tree[id]
                        {
                            this.add_plane(bounds, axis, split);
                        }
                    }
                }
            }
        }

        this
    }

    /// Flat `xyz` triples.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Pairs of vertex indices, one pair per line.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn line_count(&self) -> usize {
        self.indices.len() / 2
    }

    fn add_vertex(&mut self, vertex: Vec3) -> u32 {
        self.vertices.extend(vertex.to_array());

        (self.vertices.len() / 3 - 1) as u32
    }

    fn add_box(&mut self, bounds: BoundingBox) {
        if !bounds.is_set() {
            return;
        }

        let (min, max) = (bounds.min(), bounds.max());

        let corners: Vec<_> = (0..8)
            .map(|i| {
                self.add_vertex(Vec3::select(
                    BVec3::new(i & 1 != 0, i & 2 != 0, i & 4 != 0),
                    max,
                    min,
                ))
            })
            .collect();

        for i in 0..8 {
            for bit in [1, 2, 4] {
                if i & bit == 0 {
                    self.indices.extend([corners[i], corners[i | bit]]);
                }
            }
        }
    }

    fn add_plane(&mut self, bounds: BoundingBox, axis: Axis, split: f32) {
        let mut others = Axis::all().into_iter().filter(|&other| other != axis);

        let (Some(b), Some(c)) = (others.next(), others.next()) else {
            return;
        };

        let corners = [(false, false), (true, false), (true, true), (false, true)];

        let corners: Vec<_> = corners
            .into_iter()
            .map(|(use_max_b, use_max_c)| {
                let mut vertex = Vec3::ZERO;

                vertex[axis] = split;

                vertex[b] = if use_max_b {
                    bounds.max()[b]
                } else {
                    bounds.min()[b]
                };

                vertex[c] = if use_max_c {
                    bounds.max()[c]
                } else {
                    bounds.min()[c]
                };

                self.add_vertex(vertex)
            })
            .collect();

        for i in 0..4 {
            self.indices.extend([corners[i], corners[(i + 1) % 4]]);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{vec3, Vec3};

    use super::*;
    use crate::test_utils::*;
    use crate::{build, BuildConfig, BvhConfig, Geometry, Variant};

    #[test]
    fn bvh() {
        let mut geometry = Geometry::default();

        add_cube(&mut geometry, "a", Vec3::ZERO);
        add_cube(&mut geometry, "b", vec3(3.0, 0.0, 0.0));

        let config = BuildConfig {
            accel_struct: Variant::Bvh,
            bvh: BvhConfig {
                max_faces: 12,
                ..Default::default()
            },
            ..Default::default()
        };

        let accel = build(&geometry, &config).unwrap().accel;
        let wireframe = Wireframe::of(&accel);

        assert_eq!(2, accel.bvh().leaves().len());
        assert_eq!(2 * 8 * 3, wireframe.vertices().len());
        assert_eq!(2 * 12, wireframe.line_count());

        // Every vertex lies on one of the cubes' corners
        for vertex in wireframe.vertices().chunks(3) {
            assert!(vertex[1] == 0.0 || vertex[1] == 1.0);
            assert!([0.0, 1.0, 3.0, 4.0].contains(&vertex[0]));
        }
    }

    #[test]
    fn bvh_kd_tree() {
        let mut geometry = Geometry::default();

        add_cube_grid(&mut geometry, "grid", 2, 3.0);

        let mut config = BuildConfig::default();

        config.kd_tree.min_faces = 12;

        let accel = build(&geometry, &config).unwrap().accel;
        let wireframe = Wireframe::of(&accel);

        // Bounding box plus seven split planes
        assert_eq!(12 + 7 * 4, wireframe.line_count());
        assert_eq!((8 + 7 * 4) * 3, wireframe.vertices().len());
    }

    #[test]
    fn skips_empty_leaves() {
        let mut geometry = Geometry::default();

        geometry.add_mesh("empty", &[], &[]);

        let config = BuildConfig {
            accel_struct: Variant::Bvh,
            ..Default::default()
        };

        let accel = build(&geometry, &config).unwrap().accel;

        assert_eq!(Wireframe::default(), Wireframe::of(&accel));
    }
}
