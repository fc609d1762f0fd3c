use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use fxhash::FxHasher;
use rayon::prelude::*;

use crate::utils::{measure, Elapsed};
use crate::{
    Bvh, BvhNodeId, BvhNodes, BuildConfig, BuildError, DiagnosticKind,
    Diagnostics, Geometry, KdTree, ObjectId, SceneObject, Variant,
};

/// Two-level acceleration structure of a scene.
#[derive(Clone, Debug, PartialEq)]
pub enum AccelStructure {
    /// BVH whose leaves hold triangles directly
    Bvh(Bvh),

    /// BVH over objects; each object is a single leaf pointing at that
    /// object's k-d tree
    BvhKdTree {
        bvh: Bvh,
        kd_trees: BTreeMap<BvhNodeId, KdTree>,
    },
}

impl AccelStructure {
    pub fn variant(&self) -> Variant {
        match self {
            AccelStructure::Bvh(_) => Variant::Bvh,
            AccelStructure::BvhKdTree { .. } => Variant::BvhKdTree,
        }
    }

    pub fn bvh(&self) -> &Bvh {
        match self {
            AccelStructure::Bvh(bvh) => bvh,
            AccelStructure::BvhKdTree { bvh, .. } => bvh,
        }
    }

    /// Returns k-d trees keyed by the BVH leaves they hang off of; empty for
    /// the `Bvh` variant.
    pub fn kd_trees(&self) -> impl Iterator<Item = (BvhNodeId, &KdTree)> + '_ {
        let kd_trees = match self {
            AccelStructure::Bvh(_) => None,
            AccelStructure::BvhKdTree { kd_trees, .. } => Some(kd_trees),
        };

        kd_trees
            .into_iter()
            .flat_map(|kd_trees| kd_trees.iter())
            .map(|(id, tree)| (*id, tree))
    }

    pub fn kd_tree(&self, id: BvhNodeId) -> Option<&KdTree> {
        match self {
            AccelStructure::Bvh(_) => None,
            AccelStructure::BvhKdTree { kd_trees, .. } => kd_trees.get(&id),
        }
    }

    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();

        self.bvh().fingerprint().hash(&mut hasher);

        for (id, tree) in self.kd_trees() {
            id.hash(&mut hasher);
            tree.fingerprint().hash(&mut hasher);
        }

        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuildStats {
    pub variant: Variant,
    pub objects: usize,
    pub triangles: usize,
    pub bvh_nodes: usize,
    pub bvh_leaves: usize,
    pub bvh_depth: u32,
    pub kd_trees: usize,
    pub kd_nodes: usize,
    pub kd_leaves: usize,
    pub kd_depth: u32,
    pub avg_faces_per_leaf: f32,
    pub fingerprint: u64,

    /// Time spent building per-object subtrees
    pub objects_time: Duration,

    /// Time spent merging, ordering and relabelling the top-level tree
    pub bvh_time: Duration,
}

/// Outcome of a successful build.
#[derive(Clone, Debug)]
pub struct Build {
    pub accel: AccelStructure,
    pub diagnostics: Diagnostics,
    pub stats: BuildStats,
}

/// Builds the acceleration structure of given scene.
///
/// Objects are built independently (in parallel) and then merged into the
/// top-level BVH; diagnostics are collected in object order, so they are
/// deterministic. Diagnostics are also forwarded to the `log` facade.
pub fn build(
    geometry: &Geometry,
    config: &BuildConfig,
) -> Result<Build, BuildError> {
    let config = config.clone().validated();

    if geometry.objects().is_empty() {
        return Err(BuildError::NoObjects);
    }

    log::info!(
        "Building acceleration structure; variant={}, objects={}, triangles={}",
        config.accel_struct,
        geometry.objects().len(),
        geometry.face_count(),
    );

    let (subtrees, objects_time) = measure(|| {
        geometry
            .objects()
            .par_iter()
            .enumerate()
            .map(|(id, object)| {
                build_object(geometry, ObjectId::new(id as u32), object, &config)
            })
            .collect::<Result<Vec<_>, _>>()
    });

    let mut diagnostics = Diagnostics::default();
    let mut nodes = Vec::new();
    let mut kd_trees = Vec::new();

    for subtree in subtrees? {
        diagnostics.extend(subtree.diagnostics);

        if let Some(subtree_nodes) = subtree.nodes {
            nodes.push(subtree_nodes);
            kd_trees.push(subtree.kd_tree);
        }
    }

    if nodes.is_empty() {
        diagnostics.emit();

        return Err(BuildError::NoObjects);
    }

    let (bvh, bvh_time) =
        measure(|| Bvh::build(nodes, &config.bvh, &mut diagnostics));

    let (bvh, roots) = bvh?;

    let accel = match config.accel_struct {
        Variant::Bvh => AccelStructure::Bvh(bvh),

        Variant::BvhKdTree => {
            let kd_trees = roots
                .into_iter()
                .zip(kd_trees)
                .filter_map(|(root, tree)| Some((root, tree?)))
                .collect();

            AccelStructure::BvhKdTree { bvh, kd_trees }
        }
    };

    diagnostics.emit();

    let stats = BuildStats::new(&accel, geometry, objects_time, bvh_time);

    log::info!(
        "Acceleration structure built; bvh-nodes={}, bvh-leaves={}, \
         bvh-depth={}, kd-nodes={}, kd-leaves={}, kd-depth={}, \
         faces-per-leaf={:.2}, took={} (+ {} for bvh), fingerprint={:016x}",
        stats.bvh_nodes,
        stats.bvh_leaves,
        stats.bvh_depth,
        stats.kd_nodes,
        stats.kd_leaves,
        stats.kd_depth,
        stats.avg_faces_per_leaf,
        Elapsed(stats.objects_time),
        Elapsed(stats.bvh_time),
        stats.fingerprint,
    );

    Ok(Build {
        accel,
        diagnostics,
        stats,
    })
}

struct Subtree {
    /// `None` if the object got skipped
    nodes: Option<BvhNodes>,
    kd_tree: Option<KdTree>,
    diagnostics: Diagnostics,
}

fn build_object(
    geometry: &Geometry,
    object_id: ObjectId,
    object: &SceneObject,
    config: &BuildConfig,
) -> Result<Subtree, BuildError> {
    let mut diagnostics = Diagnostics::default();
    let tris = geometry.triangles(object_id)?;

    log::debug!(
        "Building object `{}`; triangles={}",
        object.name(),
        tris.len()
    );

    match config.accel_struct {
        Variant::Bvh => {
            let nodes = Bvh::build_object(
                object_id,
                object.name(),
                tris,
                &config.bvh,
                &mut diagnostics,
            );

            Ok(Subtree {
                nodes: Some(nodes),
                kd_tree: None,
                diagnostics,
            })
        }

        Variant::BvhKdTree => {
            let tree = KdTree::build(
                object_id,
                object.name(),
                tris,
                &config.kd_tree,
                &mut diagnostics,
            );

            match tree {
                Ok(tree) => Ok(Subtree {
                    nodes: Some(Bvh::leaf(object_id, tree.bounds())),
                    kd_tree: Some(tree),
                    diagnostics,
                }),

                Err(BuildError::EmptyObject { .. })
                    if config.kd_tree.skip_empty_objects =>
                {
                    diagnostics.error(
                        DiagnosticKind::EmptyObject,
                        object.name(),
                        "object has no triangles; skipping it",
                    );

                    Ok(Subtree {
                        nodes: None,
                        kd_tree: None,
                        diagnostics,
                    })
                }

                Err(err) => Err(err),
            }
        }
    }
}

impl BuildStats {
    fn new(
        accel: &AccelStructure,
        geometry: &Geometry,
        objects_time: Duration,
        bvh_time: Duration,
    ) -> Self {
        let bvh = accel.bvh();

        let (kd_trees, kd_nodes, kd_leaves, kd_depth, kd_refs) =
            accel.kd_trees().fold(
                (0, 0, 0, 0, 0),
                |(trees, nodes, leaves, depth, refs), (_, tree)| {
                    (
                        trees + 1,
                        nodes + tree.len(),
                        leaves + tree.leaves().len(),
                        depth.max(tree.depth_reached()),
                        refs + tree.triangle_refs(),
                    )
                },
            );

        let avg_faces_per_leaf = match accel {
            AccelStructure::Bvh(bvh) => {
                (bvh.triangle_count() as f32) / (bvh.leaves().len() as f32)
            }

            AccelStructure::BvhKdTree { .. } => {
                (kd_refs as f32) / (kd_leaves.max(1) as f32)
            }
        };

        Self {
            variant: accel.variant(),
            objects: geometry.objects().len(),
            triangles: geometry.face_count(),
            bvh_nodes: bvh.len(),
            bvh_leaves: bvh.leaves().len(),
            bvh_depth: bvh.depth_reached(),
            kd_trees,
            kd_nodes,
            kd_leaves,
            kd_depth,
            avg_faces_per_leaf,
            fingerprint: accel.fingerprint(),
            objects_time,
            bvh_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::{vec3, Vec3};

    use super::*;
    use crate::test_utils::*;

    fn config(accel_struct: Variant) -> BuildConfig {
        BuildConfig {
            accel_struct,
            ..Default::default()
        }
    }

    #[test]
    fn no_objects() {
        let geometry = Geometry::default();

        for variant in [Variant::Bvh, Variant::BvhKdTree] {
            assert_eq!(
                Some(BuildError::NoObjects),
                build(&geometry, &config(variant)).err()
            );
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

        let build = build(&geometry, &config(Variant::BvhKdTree)).unwrap();
        let bvh = build.accel.bvh();

        assert_eq!(1, bvh.len());
        assert!(build.diagnostics.is_empty());

        let tree = build.accel.kd_tree(bvh.root()).unwrap();

        assert_eq!(1, tree.len());
        assert_eq!(1, build.stats.kd_leaves);
        assert_eq!(1.0, build.stats.avg_faces_per_leaf);
    }

    #[test]
    fn two_objects() {
        let mut geometry = Geometry::default();

        add_cube(&mut geometry, "a", Vec3::ZERO);
        add_cube(&mut geometry, "b", vec3(5.0, 0.0, 0.0));

        let build = build(&geometry, &config(Variant::BvhKdTree)).unwrap();
        let bvh = build.accel.bvh();

        assert_eq!(3, bvh.len());
        assert_eq!(2, build.stats.kd_trees);

        let (left_id, right_id) = bvh[bvh.root()].children().unwrap();

        let mut objects: Vec<_> = [left_id, right_id]
            .into_iter()
            .map(|id| build.accel.kd_tree(id).unwrap().object_id().get())
            .collect();

        objects.sort();

        assert_eq!(vec![0, 1], objects);

        for (id, tree) in build.accel.kd_trees() {
            assert_eq!(bvh[id].bounds, tree.bounds());
        }
    }

    #[test]
    fn empty_objects() {
        let mut geometry = Geometry::default();

        add_cube(&mut geometry, "cube", Vec3::ZERO);
        geometry.add_mesh("empty", &[], &[]);

        // Skipped
        let build = build(&geometry, &config(Variant::BvhKdTree)).unwrap();

        assert_eq!(1, build.accel.bvh().len());
        assert_eq!(1, build.accel.kd_trees().count());

        assert_eq!(
            1,
            build
                .diagnostics
                .of_kind(DiagnosticKind::EmptyObject)
                .count()
        );

        // Rejected
        let mut config = config(Variant::BvhKdTree);

        config.kd_tree.skip_empty_objects = false;

        assert_eq!(
            Some(BuildError::EmptyObject {
                object: "empty".into()
            }),
            super::build(&geometry, &config).err()
        );
    }

    #[test]
    fn only_empty_objects() {
        let mut geometry = Geometry::default();

        geometry.add_mesh("empty", &[], &[]);

        assert_eq!(
            Some(BuildError::NoObjects),
            build(&geometry, &config(Variant::BvhKdTree)).err()
        );

        // The plain BVH keeps them as empty leaves
        let build = build(&geometry, &config(Variant::Bvh)).unwrap();

        assert_eq!(1, build.accel.bvh().len());
        assert!(!build.accel.bvh().bounds().is_set());
    }

    #[test]
    fn invalid_vertex_index() {
        let mut geometry = Geometry::default();

        geometry.add_mesh("broken", &[Vec3::ZERO], &[[0, 1, 2]]);

        assert!(matches!(
            build(&geometry, &config(Variant::Bvh)),
            Err(BuildError::InvalidVertexIndex { .. })
        ));
    }

    #[test]
    fn determinism() {
        let mut geometry = Geometry::default();

        add_triangle_soup(&mut geometry, "a", 21, 400, 10.0);
        add_triangle_soup(&mut geometry, "b", 22, 300, 10.0);
        add_cube_grid(&mut geometry, "c", 3, 2.0);

        for variant in [Variant::Bvh, Variant::BvhKdTree] {
            let a = build(&geometry, &config(variant)).unwrap();
            let b = build(&geometry, &config(variant)).unwrap();

            assert_eq!(a.stats.fingerprint, b.stats.fingerprint);
            assert_eq!(a.accel, b.accel);
            assert_eq!(a.diagnostics, b.diagnostics);
        }
    }
}
