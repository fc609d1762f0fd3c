mod bvh_serializer;
mod kd_serializer;

use std::collections::BTreeMap;

use crate::{gpu, AccelStructure, BuildError, Geometry, ObjectId};

/// Acceleration structure flattened into GPU-ready arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatAccel {
    /// BVH nodes, in traversal order
    pub bvh_nodes: Vec<gpu::BvhNode>,

    /// Face ids referenced by triangle leaves of the BVH
    pub bvh_faces: Vec<u32>,

    /// Nodes of all k-d trees, one tree after another
    pub kd_nodes: Vec<gpu::KdNode>,

    /// Six ropes per k-d leaf, ordered -X, +X, -Y, +Y, -Z, +Z
    pub kd_ropes: Vec<u32>,

    /// Face ids referenced by k-d leaves
    pub kd_faces: Vec<u32>,

    /// BVH leaf id -> global id of the k-d tree's root
    pub kd_roots: BTreeMap<u32, u32>,

    /// All faces of the scene, indexed by face id
    pub faces: Vec<gpu::Face>,
}

/// Flattens acceleration structure built for given geometry.
pub fn serialize(
    accel: &AccelStructure,
    geometry: &Geometry,
) -> Result<FlatAccel, BuildError> {
    let mut flat = FlatAccel::default();

    for id in 0..geometry.objects().len() {
        let tris = geometry.triangles(ObjectId::new(id as u32))?;

        flat.faces.extend(tris.iter().map(|tri| {
            gpu::Face::new(
                tri.vertices(),
                tri.normals(),
                tri.id().get(),
                tri.object_id().get(),
            )
        }));
    }

    for (bvh_leaf_id, tree) in accel.kd_trees() {
        let root_id = kd_serializer::run(
            tree,
            &mut flat.kd_nodes,
            &mut flat.kd_ropes,
            &mut flat.kd_faces,
        );

        flat.kd_roots.insert(bvh_leaf_id.get(), root_id);
    }

    bvh_serializer::run(
        accel.bvh(),
        &flat.kd_roots,
        &mut flat.bvh_nodes,
        &mut flat.bvh_faces,
    );

    log::debug!(
        "Acceleration structure flattened; bvh-nodes={}, kd-nodes={}, \
         kd-ropes={}, faces={}",
        flat.bvh_nodes.len(),
        flat.kd_nodes.len(),
        flat.kd_ropes.len(),
        flat.faces.len(),
    );

    Ok(flat)
}

impl FlatAccel {
    pub fn bvh_view(&self) -> gpu::BvhView<'_> {
        gpu::BvhView::new(&self.bvh_nodes, &self.bvh_faces)
    }

    pub fn kd_tree_view(&self) -> gpu::KdTreeView<'_> {
        gpu::KdTreeView::new(&self.kd_nodes, &self.kd_ropes, &self.kd_faces)
    }

    pub fn triangles_view<'a>(
        &'a self,
        positions: &'a [f32],
    ) -> gpu::TrianglesView<'a> {
        gpu::TrianglesView::new(&self.faces, positions)
    }

    /// Finds the nearest hit the same way the tracing kernel does.
    pub fn trace(&self, positions: &[f32], ray: gpu::Ray) -> gpu::Hit {
        let mut hit = gpu::Hit::none();

        self.bvh_view().trace(
            self.triangles_view(positions),
            self.kd_tree_view(),
            ray,
            &mut hit,
        );

        hit
    }

    pub fn bvh_nodes_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.bvh_nodes)
    }

    pub fn bvh_faces_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.bvh_faces)
    }

    pub fn kd_nodes_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.kd_nodes)
    }

    pub fn kd_ropes_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.kd_ropes)
    }

    pub fn kd_faces_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.kd_faces)
    }

    pub fn faces_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.faces)
    }
}
