use glam::Vec3;

use crate::{Axis, BoundingBox};

/// Global face id; faces are numbered across all objects, in object order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriId(u32);

impl TriId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Triangle as seen by the builders.
///
/// Carries only indices into the shared vertex and normal arrays, plus the
/// geometric data derived from them when the triangle gets created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tri {
    id: TriId,
    object_id: ObjectId,
    vertices: [u32; 3],
    normals: [u32; 3],
    bounds: BoundingBox,
    centroid: Vec3,
}

impl Tri {
    pub fn new(
        id: TriId,
        object_id: ObjectId,
        vertices: [u32; 3],
        normals: [u32; 3],
        positions: [Vec3; 3],
    ) -> Self {
        Self {
            id,
            object_id,
            vertices,
            normals,
            bounds: positions.into_iter().collect(),
            centroid: positions.into_iter().sum::<Vec3>() / 3.0,
        }
    }

    pub fn id(&self) -> TriId {
        self.id
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    pub fn vertices(&self) -> [u32; 3] {
        self.vertices
    }

    pub fn normals(&self) -> [u32; 3] {
        self.normals
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Mean of the three vertices.
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    /// Midpoint of the triangle's bounding box; this (not the centroid) is
    /// what the BVH builders sort and split by.
    pub fn center(&self) -> Vec3 {
        self.bounds.center()
    }

    /// Returns this triangle with its bounding box cut down to `[min, max]`
    /// along `axis`, as seen from one side of a spatial split.
    pub fn clipped(mut self, axis: Axis, min: f32, max: f32) -> Self {
        let bb_min = self.bounds.min()[axis].max(min);
        let bb_max = self.bounds.max()[axis].min(max);

        self.bounds = self.bounds.with_min(axis, bb_min).with_max(axis, bb_max);
        self
    }
}

/// Mean of the centroids of given triangles; zero for no triangles.
pub fn centroid_of(tris: &[Tri]) -> Vec3 {
    if tris.is_empty() {
        return Vec3::ZERO;
    }

    tris.iter().map(Tri::centroid).sum::<Vec3>() / (tris.len() as f32)
}
