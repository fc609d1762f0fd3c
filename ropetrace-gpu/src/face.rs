use bytemuck::{Pod, Zeroable};
use glam::{uvec4, UVec4, Vec3};

use crate::{Hit, Ray};

/// Triangle as seen by the renderer: indices into the shared vertex and
/// normal arrays, tagged with the triangle's global face id and its object.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Face {
    /// x, y, z = vertex ids; w = face id
    pub vertices: UVec4,

    /// x, y, z = normal ids; w = object id
    pub normals: UVec4,
}

impl Face {
    pub fn new(
        vertices: [u32; 3],
        normals: [u32; 3],
        face_id: u32,
        object_id: u32,
    ) -> Self {
        Self {
            vertices: uvec4(vertices[0], vertices[1], vertices[2], face_id),
            normals: uvec4(normals[0], normals[1], normals[2], object_id),
        }
    }

    pub fn vertex_ids(&self) -> [u32; 3] {
        [self.vertices.x, self.vertices.y, self.vertices.z]
    }

    pub fn normal_ids(&self) -> [u32; 3] {
        [self.normals.x, self.normals.y, self.normals.z]
    }

    pub fn face_id(&self) -> u32 {
        self.vertices.w
    }

    pub fn object_id(&self) -> u32 {
        self.normals.w
    }

    /// Resolves this face's vertices against a flat `xyz` position array.
    pub fn positions(&self, positions: &[f32]) -> [Vec3; 3] {
        self.vertex_ids().map(|id| {
            let id = 3 * id as usize;

            Vec3::from_slice(&positions[id..id + 3])
        })
    }

    /// Möller–Trumbore; returns the distance along the ray, if hit.
    pub fn hit_distance(&self, positions: &[f32], ray: Ray) -> Option<f32> {
        let [p0, p1, p2] = self.positions(positions);
        let v0v1 = p1 - p0;
        let v0v2 = p2 - p0;

        // ---

        let pvec = ray.direction().cross(v0v2);
        let det = v0v1.dot(pvec);

        if det.abs() < f32::EPSILON {
            return None;
        }

        // ---

        let inv_det = 1.0 / det;
        let tvec = ray.origin() - p0;
        let u = tvec.dot(pvec) * inv_det;
        let qvec = tvec.cross(v0v1);
        let v = ray.direction().dot(qvec) * inv_det;
        let distance = v0v2.dot(qvec) * inv_det;

        if (u < 0.0)
            | (u > 1.0)
            | (v < 0.0)
            | (u + v > 1.0)
            | (distance <= 0.0)
        {
            return None;
        }

        Some(distance)
    }

    pub fn hit(&self, positions: &[f32], ray: Ray, hit: &mut Hit) -> bool {
        match self.hit_distance(positions, ray) {
            Some(distance) if distance < hit.distance => {
                hit.distance = distance;
                hit.face_id = self.face_id();
                true
            }

            _ => false,
        }
    }
}
