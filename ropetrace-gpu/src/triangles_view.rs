use crate::{Face, Hit, Ray};

/// Read-only view over the flattened faces and the shared position array.
#[derive(Clone, Copy, Debug)]
pub struct TrianglesView<'a> {
    faces: &'a [Face],
    positions: &'a [f32],
}

impl<'a> TrianglesView<'a> {
    pub fn new(faces: &'a [Face], positions: &'a [f32]) -> Self {
        Self { faces, positions }
    }

    pub fn get(&self, face_id: u32) -> Face {
        self.faces[face_id as usize]
    }

    pub fn hit(&self, face_id: u32, ray: Ray, hit: &mut Hit) -> bool {
        self.get(face_id).hit(self.positions, ray, hit)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Tests every face; the reference answer traversals are checked against.
    pub fn trace_brute_force(&self, ray: Ray) -> Hit {
        let mut hit = Hit::none();

        for face in self.faces {
            face.hit(self.positions, ray, &mut hit);
        }

        hit
    }
}
