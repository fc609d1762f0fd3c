use derivative::Derivative;
use glam::Vec3;

use crate::{BuildError, ObjectId, Tri, TriId};

/// Scene geometry handed over by the model loader: shared position and
/// normal arrays (flat `xyz` triples) plus a list of objects indexing into
/// them.
#[derive(Clone, Default, Derivative)]
#[derivative(Debug)]
pub struct Geometry {
    #[derivative(Debug = "ignore")]
    positions: Vec<f32>,

    #[derivative(Debug = "ignore")]
    normals: Vec<f32>,

    objects: Vec<SceneObject>,

    /// Global id of each object's first face, followed by the total face
    /// count
    #[derivative(Debug = "ignore")]
    first_face_ids: Vec<u32>,
}

impl Geometry {
    pub fn new(
        positions: Vec<f32>,
        normals: Vec<f32>,
        objects: Vec<SceneObject>,
    ) -> Self {
        let mut this = Self {
            positions,
            normals,
            ..Default::default()
        };

        for object in objects {
            this.add_object(object);
        }

        this
    }

    /// Appends a mesh with its own local vertex numbering, rebasing its
    /// indices onto the shared arrays.
    pub fn add_mesh(
        &mut self,
        name: impl Into<String>,
        positions: &[Vec3],
        faces: &[[u32; 3]],
    ) -> ObjectId {
        let base = self.vertex_count() as u32;

        for position in positions {
            self.positions.extend(position.to_array());
        }

        let faces = faces
            .iter()
            .map(|face| face.map(|vertex| base + vertex))
            .collect();

        self.add_object(SceneObject::new(name, faces))
    }

    pub fn add_object(&mut self, object: SceneObject) -> ObjectId {
        if self.first_face_ids.is_empty() {
            self.first_face_ids.push(0);
        }

        let face_count = self.face_count() as u32;

        self.first_face_ids.push(face_count + object.len() as u32);
        self.objects.push(object);

        ObjectId::new((self.objects.len() - 1) as u32)
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn normals(&self) -> &[f32] {
        &self.normals
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> &SceneObject {
        &self.objects[id.get() as usize]
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn vertex(&self, id: u32) -> Option<Vec3> {
        let id = 3 * id as usize;

        self.positions.get(id..id + 3).map(Vec3::from_slice)
    }

    pub fn face_count(&self) -> usize {
        self.first_face_ids.last().copied().unwrap_or(0) as usize
    }

    /// Returns the global id of given object's first face.
    pub fn first_face_id(&self, id: ObjectId) -> u32 {
        self.first_face_ids[id.get() as usize]
    }

    /// Derives builder triangles for given object.
    pub fn triangles(&self, id: ObjectId) -> Result<Vec<Tri>, BuildError> {
        let object = self.object(id);
        let first_face_id = self.first_face_id(id);

        object
            .faces
            .iter()
            .enumerate()
            .map(|(face_idx, &vertices)| {
                let mut positions = [Vec3::ZERO; 3];

                for (position, index) in positions.iter_mut().zip(vertices) {
                    *position = self.vertex(index).ok_or_else(|| {
                        BuildError::InvalidVertexIndex {
                            object: object.name.clone(),
                            face: face_idx,
                            index,
                            len: self.vertex_count(),
                        }
                    })?;
                }

                Ok(Tri::new(
                    TriId::new(first_face_id + face_idx as u32),
                    id,
                    vertices,
                    object.normal_ids(face_idx),
                    positions,
                ))
            })
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneObject {
    name: String,
    faces: Vec<[u32; 3]>,
    face_normals: Vec<[u32; 3]>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            name: name.into(),
            faces,
            face_normals: Vec::new(),
        }
    }

    pub fn with_normals(mut self, face_normals: Vec<[u32; 3]>) -> Self {
        self.face_normals = face_normals;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Returns normal ids of given face; faces without explicit normals reuse
    /// their vertex ids.
    pub fn normal_ids(&self, face_idx: usize) -> [u32; 3] {
        self.face_normals
            .get(face_idx)
            .copied()
            .unwrap_or(self.faces[face_idx])
    }
}
