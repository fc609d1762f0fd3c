use glam::{vec3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Geometry, ObjectId, Tri};

const CUBE_FACES: [[u32; 3]; 12] = [
    [0, 2, 6],
    [0, 6, 4],
    [1, 5, 7],
    [1, 7, 3],
    [0, 4, 5],
    [0, 5, 1],
    [2, 3, 7],
    [2, 7, 6],
    [0, 1, 3],
    [0, 3, 2],
    [4, 6, 7],
    [4, 7, 5],
];

/// Returns positions and faces of an axis-aligned cube; every triangle spans
/// its whole face, so each one's bounding box covers that face.
pub fn cube(min: Vec3, size: f32) -> (Vec<Vec3>, Vec<[u32; 3]>) {
    let positions = (0..8)
        .map(|i| {
            min + size
                * vec3(
                    (i & 1) as f32,
                    ((i >> 1) & 1) as f32,
                    ((i >> 2) & 1) as f32,
                )
        })
        .collect();

    (positions, CUBE_FACES.to_vec())
}

/// Adds a single object made of unit cubes placed `spacing` apart on an
/// `n × n × n` grid.
pub fn add_cube_grid(
    geometry: &mut Geometry,
    name: &str,
    n: u32,
    spacing: f32,
) -> ObjectId {
    let mut positions = Vec::new();
    let mut faces = Vec::new();

    for x in 0..n {
        for y in 0..n {
            for z in 0..n {
                let min = spacing * vec3(x as f32, y as f32, z as f32);
                let (cube_positions, cube_faces) = cube(min, 1.0);
                let base = positions.len() as u32;

                positions.extend(cube_positions);
                faces.extend(
                    cube_faces.into_iter().map(|face| face.map(|v| base + v)),
                );
            }
        }
    }

    geometry.add_mesh(name, &positions, &faces)
}

pub fn add_cube(geometry: &mut Geometry, name: &str, min: Vec3) -> ObjectId {
    let (positions, faces) = cube(min, 1.0);

    geometry.add_mesh(name, &positions, &faces)
}

/// Adds an object made of `count` random small triangles scattered over
/// `[0, extent]³`.
pub fn add_triangle_soup(
    geometry: &mut Geometry,
    name: &str,
    seed: u64,
    count: usize,
    extent: f32,
) -> ObjectId {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions = Vec::new();
    let mut faces = Vec::new();

    for i in 0..count {
        let anchor = vec3(
            rng.gen_range(0.0..extent),
            rng.gen_range(0.0..extent),
            rng.gen_range(0.0..extent),
        );

        for _ in 0..3 {
            positions.push(
                anchor
                    + vec3(
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                    ),
            );
        }

        let base = 3 * i as u32;

        faces.push([base, base + 1, base + 2]);
    }

    geometry.add_mesh(name, &positions, &faces)
}

pub fn triangles(geometry: &Geometry, id: ObjectId) -> Vec<Tri> {
    geometry.triangles(id).unwrap()
}
