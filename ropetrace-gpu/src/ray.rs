use glam::Vec3;

#[derive(Copy, Clone, Debug, Default)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    inv_direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction,
            inv_direction: 1.0 / direction,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Returns distances at which this ray enters and leaves given box, if it
    /// hits the box at all.
    pub fn intersect_box(
        self,
        aabb_min: Vec3,
        aabb_max: Vec3,
    ) -> Option<(f32, f32)> {
        let hit_min = (aabb_min - self.origin) * self.inv_direction;
        let hit_max = (aabb_max - self.origin) * self.inv_direction;

        let tmin = hit_min.min(hit_max).max_element();
        let tmax = hit_min.max(hit_max).min_element();

        if tmax >= tmin && tmax >= 0.0 {
            Some((tmin, tmax))
        } else {
            None
        }
    }

    pub fn distance_to_node(self, aabb_min: Vec3, aabb_max: Vec3) -> f32 {
        self.intersect_box(aabb_min, aabb_max)
            .map_or(f32::MAX, |(tmin, _)| tmin)
    }

    /// Returns the distance at which this ray leaves given box and the face it
    /// leaves through, numbered as ropes are: -X, +X, -Y, +Y, -Z, +Z.
    pub fn exit_box(self, aabb_min: Vec3, aabb_max: Vec3) -> (f32, u32) {
        let mut distance = f32::MAX;
        let mut side = 0;

        for axis in 0..3 {
            let (plane, axis_side) = if self.direction[axis] > 0.0 {
                (aabb_max[axis], 2 * axis + 1)
            } else if self.direction[axis] < 0.0 {
                (aabb_min[axis], 2 * axis)
            } else {
                continue;
            };

            let axis_distance =
                (plane - self.origin[axis]) * self.inv_direction[axis];

            if axis_distance < distance {
                distance = axis_distance;
                side = axis_side as u32;
            }
        }

        (distance, side)
    }
}
