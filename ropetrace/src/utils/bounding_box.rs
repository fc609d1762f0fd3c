use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign};

use glam::Vec3;

use super::Axis;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    min: Vec3,
    max: Vec3,
}

impl BoundingBox {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Returns the smallest box containing all of given points, or `None` if
    /// there are no points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let this: Self = points.into_iter().collect();

        this.is_set().then_some(this)
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn extent(&self) -> Vec3 {
        self.max() - self.min()
    }

    pub fn center(&self) -> Vec3 {
        self.min * 0.5 + self.max * 0.5
    }

    pub fn half_area(&self) -> f32 {
        if !self.is_set() {
            return 0.0;
        }

        let extent = self.extent();

        extent.x * extent.y + extent.y * extent.z + extent.z * extent.x
    }

    pub fn surface_area(&self) -> f32 {
        2.0 * self.half_area()
    }

    pub fn is_set(&self) -> bool {
        self.min.x != Self::default().min.x
    }

    /// Returns the axis along which this box is the longest.
    ///
    /// X is compared against Y first (X must be strictly longer to win), then
    /// the winner against Z (again strictly, otherwise Z wins) - so a cube
    /// reports Z.
    pub fn longest_axis(&self) -> Axis {
        let extent = self.extent();

        if extent.x > extent.y {
            if extent.x > extent.z {
                Axis::X
            } else {
                Axis::Z
            }
        } else if extent.y > extent.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Returns this box cut down so that it ends at `value` along `axis`.
    pub fn with_max(mut self, axis: Axis, value: f32) -> Self {
        self.max[axis] = value;
        self
    }

    /// Returns this box cut down so that it starts at `value` along `axis`.
    pub fn with_min(mut self, axis: Axis, value: f32) -> Self {
        self.min[axis] = value;
        self
    }

    /// Returns the common part of both boxes; unset if they are disjoint.
    pub fn intersection(&self, other: &Self) -> Self {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);

        if min.cmple(max).all() {
            Self::new(min, max)
        } else {
            Self::default()
        }
    }

    pub fn contains(&self, other: &Self, eps: f32) -> bool {
        if !other.is_set() {
            return true;
        }

        (other.min + eps).cmpge(self.min).all()
            && (other.max - eps).cmple(self.max).all()
    }

    pub fn overlaps(&self, other: &Self, eps: f32) -> bool {
        (self.min - eps).cmple(other.max).all()
            && (self.max + eps).cmpge(other.min).all()
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new(Vec3::MAX, Vec3::MIN)
    }
}

impl Hash for BoundingBox {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.min.to_array().map(f32::to_bits).hash(state);
        self.max.to_array().map(f32::to_bits).hash(state);
    }
}

impl Add<Vec3> for BoundingBox {
    type Output = Self;

    fn add(mut self, rhs: Vec3) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign<Vec3> for BoundingBox {
    fn add_assign(&mut self, rhs: Vec3) {
        self.min = self.min.min(rhs);
        self.max = self.max.max(rhs);
    }
}

impl FromIterator<Vec3> for BoundingBox {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Vec3>,
    {
        let mut this = Self::default();

        for item in iter {
            this += item;
        }

        this
    }
}

impl Add<Self> for BoundingBox {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl AddAssign<Self> for BoundingBox {
    fn add_assign(&mut self, rhs: Self) {
        if rhs.is_set() {
            *self += rhs.min;
            *self += rhs.max;
        }
    }
}

impl FromIterator<Self> for BoundingBox {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = Self>,
    {
        let mut this = Self::default();

        for item in iter {
            this += item;
        }

        this
    }
}
