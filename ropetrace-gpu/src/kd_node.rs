use bytemuck::{Pod, Zeroable};
use glam::{uvec4, UVec4, Vec3, Vec4, Vec4Swizzles};

/// Flattened k-d tree node; ids are global across all k-d trees of a scene.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct KdNode {
    /// xyz = bounding box min; w = split position
    pub d0: Vec4,

    /// xyz = bounding box max; w = split axis (`LEAF_AXIS` for leaves)
    pub d1: Vec4,

    /// x = left child id (or ropes offset for leaves), y = right child id,
    /// z = faces offset, w = faces length
    pub d2: UVec4,
}

impl KdNode {
    pub const LEAF_AXIS: u32 = 3;

    pub fn internal(
        bb_min: Vec3,
        bb_max: Vec3,
        axis: u32,
        split: f32,
        left_id: u32,
        right_id: u32,
    ) -> Self {
        Self {
            d0: bb_min.extend(split),
            d1: bb_max.extend(f32::from_bits(axis)),
            d2: uvec4(left_id, right_id, 0, 0),
        }
    }

    pub fn leaf(
        bb_min: Vec3,
        bb_max: Vec3,
        ropes_offset: u32,
        faces_offset: u32,
        faces_len: u32,
    ) -> Self {
        Self {
            d0: bb_min.extend(0.0),
            d1: bb_max.extend(f32::from_bits(Self::LEAF_AXIS)),
            d2: uvec4(ropes_offset, 0, faces_offset, faces_len),
        }
    }

    pub fn bb_min(&self) -> Vec3 {
        self.d0.xyz()
    }

    pub fn bb_max(&self) -> Vec3 {
        self.d1.xyz()
    }

    pub fn split(&self) -> f32 {
        self.d0.w
    }

    pub fn axis(&self) -> u32 {
        self.d1.w.to_bits()
    }

    pub fn is_leaf(&self) -> bool {
        self.axis() == Self::LEAF_AXIS
    }

    pub fn left_id(&self) -> u32 {
        self.d2.x
    }

    pub fn right_id(&self) -> u32 {
        self.d2.y
    }

    pub fn ropes_offset(&self) -> u32 {
        self.d2.x
    }

    pub fn faces_offset(&self) -> u32 {
        self.d2.z
    }

    pub fn faces_len(&self) -> u32 {
        self.d2.w
    }
}
