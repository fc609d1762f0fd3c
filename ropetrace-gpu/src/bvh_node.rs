use bytemuck::{Pod, Zeroable};
use glam::{uvec4, UVec4, Vec3, Vec4, Vec4Swizzles};

use crate::INVALID_ID;

/// Flattened BVH node.
///
/// Nodes are stored in traversal order, so the root is always at index zero
/// and a node's left child (if any) directly follows it.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BvhNode {
    /// xyz = bounding box min; w = left child id (internal nodes) or payload
    /// offset (leaves)
    pub d0: Vec4,

    /// xyz = bounding box max; w = right child id (internal nodes) or payload
    /// length (leaves)
    pub d1: Vec4,

    /// x = parent id, y = skips-to-here, z = flags, w = object id
    pub d2: UVec4,
}

impl BvhNode {
    pub const FLAG_LEAF: u32 = 1;
    pub const FLAG_KD_LEAF: u32 = 1 << 1;
    pub const FLAG_SKIP_NEXT_LEFT: u32 = 1 << 2;

    pub fn internal(
        bb_min: Vec3,
        bb_max: Vec3,
        left_id: u32,
        right_id: u32,
        parent_id: u32,
        skips_to_here: u32,
        skip_next_left: bool,
    ) -> Self {
        let flags = if skip_next_left {
            Self::FLAG_SKIP_NEXT_LEFT
        } else {
            0
        };

        Self {
            d0: bb_min.extend(f32::from_bits(left_id)),
            d1: bb_max.extend(f32::from_bits(right_id)),
            d2: uvec4(parent_id, skips_to_here, flags, INVALID_ID),
        }
    }

    /// Creates a leaf; for triangle leaves the payload is a range of the leaf
    /// face list, for k-d leaves it's the k-d tree's root id (with zero
    /// length).
    #[allow(clippy::too_many_arguments)]
    pub fn leaf(
        bb_min: Vec3,
        bb_max: Vec3,
        payload_offset: u32,
        payload_len: u32,
        parent_id: u32,
        skips_to_here: u32,
        object_id: u32,
        is_kd_leaf: bool,
    ) -> Self {
        let flags = if is_kd_leaf {
            Self::FLAG_LEAF | Self::FLAG_KD_LEAF
        } else {
            Self::FLAG_LEAF
        };

        Self {
            d0: bb_min.extend(f32::from_bits(payload_offset)),
            d1: bb_max.extend(f32::from_bits(payload_len)),
            d2: uvec4(parent_id, skips_to_here, flags, object_id),
        }
    }

    pub fn bb_min(&self) -> Vec3 {
        self.d0.xyz()
    }

    pub fn bb_max(&self) -> Vec3 {
        self.d1.xyz()
    }

    pub fn left_id(&self) -> u32 {
        self.d0.w.to_bits()
    }

    pub fn right_id(&self) -> u32 {
        self.d1.w.to_bits()
    }

    pub fn payload_offset(&self) -> u32 {
        self.d0.w.to_bits()
    }

    pub fn payload_len(&self) -> u32 {
        self.d1.w.to_bits()
    }

    pub fn parent_id(&self) -> u32 {
        self.d2.x
    }

    pub fn skips_to_here(&self) -> u32 {
        self.d2.y
    }

    pub fn flags(&self) -> u32 {
        self.d2.z
    }

    pub fn object_id(&self) -> u32 {
        self.d2.w
    }

    pub fn is_leaf(&self) -> bool {
        self.flags() & Self::FLAG_LEAF != 0
    }

    pub fn is_kd_leaf(&self) -> bool {
        self.flags() & Self::FLAG_KD_LEAF != 0
    }

    pub fn skip_next_left(&self) -> bool {
        self.flags() & Self::FLAG_SKIP_NEXT_LEFT != 0
    }
}
