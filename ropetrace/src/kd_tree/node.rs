use crate::{Axis, BoundingBox, Tri};

#[derive(Clone, Debug, PartialEq)]
pub enum KdNode {
    Internal {
        bounds: BoundingBox,
        axis: Axis,
        split: f32,
        left_id: KdNodeId,
        right_id: KdNodeId,
    },

    Leaf {
        bounds: BoundingBox,
        triangles: Vec<Tri>,
        ropes: Ropes,
    },
}

impl KdNode {
    pub fn bounds(&self) -> BoundingBox {
        match self {
            KdNode::Internal { bounds, .. } => *bounds,
            KdNode::Leaf { bounds, .. } => *bounds,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, KdNode::Leaf { .. })
    }

    pub fn triangles(&self) -> &[Tri] {
        match self {
            KdNode::Internal { .. } => &[],
            KdNode::Leaf { triangles, .. } => triangles,
        }
    }

    pub fn ropes(&self) -> Option<&Ropes> {
        match self {
            KdNode::Internal { .. } => None,
            KdNode::Leaf { ropes, .. } => Some(ropes),
        }
    }

    pub fn children(&self) -> Option<(KdNodeId, KdNodeId)> {
        match self {
            KdNode::Internal {
                left_id, right_id, ..
            } => Some((*left_id, *right_id)),
            KdNode::Leaf { .. } => None,
        }
    }
}

impl Default for KdNode {
    fn default() -> Self {
        KdNode::Leaf {
            bounds: Default::default(),
            triangles: Vec::new(),
            ropes: Default::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KdNodeId(u32);

impl KdNodeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn root() -> Self {
        Self::new(0)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

/// Face of a node's bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Side {
    axis: Axis,
    positive: bool,
}

impl Side {
    pub fn new(axis: Axis, positive: bool) -> Self {
        Self { axis, positive }
    }

    /// All sides, ordered -X, +X, -Y, +Y, -Z, +Z.
    pub fn all() -> [Self; 6] {
        [
            Self::new(Axis::X, false),
            Self::new(Axis::X, true),
            Self::new(Axis::Y, false),
            Self::new(Axis::Y, true),
            Self::new(Axis::Z, false),
            Self::new(Axis::Z, true),
        ]
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn is_positive(&self) -> bool {
        self.positive
    }

    pub fn opposite(&self) -> Self {
        Self::new(self.axis, !self.positive)
    }

    pub fn index(&self) -> usize {
        2 * self.axis.get() + (self.positive as usize)
    }
}

/// Neighbor links of a leaf, one per side (indexed by `Side::index()`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Ropes([Option<KdNodeId>; 6]);

impl Ropes {
    pub fn get(&self, side: Side) -> Option<KdNodeId> {
        self.0[side.index()]
    }

    pub fn set(&mut self, side: Side, rope: Option<KdNodeId>) {
        self.0[side.index()] = rope;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Side, Option<KdNodeId>)> + '_ {
        Side::all().into_iter().map(|side| (side, self.get(side)))
    }
}
