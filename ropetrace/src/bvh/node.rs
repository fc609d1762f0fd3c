use crate::{BoundingBox, ObjectId, Tri};

#[derive(Clone, Debug, PartialEq)]
pub struct BvhNode {
    pub bounds: BoundingBox,
    pub depth: u32,
    pub parent: Option<BvhNodeId>,
    pub kind: BvhNodeKind,

    /// Whether traversal may skip testing this node's left child and go
    /// straight to the left child's children
    pub skip_next_left: bool,

    /// How many nodes preceding this one (in id order) are skippable
    pub skips_to_here: u32,
}

impl BvhNode {
    pub fn internal(
        bounds: BoundingBox,
        left_id: BvhNodeId,
        right_id: BvhNodeId,
    ) -> Self {
        Self {
            bounds,
            kind: BvhNodeKind::Internal { left_id, right_id },
            ..Default::default()
        }
    }

    pub fn leaf(
        bounds: BoundingBox,
        object_id: ObjectId,
        triangles: Vec<Tri>,
    ) -> Self {
        Self {
            bounds,
            kind: BvhNodeKind::Leaf {
                object_id,
                triangles,
            },
            ..Default::default()
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, BvhNodeKind::Leaf { .. })
    }

    pub fn is_internal(&self) -> bool {
        !self.is_leaf()
    }

    pub fn children(&self) -> Option<(BvhNodeId, BvhNodeId)> {
        match self.kind {
            BvhNodeKind::Internal { left_id, right_id } => {
                Some((left_id, right_id))
            }
            BvhNodeKind::Leaf { .. } => None,
        }
    }

    pub fn triangles(&self) -> &[Tri] {
        match &self.kind {
            BvhNodeKind::Internal { .. } => &[],
            BvhNodeKind::Leaf { triangles, .. } => triangles,
        }
    }
}

impl Default for BvhNode {
    fn default() -> Self {
        Self {
            bounds: Default::default(),
            depth: 0,
            parent: None,
            kind: BvhNodeKind::Leaf {
                object_id: ObjectId::new(0),
                triangles: Vec::new(),
            },
            skip_next_left: false,
            skips_to_here: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum BvhNodeKind {
    Internal {
        left_id: BvhNodeId,
        right_id: BvhNodeId,
    },

    Leaf {
        object_id: ObjectId,
        triangles: Vec<Tri>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BvhNodeId(u32);

impl BvhNodeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn root() -> Self {
        Self::new(0)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn offset(self, by: u32) -> Self {
        Self(self.0 + by)
    }
}
