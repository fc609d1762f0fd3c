use std::{mem, ops};

use super::{BvhNode, BvhNodeId, BvhNodeKind};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BvhNodes {
    nodes: Vec<BvhNode>,
}

impl BvhNodes {
    pub fn add(&mut self, node: BvhNode) -> BvhNodeId {
        self.nodes.push(node);

        BvhNodeId::new((self.nodes.len() - 1) as u32)
    }

    /// Moves all nodes of `other` into this arena, rebasing their ids; returns
    /// where `other`'s root landed.
    pub fn append(&mut self, other: BvhNodes) -> BvhNodeId {
        let offset = self.nodes.len() as u32;

        self.nodes.extend(other.nodes.into_iter().map(|mut node| {
            node.parent = node.parent.map(|id| id.offset(offset));

            if let BvhNodeKind::Internal { left_id, right_id } = &mut node.kind
            {
                *left_id = left_id.offset(offset);
                *right_id = right_id.offset(offset);
            }

            node
        }));

        BvhNodeId::new(offset)
    }

    pub fn take(&mut self, id: BvhNodeId) -> BvhNode {
        mem::take(&mut self[id])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = BvhNodeId> {
        (0..self.nodes.len() as u32).map(BvhNodeId::new)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BvhNodeId, &BvhNode)> + '_ {
        self.ids().zip(self.nodes.iter())
    }
}

impl FromIterator<BvhNode> for BvhNodes {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = BvhNode>,
    {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl ops::Index<BvhNodeId> for BvhNodes {
    type Output = BvhNode;

    fn index(&self, index: BvhNodeId) -> &Self::Output {
        &self.nodes[index.get() as usize]
    }
}

impl ops::IndexMut<BvhNodeId> for BvhNodes {
    fn index_mut(&mut self, index: BvhNodeId) -> &mut Self::Output {
        &mut self.nodes[index.get() as usize]
    }
}
