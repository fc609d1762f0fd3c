use std::ops;

use super::{KdNode, KdNodeId};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct KdNodes {
    nodes: Vec<KdNode>,
}

impl KdNodes {
    pub fn add(&mut self, node: KdNode) -> KdNodeId {
        self.nodes.push(node);

        KdNodeId::new((self.nodes.len() - 1) as u32)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = KdNodeId> {
        (0..self.nodes.len() as u32).map(KdNodeId::new)
    }

    pub fn iter(&self) -> impl Iterator<Item = (KdNodeId, &KdNode)> + '_ {
        self.ids().zip(self.nodes.iter())
    }
}

impl ops::Index<KdNodeId> for KdNodes {
    type Output = KdNode;

    fn index(&self, index: KdNodeId) -> &Self::Output {
        &self.nodes[index.get() as usize]
    }
}

impl ops::IndexMut<KdNodeId> for KdNodes {
    fn index_mut(&mut self, index: KdNodeId) -> &mut Self::Output {
        &mut self.nodes[index.get() as usize]
    }
}
