//! Handles and slot types for the planar graph arena.

use crate::geometry::Vec2;

/// Identifier types for clarity; all are indices into the owning arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub usize);
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceId(pub usize);

/// A vertex with its rotation: incident edges in ascending angle order.
#[derive(Clone, Debug)]
pub struct Node<N> {
    pub id: String,
    pub pos: Vec2,
    pub(crate) edges: Vec<EdgeId>,
    pub data: N,
}

impl<N> Node<N> {
    /// Incident edges in ascending `atan2` order around the node.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn degree(&self) -> usize {
        self.edges.len()
    }
}

/// A directed edge `from → to`. Identity is the unordered endpoint pair.
#[derive(Clone, Debug)]
pub struct Edge<E> {
    pub from: NodeId,
    pub to: NodeId,
    pub data: E,
}

impl<E> Edge<E> {
    /// The endpoint opposite `v`.
    #[inline]
    pub fn other(&self, v: NodeId) -> NodeId {
        if self.from == v {
            self.to
        } else {
            self.from
        }
    }

    #[inline]
    pub fn touches(&self, v: NodeId) -> bool {
        self.from == v || self.to == v
    }
}
