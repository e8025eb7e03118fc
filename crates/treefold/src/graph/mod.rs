//! Planar graph with an explicit rotation system.
//!
//! Purpose
//! - Store nodes and directed edges in insertion-ordered arenas addressed by
//!   `Copy` handles, so faces and annotations can point at them without
//!   ownership cycles.
//! - Keep, for every node, its incident edges sorted by angle. Face traversal
//!   only ever needs `clockwise`/`counterclockwise` on that list.
//!
//! Removed slots are tombstoned so handles stay stable; iteration skips them
//! and otherwise follows insertion order.

mod types;

use std::collections::HashMap;
use std::f64::consts::TAU;
use std::ops::{Index, IndexMut};

use crate::cfg::ANGLE_TOLERANCE;
use crate::error::{PatternError, Result};
use crate::geometry::{angle_of, Vec2};

pub use types::{Edge, EdgeId, FaceId, Node, NodeId};

#[derive(Clone, Debug)]
pub struct PlanarGraph<N, E> {
    nodes: Vec<Option<Node<N>>>,
    edges: Vec<Option<Edge<E>>>,
    by_id: HashMap<String, NodeId>,
    pairs: HashMap<(NodeId, NodeId), EdgeId>,
}

impl<N, E> Default for PlanarGraph<N, E> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            by_id: HashMap::new(),
            pairs: HashMap::new(),
        }
    }
}

#[inline]
fn pair_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl<N, E> PlanarGraph<N, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: impl Into<String>, pos: Vec2, data: N) -> Result<NodeId> {
        let id = id.into();
        if self.by_id.contains_key(&id) {
            return Err(PatternError::DuplicateNode(id));
        }
        let handle = NodeId(self.nodes.len());
        self.by_id.insert(id.clone(), handle);
        self.nodes.push(Some(Node {
            id,
            pos,
            edges: Vec::new(),
            data,
        }));
        Ok(handle)
    }

    /// Insert `from → to`, placing it in both endpoints' rotations.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, data: E) -> Result<EdgeId> {
        for v in [from, to] {
            if self.try_node(v).is_none() {
                return Err(PatternError::UnknownNode(format!("#{}", v.0)));
            }
        }
        if from == to {
            return Err(PatternError::SelfLoop {
                node: self[from].id.clone(),
            });
        }
        if self.pairs.contains_key(&pair_key(from, to)) {
            return Err(PatternError::EdgeExists {
                from: self[from].id.clone(),
                to: self[to].id.clone(),
            });
        }
        let slot_from = self.rotation_slot(from, to)?;
        let slot_to = self.rotation_slot(to, from)?;
        let e = EdgeId(self.edges.len());
        self.edges.push(Some(Edge { from, to, data }));
        self[from].edges.insert(slot_from, e);
        self[to].edges.insert(slot_to, e);
        self.pairs.insert(pair_key(from, to), e);
        Ok(e)
    }

    /// Index in `at`'s rotation where an edge towards `toward` belongs.
    fn rotation_slot(&self, at: NodeId, toward: NodeId) -> Result<usize> {
        let a = angle_of(self[toward].pos - self[at].pos);
        let mut slot = None;
        for (i, &f) in self[at].edges.iter().enumerate() {
            let b = self.angle_at(f, at);
            let d = (a - b).abs();
            if d < ANGLE_TOLERANCE || (d - TAU).abs() < ANGLE_TOLERANCE {
                return Err(PatternError::ParallelEdge {
                    node: self[at].id.clone(),
                    from: self[at].id.clone(),
                    to: self[toward].id.clone(),
                });
            }
            if b > a && slot.is_none() {
                slot = Some(i);
            }
        }
        Ok(slot.unwrap_or(self[at].edges.len()))
    }

    /// Angle of edge `e` as seen from its endpoint `at`.
    pub fn angle_at(&self, e: EdgeId, at: NodeId) -> f64 {
        let other = self[e].other(at);
        angle_of(self[other].pos - self[at].pos)
    }

    pub fn remove_edge(&mut self, e: EdgeId) -> Result<Edge<E>> {
        let (from, to) = match self.try_edge(e) {
            Some(edge) => (edge.from, edge.to),
            None => return Err(PatternError::UnknownEdge(format!("#{}", e.0))),
        };
        for v in [from, to] {
            if !self[v].edges.contains(&e) {
                return Err(PatternError::EdgeNotIncident {
                    node: self[v].id.clone(),
                });
            }
        }
        self[from].edges.retain(|&f| f != e);
        self[to].edges.retain(|&f| f != e);
        self.pairs.remove(&pair_key(from, to));
        match self.edges[e.0].take() {
            Some(edge) => Ok(edge),
            None => Err(PatternError::UnknownEdge(format!("#{}", e.0))),
        }
    }

    /// Remove an isolated node.
    pub fn remove_node(&mut self, v: NodeId) -> Result<Node<N>> {
        let degree = self[v].edges.len();
        if degree > 0 {
            return Err(PatternError::NodeHasEdges {
                node: self[v].id.clone(),
                degree,
            });
        }
        let id = self[v].id.clone();
        self.by_id.remove(&id);
        self.nodes[v.0].take().ok_or(PatternError::UnknownNode(id))
    }

    /// Reposition `v` and restore the rotation order around it and its neighbours.
    pub fn move_node(&mut self, v: NodeId, pos: Vec2) {
        self[v].pos = pos;
        let neighbours: Vec<NodeId> = self[v].edges.iter().map(|&e| self[e].other(v)).collect();
        for w in std::iter::once(v).chain(neighbours) {
            let mut ring = std::mem::take(&mut self[w].edges);
            ring.sort_by(|&a, &b| self.angle_at(a, w).total_cmp(&self.angle_at(b, w)));
            self[w].edges = ring;
        }
    }

    /// Edge joining `a` and `b` in either direction.
    pub fn get_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.pairs.get(&pair_key(a, b)).copied()
    }

    pub fn require_edge(&self, a: NodeId, b: NodeId) -> Result<EdgeId> {
        self.get_edge(a, b).ok_or_else(|| PatternError::MissingEdge {
            from: self[a].id.clone(),
            to: self[b].id.clone(),
        })
    }

    fn rotation_index(&self, v: NodeId, e: EdgeId) -> Result<usize> {
        self[v]
            .edges
            .iter()
            .position(|&f| f == e)
            .ok_or_else(|| PatternError::EdgeNotIncident {
                node: self[v].id.clone(),
            })
    }

    /// Next edge clockwise from `e` around `v` (the previous rotation entry).
    pub fn clockwise(&self, v: NodeId, e: EdgeId) -> Result<EdgeId> {
        let i = self.rotation_index(v, e)?;
        let ring = &self[v].edges;
        Ok(ring[(i + ring.len() - 1) % ring.len()])
    }

    pub fn counterclockwise(&self, v: NodeId, e: EdgeId) -> Result<EdgeId> {
        let i = self.rotation_index(v, e)?;
        let ring = &self[v].edges;
        Ok(ring[(i + 1) % ring.len()])
    }

    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    pub fn require_node(&self, id: &str) -> Result<NodeId> {
        self.node_by_id(id)
            .ok_or_else(|| PatternError::UnknownNode(id.to_string()))
    }

    pub fn try_node(&self, v: NodeId) -> Option<&Node<N>> {
        self.nodes.get(v.0).and_then(Option::as_ref)
    }

    pub fn try_edge(&self, e: EdgeId) -> Option<&Edge<E>> {
        self.edges.get(e.0).and_then(Option::as_ref)
    }

    /// Live node handles in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| NodeId(i))
    }

    /// Live edge handles in insertion order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_some())
            .map(|(i, _)| EdgeId(i))
    }

    pub fn node_count(&self) -> usize {
        self.by_id.len()
    }

    pub fn edge_count(&self) -> usize {
        self.pairs.len()
    }

    /// Sorted endpoint ids, the undirected identity of an edge.
    pub fn canonical_id(&self, e: EdgeId) -> (String, String) {
        let a = self[self[e].from].id.clone();
        let b = self[self[e].to].id.clone();
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Node handles of `e` oriented as `(from, to)`.
    #[inline]
    pub fn ends(&self, e: EdgeId) -> (NodeId, NodeId) {
        (self[e].from, self[e].to)
    }
}

impl<N, E> Index<NodeId> for PlanarGraph<N, E> {
    type Output = Node<N>;
    fn index(&self, v: NodeId) -> &Node<N> {
        match self.try_node(v) {
            Some(node) => node,
            None => panic!("stale node handle #{}", v.0),
        }
    }
}

impl<N, E> IndexMut<NodeId> for PlanarGraph<N, E> {
    fn index_mut(&mut self, v: NodeId) -> &mut Node<N> {
        match self.nodes.get_mut(v.0).and_then(Option::as_mut) {
            Some(node) => node,
            None => panic!("stale node handle #{}", v.0),
        }
    }
}

impl<N, E> Index<EdgeId> for PlanarGraph<N, E> {
    type Output = Edge<E>;
    fn index(&self, e: EdgeId) -> &Edge<E> {
        match self.try_edge(e) {
            Some(edge) => edge,
            None => panic!("stale edge handle #{}", e.0),
        }
    }
}

impl<N, E> IndexMut<EdgeId> for PlanarGraph<N, E> {
    fn index_mut(&mut self, e: EdgeId) -> &mut Edge<E> {
        match self.edges.get_mut(e.0).and_then(Option::as_mut) {
            Some(edge) => edge,
            None => panic!("stale edge handle #{}", e.0),
        }
    }
}
