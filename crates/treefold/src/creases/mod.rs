//! Phase-tagged crease graph and its first two phases.
//!
//! Purpose
//! - `CreasesGraph` owns the planar crease graph plus everything the pipeline
//!   accumulates on top of it: leaf extensions, faces, molecules and the
//!   lifecycle state.
//! - `clean_packing` turns a raw disk packing into a clean graph of axial
//!   creases; `build_faces` adds the hull and traces the faces.
//!
//! Every phase entry point checks the incoming state with `require_state` and
//! only advances the state once the phase has fully succeeded.

mod clean;
mod faces;
mod types;

use std::collections::HashMap;

use crate::cfg::FACE_TRACE_MAX_STEPS;
use crate::error::{PatternError, Result};
use crate::geometry::Vec2;
use crate::graph::{EdgeId, FaceId, NodeId, PlanarGraph};
use crate::packing::Packing;

pub use clean::clean_packing;
pub use faces::{build_faces, convex_hull, has_twisted_inner_face, is_twisted};
pub(crate) use faces::mark_outer_face;
pub use types::{
    Assignment, Crease, CreaseNode, CreaseType, Face, FaceNav, FaceOrder, GraphState, Molecule,
    MoleculeId, NodeKind,
};

#[derive(Clone, Debug)]
pub struct CreasesGraph {
    pub(crate) graph: PlanarGraph<CreaseNode, Crease>,
    pub(crate) faces: Vec<Face>,
    pub(crate) molecules: Vec<Molecule>,
    pub(crate) hull: Vec<NodeId>,
    leaf_extensions: HashMap<String, f64>,
    scale_factor: f64,
    state: GraphState,
    created_nodes: usize,
}

impl CreasesGraph {
    /// One leaf node per packing node, no edges.
    pub fn from_packing(packing: &Packing) -> Result<Self> {
        let mut graph = PlanarGraph::new();
        let mut leaf_extensions = HashMap::new();
        for n in &packing.nodes {
            graph.add_node(n.id.clone(), n.position(), CreaseNode::leaf(&n.id))?;
            leaf_extensions.insert(n.id.clone(), 0.0);
        }
        Ok(Self {
            graph,
            faces: Vec::new(),
            molecules: Vec::new(),
            hull: Vec::new(),
            leaf_extensions,
            scale_factor: packing.scale_factor,
            state: GraphState::NewlyCreated,
            created_nodes: 0,
        })
    }

    pub fn state(&self) -> GraphState {
        self.state
    }

    pub fn require_state(&self, op: &'static str, expected: GraphState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(PatternError::StateOrder {
                op,
                expected,
                found: self.state,
            })
        }
    }

    pub(crate) fn advance(&mut self, next: GraphState) {
        tracing::debug!(
            from = ?self.state,
            to = ?next,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            faces = self.faces.len(),
            "phase complete"
        );
        self.state = next;
    }

    pub fn graph(&self) -> &PlanarGraph<CreaseNode, Crease> {
        &self.graph
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Extra effective leaf length gained during cleanup (0 for non-leaves).
    pub fn leaf_extension(&self, id: &str) -> f64 {
        self.leaf_extensions.get(id).copied().unwrap_or(0.0)
    }

    /// Extensions only grow: a negative or NaN step is rejected and leaves
    /// the recorded extension untouched.
    pub(crate) fn grow_leaf_extension(&mut self, id: &str, by: f64) -> Result<()> {
        if by.is_nan() || by < 0.0 {
            return Err(PatternError::inconsistent(format!(
                "leaf {id} extension step {by} is negative"
            )));
        }
        *self.leaf_extensions.entry(id.to_string()).or_insert(0.0) += by;
        Ok(())
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn face(&self, f: FaceId) -> &Face {
        &self.faces[f.0]
    }

    pub(crate) fn face_mut(&mut self, f: FaceId) -> &mut Face {
        &mut self.faces[f.0]
    }

    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> {
        (0..self.faces.len()).map(FaceId)
    }

    pub fn outer_face(&self) -> Option<FaceId> {
        self.faces.iter().position(|f| f.is_outer).map(FaceId)
    }

    pub fn molecules(&self) -> &[Molecule] {
        &self.molecules
    }

    pub fn molecule(&self, m: MoleculeId) -> &Molecule {
        &self.molecules[m.0]
    }

    /// Convex hull of the clean packing, counter-clockwise.
    pub fn hull(&self) -> &[NodeId] {
        &self.hull
    }

    #[inline]
    pub fn pos(&self, v: NodeId) -> Vec2 {
        self.graph[v].pos
    }

    #[inline]
    pub fn node(&self, v: NodeId) -> &CreaseNode {
        &self.graph[v].data
    }

    #[inline]
    pub fn crease(&self, e: EdgeId) -> &Crease {
        &self.graph[e].data
    }

    #[inline]
    pub(crate) fn crease_mut(&mut self, e: EdgeId) -> &mut Crease {
        &mut self.graph[e].data
    }

    #[inline]
    pub fn label(&self, v: NodeId) -> &str {
        &self.graph[v].id
    }

    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.graph.node_by_id(id)
    }

    /// Node ids of a face, for diagnostics.
    pub fn face_label(&self, f: FaceId) -> String {
        let ids: Vec<&str> = self.faces[f.0].nodes.iter().map(|&v| self.label(v)).collect();
        format!("[{}]", ids.join(","))
    }

    pub(crate) fn edge_label(&self, e: EdgeId) -> String {
        let (a, b) = self.graph.ends(e);
        format!("{}-{}", self.label(a), self.label(b))
    }

    pub(crate) fn add_crease(
        &mut self,
        from: NodeId,
        to: NodeId,
        crease_type: CreaseType,
        base_face: Option<MoleculeId>,
    ) -> Result<EdgeId> {
        self.graph
            .add_edge(from, to, Crease::new(crease_type, base_face))
    }

    /// Add a pipeline-created vertex named `i1`, `i2`, ... in creation order.
    pub(crate) fn add_created_node(
        &mut self,
        pos: Vec2,
        kind: NodeKind,
        display_id: &str,
        elevation: f64,
    ) -> Result<NodeId> {
        self.created_nodes += 1;
        let data = CreaseNode {
            display_id: display_id.to_string(),
            elevation,
            kind,
        };
        self.graph
            .add_node(format!("i{}", self.created_nodes), pos, data)
    }

    /// Split `e` at `points` (ordered from `e.from`); the pieces keep the type
    /// and base face and run in the original direction.
    pub fn subdivide_crease(&mut self, e: EdgeId, points: &[NodeId]) -> Result<Vec<EdgeId>> {
        let removed = self.graph.remove_edge(e)?;
        let mut chain = Vec::with_capacity(points.len() + 2);
        chain.push(removed.from);
        chain.extend_from_slice(points);
        chain.push(removed.to);
        chain
            .windows(2)
            .map(|w| {
                self.add_crease(
                    w[0],
                    w[1],
                    removed.data.crease_type,
                    removed.data.base_face,
                )
            })
            .collect()
    }

    /// The face across `e` from `f`.
    pub fn other_face(&self, e: EdgeId, f: FaceId) -> Option<FaceId> {
        let c = self.crease(e);
        if c.left_face == Some(f) {
            c.right_face
        } else {
            c.left_face
        }
    }

    /// Face on the left of `e` when walked from `at`.
    pub(crate) fn face_left_of(&self, e: EdgeId, at: NodeId) -> Option<FaceId> {
        let c = self.crease(e);
        if self.graph[e].from == at {
            c.left_face
        } else {
            c.right_face
        }
    }

    /// Walk the face on the left of `start` (walked forward or backward),
    /// turning clockwise at each vertex, and claim each side for `fid`.
    pub(crate) fn trace_face(
        &mut self,
        start: EdgeId,
        forward: bool,
        fid: FaceId,
    ) -> Result<(Vec<NodeId>, Vec<EdgeId>)> {
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let (mut cur, mut fw) = (start, forward);
        for _ in 0..FACE_TRACE_MAX_STEPS {
            let (from, to) = self.graph.ends(cur);
            let (a, b) = if fw { (from, to) } else { (to, from) };
            let claimed = if fw {
                self.crease(cur).left_face
            } else {
                self.crease(cur).right_face
            };
            if claimed.is_some_and(|f| f != fid) {
                return Err(PatternError::inconsistent(format!(
                    "crease {} already has a face on that side",
                    self.edge_label(cur)
                )));
            }
            let crease = self.crease_mut(cur);
            if fw {
                crease.left_face = Some(fid);
            } else {
                crease.right_face = Some(fid);
            }
            nodes.push(a);
            edges.push(cur);
            let next = self.graph.clockwise(b, cur)?;
            fw = self.graph[next].from == b;
            cur = next;
            if cur == start && fw == forward {
                return Ok((nodes, edges));
            }
        }
        Err(PatternError::Diverged {
            during: "tracing a face",
        })
    }

    /// Counts per assignment: `[M, V, Unfolded, Unknown, Boundary]`.
    pub fn assignment_histogram(&self) -> [usize; 5] {
        let mut hist = [0; 5];
        for e in self.graph.edge_ids() {
            hist[self.crease(e).assignment.index()] += 1;
        }
        hist
    }

    /// Sorted multiset of crease types.
    pub fn crease_types(&self) -> Vec<CreaseType> {
        let mut types: Vec<CreaseType> = self
            .graph
            .edge_ids()
            .map(|e| self.crease(e).crease_type)
            .collect();
        types.sort();
        types
    }

    /// Crease types incident to `v`, sorted.
    pub fn incident_types(&self, v: NodeId) -> Vec<CreaseType> {
        let mut types: Vec<CreaseType> = self.graph[v]
            .edges()
            .iter()
            .map(|&e| self.crease(e).crease_type)
            .collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests;
