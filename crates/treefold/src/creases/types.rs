//! Crease-pattern payloads: node/crease data, faces, molecules and states.

use std::collections::BTreeSet;

use crate::graph::{EdgeId, FaceId, NodeId};

/// Lifecycle of a [`super::CreasesGraph`]; phases advance strictly in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GraphState {
    NewlyCreated,
    Clean,
    PreUma,
    PostUma,
    PreFacetOrdering,
    FullyAssigned,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CreaseType {
    Axial,
    ActiveHull,
    InactiveHull,
    Ridge,
    Hinge,
    Pseudohinge,
    Gusset,
}

impl CreaseType {
    pub fn default_assignment(self) -> Assignment {
        match self {
            CreaseType::ActiveHull | CreaseType::InactiveHull => Assignment::Boundary,
            _ => Assignment::Unknown,
        }
    }

    /// Axial or hull creases: the polygon sides of the packing.
    pub fn is_axial(self) -> bool {
        matches!(
            self,
            CreaseType::Axial | CreaseType::ActiveHull | CreaseType::InactiveHull
        )
    }

    pub fn is_gusset_or_pseudohinge(self) -> bool {
        matches!(self, CreaseType::Gusset | CreaseType::Pseudohinge)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Assignment {
    Mountain,
    Valley,
    Unfolded,
    Unknown,
    Boundary,
}

impl Assignment {
    /// Slot in [`super::CreasesGraph::assignment_histogram`].
    pub fn index(self) -> usize {
        match self {
            Assignment::Mountain => 0,
            Assignment::Valley => 1,
            Assignment::Unfolded => 2,
            Assignment::Unknown => 3,
            Assignment::Boundary => 4,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Assignment::Mountain => 'M',
            Assignment::Valley => 'V',
            Assignment::Unfolded => 'U',
            Assignment::Unknown => '?',
            Assignment::Boundary => 'B',
        }
    }
}

/// How a crease-pattern vertex came to exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A packed leaf of the tree.
    Leaf,
    /// Branch point projected onto a polygon side.
    Boundary,
    /// Created while insetting a molecule.
    Inset,
    /// Ridge vertex projected onto an inactive hull side.
    Projection,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreaseNode {
    /// Tree node this vertex folds onto.
    pub display_id: String,
    pub elevation: f64,
    pub kind: NodeKind,
}

impl CreaseNode {
    pub fn leaf(id: &str) -> Self {
        Self {
            display_id: id.to_string(),
            elevation: 0.0,
            kind: NodeKind::Leaf,
        }
    }
}

/// Base polygon a crease was created inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoleculeId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub struct Crease {
    pub crease_type: CreaseType,
    pub assignment: Assignment,
    pub left_face: Option<FaceId>,
    pub right_face: Option<FaceId>,
    pub base_face: Option<MoleculeId>,
}

impl Crease {
    pub fn new(crease_type: CreaseType, base_face: Option<MoleculeId>) -> Self {
        Self {
            crease_type,
            assignment: crease_type.default_assignment(),
            left_face: None,
            right_face: None,
            base_face,
        }
    }

    /// Change the type; the assignment follows the new type's default.
    pub fn retype(&mut self, crease_type: CreaseType) {
        self.crease_type = crease_type;
        self.assignment = crease_type.default_assignment();
    }
}

/// One active polygon of the clean packing and its ordering anchors.
#[derive(Clone, Debug, Default)]
pub struct Molecule {
    /// Polygon corners, counter-clockwise.
    pub corners: Vec<NodeId>,
    /// Branch point on the boundary with the smallest discrete depth.
    pub local_root: Option<String>,
    /// Axial facet where facet ordering enters this molecule.
    pub source: Option<FaceId>,
}

/// Navigation filled in when faces are rebuilt after insetting.
#[derive(Clone, Debug, Default)]
pub struct FaceNav {
    /// The single axial or hull crease, if this is an axial facet.
    pub axial: Option<EdgeId>,
    pub cross_axial: Option<FaceId>,
    pub cross_ridge: Option<FaceId>,
    pub cross_gusset_or_pseudohinge: Option<FaceId>,
    /// Chain of facets from this axial facet to the next one; `Some` iff axial.
    pub corridor: Option<Vec<FaceId>>,
    /// Tree node ids the facet projects to.
    pub flap: BTreeSet<String>,
    pub has_pseudohinge: bool,
    pub molecule: Option<MoleculeId>,
    pub crease_to_next_axial_facet: Option<EdgeId>,
}

/// State written while ordering facets.
#[derive(Clone, Debug, Default)]
pub struct FaceOrder {
    pub facet_order_index: Option<usize>,
    pub coloring: Option<bool>,
    pub extended_has_pseudohinge: bool,
    pub crease_to_prev_axial_facet: Option<EdgeId>,
}

#[derive(Clone, Debug, Default)]
pub struct Face {
    /// Boundary nodes with the face on the left of each side.
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
    pub is_outer: bool,
    pub nav: FaceNav,
    pub order: FaceOrder,
}

impl Face {
    pub fn new(nodes: Vec<NodeId>, edges: Vec<EdgeId>) -> Self {
        Self {
            nodes,
            edges,
            ..Self::default()
        }
    }
}
