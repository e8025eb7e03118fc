//! Pipeline entry points and the serializable design format.
//!
//! `crease_pattern` runs the four phases in order:
//! cleanup → faces → molecules → facet ordering.

use serde::{Deserialize, Serialize};

use crate::creases::{build_faces, clean_packing, has_twisted_inner_face, is_twisted, CreasesGraph};
use crate::error::{PatternError, Result};
use crate::geometry::Vec2;
use crate::molecule::generate_molecules;
use crate::ordering::order_facets;
use crate::packing::Packing;
use crate::tree::TreeGraph;

/// A tree, its packing and an optional root for the discrete depth.
#[derive(Clone, Debug)]
pub struct Design {
    pub tree: TreeGraph,
    pub packing: Packing,
    pub root: Option<String>,
}

impl Design {
    /// Explicit root, else the first branch node of the tree.
    pub fn root_id(&self) -> Option<String> {
        self.root.clone().or_else(|| self.tree.default_root())
    }

    pub fn crease_pattern(&self) -> Result<CreasesGraph> {
        crease_pattern(&self.tree, &self.packing, self.root.as_deref())
    }

    pub fn is_twisted(&self) -> Result<bool> {
        packing_is_twisted(&self.tree, &self.packing)
    }

    pub fn to_file(&self) -> DesignFile {
        let g = self.tree.graph();
        let nodes = g
            .node_ids()
            .map(|v| TreeNodeSpec {
                id: g[v].id.clone(),
                x: g[v].pos.x,
                y: g[v].pos.y,
            })
            .collect();
        let edges = g
            .edge_ids()
            .map(|e| TreeEdgeSpec {
                from: g[g[e].from].id.clone(),
                to: g[g[e].to].id.clone(),
                length: g[e].data,
            })
            .collect();
        DesignFile {
            tree: TreeSpec { nodes, edges },
            packing: self.packing.clone(),
            root: self.root.clone(),
        }
    }

    pub fn from_file(file: &DesignFile) -> Result<Self> {
        let mut tree = TreeGraph::new();
        for n in &file.tree.nodes {
            tree.add_node(n.id.clone(), Vec2::new(n.x, n.y))?;
        }
        for e in &file.tree.edges {
            tree.add_edge(&e.from, &e.to, e.length)?;
        }
        Ok(Self {
            tree,
            packing: file.packing.clone(),
            root: file.root.clone(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeNodeSpec {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeEdgeSpec {
    pub from: String,
    pub to: String,
    pub length: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<TreeNodeSpec>,
    pub edges: Vec<TreeEdgeSpec>,
}

/// On-disk design: `{"tree": {...}, "packing": {...}, "root": "1"}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesignFile {
    pub tree: TreeSpec,
    pub packing: Packing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
}

/// Run the full pipeline and return the fully assigned crease graph.
///
/// `root` picks the tree node of depth 0; `None` uses the first branch node.
/// A packing with a twisted inner face is rejected as a consistency violation
/// before insetting. A twist confined to the outer face is left to facet
/// ordering, which fails on it only when the molecule rings cannot be merged.
pub fn crease_pattern(tree: &TreeGraph, packing: &Packing, root: Option<&str>) -> Result<CreasesGraph> {
    let root = match root {
        Some(r) => r.to_string(),
        None => tree
            .default_root()
            .ok_or_else(|| PatternError::infeasible("tree has no branch node to root at"))?,
    };
    let d = tree.distances();
    let mut packing = packing.clone();
    let mut g = clean_packing(&mut packing, &d)?;
    if let Some(msg) = build_faces(&mut g)? {
        return Err(PatternError::inconsistent(msg));
    }
    if has_twisted_inner_face(&d, &g)? {
        return Err(PatternError::inconsistent(
            "packing is twisted: an inner face boundary walks a tree edge twice",
        ));
    }
    let depth = tree.dangle(&root);
    generate_molecules(&mut g, &d, packing.scale_factor, &depth)?;
    order_facets(&mut g, &depth)?;
    tracing::debug!(
        root = %root,
        nodes = g.graph().node_count(),
        edges = g.graph().edge_count(),
        faces = g.faces().len(),
        "crease pattern complete"
    );
    Ok(g)
}

/// Whether the packing folds into a twisted base: either some face touches two
/// inactive hull creases or a face boundary repeats a directed tree edge.
pub fn packing_is_twisted(tree: &TreeGraph, packing: &Packing) -> Result<bool> {
    let d = tree.distances();
    let mut packing = packing.clone();
    let mut g = clean_packing(&mut packing, &d)?;
    if build_faces(&mut g)?.is_some() {
        return Ok(true);
    }
    is_twisted(&d, &g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creases::GraphState;
    use crate::samples;

    #[test]
    fn design_file_round_trips_tree_and_root() {
        let bone = samples::bone().unwrap();
        let file = bone.to_file();
        assert_eq!(file.tree.nodes.len(), 7);
        assert_eq!(file.tree.edges.len(), 6);
        assert_eq!(file.root.as_deref(), Some("3"));
        let back = Design::from_file(&file).unwrap();
        assert_eq!(back.to_file(), file);
    }

    #[test]
    fn root_defaults_to_first_branch_node() {
        let mut star = samples::rabbit_ear().unwrap();
        star.root = None;
        assert_eq!(star.root_id().as_deref(), Some("0"));
    }

    #[test]
    fn pipeline_runs_on_canonical_designs() {
        for design in [
            samples::four_leaf_star().unwrap(),
            samples::bone().unwrap(),
            samples::lang_demaine_paper().unwrap(),
            samples::two_molecule().unwrap(),
            samples::rabbit_ear().unwrap(),
            samples::crossing_swords().unwrap(),
            samples::pseudohinge_elevation().unwrap(),
            samples::corridor_after_pseudohinge().unwrap(),
            samples::deep_merge().unwrap(),
        ] {
            let g = design.crease_pattern().unwrap();
            assert_eq!(g.state(), GraphState::FullyAssigned);
            assert_eq!(g.assignment_histogram()[3], 0);
        }
    }

    #[test]
    fn twisted_classification() {
        assert!(samples::twisted_bone().unwrap().is_twisted().unwrap());
        assert!(!samples::bone().unwrap().is_twisted().unwrap());
        assert!(!samples::four_leaf_star().unwrap().is_twisted().unwrap());
    }

    #[test]
    fn twisted_design_is_rejected_by_pipeline() {
        let err = samples::twisted_bone().unwrap().crease_pattern();
        assert!(matches!(err, Err(PatternError::Inconsistent(msg)) if msg.contains("inner face")));
    }

    #[test]
    fn outer_twist_is_left_to_ordering() {
        let deep = samples::deep_merge().unwrap();
        assert!(deep.is_twisted().unwrap());
        assert!(deep.crease_pattern().is_ok());

        let err = samples::twisted_merge().unwrap().crease_pattern().unwrap_err();
        assert!(err.to_string().contains("facet ordering reached 10 of 20"), "{err}");
    }
}
