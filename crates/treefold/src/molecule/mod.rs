//! Universal molecule construction over a faced crease graph.
//!
//! Purpose
//! - Split the axial creases at the tree's branch points and record the
//!   reduced-path table every inset level works from.
//! - Inset each active polygon recursively into ridges, hinges and gussets.
//! - Tidy up: drop straight-through inset vertices, fill the paper-boundary
//!   strips with hinges and pseudohinges.
//! - Re-trace the faces and annotate the navigation facet ordering consumes.
//!
//! Molecules are kept in an arena on the graph; creases and facets refer to
//! them by [`MoleculeId`].

mod fill;
mod inset;
mod rebuild;
mod subdivide;
mod suppress;

use std::collections::HashMap;

use crate::creases::{CreaseType, CreasesGraph, GraphState, Molecule, MoleculeId};
use crate::error::Result;
use crate::graph::{FaceId, NodeId};
use crate::tree::{DiscreteDepth, DistanceTable};

pub use rebuild::rebuild_faces;
pub use subdivide::{ZStop, ZTable};

use inset::Inset;

/// Run the molecule phase end to end: `PreUma` in, `PreFacetOrdering` out.
///
/// Returns the reduced-path table seeded from the packing's axial creases.
pub fn generate_molecules(
    g: &mut CreasesGraph,
    d: &DistanceTable,
    scale: f64,
    depth: &DiscreteDepth,
) -> Result<ZTable> {
    g.require_state("generate_molecules", GraphState::PreUma)?;
    let (z, inactive) = subdivide::subdivide_creases_initial(g, d, scale)?;

    let bases: Vec<FaceId> = g.face_ids().filter(|&f| !g.face(f).is_outer).collect();
    g.molecules.clear();
    let mut molecule_of = HashMap::new();
    for f in bases {
        let corners: Vec<NodeId> = g.face(f).nodes.clone();
        let id = MoleculeId(g.molecules.len());
        g.molecules.push(Molecule {
            corners: corners.clone(),
            ..Molecule::default()
        });
        let n = corners.len();
        for i in 0..n {
            if let Some(e) = g.graph.get_edge(corners[i], corners[(i + 1) % n]) {
                if g.crease(e).crease_type == CreaseType::InactiveHull {
                    molecule_of.insert(e, id);
                }
            }
        }
        Inset::new(id).build(g, &corners, &z, 0.0)?;
    }
    tracing::debug!(
        molecules = g.molecules.len(),
        nodes = g.graph.node_count(),
        edges = g.graph.edge_count(),
        "molecules inset"
    );

    suppress::suppress_redundant_nodes(g)?;
    fill::fill_inactive_hull(g, &inactive, &molecule_of)?;
    g.advance(GraphState::PostUma);
    rebuild_faces(g, depth)?;
    Ok(z)
}

#[cfg(test)]
mod tests;
