//! Facet ordering and mountain/valley assignment.
//!
//! Purpose
//! - Decide which hinges stay folded and which open flat, from the tree depth
//!   of the flaps on either side.
//! - Walk every molecule's ring of axial facets, chaining corridors into a
//!   facet ordering graph and merging into neighbouring molecules at shared
//!   root hinges.
//! - Sort that graph into a stacking order and two-colour the dual graph to
//!   turn the order into mountain and valley creases.
//!
//! A cycle in the ordering graph means the pattern cannot be stacked and is
//! reported as a consistency violation; it is never retried.

mod assign;
mod graph;
mod mog;

use std::collections::HashSet;

use crate::creases::{CreasesGraph, GraphState, MoleculeId};
use crate::error::{PatternError, Result};
use crate::graph::{EdgeId, FaceId};
use crate::tree::DiscreteDepth;

pub use assign::{assign_unfolded_hinges, compute_mv_assignment};
pub use graph::FacetOrderingGraph;

/// Order every inner facet and assign every crease: `PreFacetOrdering` in,
/// `FullyAssigned` out. Returns the ordering graph that produced the order.
pub fn order_facets(g: &mut CreasesGraph, depth: &DiscreteDepth) -> Result<FacetOrderingGraph> {
    g.require_state("order_facets", GraphState::PreFacetOrdering)?;
    let global = assign_unfolded_hinges(g, depth)?;
    let start = source_of(g, global)?;

    let mut og = FacetOrderingGraph::new();
    let mut visited = HashSet::new();
    let mut launched = HashSet::new();
    mog::build_rog(g, &mut og, &mut visited, &mut launched, global, None, true)?;
    let order = og.topological_sort()?;
    for (i, &f) in order.iter().enumerate() {
        g.face_mut(f).order.facet_order_index = Some(i);
    }
    let inner = g.faces().len() - 1;
    if og.len() != inner {
        return Err(PatternError::inconsistent(format!(
            "facet ordering reached {} of {inner} inner facets",
            og.len()
        )));
    }
    compute_mv_assignment(g, start)?;
    g.advance(GraphState::FullyAssigned);
    Ok(og)
}

fn source_of(g: &CreasesGraph, m: MoleculeId) -> Result<FaceId> {
    g.molecule(m).source.ok_or_else(|| {
        PatternError::inconsistent(format!("molecule {} has no source facet", m.0))
    })
}

fn across(g: &CreasesGraph, e: EdgeId, f: FaceId) -> Result<FaceId> {
    g.other_face(e, f).ok_or_else(|| {
        PatternError::inconsistent(format!("crease {} has an open side", g.edge_label(e)))
    })
}

/// Crease leading to the next axial facet around the molecule ring.
fn next_crease(g: &CreasesGraph, f: FaceId) -> Result<EdgeId> {
    g.face(f).nav.crease_to_next_axial_facet.ok_or_else(|| {
        PatternError::inconsistent(format!("facet {} is not on a molecule ring", g.face_label(f)))
    })
}

fn prev_crease(g: &CreasesGraph, f: FaceId) -> Result<EdgeId> {
    g.face(f).order.crease_to_prev_axial_facet.ok_or_else(|| {
        PatternError::inconsistent(format!(
            "facet {} was never reached around its ring",
            g.face_label(f)
        ))
    })
}

fn molecule_of(g: &CreasesGraph, f: FaceId) -> Result<MoleculeId> {
    g.face(f).nav.molecule.ok_or_else(|| {
        PatternError::inconsistent(format!("facet {} belongs to no molecule", g.face_label(f)))
    })
}

fn corridor(g: &CreasesGraph, f: FaceId) -> Result<Vec<FaceId>> {
    match &g.face(f).nav.corridor {
        Some(c) if c.len() >= 2 => Ok(c.clone()),
        _ => Err(PatternError::inconsistent(format!(
            "facet {} has no corridor",
            g.face_label(f)
        ))),
    }
}

#[cfg(test)]
mod tests;
