//! Face re-tracing after insetting, plus the navigation facet ordering walks.

use std::collections::BTreeSet;

use crate::cfg::{ANGLE_TOLERANCE, CORRIDOR_MAX_ITERATIONS, RING_WALK_MAX_ITERATIONS};
use crate::creases::{
    mark_outer_face, CreaseType, CreasesGraph, Face, GraphState, MoleculeId, NodeKind,
};
use crate::error::{PatternError, Result};
use crate::graph::{EdgeId, FaceId, NodeId};
use crate::tree::DiscreteDepth;

/// Re-derive every face and annotate axial facets with their corridor, flap
/// and molecule ring successor.
pub fn rebuild_faces(g: &mut CreasesGraph, depth: &DiscreteDepth) -> Result<()> {
    g.require_state("rebuild_faces", GraphState::PostUma)?;
    trace_all_faces(g)?;
    let (v, e, f) = (g.graph.node_count(), g.graph.edge_count(), g.faces.len());
    if v + f != e + 2 {
        return Err(PatternError::inconsistent(format!(
            "Euler characteristic broken: {v} nodes, {e} edges, {f} faces"
        )));
    }
    annotate_crossings(g)?;
    build_corridors(g)?;
    assign_flaps(g)?;
    link_molecule_rings(g, depth)?;
    g.advance(GraphState::PreFacetOrdering);
    Ok(())
}

fn trace_all_faces(g: &mut CreasesGraph) -> Result<()> {
    let edges: Vec<EdgeId> = g.graph.edge_ids().collect();
    for &e in &edges {
        let c = g.crease_mut(e);
        c.left_face = None;
        c.right_face = None;
    }
    g.faces.clear();
    for e in edges {
        for forward in [true, false] {
            let c = g.crease(e);
            if (if forward { c.left_face } else { c.right_face }).is_some() {
                continue;
            }
            let fid = FaceId(g.faces.len());
            let (nodes, sides) = g.trace_face(e, forward, fid)?;
            g.faces.push(Face::new(nodes, sides));
        }
    }
    mark_outer_face(g)?;
    Ok(())
}

fn across(g: &CreasesGraph, e: EdgeId, f: FaceId) -> Result<FaceId> {
    g.other_face(e, f).ok_or_else(|| {
        PatternError::inconsistent(format!("crease {} has an open side", g.edge_label(e)))
    })
}

fn annotate_crossings(g: &mut CreasesGraph) -> Result<()> {
    for f in g.face_ids().collect::<Vec<_>>() {
        let face = g.face(f);
        let has_pseudohinge = face
            .edges
            .iter()
            .any(|&e| g.crease(e).crease_type == CreaseType::Pseudohinge);
        let molecule = if face.is_outer {
            None
        } else {
            face.edges.iter().find_map(|&e| g.crease(e).base_face)
        };
        let nav = &mut g.face_mut(f).nav;
        nav.has_pseudohinge = has_pseudohinge;
        nav.molecule = molecule;
    }

    for f in g.face_ids().collect::<Vec<_>>() {
        if g.face(f).is_outer {
            continue;
        }
        let edges = g.face(f).edges.clone();
        let axial: Vec<EdgeId> = edges
            .iter()
            .copied()
            .filter(|&e| g.crease(e).crease_type.is_axial())
            .collect();
        if axial.len() > 1 {
            return Err(PatternError::inconsistent(format!(
                "facet {} has {} axial creases",
                g.face_label(f),
                axial.len()
            )));
        }
        let cross_axial = match axial.first() {
            Some(&e) => Some(across(g, e, f)?),
            None => None,
        };

        // Prefer a pseudohinge-bearing neighbour, then the highest ridge.
        let mut best: Option<((bool, f64), FaceId)> = None;
        for &e in &edges {
            if g.crease(e).crease_type != CreaseType::Ridge {
                continue;
            }
            let o = across(g, e, f)?;
            let (a, b) = g.graph.ends(e);
            let key = (
                g.face(o).nav.has_pseudohinge,
                g.node(a).elevation + g.node(b).elevation,
            );
            let better = match best {
                None => true,
                Some(((ph, el), _)) => key.0 > ph || (key.0 == ph && key.1 > el),
            };
            if better {
                best = Some((key, o));
            }
        }
        let cross_gusset_or_pseudohinge = match edges
            .iter()
            .find(|&&e| g.crease(e).crease_type.is_gusset_or_pseudohinge())
        {
            Some(&e) => Some(across(g, e, f)?),
            None => None,
        };

        let nav = &mut g.face_mut(f).nav;
        nav.axial = axial.first().copied();
        nav.cross_axial = cross_axial;
        nav.cross_ridge = best.map(|(_, o)| o);
        nav.cross_gusset_or_pseudohinge = cross_gusset_or_pseudohinge;
    }
    Ok(())
}

fn axial_facets(g: &CreasesGraph) -> Vec<FaceId> {
    g.face_ids()
        .filter(|&f| !g.face(f).is_outer && g.face(f).nav.axial.is_some())
        .collect()
}

/// Walk alternately across ridges and gussets/pseudohinges until the next
/// axial facet without a pseudohinge.
fn build_corridors(g: &mut CreasesGraph) -> Result<()> {
    for f in axial_facets(g) {
        let mut corridor = vec![f];
        let mut cur = f;
        let mut over_ridge = true;
        let mut closed = false;
        for _ in 0..CORRIDOR_MAX_ITERATIONS {
            let nav = &g.face(cur).nav;
            let next = if over_ridge {
                nav.cross_ridge
            } else {
                nav.cross_gusset_or_pseudohinge
            };
            let Some(next) = next else {
                return Err(PatternError::inconsistent(format!(
                    "corridor dead end at facet {}",
                    g.face_label(cur)
                )));
            };
            corridor.push(next);
            cur = next;
            let nav = &g.face(cur).nav;
            if nav.axial.is_some() && !nav.has_pseudohinge {
                closed = true;
                break;
            }
            over_ridge = !over_ridge;
        }
        if !closed {
            return Err(PatternError::Diverged {
                during: "walking a corridor",
            });
        }
        tracing::trace!(facet = %g.face_label(f), len = corridor.len(), "corridor");
        g.face_mut(f).nav.corridor = Some(corridor);
    }
    Ok(())
}

/// The two tree nodes a corridor's axial creases project onto.
fn assign_flaps(g: &mut CreasesGraph) -> Result<()> {
    for f in axial_facets(g) {
        let corridor = g.face(f).nav.corridor.clone().unwrap_or_default();
        let mut flap = BTreeSet::new();
        for &c in &corridor {
            let Some(e) = g.face(c).nav.axial else {
                continue;
            };
            if g.crease(e).crease_type == CreaseType::InactiveHull {
                continue;
            }
            let (a, b) = g.graph.ends(e);
            flap.insert(g.node(a).display_id.clone());
            flap.insert(g.node(b).display_id.clone());
        }
        if flap.len() != 2 {
            let faces: Vec<String> = corridor.iter().map(|&c| g.face_label(c)).collect();
            return Err(PatternError::inconsistent(format!(
                "corridor {} projects onto {flap:?}, expected two tree nodes",
                faces.join(" ")
            )));
        }
        for &c in &corridor {
            g.face_mut(c).nav.flap = flap.clone();
        }
    }
    Ok(())
}

/// Every vertex on the molecule's polygon sides, counter-clockwise.
fn boundary_ring(g: &CreasesGraph, corners: &[NodeId]) -> Result<Vec<NodeId>> {
    let n = corners.len();
    let mut ring = Vec::new();
    for i in 0..n {
        let (a, b) = (corners[i], corners[(i + 1) % n]);
        ring.push(a);
        let dir = (g.pos(b) - g.pos(a)).normalize();
        let mut cur = a;
        let mut reached = false;
        for _ in 0..RING_WALK_MAX_ITERATIONS {
            let mut next = None;
            for &e in g.graph[cur].edges() {
                if !g.crease(e).crease_type.is_axial() {
                    continue;
                }
                let o = g.graph[e].other(cur);
                if (g.pos(o) - g.pos(cur)).normalize().dot(&dir) > 1.0 - ANGLE_TOLERANCE {
                    next = Some(o);
                }
            }
            let Some(next) = next else {
                return Err(PatternError::inconsistent(format!(
                    "polygon side {}-{} is broken at {}",
                    g.label(a),
                    g.label(b),
                    g.label(cur)
                )));
            };
            if next == b {
                reached = true;
                break;
            }
            ring.push(next);
            cur = next;
        }
        if !reached {
            return Err(PatternError::Diverged {
                during: "walking a polygon side",
            });
        }
    }
    Ok(ring)
}

/// Local roots plus `crease_to_next_axial_facet` around every molecule.
fn link_molecule_rings(g: &mut CreasesGraph, depth: &DiscreteDepth) -> Result<()> {
    for m in 0..g.molecules.len() {
        let corners = g.molecules[m].corners.clone();
        let ring = boundary_ring(g, &corners)?;
        let mut best: Option<(u32, String)> = None;
        for &v in &ring {
            let node = g.node(v);
            if !matches!(node.kind, NodeKind::Boundary | NodeKind::Projection) {
                continue;
            }
            let k = depth.get(&node.display_id);
            if best.as_ref().map_or(true, |(d, _)| k < *d) {
                best = Some((k, node.display_id.clone()));
            }
        }
        g.molecules[m].local_root = best.map(|(_, id)| id);

        let k = ring.len();
        for i in 0..k {
            let (u, v) = (ring[i], ring[(i + 1) % k]);
            let e = g.graph.require_edge(u, v)?;
            let f = g.face_left_of(e, u).ok_or_else(|| {
                PatternError::inconsistent(format!("side {} has no inner facet", g.edge_label(e)))
            })?;
            let next = g.graph.clockwise(v, e)?;
            let nav = &mut g.face_mut(f).nav;
            nav.crease_to_next_axial_facet = Some(next);
            nav.molecule = Some(MoleculeId(m));
        }
    }
    Ok(())
}
