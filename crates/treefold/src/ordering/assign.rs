//! Unfolded hinges, molecule sources and the mountain/valley two-colouring.

use crate::creases::{Assignment, CreaseType, CreasesGraph, GraphState, MoleculeId};
use crate::error::{PatternError, Result};
use crate::graph::{EdgeId, FaceId};
use crate::tree::DiscreteDepth;

use super::across;

/// Open every hinge whose two flaps differ in depth by two, and pick each
/// molecule's source facet. Returns the molecule holding the tree root.
pub fn assign_unfolded_hinges(g: &mut CreasesGraph, depth: &DiscreteDepth) -> Result<MoleculeId> {
    g.require_state("assign_unfolded_hinges", GraphState::PreFacetOrdering)?;
    let mut global = None;
    let edges: Vec<EdgeId> = g.graph.edge_ids().collect();
    for e in edges {
        if g.crease(e).crease_type != CreaseType::Hinge {
            continue;
        }
        let c = g.crease(e);
        let (Some(left), Some(right)) = (c.left_face, c.right_face) else {
            return Err(PatternError::inconsistent(format!(
                "hinge {} has an open side",
                g.edge_label(e)
            )));
        };
        let (lf, rf) = (&g.face(left).nav.flap, &g.face(right).nav.flap);
        let shared: Vec<&String> = lf.intersection(rf).collect();
        let only_left: Vec<&String> = lf.difference(rf).collect();
        let only_right: Vec<&String> = rf.difference(lf).collect();
        let (&[hinge_id], &[li], &[ri]) = (
            shared.as_slice(),
            only_left.as_slice(),
            only_right.as_slice(),
        ) else {
            return Err(PatternError::inconsistent(format!(
                "flaps at hinge {}: {lf:?} and {rf:?}",
                g.edge_label(e)
            )));
        };
        let (from, to) = g.graph.ends(e);
        let (df, dt) = (&g.node(from).display_id, &g.node(to).display_id);
        if hinge_id != df || hinge_id != dt {
            return Err(PatternError::inconsistent(format!(
                "hinge {} joins {df} and {dt} but separates flaps at {hinge_id}",
                g.edge_label(e)
            )));
        }
        let unfolded = match depth.get(li).abs_diff(depth.get(ri)) {
            0 => false,
            2 => true,
            diff => {
                return Err(PatternError::inconsistent(format!(
                    "flaps {li} and {ri} at hinge {} differ in depth by {diff}",
                    g.edge_label(e)
                )))
            }
        };
        let hinge_id = hinge_id.clone();
        let at_paper = g.node(from).elevation == 0.0;
        let Some(m) = c.base_face else {
            return Err(PatternError::inconsistent(format!(
                "hinge {} lies in no molecule",
                g.edge_label(e)
            )));
        };
        if unfolded {
            g.crease_mut(e).assignment = Assignment::Unfolded;
        }

        let molecule = g.molecule(m);
        if molecule.source.is_none()
            && at_paper
            && !g.face(right).nav.has_pseudohinge
            && molecule.local_root.as_deref() == Some(hinge_id.as_str())
        {
            g.molecules[m.0].source = Some(right);
            if global.is_none() && depth.get(&hinge_id) == 0 {
                global = Some(m);
            }
        }
    }
    global.ok_or_else(|| PatternError::inconsistent("Could not find global root hinge"))
}

/// Mountain or valley for the crease between `f1` and `f2` under `coloring`.
fn mountain_or_valley(g: &CreasesGraph, f1: FaceId, f2: FaceId, coloring: bool) -> Result<Assignment> {
    let index = |f: FaceId| {
        g.face(f).order.facet_order_index.ok_or_else(|| {
            PatternError::inconsistent(format!("facet {} was never ordered", g.face_label(f)))
        })
    };
    let (a, b) = (index(f1)?, index(f2)?);
    let (above, below) = (Assignment::Mountain, Assignment::Valley);
    match a.cmp(&b) {
        std::cmp::Ordering::Less => Ok(if coloring { above } else { below }),
        std::cmp::Ordering::Greater => Ok(if coloring { below } else { above }),
        std::cmp::Ordering::Equal => Err(PatternError::inconsistent(format!(
            "facets {} and {} share order index {a}",
            g.face_label(f1),
            g.face_label(f2)
        ))),
    }
}

/// Two-colour the inner faces from `start` and assign every folded crease.
///
/// Unfolded creases keep the colouring; every other crease flips it.
pub fn compute_mv_assignment(g: &mut CreasesGraph, start: FaceId) -> Result<()> {
    let mut stack = vec![(start, true)];
    while let Some((f, coloring)) = stack.pop() {
        if let Some(existing) = g.face(f).order.coloring {
            if existing != coloring {
                return Err(PatternError::inconsistent(format!(
                    "facet {} cannot be two-coloured",
                    g.face_label(f)
                )));
            }
            continue;
        }
        g.face_mut(f).order.coloring = Some(coloring);
        let mut pending = Vec::new();
        for e in g.face(f).edges.clone() {
            let o = across(g, e, f)?;
            if g.face(o).is_outer {
                continue;
            }
            let current = g.crease(e).assignment;
            if current == Assignment::Unfolded {
                pending.push((o, coloring));
                continue;
            }
            let wanted = mountain_or_valley(g, f, o, coloring)?;
            if current == Assignment::Unknown {
                g.crease_mut(e).assignment = wanted;
            } else if current != wanted {
                return Err(PatternError::inconsistent(format!(
                    "crease {} should be {} but is {}",
                    g.edge_label(e),
                    wanted.letter(),
                    current.letter()
                )));
            }
            pending.push((o, !coloring));
        }
        stack.extend(pending.into_iter().rev());
    }
    Ok(())
}
