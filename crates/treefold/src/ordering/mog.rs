//! Molecule ring walks that build the facet ordering graph.

use std::collections::HashSet;

use crate::cfg::{CORRIDOR_MAX_ITERATIONS, RING_WALK_MAX_ITERATIONS};
use crate::creases::{Assignment, CreaseType, CreasesGraph, MoleculeId};
use crate::error::{PatternError, Result};
use crate::graph::FaceId;

use super::{
    across, corridor, molecule_of, next_crease, prev_crease, source_of, FacetOrderingGraph,
};

/// Mark maximal runs of ring facets joined by unfolded creases that contain a
/// pseudohinge, and record each facet's incoming ring crease.
fn annotate_extended_pseudohinges(g: &mut CreasesGraph, source: FaceId) -> Result<()> {
    let mut cur = source;
    let mut run = Vec::new();
    let mut found = false;
    for _ in 0..RING_WALK_MAX_ITERATIONS {
        run.push(cur);
        let crease = next_crease(g, cur)?;
        found |= g.face(cur).nav.has_pseudohinge;
        if g.crease(crease).assignment != Assignment::Unfolded {
            if found {
                for &f in &run {
                    g.face_mut(f).order.extended_has_pseudohinge = true;
                }
            }
            run.clear();
            found = false;
        }
        let next = across(g, crease, cur)?;
        g.face_mut(next).order.crease_to_prev_axial_facet = Some(crease);
        if next == source {
            return Ok(());
        }
        cur = next;
    }
    Err(PatternError::Diverged {
        during: "annotating extended pseudohinges",
    })
}

/// First facet at or after `f` on the ring outside an extended pseudohinge run.
fn next_non_pseudohinge(g: &CreasesGraph, mut f: FaceId) -> Result<FaceId> {
    for _ in 0..CORRIDOR_MAX_ITERATIONS {
        if !g.face(f).order.extended_has_pseudohinge {
            return Ok(f);
        }
        f = across(g, next_crease(g, f)?, f)?;
    }
    Err(PatternError::Diverged {
        during: "skipping pseudohinge facets",
    })
}

/// Whether the walk may jump across `f1`'s axial crease into the neighbour
/// molecule: both ring hinges sit on the same tree node, which is the local
/// root of one of the two molecules.
fn is_valid_merge_point(g: &CreasesGraph, f1: FaceId) -> Result<bool> {
    let h1 = next_crease(g, f1)?;
    if g.crease(h1).crease_type != CreaseType::Hinge {
        return Ok(false);
    }
    let n1 = across(g, h1, f1)?;
    let f2 = g.face(n1).nav.cross_axial.ok_or_else(|| {
        PatternError::inconsistent(format!("facet {} has no axial crease", g.face_label(n1)))
    })?;
    if g.face(f2).is_outer {
        return Err(PatternError::inconsistent(format!(
            "merge from {} crosses onto the outer face",
            g.face_label(f1)
        )));
    }
    let h2 = next_crease(g, f2)?;
    if g.crease(h2).crease_type != CreaseType::Hinge {
        return Err(PatternError::inconsistent(format!(
            "merge partner {} is not followed by a hinge",
            g.face_label(f2)
        )));
    }
    let hinge_id = &g.node(g.graph[h1].from).display_id;
    if *hinge_id != g.node(g.graph[h2].from).display_id {
        return Err(PatternError::inconsistent(format!(
            "hinges {} and {} sit on different tree nodes",
            g.edge_label(h1),
            g.edge_label(h2)
        )));
    }
    let rooted_here = |f: FaceId| -> Result<bool> {
        let m = molecule_of(g, f)?;
        Ok(g.molecule(m).local_root.as_ref() == Some(hinge_id))
    };
    Ok(rooted_here(f1)? || rooted_here(f2)?)
}

/// Follow unfolded ring creases away from a pseudohinge corridor, attaching
/// each reached facet's corridor. `launched` holds every facet placed this
/// way so far.
fn launch(
    g: &CreasesGraph,
    og: &mut FacetOrderingGraph,
    launched: &mut HashSet<FaceId>,
    mut cur: FaceId,
    forward: bool,
) -> Result<()> {
    for _ in 0..CORRIDOR_MAX_ITERATIONS {
        let crease = if forward {
            next_crease(g, cur)?
        } else {
            prev_crease(g, cur)?
        };
        let next = across(g, crease, cur)?;
        if g.crease(crease).assignment != Assignment::Unfolded || g.face(next).nav.has_pseudohinge {
            return Ok(());
        }
        og.add_face(next);
        og.add_edge(cur, next);
        // A run between two pseudohinge facets can be entered from both ends;
        // the second entry only links to it.
        if !launched.insert(next) {
            return Ok(());
        }
        cur = next;
        let chain = corridor(g, cur)?;
        if og.contains(chain[1]) {
            return Err(PatternError::inconsistent(format!(
                "corridor from {} was already walked",
                g.face_label(cur)
            )));
        }
        let mut last = cur;
        for &c in &chain[1..] {
            if og.contains(c) {
                return Err(PatternError::inconsistent(format!(
                    "corridor after pseudohinge revisits {}",
                    g.face_label(c)
                )));
            }
            og.add_face(c);
            og.add_edge(last, c);
            last = c;
        }
    }
    Err(PatternError::Diverged {
        during: "launching pseudohinge corridors",
    })
}

/// Walk molecule `m`'s ring, attaching corridors and recursing into
/// neighbour molecules at valid merge points.
///
/// The global molecule's ring is cut just before its source. A molecule
/// entered through facet `merge` is cut just before that facet instead, and
/// its last facet links back across the axial crease to the parent's ring
/// unless `rejoin` is false.
pub(super) fn build_rog(
    g: &mut CreasesGraph,
    og: &mut FacetOrderingGraph,
    visited: &mut HashSet<MoleculeId>,
    launched: &mut HashSet<FaceId>,
    m: MoleculeId,
    merge: Option<FaceId>,
    rejoin: bool,
) -> Result<()> {
    visited.insert(m);
    let source = source_of(g, m)?;
    og.add_face(source);
    annotate_extended_pseudohinges(g, source)?;
    let start = next_non_pseudohinge(g, merge.unwrap_or(source))?;
    let mut cur = start;
    for _ in 0..RING_WALK_MAX_ITERATIONS {
        let chain = corridor(g, cur)?;
        if !og.contains(chain[1]) {
            let mut last = cur;
            for &c in &chain[1..] {
                if og.contains(c) {
                    return Err(PatternError::inconsistent(format!(
                        "corridor facet {} was already visited",
                        g.face_label(c)
                    )));
                }
                og.add_face(c);
                og.add_edge(last, c);
                if g.face(c).nav.has_pseudohinge && g.face(last).nav.has_pseudohinge {
                    let (fc, fl) = (g.face(c), g.face(last));
                    let forward =
                        fc.order.crease_to_prev_axial_facet == fl.nav.crease_to_next_axial_facet;
                    let backward =
                        fc.nav.crease_to_next_axial_facet == fl.order.crease_to_prev_axial_facet;
                    if forward == backward {
                        return Err(PatternError::inconsistent(format!(
                            "cannot tell the ring direction between {} and {}",
                            g.face_label(last),
                            g.face_label(c)
                        )));
                    }
                    launch(g, og, launched, c, forward)?;
                }
                last = c;
            }
        }

        let next = next_non_pseudohinge(g, across(g, next_crease(g, cur)?, cur)?)?;
        if g.face(next).is_outer {
            return Err(PatternError::inconsistent(format!(
                "ring of molecule {} runs onto the outer face",
                m.0
            )));
        }
        og.add_face(next);
        let jump = g.face(cur).nav.cross_axial.ok_or_else(|| {
            PatternError::inconsistent(format!("facet {} has no axial crease", g.face_label(cur)))
        })?;
        let mergeable = !g.face(jump).is_outer
            && !visited.contains(&molecule_of(g, jump)?)
            && is_valid_merge_point(g, cur)?;
        if mergeable {
            let target = molecule_of(g, jump)?;
            // Merging at the global cut hands the rest of the path to `target`.
            let at_cut = merge.is_none() && next == start;
            tracing::trace!(
                from = m.0,
                to = target.0,
                facet = %g.face_label(jump),
                at_cut,
                "molecule jump"
            );
            og.add_face(jump);
            og.add_edge(cur, jump);
            build_rog(g, og, visited, launched, target, Some(jump), !at_cut)?;
            if at_cut {
                return Ok(());
            }
        } else if next == start {
            if merge.is_some() && rejoin {
                og.add_edge(cur, jump);
            }
            return Ok(());
        } else {
            og.add_edge(cur, next);
        }
        cur = next;
    }
    Err(PatternError::Diverged {
        during: "building the molecule ordering graph",
    })
}
