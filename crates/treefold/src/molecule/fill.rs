//! Hinges and pseudohinges across the paper-boundary strips.
//!
//! A molecule side on an inactive hull edge is bounded inside by a chain of
//! ridges. Every odd-degree vertex on that chain gets a crease dropped
//! perpendicular onto the hull edge so the vertex satisfies Maekawa.

use std::collections::HashMap;

use crate::cfg::FACE_TRACE_MAX_STEPS;
use crate::creases::{CreaseType, CreasesGraph, MoleculeId, NodeKind};
use crate::error::{PatternError, Result};
use crate::graph::{EdgeId, NodeId};

/// Vertices walked clockwise from `e.to` back to `e.from` along the molecule
/// side of `e`, endpoints excluded.
fn inner_chain(g: &CreasesGraph, e: EdgeId) -> Result<Vec<NodeId>> {
    let (a, b) = g.graph.ends(e);
    let mut chain = Vec::new();
    let (mut cur, mut at) = (e, b);
    for _ in 0..FACE_TRACE_MAX_STEPS {
        let next = g.graph.clockwise(at, cur)?;
        let o = g.graph[next].other(at);
        if o == a {
            return Ok(chain);
        }
        chain.push(o);
        cur = next;
        at = o;
    }
    Err(PatternError::Diverged {
        during: "walking an inactive hull strip",
    })
}

pub(super) fn fill_inactive_hull(
    g: &mut CreasesGraph,
    inactive: &[EdgeId],
    molecule_of: &HashMap<EdgeId, MoleculeId>,
) -> Result<()> {
    for &e in inactive {
        let molecule = *molecule_of.get(&e).ok_or_else(|| {
            PatternError::inconsistent(format!(
                "inactive hull crease {} borders no molecule",
                g.edge_label(e)
            ))
        })?;
        let (a, b) = g.graph.ends(e);
        let pa = g.pos(a);
        let dir = (g.pos(b) - pa).normalize();
        let mut feet: Vec<(f64, NodeId)> = inner_chain(g, e)?
            .into_iter()
            .filter(|&v| g.graph[v].degree() % 2 == 1)
            .map(|v| ((g.pos(v) - pa).dot(&dir), v))
            .collect();
        if feet.is_empty() {
            continue;
        }
        feet.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));

        let mut points = Vec::with_capacity(feet.len());
        for &(s, v) in &feet {
            let display = g.node(v).display_id.clone();
            points.push(g.add_created_node(pa + dir * s, NodeKind::Projection, &display, 0.0)?);
        }
        let hull = g.edge_label(e);
        g.subdivide_crease(e, &points)?;
        for (&(_, v), &foot) in feet.iter().zip(&points) {
            let hinge_at_v = g.graph[v]
                .edges()
                .iter()
                .any(|&f| g.crease(f).crease_type == CreaseType::Hinge);
            let t = if hinge_at_v {
                CreaseType::Hinge
            } else {
                CreaseType::Pseudohinge
            };
            g.add_crease(foot, v, t, Some(molecule))?;
        }
        tracing::trace!(
            %hull,
            feet = points.len(),
            "filled inactive hull strip"
        );
    }
    Ok(())
}
