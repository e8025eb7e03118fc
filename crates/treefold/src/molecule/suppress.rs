//! Removal of inset vertices that only straighten a ridge or hinge.

use crate::cfg::TOLERANCE;
use crate::creases::{CreaseType, CreasesGraph, NodeKind};
use crate::error::{PatternError, Result};
use crate::geometry::parallelogram_area;
use crate::graph::{EdgeId, NodeId};

/// `v` lies on the segment between its two neighbours, strictly inside it.
fn straight_through(g: &CreasesGraph, v: NodeId, e1: EdgeId, e2: EdgeId) -> bool {
    let p = g.pos(v);
    let a = g.pos(g.graph[e1].other(v));
    let b = g.pos(g.graph[e2].other(v));
    let ab = b - a;
    let offset = parallelogram_area(ab, p - a).abs() / ab.norm();
    offset < TOLERANCE && (a - p).dot(&(b - p)) < 0.0
}

/// Merge the two creases of every degree-2 inset vertex whose creases run
/// straight through it. The merged crease runs from the lower endpoint.
pub(super) fn suppress_redundant_nodes(g: &mut CreasesGraph) -> Result<usize> {
    let candidates: Vec<NodeId> = g.graph.node_ids().collect();
    let mut removed = 0;
    for v in candidates {
        let Some(node) = g.graph.try_node(v) else {
            continue;
        };
        if node.data.kind != NodeKind::Inset || node.degree() != 2 {
            continue;
        }
        let (e1, e2) = (node.edges()[0], node.edges()[1]);
        let (t1, t2) = (g.crease(e1).crease_type, g.crease(e2).crease_type);
        let foldable = |t: CreaseType| matches!(t, CreaseType::Ridge | CreaseType::Hinge);
        if !foldable(t1) || !foldable(t2) || !straight_through(g, v, e1, e2) {
            continue;
        }
        if t1 != t2 {
            return Err(PatternError::inconsistent(format!(
                "straight vertex {} joins a {t1:?} and a {t2:?}",
                g.label(v)
            )));
        }
        let mut a = g.graph[e1].other(v);
        let mut b = g.graph[e2].other(v);
        if g.node(a).elevation > g.node(b).elevation {
            std::mem::swap(&mut a, &mut b);
        }
        let base = g.crease(e1).base_face;
        g.graph.remove_edge(e1)?;
        g.graph.remove_edge(e2)?;
        g.graph.remove_node(v)?;
        g.add_crease(a, b, t1, base)?;
        removed += 1;
    }
    tracing::debug!(removed, "redundant inset nodes suppressed");
    Ok(removed)
}
