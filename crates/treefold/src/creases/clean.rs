//! Packing cleanup: grow or move leaves until every one is held by taut
//! constraints and no active polygon has a reflex gap.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::f64::consts::{PI, TAU};

use crate::cfg::{
    BINARY_SEARCH_MAX_RADIUS, BINARY_SEARCH_STEPS, BINARY_SEARCH_TOLERANCE,
    CLEANUP_MAX_ITERATIONS, TOLERANCE,
};
use crate::error::{PatternError, Result};
use crate::geometry::{angle_of, boundary_slack, circle_intersection, in_unit_square, Vec2};
use crate::graph::NodeId;
use crate::packing::Packing;
use crate::tree::DistanceTable;

use super::{CreaseType, CreasesGraph, GraphState};

/// Scaled tree distance plus both leaf extensions.
fn active_distance(g: &CreasesGraph, d: &DistanceTable, a: NodeId, b: NodeId) -> Result<f64> {
    let (ia, ib) = (g.label(a), g.label(b));
    let tree = d.distance(ia, ib)?;
    Ok(g.scale_factor() * (tree + g.leaf_extension(ia) + g.leaf_extension(ib)))
}

fn slack(g: &CreasesGraph, d: &DistanceTable, a: NodeId, b: NodeId) -> Result<f64> {
    Ok((g.pos(a) - g.pos(b)).norm() - active_distance(g, d, a, b)?)
}

/// Taut within tolerance; an overlap beyond tolerance is infeasible.
fn is_active(g: &CreasesGraph, d: &DistanceTable, a: NodeId, b: NodeId) -> Result<bool> {
    let s = slack(g, d, a, b)?;
    if s < -TOLERANCE {
        return Err(PatternError::infeasible(format!(
            "nodes {} and {} overlap by {:.6}",
            g.label(a),
            g.label(b),
            -s
        )));
    }
    Ok(s < TOLERANCE)
}

/// Axial crease between an active pair, directed from the smaller id.
fn add_axial(g: &mut CreasesGraph, u: NodeId, v: NodeId) -> Result<()> {
    let (a, b) = if g.label(u) < g.label(v) { (u, v) } else { (v, u) };
    g.add_crease(a, b, CreaseType::Axial, None)?;
    Ok(())
}

fn detach(g: &mut CreasesGraph, v: NodeId) -> Result<BTreeSet<NodeId>> {
    let mut touched = BTreeSet::new();
    for e in g.graph[v].edges().to_vec() {
        touched.insert(g.graph[e].other(v));
        g.graph.remove_edge(e)?;
    }
    Ok(touched)
}

/// Rebuild `v`'s axial creases; returns every neighbour that changed.
fn refresh(g: &mut CreasesGraph, d: &DistanceTable, v: NodeId) -> Result<BTreeSet<NodeId>> {
    let mut changed = detach(g, v)?;
    let others: Vec<NodeId> = g.graph.node_ids().filter(|&u| u != v).collect();
    for u in others {
        if is_active(g, d, u, v)? {
            changed.insert(u);
            add_axial(g, u, v)?;
        }
    }
    Ok(changed)
}

fn active_neighbours(g: &CreasesGraph, v: NodeId) -> Vec<NodeId> {
    g.graph[v]
        .edges()
        .iter()
        .map(|&e| g.graph[e].other(v))
        .collect()
}

/// Two angularly adjacent active neighbours subtending more than π at `v`.
fn convex_gap(g: &CreasesGraph, v: NodeId, active: &[NodeId]) -> Option<(NodeId, NodeId)> {
    let p = g.pos(v);
    let mut around: Vec<(f64, NodeId)> = active
        .iter()
        .map(|&u| (angle_of(g.pos(u) - p), u))
        .collect();
    around.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    let n = around.len();
    (0..n).find_map(|i| {
        let (a0, u0) = around[i];
        let (a1, u1) = around[(i + 1) % n];
        let gap = if i + 1 < n { a1 - a0 } else { a1 + TAU - a0 };
        (gap > PI + TOLERANCE).then_some((u0, u1))
    })
}

/// Grow the extension of a node with no taut constraint by its smallest slack.
fn grow_free_node(g: &mut CreasesGraph, d: &DistanceTable, v: NodeId) -> Result<BTreeSet<NodeId>> {
    let mut best: Option<f64> = None;
    for u in g.graph.node_ids().filter(|&u| u != v) {
        let s = slack(g, d, v, u)?;
        if best.map_or(true, |b| s < b) {
            best = Some(s);
        }
    }
    let r = match best {
        Some(r) if r > 0.0 => r,
        _ => {
            return Err(PatternError::infeasible(format!(
                "no binding constraint for free node {}",
                g.label(v)
            )))
        }
    };
    let id = g.label(v).to_string();
    g.grow_leaf_extension(&id, r / g.scale_factor())?;
    tracing::trace!(node = %id, grow = r, "extended free leaf");
    refresh(g, d, v)
}

/// Slide a node held by one constraint straight away from its neighbour until
/// it touches another circle or the square.
fn slide_away(
    g: &mut CreasesGraph,
    d: &DistanceTable,
    v: NodeId,
    w: NodeId,
) -> Result<BTreeSet<NodeId>> {
    let p = g.pos(v);
    let dir = (p - g.pos(w)).normalize();
    let mut t = f64::INFINITY;
    for u in g.graph.node_ids().filter(|&u| u != v && u != w) {
        let pp = p - g.pos(u);
        let a = active_distance(g, d, v, u)?;
        let den = a - pp.dot(&dir);
        if den > 0.0 {
            let tt = (pp.norm_squared() - a * a) / (2.0 * den);
            if tt >= 0.0 {
                t = t.min(tt);
            }
        }
    }
    for k in 0..2 {
        if dir[k] > 0.0 {
            t = t.min((1.0 - p[k]) / dir[k]);
        } else if dir[k] < 0.0 {
            t = t.min(-p[k] / dir[k]);
        }
    }
    if !t.is_finite() || t <= 0.0 {
        return Err(PatternError::infeasible(format!(
            "no safe step away from {} for node {}",
            g.label(w),
            g.label(v)
        )));
    }
    detach(g, v)?;
    let target = p + dir * t;
    g.graph.move_node(v, target);
    let id = g.label(v).to_string();
    g.grow_leaf_extension(&id, t / g.scale_factor())?;
    tracing::trace!(node = %id, step = t, x = target.x, y = target.y, "slid leaf");
    let mut changed = refresh(g, d, v)?;
    changed.insert(w);
    Ok(changed)
}

/// Push a node with a reflex gap between neighbours `a` and `b` into the gap,
/// growing all three circles by the largest radius that stays feasible.
fn close_gap(
    g: &mut CreasesGraph,
    d: &DistanceTable,
    v: NodeId,
    a: NodeId,
    b: NodeId,
) -> Result<Option<BTreeSet<NodeId>>> {
    let p = g.pos(v);
    let (pa, pb) = (g.pos(a), g.pos(b));
    let (ra, rb) = (active_distance(g, d, v, a)?, active_distance(g, d, v, b)?);
    let mut others = Vec::new();
    for u in g.graph.node_ids().filter(|&u| u != v && u != a && u != b) {
        others.push((g.pos(u), active_distance(g, d, v, u)?));
    }
    let candidate = |r: f64| -> Option<Vec2> {
        let c = circle_intersection(pa, ra + r, pb, rb + r, p)?;
        if !in_unit_square(c, BINARY_SEARCH_TOLERANCE) {
            return None;
        }
        let clear = others
            .iter()
            .all(|&(q, s)| (c - q).norm() >= s + r - BINARY_SEARCH_TOLERANCE);
        clear.then_some(c)
    };
    let (mut lo, mut hi) = (0.0, BINARY_SEARCH_MAX_RADIUS);
    for _ in 0..BINARY_SEARCH_STEPS {
        let mid = (lo + hi) / 2.0;
        if candidate(mid).is_some() {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < BINARY_SEARCH_TOLERANCE {
            break;
        }
    }
    if lo <= BINARY_SEARCH_TOLERANCE {
        return Ok(None);
    }
    let Some(target) = candidate(lo) else {
        return Err(PatternError::infeasible(format!(
            "gap at node {} has no feasible target",
            g.label(v)
        )));
    };
    detach(g, v)?;
    g.graph.move_node(v, target);
    let id = g.label(v).to_string();
    g.grow_leaf_extension(&id, lo / g.scale_factor())?;
    tracing::trace!(node = %id, grow = lo, x = target.x, y = target.y, "closed convex gap");
    refresh(g, d, v).map(Some)
}

/// Turn a raw packing into a clean crease graph of axial creases.
///
/// Moved leaves are written back into `packing`. Leaf extensions only grow.
pub fn clean_packing(packing: &mut Packing, d: &DistanceTable) -> Result<CreasesGraph> {
    let mut g = CreasesGraph::from_packing(packing)?;
    g.require_state("clean_packing", GraphState::NewlyCreated)?;
    let ids: Vec<NodeId> = g.graph.node_ids().collect();
    for &i in &ids {
        for &j in &ids {
            if g.label(i) < g.label(j) && is_active(&g, d, i, j)? {
                g.add_crease(i, j, CreaseType::Axial, None)?;
            }
        }
    }

    let mut queue: VecDeque<NodeId> = ids.iter().copied().collect();
    let mut queued: HashSet<NodeId> = ids.iter().copied().collect();
    let mut iterations = 0;
    while let Some(v) = queue.pop_front() {
        iterations += 1;
        if iterations > CLEANUP_MAX_ITERATIONS {
            return Err(PatternError::Diverged {
                during: "cleaning packing",
            });
        }
        queued.remove(&v);
        let active = active_neighbours(&g, v);
        let inside = boundary_slack(g.pos(v)) >= TOLERANCE;
        let changed = match active.len() {
            0 => Some(grow_free_node(&mut g, d, v)?),
            1 if inside => Some(slide_away(&mut g, d, v, active[0])?),
            n if n >= 2 && inside => match convex_gap(&g, v, &active) {
                Some((a, b)) => close_gap(&mut g, d, v, a, b)?,
                None => None,
            },
            _ => None,
        };
        if let Some(changed) = changed {
            for u in std::iter::once(v).chain(changed) {
                if queued.insert(u) {
                    queue.push_back(u);
                }
            }
        }
    }

    for v in g.graph.node_ids() {
        packing.set_position(g.label(v), g.pos(v));
    }
    tracing::debug!(
        iterations,
        axial = g.graph.edge_count(),
        "packing cleaned"
    );
    g.advance(GraphState::Clean);
    Ok(g)
}
