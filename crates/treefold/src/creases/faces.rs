//! Convex hull, hull crease classification and face tracing.

use std::collections::{HashSet, VecDeque};

use crate::cfg::TOLERANCE;
use crate::error::{PatternError, Result};
use crate::geometry::{angle_of, signed_area, turn, Vec2};
use crate::graph::{EdgeId, FaceId, NodeId};
use crate::tree::DistanceTable;

use super::{CreaseType, CreasesGraph, Face, GraphState};

/// Graham scan returning indices into `points`, counter-clockwise from the
/// first point with the least x.
///
/// Collinear boundary runs are kept: when a turn is flat but doubles back,
/// the popped point is queued again after the current one instead of being
/// discarded.
pub fn convex_hull(points: &[Vec2]) -> Vec<usize> {
    if points.len() < 3 {
        return (0..points.len()).collect();
    }
    let eps = TOLERANCE * TOLERANCE;
    let mut pivot = 0;
    for (i, p) in points.iter().enumerate() {
        if p.x < points[pivot].x {
            pivot = i;
        }
    }
    let origin = points[pivot];
    let mut rest: Vec<usize> = (0..points.len()).filter(|&i| i != pivot).collect();
    rest.sort_by(|&a, &b| {
        let (pa, pb) = (points[a] - origin, points[b] - origin);
        angle_of(pa)
            .total_cmp(&angle_of(pb))
            .then(pa.norm().total_cmp(&pb.norm()))
    });
    let last = points[rest[rest.len() - 1]];
    let mut k = rest.len() - 1;
    while k > 0 && turn(origin, points[rest[k - 1]], last).abs() < eps {
        k -= 1;
    }
    if k < rest.len() - 1 {
        rest[k..].sort_by(|&a, &b| {
            (points[b] - origin)
                .norm()
                .total_cmp(&(points[a] - origin).norm())
        });
    }

    let mut stack = vec![pivot];
    let mut pending: VecDeque<usize> = rest.into();
    while let Some(p) = pending.pop_front() {
        let mut keep = true;
        while stack.len() >= 2 {
            let o = points[stack[stack.len() - 2]];
            let a = points[stack[stack.len() - 1]];
            let b = points[p];
            let t = turn(o, a, b);
            if t < -eps {
                stack.pop();
            } else if t.abs() <= eps && (a - o).dot(&(b - a)) < 0.0 {
                if let Some(popped) = stack.pop() {
                    pending.push_front(popped);
                }
                pending.push_front(p);
                keep = false;
                break;
            } else {
                break;
            }
        }
        if keep {
            stack.push(p);
        }
    }
    stack
}

/// Add hull creases and trace every face of the clean graph.
///
/// `Ok(Some(msg))` classifies the packing as twisted: some inner face touches
/// two or more inactive hull creases. The state then stays `Clean`.
pub fn build_faces(g: &mut CreasesGraph) -> Result<Option<String>> {
    g.require_state("build_faces", GraphState::Clean)?;
    let ids: Vec<NodeId> = g.graph.node_ids().collect();
    let points: Vec<Vec2> = ids.iter().map(|&v| g.pos(v)).collect();
    let hull: Vec<NodeId> = convex_hull(&points).into_iter().map(|i| ids[i]).collect();
    if hull.len() < 2 {
        return Err(PatternError::infeasible(
            "a crease pattern needs at least two packed leaves",
        ));
    }
    let sides = if hull.len() == 2 { 1 } else { hull.len() };
    for i in 0..sides {
        let (a, b) = (hull[i], hull[(i + 1) % hull.len()]);
        match g.graph.get_edge(a, b) {
            Some(e) => g.crease_mut(e).retype(CreaseType::ActiveHull),
            None => {
                g.add_crease(a, b, CreaseType::InactiveHull, None)?;
            }
        }
    }
    g.hull = hull;

    let first = g.graph.require_edge(g.hull[0], g.hull[1])?;
    let forward = g.graph[first].from == g.hull[0];
    let mut work = VecDeque::from([(first, forward), (first, !forward)]);
    g.faces.clear();
    while let Some((e, fw)) = work.pop_front() {
        let c = g.crease(e);
        if (if fw { c.left_face } else { c.right_face }).is_some() {
            continue;
        }
        let fid = FaceId(g.faces.len());
        let (nodes, edges) = g.trace_face(e, fw, fid)?;
        for (&side, &start) in edges.iter().zip(&nodes) {
            work.push_back((side, g.graph[side].from != start));
        }
        g.faces.push(Face::new(nodes, edges));
    }

    for e in g.graph.edge_ids() {
        let c = g.crease(e);
        if c.left_face.is_none() || c.right_face.is_none() {
            let (a, b) = g.graph.canonical_id(e);
            return Err(PatternError::inconsistent(format!(
                "Edges {a}-{b} lie in different component than first hull edge"
            )));
        }
    }
    mark_outer_face(g)?;

    for f in g.face_ids() {
        let face = g.face(f);
        if face.is_outer {
            continue;
        }
        let inactive = count_type(g, &face.edges, CreaseType::InactiveHull);
        if inactive >= 2 {
            let msg = format!(
                "face {} touches {inactive} inactive hull creases",
                g.face_label(f)
            );
            tracing::debug!(%msg, "packing classified as twisted");
            return Ok(Some(msg));
        }
    }
    g.advance(GraphState::PreUma);
    Ok(None)
}

fn count_type(g: &CreasesGraph, edges: &[EdgeId], t: CreaseType) -> usize {
    edges
        .iter()
        .filter(|&&e| g.crease(e).crease_type == t)
        .count()
}

/// Flag the unique face with negative signed area as the outer face.
pub(crate) fn mark_outer_face(g: &mut CreasesGraph) -> Result<FaceId> {
    let negative: Vec<usize> = g
        .faces
        .iter()
        .enumerate()
        .filter(|(_, f)| {
            let pts: Vec<Vec2> = f.nodes.iter().map(|&v| g.pos(v)).collect();
            signed_area(&pts) < -TOLERANCE * TOLERANCE
        })
        .map(|(i, _)| i)
        .collect();
    let outer = match negative.as_slice() {
        [i] => *i,
        [] if g.faces.len() == 1 => 0,
        _ => {
            return Err(PatternError::inconsistent(format!(
                "expected exactly one outer face, found {}",
                negative.len()
            )))
        }
    };
    for (i, f) in g.faces.iter_mut().enumerate() {
        f.is_outer = i == outer;
    }
    Ok(FaceId(outer))
}

/// True when some face boundary walks a directed tree edge twice.
///
/// A molecule boundary traces an Euler tour of its subtree, so every tree edge
/// is walked at most once per direction around one face.
pub fn is_twisted(d: &DistanceTable, g: &CreasesGraph) -> Result<bool> {
    for face in g.faces() {
        if walks_tree_edge_twice(d, g, face)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// [`is_twisted`] restricted to inner faces, the ones that become molecules.
pub fn has_twisted_inner_face(d: &DistanceTable, g: &CreasesGraph) -> Result<bool> {
    for face in g.faces().iter().filter(|f| !f.is_outer) {
        if walks_tree_edge_twice(d, g, face)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn walks_tree_edge_twice(d: &DistanceTable, g: &CreasesGraph, face: &Face) -> Result<bool> {
    let ids: Vec<&str> = face.nodes.iter().map(|&v| g.label(v)).collect();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    for i in 0..ids.len() {
        let (a, b) = (ids[i], ids[(i + 1) % ids.len()]);
        let mut prev = a;
        for stop in d.path(a, b)? {
            if !seen.insert((prev, stop.node.as_str())) {
                return Ok(true);
            }
            prev = stop.node.as_str();
        }
    }
    Ok(false)
}
