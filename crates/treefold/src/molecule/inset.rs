//! Recursive insetting of one active polygon.
//!
//! Each level shrinks the polygon by the largest distance `h` that keeps every
//! reduced path feasible, drops ridges from the corners to the inset corners,
//! hangs hinges off every branch point on the sides, and then either closes
//! the remainder or splits it along gussets and recurses.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use crate::cfg::{MOLECULE_MAX_ITERATIONS, ROOT_EPS, SOLVE_EPS, TOLERANCE};
use crate::creases::{CreaseType, CreasesGraph, MoleculeId, NodeKind};
use crate::error::{PatternError, Result};
use crate::geometry::{lerp, parallelogram_area, Vec2};
use crate::graph::NodeId;

use super::subdivide::{ZStop, ZTable};

/// Per-molecule recursion bookkeeping.
pub(super) struct Inset {
    molecule: MoleculeId,
    calls: usize,
}

/// Corner geometry: inset velocity, cotangent rate along the sides, side length.
struct Corner {
    velocity: Vec2,
    rate: f64,
    side: f64,
}

/// A branch point whose hinge lands on a corner ridge at parameter `s`.
struct RidgeHit {
    s: f64,
    display_id: String,
    node: NodeId,
}

/// A hinge foot on the inset side, `offset` from the inset corner.
#[derive(Clone, Copy)]
struct SideFoot {
    offset: f64,
    node: NodeId,
}

/// A branch point at distance `d` along a side must lie on that side.
pub(super) fn check_on_side(d: f64, side: f64, display_id: &str) -> Result<()> {
    if d < -TOLERANCE || d > side + TOLERANCE {
        return Err(PatternError::infeasible(format!(
            "branch point {display_id} lies {d:.6} along a side of length {side:.6}"
        )));
    }
    Ok(())
}

impl Inset {
    pub(super) fn new(molecule: MoleculeId) -> Self {
        Self { molecule, calls: 0 }
    }

    fn crease(&self, g: &mut CreasesGraph, a: NodeId, b: NodeId, t: CreaseType) -> Result<()> {
        g.add_crease(a, b, t, Some(self.molecule)).map(|_| ())
    }

    /// Node within tolerance of `p` on the current level, else a new one.
    fn level_node(
        g: &mut CreasesGraph,
        level: &mut Vec<NodeId>,
        p: Vec2,
        display_id: &str,
        elevation: f64,
    ) -> Result<NodeId> {
        if let Some(&v) = level.iter().find(|&&v| (g.pos(v) - p).norm() < TOLERANCE) {
            return Ok(v);
        }
        let v = g.add_created_node(p, NodeKind::Inset, display_id, elevation)?;
        level.push(v);
        Ok(v)
    }

    fn corners(g: &CreasesGraph, corners: &[NodeId]) -> Result<Vec<Corner>> {
        let n = corners.len();
        let p: Vec<Vec2> = corners.iter().map(|&v| g.pos(v)).collect();
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let u1 = (p[(i + 1) % n] - p[i]).normalize();
            let u2 = (p[(i + n - 1) % n] - p[i]).normalize();
            let start = u1.y.atan2(u1.x);
            let mut alpha = parallelogram_area(u1, u2).atan2(u1.dot(&u2));
            if alpha < 0.0 {
                alpha += TAU;
            }
            if alpha <= 0.0 || alpha > PI + ROOT_EPS {
                return Err(PatternError::infeasible(format!(
                    "reflex corner at {} ({alpha:.6} rad)",
                    g.label(corners[i])
                )));
            }
            let half = alpha / 2.0;
            let bisector = Vec2::new((start + half).cos(), (start + half).sin());
            out.push(Corner {
                velocity: bisector / half.sin(),
                rate: half.cos() / half.sin(),
                side: (p[(i + 1) % n] - p[i]).norm(),
            });
        }
        Ok(out)
    }

    /// Largest inset distance before a side collapses or a cross path goes taut.
    fn inset_distance(
        g: &CreasesGraph,
        corners: &[NodeId],
        c: &[Corner],
        z: &ZTable,
    ) -> Result<f64> {
        let n = corners.len();
        let mut candidates = Vec::new();
        for i in 0..n {
            let rate = c[i].rate + c[(i + 1) % n].rate;
            if rate > SOLVE_EPS {
                candidates.push(c[i].side / rate);
            }
        }
        for i in 0..n {
            for j in i + 2..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                let l = z.length(corners[i], corners[j])?;
                let rate = c[i].rate + c[j].rate;
                let d0 = g.pos(corners[j]) - g.pos(corners[i]);
                let dw = c[j].velocity - c[i].velocity;
                let qa = dw.dot(&dw) - rate * rate;
                let qb = 2.0 * (d0.dot(&dw) + l * rate);
                let qc = d0.dot(&d0) - l * l;
                let mut roots = Vec::with_capacity(2);
                if qa.abs() < SOLVE_EPS {
                    if qb.abs() > SOLVE_EPS {
                        roots.push(-qc / qb);
                    }
                } else {
                    let disc = qb * qb - 4.0 * qa * qc;
                    if disc >= -SOLVE_EPS {
                        let sq = disc.max(0.0).sqrt();
                        roots.push((-qb - sq) / (2.0 * qa));
                        roots.push((-qb + sq) / (2.0 * qa));
                    }
                }
                candidates.extend(
                    roots
                        .into_iter()
                        .filter(|&r| r > ROOT_EPS && l - r * rate >= -TOLERANCE),
                );
            }
        }
        candidates
            .into_iter()
            .min_by(f64::total_cmp)
            .ok_or_else(|| {
                let ids: Vec<&str> = corners.iter().map(|&v| g.label(v)).collect();
                PatternError::infeasible(format!(
                    "no feasible inset distance for polygon [{}]",
                    ids.join(",")
                ))
            })
    }

    /// Inset `corners` once, then close or split what remains.
    pub(super) fn build(
        &mut self,
        g: &mut CreasesGraph,
        corners: &[NodeId],
        z: &ZTable,
        elevation: f64,
    ) -> Result<()> {
        self.calls += 1;
        if self.calls > MOLECULE_MAX_ITERATIONS {
            return Err(PatternError::Diverged {
                during: "building a molecule",
            });
        }
        let n = corners.len();
        if n < 3 {
            return Ok(());
        }
        let p: Vec<Vec2> = corners.iter().map(|&v| g.pos(v)).collect();
        let c = Self::corners(g, corners)?;
        let h = Self::inset_distance(g, corners, &c, z)?;
        let top = elevation + h;
        tracing::trace!(
            molecule = self.molecule.0,
            corners = n,
            h,
            elevation = top,
            "inset level"
        );

        let mut level = Vec::new();
        let mut q = Vec::with_capacity(n);
        for i in 0..n {
            let display = g.node(corners[i]).display_id.clone();
            let at = p[i] + c[i].velocity * h;
            q.push(Self::level_node(g, &mut level, at, &display, top)?);
        }
        for i in 0..n {
            self.crease(g, corners[i], q[i], CreaseType::Ridge)?;
        }

        let mut ridge_hits: Vec<Vec<RidgeHit>> = (0..n).map(|_| Vec::new()).collect();
        let mut feet: Vec<Vec<SideFoot>> = (0..n).map(|_| Vec::new()).collect();
        let mut hinges: Vec<(NodeId, NodeId)> = Vec::new();
        for i in 0..n {
            let j = (i + 1) % n;
            let ti = h * c[i].rate;
            let tj = c[i].side - h * c[j].rate;
            let dir = (p[j] - p[i]).normalize();
            for stop in z.interior(corners[i], corners[j])? {
                let Some(node) = stop.node else {
                    continue;
                };
                let d = stop.distance;
                check_on_side(d, c[i].side, &stop.display_id)?;
                if d < ti - TOLERANCE {
                    ridge_hits[i].push(RidgeHit {
                        s: d / ti,
                        display_id: stop.display_id.clone(),
                        node,
                    });
                } else if (d - ti).abs() <= TOLERANCE {
                    g.graph[q[i]].data.display_id = stop.display_id.clone();
                    hinges.push((node, q[i]));
                } else if d < tj - TOLERANCE {
                    let at = g.pos(q[i]) + dir * (d - ti);
                    let hit = Self::level_node(g, &mut level, at, &stop.display_id, top)?;
                    feet[i].push(SideFoot {
                        offset: d - ti,
                        node: hit,
                    });
                    hinges.push((node, hit));
                } else if (d - tj).abs() <= TOLERANCE {
                    g.graph[q[j]].data.display_id = stop.display_id.clone();
                    hinges.push((node, q[j]));
                } else {
                    ridge_hits[j].push(RidgeHit {
                        s: (c[i].side - d) / (h * c[j].rate),
                        display_id: stop.display_id.clone(),
                        node,
                    });
                }
            }
        }

        for (i, hits) in ridge_hits.iter_mut().enumerate() {
            if hits.is_empty() {
                continue;
            }
            hits.sort_by(|a, b| {
                a.s.total_cmp(&b.s)
                    .then_with(|| a.display_id.cmp(&b.display_id))
                    .then(a.node.cmp(&b.node))
            });
            let speed = h * c[i].velocity.norm();
            let mut points: Vec<(f64, NodeId)> = Vec::new();
            for hit in hits.iter() {
                if let Some(&(s, v)) = points.last() {
                    if (s - hit.s).abs() * speed < TOLERANCE {
                        hinges.push((hit.node, v));
                        continue;
                    }
                }
                let at = lerp(p[i], g.pos(q[i]), hit.s);
                let v = g.add_created_node(
                    at,
                    NodeKind::Inset,
                    &hit.display_id,
                    elevation + hit.s * h,
                )?;
                points.push((hit.s, v));
                hinges.push((hit.node, v));
            }
            let ridge = g.graph.require_edge(corners[i], q[i])?;
            let split: Vec<NodeId> = points.iter().map(|&(_, v)| v).collect();
            g.subdivide_crease(ridge, &split)?;
        }
        for (a, b) in hinges {
            if g.graph.get_edge(a, b).is_none() {
                self.crease(g, a, b, CreaseType::Hinge)?;
            }
        }

        let mut cycle: Vec<NodeId> = Vec::with_capacity(n);
        for &v in &q {
            if cycle.last() != Some(&v) {
                cycle.push(v);
            }
        }
        while cycle.len() > 1 && cycle.first() == cycle.last() {
            cycle.pop();
        }
        let m = cycle.len();
        if m <= 1 {
            return Ok(());
        }
        let mut side_of = vec![None; m];
        for (k, slot) in side_of.iter_mut().enumerate() {
            let (a, b) = (cycle[k], cycle[(k + 1) % m]);
            for i in 0..n {
                if q[i] == a && q[(i + 1) % n] == b {
                    *slot = Some(i);
                }
            }
        }
        let side = |k: usize| -> Result<usize> {
            side_of[k].ok_or_else(|| {
                PatternError::inconsistent(format!("inset side {k} has no source side"))
            })
        };

        if m == 2 {
            let (a, b) = (cycle[0], cycle[1]);
            let mut points: Vec<NodeId> = Vec::new();
            for k in 0..2 {
                for foot in &feet[side(k)?] {
                    if !points.contains(&foot.node) {
                        points.push(foot.node);
                    }
                }
            }
            let pa = g.pos(a);
            points.sort_by(|&u, &v| (g.pos(u) - pa).norm().total_cmp(&(g.pos(v) - pa).norm()));
            let e = g.add_crease(a, b, CreaseType::Ridge, Some(self.molecule))?;
            if !points.is_empty() {
                g.subdivide_crease(e, &points)?;
            }
            return Ok(());
        }

        let mut first: HashMap<NodeId, usize> = HashMap::new();
        for (i, &v) in q.iter().enumerate() {
            first.entry(v).or_insert(i);
        }
        let reduce = |g: &CreasesGraph,
                      b: NodeId,
                      ra: usize,
                      rb: usize,
                      feet: Option<&[SideFoot]>|
         -> Result<Vec<ZStop>> {
            let base = z.stops(corners[ra], corners[rb])?;
            let total = z.length(corners[ra], corners[rb])? - h * (c[ra].rate + c[rb].rate);
            let mut stops = Vec::new();
            for stop in &base[..base.len() - 1] {
                let dd = stop.distance - h * c[ra].rate;
                if dd <= TOLERANCE || dd >= total - TOLERANCE {
                    continue;
                }
                let node = feet.and_then(|fs| {
                    fs.iter()
                        .rev()
                        .find(|f| (f.offset - dd).abs() < TOLERANCE)
                        .map(|f| f.node)
                });
                stops.push(ZStop {
                    display_id: stop.display_id.clone(),
                    distance: dd,
                    node,
                });
            }
            stops.push(ZStop {
                display_id: g.node(b).display_id.clone(),
                distance: total,
                node: Some(b),
            });
            Ok(stops)
        };

        let mut reduced = ZTable::default();
        for k in 0..m {
            for l in 0..m {
                if k == l {
                    continue;
                }
                let (a, b) = (cycle[k], cycle[l]);
                let stops = if l == (k + 1) % m {
                    let i = side(k)?;
                    reduce(&*g, b, i, (i + 1) % n, Some(feet[i].as_slice()))?
                } else if k == (l + 1) % m {
                    let i = side(l)?;
                    let span = c[i].side - h * (c[i].rate + c[(i + 1) % n].rate);
                    let mirrored: Vec<SideFoot> = feet[i]
                        .iter()
                        .map(|f| SideFoot {
                            offset: span - f.offset,
                            node: f.node,
                        })
                        .collect();
                    reduce(&*g, b, (i + 1) % n, i, Some(mirrored.as_slice()))?
                } else {
                    let (fa, fb) = match (first.get(&a), first.get(&b)) {
                        (Some(&fa), Some(&fb)) => (fa, fb),
                        _ => {
                            return Err(PatternError::inconsistent(
                                "inset corner without a source corner",
                            ))
                        }
                    };
                    reduce(&*g, b, fa, fb, None)?
                };
                reduced.insert(a, b, stops);
            }
        }
        self.split(g, &cycle, &mut reduced, top)
    }

    /// Separate pinched cycles and taut gusset chords, then inset each part.
    pub(super) fn split(
        &mut self,
        g: &mut CreasesGraph,
        cycle: &[NodeId],
        z: &mut ZTable,
        elevation: f64,
    ) -> Result<()> {
        let m = cycle.len();
        let mut seen: HashMap<NodeId, usize> = HashMap::new();
        for (k, &v) in cycle.iter().enumerate() {
            if let Some(&k0) = seen.get(&v) {
                self.split(g, &cycle[k0..k], z, elevation)?;
                let rest: Vec<NodeId> = cycle[k..].iter().chain(&cycle[..k0]).copied().collect();
                return self.split(g, &rest, z, elevation);
            }
            seen.insert(v, k);
        }
        if m == 2 {
            if g.graph.get_edge(cycle[0], cycle[1]).is_none() {
                self.crease(g, cycle[0], cycle[1], CreaseType::Ridge)?;
            }
            return Ok(());
        }
        if m < 2 {
            return Ok(());
        }
        for k in 0..m {
            for l in k + 2..m {
                if k == 0 && l == m - 1 {
                    continue;
                }
                let (a, b) = (cycle[k], cycle[l]);
                let (pa, pb) = (g.pos(a), g.pos(b));
                let span = (pb - pa).norm();
                if (span - z.length(a, b)?).abs() >= TOLERANCE {
                    continue;
                }
                if g.graph.get_edge(a, b).is_none() {
                    self.gusset(g, a, b, z, elevation)?;
                }
                self.split(g, &cycle[k..=l], z, elevation)?;
                let rest: Vec<NodeId> = cycle[l..].iter().chain(&cycle[..=k]).copied().collect();
                return self.split(g, &rest, z, elevation);
            }
        }
        self.build(g, cycle, z, elevation)
    }

    /// Gusset along a taut chord, split at its branch points.
    fn gusset(
        &self,
        g: &mut CreasesGraph,
        a: NodeId,
        b: NodeId,
        z: &mut ZTable,
        elevation: f64,
    ) -> Result<()> {
        let (pa, pb) = (g.pos(a), g.pos(b));
        let span = (pb - pa).norm();
        let mut points = Vec::new();
        let forward = z.stops_mut(a, b)?;
        let k = forward.len() - 1;
        for stop in &mut forward[..k] {
            let at = lerp(pa, pb, stop.distance / span);
            let v = g.add_created_node(at, NodeKind::Inset, &stop.display_id, elevation)?;
            stop.node = Some(v);
            points.push(v);
        }
        let backward = z.stops_mut(b, a)?;
        let k = backward.len() - 1;
        for stop in &mut backward[..k] {
            for &v in &points {
                if ((g.pos(v) - pb).norm() - stop.distance).abs() < TOLERANCE {
                    stop.node = Some(v);
                }
            }
        }
        tracing::trace!(
            from = %g.label(a),
            to = %g.label(b),
            stops = points.len(),
            "gusset"
        );
        let e = g.add_crease(a, b, CreaseType::Gusset, Some(self.molecule))?;
        if !points.is_empty() {
            g.subdivide_crease(e, &points)?;
        }
        Ok(())
    }
}
