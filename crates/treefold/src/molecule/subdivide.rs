//! Branch-point subdivision of the axial creases and the reduced-path table.

use std::collections::HashMap;

use crate::creases::{CreaseType, CreasesGraph, NodeKind};
use crate::error::{PatternError, Result};
use crate::geometry::lerp;
use crate::graph::{EdgeId, NodeId};
use crate::tree::DistanceTable;

/// One stop on a reduced path: the tree node it stands for, its scaled
/// distance from the path's start, and the crease vertex placed for it.
#[derive(Clone, Debug, PartialEq)]
pub struct ZStop {
    pub display_id: String,
    pub distance: f64,
    pub node: Option<NodeId>,
}

/// Ordered stops for every ordered pair of polygon corners; the last stop is
/// the far corner and carries the full reduced length.
#[derive(Clone, Debug, Default)]
pub struct ZTable {
    paths: HashMap<(NodeId, NodeId), Vec<ZStop>>,
}

impl ZTable {
    pub fn insert(&mut self, from: NodeId, to: NodeId, stops: Vec<ZStop>) {
        self.paths.insert((from, to), stops);
    }

    pub fn stops(&self, from: NodeId, to: NodeId) -> Result<&[ZStop]> {
        self.paths
            .get(&(from, to))
            .map(Vec::as_slice)
            .ok_or_else(|| {
                PatternError::inconsistent(format!("no reduced path #{} -> #{}", from.0, to.0))
            })
    }

    pub(crate) fn stops_mut(&mut self, from: NodeId, to: NodeId) -> Result<&mut Vec<ZStop>> {
        self.paths.get_mut(&(from, to)).ok_or_else(|| {
            PatternError::inconsistent(format!("no reduced path #{} -> #{}", from.0, to.0))
        })
    }

    /// Intermediate stops, without the terminal corner.
    pub fn interior(&self, from: NodeId, to: NodeId) -> Result<&[ZStop]> {
        let stops = self.stops(from, to)?;
        Ok(&stops[..stops.len().saturating_sub(1)])
    }

    /// Scaled length of the reduced path.
    pub fn length(&self, from: NodeId, to: NodeId) -> Result<f64> {
        self.stops(from, to)?
            .last()
            .map(|s| s.distance)
            .ok_or_else(|| PatternError::inconsistent("empty reduced path"))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Seed the reduced-path table from the tree and split every non-hull axial
/// crease at the branch points its tree path passes through.
///
/// Returns the table and the inactive hull creases, which stay whole until the
/// paper-boundary fill.
pub(super) fn subdivide_creases_initial(
    g: &mut CreasesGraph,
    d: &DistanceTable,
    scale: f64,
) -> Result<(ZTable, Vec<EdgeId>)> {
    let ids: Vec<NodeId> = g.graph.node_ids().collect();
    let mut z = ZTable::default();
    for &i in &ids {
        for &j in &ids {
            if i == j {
                continue;
            }
            let (a, b) = (g.label(i), g.label(j));
            let (ext_a, ext_b) = (g.leaf_extension(a), g.leaf_extension(b));
            let path = d.path(a, b)?;
            let Some((last, inner)) = path.split_last() else {
                return Err(PatternError::inconsistent(format!("empty tree path {a} -> {b}")));
            };
            let mut stops: Vec<ZStop> = inner
                .iter()
                .map(|s| ZStop {
                    display_id: s.node.clone(),
                    distance: scale * (s.distance + ext_a),
                    node: None,
                })
                .collect();
            stops.push(ZStop {
                display_id: b.to_string(),
                distance: scale * (last.distance + ext_a + ext_b),
                node: Some(j),
            });
            z.insert(i, j, stops);
        }
    }

    let mut inactive = Vec::new();
    for (x, &i) in ids.iter().enumerate() {
        for &j in &ids[x + 1..] {
            let Some(e) = g.graph.get_edge(i, j) else {
                continue;
            };
            if g.crease(e).crease_type == CreaseType::InactiveHull {
                inactive.push(e);
                for (p, q) in [(i, j), (j, i)] {
                    let stops = z.stops_mut(p, q)?;
                    let keep = stops.len() - 1;
                    stops.drain(..keep);
                }
                continue;
            }
            let stops = z.stops(i, j)?.to_vec();
            let Some((last, inner)) = stops.split_last() else {
                continue;
            };
            if inner.is_empty() {
                continue;
            }
            let (p, q) = (g.pos(i), g.pos(j));
            let mut nodes = Vec::with_capacity(inner.len());
            for s in inner {
                let at = lerp(p, q, s.distance / last.distance);
                nodes.push(g.add_created_node(at, NodeKind::Boundary, &s.display_id, 0.0)?);
            }
            for (s, &v) in z.stops_mut(i, j)?.iter_mut().zip(&nodes) {
                s.node = Some(v);
            }
            let reverse = z.stops_mut(j, i)?;
            let k = reverse.len() - 1;
            for (s, &v) in reverse[..k].iter_mut().zip(nodes.iter().rev()) {
                s.node = Some(v);
            }
            if g.graph[e].from != i {
                nodes.reverse();
            }
            g.subdivide_crease(e, &nodes)?;
        }
    }
    tracing::debug!(
        pairs = z.len(),
        inactive = inactive.len(),
        nodes = g.graph.node_count(),
        "axial creases subdivided"
    );
    Ok((z, inactive))
}
