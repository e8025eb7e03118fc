//! Tree analysis consumed by the pipeline: path distances and discrete depth.
//!
//! The tree is the stick-figure skeleton of a design. Its edges carry flap
//! lengths; its node positions only matter for the rotation system of the
//! underlying [`PlanarGraph`].

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::cfg::UNSET_DEPTH;
use crate::error::{PatternError, Result};
use crate::geometry::Vec2;
use crate::graph::{EdgeId, NodeId, PlanarGraph};

/// One stop on a tree path with the cumulative length from the path's start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathStop {
    pub node: String,
    pub distance: f64,
}

/// Ordered tree paths for every ordered pair of distinct nodes.
///
/// `path(a, b)` excludes `a` and ends with `b`; the last stop's distance is the
/// full tree distance.
#[derive(Clone, Debug, Default)]
pub struct DistanceTable {
    paths: HashMap<String, HashMap<String, Vec<PathStop>>>,
}

impl DistanceTable {
    pub fn insert(&mut self, from: &str, to: &str, stops: Vec<PathStop>) {
        self.paths
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string(), stops);
    }

    pub fn path(&self, from: &str, to: &str) -> Result<&[PathStop]> {
        self.paths
            .get(from)
            .and_then(|m| m.get(to))
            .map(Vec::as_slice)
            .ok_or_else(|| PatternError::UnknownNode(format!("no tree path {from} -> {to}")))
    }

    pub fn distance(&self, from: &str, to: &str) -> Result<f64> {
        self.path(from, to)?
            .last()
            .map(|s| s.distance)
            .ok_or_else(|| PatternError::UnknownNode(format!("empty tree path {from} -> {to}")))
    }
}

/// Edge count from a chosen root; unknown ids report [`UNSET_DEPTH`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiscreteDepth {
    depths: HashMap<String, u32>,
}

impl DiscreteDepth {
    pub fn get(&self, id: &str) -> u32 {
        self.depths.get(id).copied().unwrap_or(UNSET_DEPTH)
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for DiscreteDepth {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self {
            depths: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TreeGraph {
    graph: PlanarGraph<(), f64>,
}

impl TreeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: impl Into<String>, pos: Vec2) -> Result<NodeId> {
        self.graph.add_node(id, pos, ())
    }

    pub fn add_edge(&mut self, from: &str, to: &str, length: f64) -> Result<EdgeId> {
        let a = self.graph.require_node(from)?;
        let b = self.graph.require_node(to)?;
        self.graph.add_edge(a, b, length)
    }

    pub fn graph(&self) -> &PlanarGraph<(), f64> {
        &self.graph
    }

    /// First node with more than one incident edge, the default rooting point.
    pub fn default_root(&self) -> Option<String> {
        self.graph
            .node_ids()
            .find(|&v| self.graph[v].degree() > 1)
            .map(|v| self.graph[v].id.clone())
    }

    /// Breadth-first path table from every node.
    pub fn distances(&self) -> DistanceTable {
        let g = &self.graph;
        let mut table = DistanceTable::default();
        for s in g.node_ids() {
            let mut paths: HashMap<NodeId, Vec<PathStop>> = HashMap::from([(s, Vec::new())]);
            let mut dist: HashMap<NodeId, f64> = HashMap::from([(s, 0.0)]);
            let mut order = Vec::new();
            let mut queue = VecDeque::from([s]);
            while let Some(u) = queue.pop_front() {
                for &e in g[u].edges() {
                    let w = g[e].other(u);
                    if paths.contains_key(&w) {
                        continue;
                    }
                    let d = dist[&u] + g[e].data;
                    let mut path = paths[&u].clone();
                    path.push(PathStop {
                        node: g[w].id.clone(),
                        distance: d,
                    });
                    dist.insert(w, d);
                    paths.insert(w, path);
                    order.push(w);
                    queue.push_back(w);
                }
            }
            for w in order {
                if let Some(stops) = paths.remove(&w) {
                    table.insert(&g[s].id, &g[w].id, stops);
                }
            }
        }
        table
    }

    /// Depth of every node below `root`. An unknown root yields an empty map.
    pub fn dangle(&self, root: &str) -> DiscreteDepth {
        let g = &self.graph;
        let Some(r) = g.node_by_id(root) else {
            return DiscreteDepth::default();
        };
        let mut depth: HashMap<NodeId, u32> = HashMap::from([(r, 0)]);
        let mut queue = VecDeque::from([r]);
        while let Some(u) = queue.pop_front() {
            for &e in g[u].edges() {
                let w = g[e].other(u);
                if !depth.contains_key(&w) {
                    depth.insert(w, depth[&u] + 1);
                    queue.push_back(w);
                }
            }
        }
        depth
            .into_iter()
            .map(|(v, k)| (g[v].id.clone(), k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;
    use nalgebra::vector;

    fn tee() -> TreeGraph {
        let mut t = TreeGraph::new();
        t.add_node("u", vector![0.0, 0.0]).unwrap();
        t.add_node("v1", vector![0.0, 1.0]).unwrap();
        t.add_node("v2", vector![0.0, -1.0]).unwrap();
        t.add_node("v3", vector![1.0, 0.0]).unwrap();
        t.add_edge("u", "v1", 1.0).unwrap();
        t.add_edge("u", "v2", 2.0).unwrap();
        t.add_edge("u", "v3", 3.0).unwrap();
        t
    }

    #[test]
    fn distances_list_every_stop() {
        let d = tee().distances();
        let path = d.path("v1", "v2").unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].node, "u");
        assert!((path[0].distance - 1.0).abs() < 1e-12);
        assert_eq!(path[1].node, "v2");
        assert!((path[1].distance - 3.0).abs() < 1e-12);
        assert!((d.distance("v3", "v2").unwrap() - 5.0).abs() < 1e-12);
        assert_eq!(d.path("u", "v3").unwrap().len(), 1);
        assert!(d.path("v1", "nope").is_err());
    }

    #[test]
    fn default_root_is_first_branch_node() {
        assert_eq!(tee().default_root().as_deref(), Some("u"));
    }

    #[test]
    fn dangle_counts_edges_from_root() {
        let bone = samples::bone().unwrap();
        let depth = bone.tree.dangle("3");
        let expected = [("3", 0), ("1", 1), ("2", 1), ("4", 1), ("5", 2), ("6", 3), ("7", 3)];
        for (id, k) in expected {
            assert_eq!(depth.get(id), k, "depth of {id}");
        }
        assert_eq!(depth.get("unset"), UNSET_DEPTH);

        let paper = samples::lang_demaine_paper().unwrap();
        let depth = paper.tree.dangle("3");
        for (id, k) in [("3", 0), ("1", 1), ("2", 1), ("4", 1), ("5", 2), ("6", 2), ("7", 2)] {
            assert_eq!(depth.get(id), k, "depth of {id}");
        }
    }

    #[test]
    fn dangle_with_unknown_root_is_empty() {
        let depth = tee().dangle("missing");
        assert!(depth.is_empty());
        assert_eq!(depth.get("u"), UNSET_DEPTH);
    }
}
