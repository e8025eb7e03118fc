//! Directed graph over facets whose topological order is the layer order.

use std::collections::{HashMap, HashSet};

use crate::error::{PatternError, Result};
use crate::graph::FaceId;

/// Insertion-ordered facets with insertion-ordered successor lists.
#[derive(Clone, Debug, Default)]
pub struct FacetOrderingGraph {
    faces: Vec<FaceId>,
    successors: HashMap<FaceId, Vec<FaceId>>,
}

impl FacetOrderingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_face(&mut self, f: FaceId) {
        if !self.successors.contains_key(&f) {
            self.successors.insert(f, Vec::new());
            self.faces.push(f);
        }
    }

    /// Add `from → to`, registering unseen endpoints; duplicates are ignored.
    pub fn add_edge(&mut self, from: FaceId, to: FaceId) {
        self.add_face(from);
        self.add_face(to);
        let out = self.successors.entry(from).or_default();
        if !out.contains(&to) {
            out.push(to);
        }
    }

    pub fn contains(&self, f: FaceId) -> bool {
        self.successors.contains_key(&f)
    }

    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    pub fn successors(&self, f: FaceId) -> &[FaceId] {
        self.successors.get(&f).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Reverse depth-first post-order, roots and successors taken in
    /// insertion order. Any edge pointing back into the prefix is a cycle.
    pub fn topological_sort(&self) -> Result<Vec<FaceId>> {
        let mut seen: HashSet<FaceId> = HashSet::new();
        let mut post = Vec::with_capacity(self.faces.len());
        for &root in &self.faces {
            if !seen.insert(root) {
                continue;
            }
            let mut stack = vec![(root, 0usize)];
            while let Some((f, i)) = stack.pop() {
                match self.successors(f).get(i) {
                    Some(&next) => {
                        stack.push((f, i + 1));
                        if seen.insert(next) {
                            stack.push((next, 0));
                        }
                    }
                    None => post.push(f),
                }
            }
        }
        post.reverse();

        let mut encountered = HashSet::new();
        for &f in &post {
            if self.successors(f).iter().any(|n| encountered.contains(n)) {
                return Err(PatternError::inconsistent(
                    "Facet ordering graph is not a DAG",
                ));
            }
            encountered.insert(f);
        }
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(xs: &[usize]) -> Vec<FaceId> {
        xs.iter().copied().map(FaceId).collect()
    }

    fn sample() -> FacetOrderingGraph {
        let mut og = FacetOrderingGraph::new();
        for f in 1..=4 {
            og.add_face(FaceId(f));
        }
        for (a, b) in [(1, 3), (2, 4), (1, 3), (4, 1), (2, 3)] {
            og.add_edge(FaceId(a), FaceId(b));
        }
        og
    }

    #[test]
    fn sorts_in_dependency_order() {
        let og = sample();
        assert_eq!(og.successors(FaceId(1)), ids(&[3]).as_slice());
        assert_eq!(og.topological_sort().unwrap(), ids(&[2, 4, 1, 3]));
    }

    #[test]
    fn cycle_is_rejected() {
        let mut og = sample();
        og.add_edge(FaceId(3), FaceId(2));
        assert!(matches!(
            og.topological_sort(),
            Err(PatternError::Inconsistent(msg)) if msg.contains("not a DAG")
        ));
    }

    #[test]
    fn edges_register_their_endpoints() {
        let mut og = FacetOrderingGraph::new();
        og.add_edge(FaceId(7), FaceId(5));
        assert_eq!(og.faces(), ids(&[7, 5]).as_slice());
        assert_eq!(og.topological_sort().unwrap(), ids(&[7, 5]));
        assert!(!og.is_empty());
    }
}
