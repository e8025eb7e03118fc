//! FOLD 1.1 projection of a crease graph.
//!
//! A pure reader: nothing in the pipeline depends on this module. Vertices are
//! sorted by id and edges by canonical id so the output is stable across runs.

use serde::{Deserialize, Serialize};

use crate::creases::{Assignment, CreaseType, CreasesGraph};
use crate::graph::{EdgeId, NodeId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoldDocument {
    pub file_spec: String,
    pub file_creator: String,
    pub file_classes: Vec<String>,
    pub frame_classes: Vec<String>,
    pub vertices_coords: Vec<[f64; 2]>,
    pub vertices_edges: Vec<Vec<usize>>,
    pub edges_vertices: Vec<[usize; 2]>,
    pub edges_assignment: Vec<String>,
    #[serde(rename = "edges_foldAngle")]
    pub edges_fold_angle: Vec<Option<f64>>,
    pub faces_vertices: Vec<Vec<usize>>,
}

/// FOLD letter for a crease. With `fan_out_hinges` every hinge is left
/// unassigned as `B`, so a simulator may swing flaps freely.
fn assignment_letter(
    crease_type: CreaseType,
    assignment: Assignment,
    fan_out_hinges: bool,
) -> &'static str {
    if fan_out_hinges && crease_type == CreaseType::Hinge {
        return "B";
    }
    match assignment {
        Assignment::Mountain => "M",
        Assignment::Valley => "V",
        Assignment::Unfolded => "F",
        Assignment::Unknown | Assignment::Boundary => "B",
    }
}

fn fold_angle(letter: &str) -> Option<f64> {
    match letter {
        "M" => Some(-180.0),
        "V" => Some(180.0),
        "F" => Some(0.0),
        _ => None,
    }
}

/// Project `g` into a FOLD document. Inner faces only, vertex order reversed
/// to FOLD's clockwise convention.
pub fn fold_document(g: &CreasesGraph, fan_out_hinges: bool) -> FoldDocument {
    let graph = g.graph();
    let mut vertices: Vec<NodeId> = graph.node_ids().collect();
    vertices.sort_by(|&a, &b| g.label(a).cmp(g.label(b)));
    let mut index = vec![usize::MAX; vertices.iter().map(|v| v.0 + 1).max().unwrap_or(0)];
    for (i, v) in vertices.iter().enumerate() {
        index[v.0] = i;
    }

    let mut edges: Vec<EdgeId> = graph.edge_ids().collect();
    edges.sort_by_cached_key(|&e| graph.canonical_id(e));

    let mut doc = FoldDocument {
        file_spec: "1.1".into(),
        file_creator: "treefold".into(),
        file_classes: vec!["creasePattern".into()],
        frame_classes: vec!["creasePattern".into()],
        vertices_coords: vertices
            .iter()
            .map(|&v| [g.pos(v).x, g.pos(v).y])
            .collect(),
        vertices_edges: vec![Vec::new(); vertices.len()],
        edges_vertices: Vec::with_capacity(edges.len()),
        edges_assignment: Vec::with_capacity(edges.len()),
        edges_fold_angle: Vec::with_capacity(edges.len()),
        faces_vertices: Vec::new(),
    };
    for (i, &e) in edges.iter().enumerate() {
        let (from, to) = graph.ends(e);
        let (a, b) = (index[from.0], index[to.0]);
        doc.vertices_edges[a].push(i);
        doc.vertices_edges[b].push(i);
        doc.edges_vertices.push([a, b]);
        let c = g.crease(e);
        let letter = assignment_letter(c.crease_type, c.assignment, fan_out_hinges);
        doc.edges_assignment.push(letter.to_string());
        doc.edges_fold_angle.push(fold_angle(letter));
    }
    doc.faces_vertices = g
        .faces()
        .iter()
        .filter(|f| !f.is_outer)
        .map(|f| f.nodes.iter().rev().map(|v| index[v.0]).collect())
        .collect();
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;

    #[test]
    fn four_leaf_star_document() {
        let g = samples::four_leaf_star().unwrap().crease_pattern().unwrap();
        let doc = fold_document(&g, false);
        let (n, m) = (g.graph().node_count(), g.graph().edge_count());
        assert_eq!(doc.vertices_coords.len(), n);
        assert_eq!(doc.vertices_edges.len(), n);
        assert_eq!(doc.edges_vertices.len(), m);
        assert_eq!(doc.faces_vertices.len(), g.faces().len() - 1);
        for [x, y] in &doc.vertices_coords {
            assert!((0.0..=1.0).contains(x) && (0.0..=1.0).contains(y));
        }
        for [a, b] in &doc.edges_vertices {
            assert_ne!(a, b);
            assert!(*a < n && *b < n);
        }
        let count = |l: &str| doc.edges_assignment.iter().filter(|x| *x == l).count();
        assert_eq!((count("M"), count("V"), count("B")), (5, 3, 8));
        for (letter, angle) in doc.edges_assignment.iter().zip(&doc.edges_fold_angle) {
            assert_eq!(*angle, fold_angle(letter));
        }
    }

    #[test]
    fn fanned_out_hinges_are_unassigned() {
        let g = samples::bone().unwrap().crease_pattern().unwrap();
        let plain = fold_document(&g, false);
        let fanned = fold_document(&g, true);
        assert!(plain.edges_assignment.iter().any(|l| l == "F"));
        assert!(!fanned.edges_assignment.iter().any(|l| l == "F"));
        let hinges = g
            .crease_types()
            .into_iter()
            .filter(|&t| t == CreaseType::Hinge)
            .count();
        let b = |d: &FoldDocument| d.edges_assignment.iter().filter(|l| *l == "B").count();
        assert_eq!(b(&fanned), b(&plain) + hinges - count_hinges_already_b(&g));
    }

    fn count_hinges_already_b(g: &CreasesGraph) -> usize {
        g.graph()
            .edge_ids()
            .filter(|&e| {
                let c = g.crease(e);
                c.crease_type == CreaseType::Hinge
                    && matches!(c.assignment, Assignment::Unknown | Assignment::Boundary)
            })
            .count()
    }

    #[test]
    fn serializes_fold_field_names() {
        let g = samples::rabbit_ear().unwrap().crease_pattern().unwrap();
        let json = serde_json::to_value(fold_document(&g, false)).unwrap();
        assert_eq!(json["file_spec"], "1.1");
        assert_eq!(json["file_creator"], "treefold");
        assert!(json["edges_foldAngle"].is_array());
        assert!(json.get("edges_fold_angle").is_none());
        let back: FoldDocument = serde_json::from_value(json).unwrap();
        assert_eq!(back.faces_vertices.len(), g.faces().len() - 1);
    }
}
