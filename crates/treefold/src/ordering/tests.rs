use super::*;
use crate::api::Design;
use crate::creases::{build_faces, clean_packing, Assignment};
use crate::molecule::generate_molecules;
use crate::samples;

fn prepared(design: &Design) -> (CreasesGraph, DiscreteDepth) {
    let d = design.tree.distances();
    let mut packing = design.packing.clone();
    let mut g = clean_packing(&mut packing, &d).unwrap();
    assert!(build_faces(&mut g).unwrap().is_none());
    let depth = design.tree.dangle(&design.root_id().unwrap());
    generate_molecules(&mut g, &d, packing.scale_factor, &depth).unwrap();
    (g, depth)
}

fn ordered(design: &Design) -> (CreasesGraph, FacetOrderingGraph) {
    let (mut g, depth) = prepared(design);
    let og = order_facets(&mut g, &depth).unwrap();
    (g, og)
}

#[test]
fn four_leaf_star_histogram() {
    let (g, og) = ordered(&samples::four_leaf_star().unwrap());
    assert_eq!(g.state(), GraphState::FullyAssigned);
    assert_eq!(g.assignment_histogram(), [5, 3, 0, 0, 8]);
    assert_eq!(og.len(), 8);
}

#[test]
fn histograms_of_canonical_designs() {
    let cases = [
        (samples::rabbit_ear(), [4, 2, 0, 0, 6]),
        (samples::bone(), [7, 3, 4, 0, 12]),
        (samples::lang_demaine_paper(), [22, 13, 6, 0, 14]),
        (samples::two_molecule(), [8, 6, 0, 0, 8]),
        (samples::ten_star_suboptimal(), [47, 32, 0, 0, 20]),
        (samples::crossing_swords(), [65, 45, 32, 0, 28]),
        (samples::pseudohinge_elevation(), [7, 2, 4, 0, 10]),
        (samples::corridor_after_pseudohinge(), [29, 16, 16, 0, 22]),
        (samples::deep_merge(), [71, 49, 36, 0, 20]),
    ];
    for (design, expected) in cases {
        let design = design.unwrap();
        let (g, _) = ordered(&design);
        assert_eq!(g.state(), GraphState::FullyAssigned);
        assert_eq!(g.assignment_histogram(), expected);
    }
}

#[test]
fn order_respects_every_graph_edge() {
    for design in [
        samples::bone().unwrap(),
        samples::ten_star_suboptimal().unwrap(),
        samples::crossing_swords().unwrap(),
        samples::corridor_after_pseudohinge().unwrap(),
        samples::deep_merge().unwrap(),
    ] {
        let (g, og) = ordered(&design);
        assert_eq!(og.len(), g.faces().len() - 1);
        let index = |f: FaceId| g.face(f).order.facet_order_index.unwrap();
        for &a in og.faces() {
            for &b in og.successors(a) {
                assert!(index(a) < index(b), "{a:?} -> {b:?}");
            }
        }
        assert!(g.face_ids().all(|f| g.face(f).is_outer || g.face(f).order.facet_order_index.is_some()));
    }
}

#[test]
fn merged_molecules_close_their_rings_without_a_cycle() {
    let (g, og) = ordered(&samples::deep_merge().unwrap());
    assert_eq!(g.faces().len(), 93);
    assert_eq!(og.topological_sort().unwrap().len(), 92);
}

/// Facets without a pseudohinge entered from two pseudohinge facets.
fn bracketed_runs(g: &CreasesGraph, og: &FacetOrderingGraph) -> usize {
    let has_ph = |f: FaceId| g.face(f).nav.has_pseudohinge;
    og.faces()
        .iter()
        .filter(|&&f| !has_ph(f))
        .filter(|&&f| {
            og.faces()
                .iter()
                .filter(|&&a| has_ph(a) && og.successors(a).contains(&f))
                .count()
                >= 2
        })
        .count()
}

#[test]
fn run_between_pseudohinge_facets_is_entered_from_both_ends() {
    let (g, og) = ordered(&samples::corridor_after_pseudohinge().unwrap());
    assert_eq!(g.faces().len(), 39);
    assert_eq!(og.len(), 38);
    assert_eq!(bracketed_runs(&g, &og), 1);

    let (g, og) = ordered(&samples::bone().unwrap());
    assert_eq!(bracketed_runs(&g, &og), 0);
}

#[test]
fn colouring_flips_across_folded_creases_only() {
    let (g, _) = ordered(&samples::lang_demaine_paper().unwrap());
    for e in g.graph().edge_ids() {
        let c = g.crease(e);
        let (Some(l), Some(r)) = (c.left_face, c.right_face) else {
            panic!("open crease");
        };
        if g.face(l).is_outer || g.face(r).is_outer {
            assert_eq!(c.assignment, Assignment::Boundary);
            continue;
        }
        let (cl, cr) = (g.face(l).order.coloring, g.face(r).order.coloring);
        assert!(cl.is_some() && cr.is_some());
        assert_eq!(cl == cr, c.assignment == Assignment::Unfolded);
    }
}

#[test]
fn unfolded_hinges_bridge_depth_two() {
    let design = samples::bone().unwrap();
    let (g, _) = ordered(&design);
    let depth = design.tree.dangle("3");
    for e in g.graph().edge_ids() {
        let c = g.crease(e);
        if c.assignment != Assignment::Unfolded {
            continue;
        }
        assert_eq!(c.crease_type, crate::creases::CreaseType::Hinge);
        let (l, r) = (c.left_face.unwrap(), c.right_face.unwrap());
        let (lf, rf) = (&g.face(l).nav.flap, &g.face(r).nav.flap);
        let a = lf.difference(rf).next().unwrap();
        let b = rf.difference(lf).next().unwrap();
        assert_eq!(depth.get(a).abs_diff(depth.get(b)), 2);
    }
}

#[test]
fn ordering_requires_molecules() {
    let design = samples::four_leaf_star().unwrap();
    let d = design.tree.distances();
    let mut packing = design.packing.clone();
    let mut g = clean_packing(&mut packing, &d).unwrap();
    build_faces(&mut g).unwrap();
    let err = order_facets(&mut g, &design.tree.dangle("1"));
    assert!(matches!(
        err,
        Err(PatternError::StateOrder {
            op: "order_facets",
            ..
        })
    ));
}
