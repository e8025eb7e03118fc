use super::*;
use crate::samples;
use proptest::prelude::*;

fn clean(design: &crate::api::Design) -> (CreasesGraph, crate::tree::DistanceTable, Packing) {
    let d = design.tree.distances();
    let mut packing = design.packing.clone();
    let g = clean_packing(&mut packing, &d).unwrap();
    (g, d, packing)
}

fn node(g: &CreasesGraph, id: &str) -> NodeId {
    g.node_by_id(id).unwrap_or_else(|| panic!("node {id} missing"))
}

fn labels(g: &CreasesGraph, f: FaceId) -> Vec<&str> {
    g.face(f).nodes.iter().map(|&v| g.label(v)).collect()
}

#[test]
fn four_leaf_star_is_already_clean() {
    let (mut g, _, _) = clean(&samples::four_leaf_star().unwrap());
    assert_eq!(g.state(), GraphState::Clean);
    for id in ["2", "3", "4", "5"] {
        assert_eq!(g.leaf_extension(id), 0.0);
    }
    assert_eq!(g.crease_types(), vec![CreaseType::Axial; 4]);

    assert!(build_faces(&mut g).unwrap().is_none());
    assert_eq!(g.state(), GraphState::PreUma);
    assert_eq!(g.crease_types(), vec![CreaseType::ActiveHull; 4]);
    assert_eq!(g.faces().len(), 2);
    assert_eq!(labels(&g, FaceId(0)), ["4", "5", "2", "3"]);
    assert_eq!(labels(&g, FaceId(1)), ["5", "4", "3", "2"]);
    assert!(!g.face(FaceId(0)).is_outer);
    assert_eq!(g.outer_face(), Some(FaceId(1)));

    let bottom = g.graph().require_edge(node(&g, "2"), node(&g, "5")).unwrap();
    assert_eq!(g.crease(bottom).left_face, Some(FaceId(1)));
    assert_eq!(g.crease(bottom).right_face, Some(FaceId(0)));
    let right = g.graph().require_edge(node(&g, "2"), node(&g, "3")).unwrap();
    assert_eq!(g.crease(right).left_face, Some(FaceId(0)));
    assert_eq!(g.crease(right).right_face, Some(FaceId(1)));
}

#[test]
fn floating_leaf_grows_onto_the_boundary() {
    let (g, _, packing) = clean(&samples::three_node_suboptimal().unwrap());
    assert_eq!(g.leaf_extension("1"), 0.0);
    assert!((g.leaf_extension("2") - 12.5).abs() < 1e-6);
    let p = g.pos(node(&g, "2"));
    assert!((p - Vec2::new(0.25, 1.0)).norm() < 1e-6, "{p:?}");
    assert!((packing.position("2").unwrap() - p).norm() < 1e-12);
}

#[test]
fn two_molecule_leaf_slides_to_the_edge() {
    let (g, _, _) = clean(&samples::two_molecule().unwrap());
    assert!((g.leaf_extension("1") - 1.403_124_243_021_011_4).abs() < 1e-6);
    assert!((g.pos(node(&g, "1")) - Vec2::new(1.0, 0.5)).norm() < 1e-6);
}

#[test]
fn extensions_never_shrink() {
    for design in [
        samples::three_node_suboptimal().unwrap(),
        samples::ten_star_suboptimal().unwrap(),
        samples::two_molecule().unwrap(),
        samples::lang_demaine_paper().unwrap(),
        samples::crossing_swords().unwrap(),
    ] {
        // Every cleanup step goes through grow_leaf_extension, which refuses
        // to shrink, so a clean run means no step lowered an extension.
        let (g, _, _) = clean(&design);
        for v in g.graph().node_ids() {
            assert!(g.leaf_extension(g.label(v)) >= 0.0);
        }
    }

    let (mut g, _, _) = clean(&samples::three_node_suboptimal().unwrap());
    let mut last = g.leaf_extension("2");
    for step in [0.5, 0.0, 1.25] {
        g.grow_leaf_extension("2", step).unwrap();
        assert!(g.leaf_extension("2") >= last);
        last = g.leaf_extension("2");
    }
    assert!((last - 14.25).abs() < 1e-6);
    for bad in [-1e-9, f64::NAN] {
        assert!(matches!(
            g.grow_leaf_extension("2", bad),
            Err(PatternError::Inconsistent(_))
        ));
        assert_eq!(g.leaf_extension("2"), last);
    }
}

#[test]
fn ten_star_has_an_inactive_hull_crease() {
    let (mut g, d, _) = clean(&samples::ten_star_suboptimal().unwrap());
    assert!((g.leaf_extension("6") - 2.5).abs() < 1e-6);
    assert!((g.pos(node(&g, "6")) - Vec2::new(0.625, 0.5)).norm() < 1e-6);
    assert!(build_faces(&mut g).unwrap().is_none());
    assert!(!is_twisted(&d, &g).unwrap());

    let e = g.graph().require_edge(node(&g, "10"), node(&g, "4")).unwrap();
    let c = g.crease(e);
    assert_eq!(c.crease_type, CreaseType::InactiveHull);
    let (inside, outside) = if g.graph()[e].from == node(&g, "10") {
        (c.left_face.unwrap(), c.right_face.unwrap())
    } else {
        (c.right_face.unwrap(), c.left_face.unwrap())
    };
    assert_eq!(g.face(inside).nodes.len(), 4);
    assert_eq!(g.face(outside).nodes.len(), 9);
    assert!(g.face(outside).is_outer);

    let mut sizes: Vec<usize> = g.faces().iter().map(|f| f.nodes.len()).collect();
    sizes.sort_unstable();
    assert_eq!(sizes, [4, 5, 6, 9]);
}

#[test]
fn two_leaves_make_a_single_outer_face() {
    let (mut g, _, _) = clean(&samples::three_node_suboptimal().unwrap());
    assert!(build_faces(&mut g).unwrap().is_none());
    assert_eq!(g.faces().len(), 1);
    assert!(g.face(FaceId(0)).is_outer);
    assert_eq!(g.face(FaceId(0)).nodes.len(), 2);
    assert_eq!(g.crease_types(), vec![CreaseType::ActiveHull]);
}

#[test]
fn stray_crease_inside_the_hull_is_rejected() {
    let packing = Packing::new(0.1)
        .with_node("1", 0.0, 0.0)
        .with_node("2", 1.0, 0.0)
        .with_node("3", 1.0, 1.0)
        .with_node("4", 0.0, 1.0)
        .with_node("a", 0.4, 0.5)
        .with_node("b", 0.6, 0.5);
    let mut g = CreasesGraph::from_packing(&packing).unwrap();
    g.add_crease(node(&g, "a"), node(&g, "b"), CreaseType::Axial, None)
        .unwrap();
    g.advance(GraphState::Clean);
    let err = build_faces(&mut g).unwrap_err();
    assert_eq!(
        err,
        PatternError::inconsistent("Edges a-b lie in different component than first hull edge")
    );
}

#[test]
fn twisted_bone_is_classified() {
    let (mut g, d, _) = clean(&samples::twisted_bone().unwrap());
    assert!(build_faces(&mut g).unwrap().is_none());
    assert!(is_twisted(&d, &g).unwrap());
    assert!(has_twisted_inner_face(&d, &g).unwrap());

    let (mut g, d, _) = clean(&samples::bone().unwrap());
    assert!(build_faces(&mut g).unwrap().is_none());
    assert!(!is_twisted(&d, &g).unwrap());
    let (v, e, f) = (g.graph().node_count(), g.graph().edge_count(), g.faces().len());
    assert_eq!(v + f, e + 2);
}

#[test]
fn twist_on_the_outer_boundary_only() {
    let (mut g, d, _) = clean(&samples::twisted_merge().unwrap());
    assert!(build_faces(&mut g).unwrap().is_none());
    assert_eq!(g.faces().len(), 3);
    assert!(is_twisted(&d, &g).unwrap());
    assert!(!has_twisted_inner_face(&d, &g).unwrap());
}

#[test]
fn phases_run_in_order() {
    let design = samples::four_leaf_star().unwrap();
    let (mut g, _, _) = clean(&design);
    build_faces(&mut g).unwrap();
    assert!(matches!(
        build_faces(&mut g),
        Err(PatternError::StateOrder {
            op: "build_faces",
            expected: GraphState::Clean,
            found: GraphState::PreUma,
        })
    ));
    let fresh = CreasesGraph::from_packing(&design.packing).unwrap();
    assert_eq!(fresh.state(), GraphState::NewlyCreated);
    assert!(fresh.require_state("build_faces", GraphState::Clean).is_err());
}

#[test]
fn overlapping_disks_are_infeasible() {
    let mut design = samples::four_leaf_star().unwrap();
    design.packing = Packing::new(1.0)
        .with_node("2", 1.0, 0.0)
        .with_node("3", 1.0, 1.0)
        .with_node("4", 0.0, 1.0)
        .with_node("5", 0.0, 0.0);
    let d = design.tree.distances();
    let err = clean_packing(&mut design.packing, &d);
    assert!(matches!(err, Err(PatternError::Infeasible(_))));
}

#[test]
fn hull_keeps_collinear_boundary_points() {
    let pts = [
        Vec2::new(0.0, 0.0),
        Vec2::new(0.5, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(0.0, 1.0),
        Vec2::new(0.4, 0.6),
    ];
    let hull = convex_hull(&pts);
    assert_eq!(hull.len(), 5);
    assert!(!hull.contains(&5));
}

proptest! {
    #[test]
    fn hull_is_convex_and_encloses_every_point(
        raw in prop::collection::vec((0.0f64..1.0, 0.0f64..1.0), 3..24)
    ) {
        let pts: Vec<Vec2> = raw.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
        let hull = convex_hull(&pts);
        prop_assume!(hull.len() >= 3);
        let mut distinct = hull.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(distinct.len(), hull.len());

        let n = hull.len();
        for i in 0..n {
            let (a, b) = (pts[hull[i]], pts[hull[(i + 1) % n]]);
            for p in &pts {
                prop_assert!(crate::geometry::turn(a, b, *p) > -1e-5);
            }
        }
        let ring: Vec<Vec2> = hull.iter().map(|&i| pts[i]).collect();
        prop_assert!(crate::geometry::signed_area(&ring) > 0.0);
    }
}
