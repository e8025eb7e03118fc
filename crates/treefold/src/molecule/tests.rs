use super::*;
use crate::api::Design;
use crate::creases::{build_faces, clean_packing};
use crate::error::PatternError;
use crate::samples;

fn inset(design: &Design) -> (CreasesGraph, ZTable) {
    let root = design.root_id().unwrap();
    let d = design.tree.distances();
    let mut packing = design.packing.clone();
    let mut g = clean_packing(&mut packing, &d).unwrap();
    assert!(build_faces(&mut g).unwrap().is_none());
    let depth = design.tree.dangle(&root);
    let z = generate_molecules(&mut g, &d, packing.scale_factor, &depth).unwrap();
    (g, z)
}

fn counts(g: &CreasesGraph) -> (usize, usize, usize) {
    (g.graph().node_count(), g.graph().edge_count(), g.faces().len())
}

fn count_type(g: &CreasesGraph, t: CreaseType) -> usize {
    g.crease_types().into_iter().filter(|&x| x == t).count()
}

fn node(g: &CreasesGraph, id: &str) -> NodeId {
    g.node_by_id(id).unwrap_or_else(|| panic!("node {id} missing"))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn four_leaf_star_meets_in_the_centre() {
    let (g, _) = inset(&samples::four_leaf_star().unwrap());
    assert_eq!(g.state(), GraphState::PreFacetOrdering);
    assert_eq!(counts(&g), (9, 16, 9));
    let centre = node(&g, "i5");
    assert!((g.pos(centre) - crate::geometry::Vec2::new(0.5, 0.5)).norm() < 1e-9);
    assert_eq!(g.graph()[centre].degree(), 8);
    assert_eq!(g.node(centre).display_id, "1");
    assert!(close(g.node(centre).elevation, 0.5));
    assert_eq!(g.graph()[node(&g, "i2")].degree(), 3);
    assert_eq!(count_type(&g, CreaseType::ActiveHull), 8);
    assert_eq!(count_type(&g, CreaseType::Ridge), 4);
    assert_eq!(count_type(&g, CreaseType::Hinge), 4);
    assert_eq!(g.molecules().len(), 1);
    assert_eq!(g.molecules()[0].local_root.as_deref(), Some("1"));
}

#[test]
fn rabbit_ear_has_one_inset_corner() {
    let (g, _) = inset(&samples::rabbit_ear().unwrap());
    assert_eq!(counts(&g), (7, 12, 7));
    let apex = node(&g, "i4");
    assert!(close(g.pos(apex).x, 0.791_666_666_666_666_6));
    assert!(close(g.pos(apex).y, 0.5));
    assert_eq!(g.graph()[apex].degree(), 6);
    assert!(g.node_by_id("i5").is_none());
}

#[test]
fn bone_spine_node_has_two_ridges_and_two_hinges() {
    let (g, _) = inset(&samples::bone().unwrap());
    assert_eq!(counts(&g), (15, 26, 13));

    let spine = node(&g, "i11");
    assert!(close(g.pos(spine).x, 1.0 / 3.0));
    assert!(close(g.pos(spine).y, 0.5));
    assert_eq!(g.node(spine).display_id, "4");
    assert!(close(g.node(spine).elevation, 1.0 / 3.0));
    assert_eq!(
        g.incident_types(spine),
        vec![
            CreaseType::Ridge,
            CreaseType::Ridge,
            CreaseType::Hinge,
            CreaseType::Hinge
        ]
    );

    let fork = node(&g, "i9");
    assert!(close(g.pos(fork).y, 2.0 / 3.0));
    assert_eq!(g.node(fork).display_id, "3");
    assert_eq!(
        g.incident_types(fork),
        [CreaseType::Ridge; 3]
            .into_iter()
            .chain([CreaseType::Hinge; 3])
            .collect::<Vec<_>>()
    );
    assert_eq!(g.node(node(&g, "i10")).display_id, "5");
    assert_eq!(g.molecules()[0].local_root.as_deref(), Some("3"));
}

#[test]
fn paper_reduced_paths_follow_the_tree() {
    let (g, z) = inset(&samples::lang_demaine_paper().unwrap());
    let (one, two) = (node(&g, "1"), node(&g, "2"));
    let (five, six) = (node(&g, "5"), node(&g, "6"));
    assert_eq!(z.stops(one, two).unwrap().len(), 2);
    // 1-5 is an inactive hull crease: no branch points projected onto it.
    assert_eq!(z.stops(one, five).unwrap().len(), 1);
    let path = z.stops(one, six).unwrap();
    let expected = [("3", 0.2754), ("4", 0.5508), ("6", 0.8262)];
    assert_eq!(path.len(), expected.len());
    for (stop, (id, dist)) in path.iter().zip(expected) {
        assert_eq!(stop.display_id, id);
        assert!((stop.distance - dist).abs() < 1e-4, "{id}: {}", stop.distance);
    }
    // 1 and 6 share no crease, so only the terminal stop has a vertex.
    assert!(path[..2].iter().all(|s| s.node.is_none()));
    assert_eq!(path[2].node, Some(six));

    assert_eq!(counts(&g), (30, 55, 27));
    assert_eq!(count_type(&g, CreaseType::Gusset), 6);
    assert_eq!(count_type(&g, CreaseType::Pseudohinge), 1);
    assert_eq!(count_type(&g, CreaseType::InactiveHull), 5);
}

#[test]
fn every_axial_facet_has_a_corridor_and_two_flaps() {
    for design in [
        samples::four_leaf_star().unwrap(),
        samples::bone().unwrap(),
        samples::lang_demaine_paper().unwrap(),
        samples::two_molecule().unwrap(),
        samples::ten_star_suboptimal().unwrap(),
    ] {
        let (g, _) = inset(&design);
        let (v, e, f) = counts(&g);
        assert_eq!(v + f, e + 2, "Euler characteristic");
        for fid in g.face_ids() {
            let face = g.face(fid);
            if face.is_outer || face.nav.axial.is_none() {
                continue;
            }
            let corridor = face.nav.corridor.as_ref().unwrap();
            assert_eq!(corridor[0], fid);
            assert!(corridor.len() >= 2);
            assert_eq!(face.nav.flap.len(), 2);
            assert!(face.nav.crease_to_next_axial_facet.is_some());
            assert!(face.nav.molecule.is_some());
        }
    }
}

#[test]
fn ten_star_splits_into_three_molecules() {
    let (g, _) = inset(&samples::ten_star_suboptimal().unwrap());
    assert_eq!(counts(&g), (48, 99, 53));
    assert_eq!(g.molecules().len(), 3);
    assert!(g
        .molecules()
        .iter()
        .all(|m| m.local_root.as_deref() == Some("0")));
}

#[test]
fn repeated_runs_agree() {
    let design = samples::lang_demaine_paper().unwrap();
    let (a, _) = inset(&design);
    let (b, _) = inset(&design);
    assert_eq!(counts(&a), counts(&b));
    assert_eq!(a.crease_types(), b.crease_types());
}

#[test]
fn molecules_require_faces() {
    let design = samples::bone().unwrap();
    let d = design.tree.distances();
    let mut packing = design.packing.clone();
    let mut g = clean_packing(&mut packing, &d).unwrap();
    let depth = design.tree.dangle("3");
    let err = generate_molecules(&mut g, &d, packing.scale_factor, &depth);
    assert!(matches!(
        err,
        Err(PatternError::StateOrder {
            expected: GraphState::PreUma,
            found: GraphState::Clean,
            ..
        })
    ));
}

#[test]
fn branch_point_off_its_side_is_infeasible() {
    assert!(super::inset::check_on_side(0.0, 2.0, "3").is_ok());
    assert!(super::inset::check_on_side(2.0, 2.0, "3").is_ok());
    for d in [-0.01, 2.01] {
        let err = super::inset::check_on_side(d, 2.0, "3").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::GeometricInfeasibility);
        assert!(err.to_string().contains("branch point 3"), "{err}");
    }
}
