//! Canonical tree/packing designs used by tests, benches, the demo and the CLI.
//!
//! Each design carries the root used for its discrete depth.

use std::f64::consts::PI;

use crate::api::Design;
use crate::error::{PatternError, Result};
use crate::geometry::Vec2;
use crate::packing::Packing;
use crate::tree::TreeGraph;

/// Names accepted by [`by_name`].
pub const NAMES: &[&str] = &[
    "four-leaf-star",
    "three-node",
    "rabbit-ear",
    "two-molecule",
    "ten-star",
    "bone",
    "twisted-bone",
    "paper",
    "crossing-swords",
    "pseudohinge-elevation",
    "corridor-after-pseudohinge",
    "deep-merge",
    "twisted-merge",
];

pub fn by_name(name: &str) -> Result<Design> {
    match name {
        "four-leaf-star" => four_leaf_star(),
        "three-node" => three_node_suboptimal(),
        "rabbit-ear" => rabbit_ear(),
        "two-molecule" => two_molecule(),
        "ten-star" => ten_star_suboptimal(),
        "bone" => bone(),
        "twisted-bone" => twisted_bone(),
        "paper" => lang_demaine_paper(),
        "crossing-swords" => crossing_swords(),
        "pseudohinge-elevation" => pseudohinge_elevation(),
        "corridor-after-pseudohinge" => corridor_after_pseudohinge(),
        "deep-merge" => deep_merge(),
        "twisted-merge" => twisted_merge(),
        other => Err(PatternError::UnknownSample(other.to_string())),
    }
}

/// Explicit tree from `(id, x, y)` nodes and `(from, to, length)` edges.
fn tree(nodes: &[(&str, f64, f64)], edges: &[(&str, &str, f64)]) -> Result<TreeGraph> {
    let mut t = TreeGraph::new();
    for &(id, x, y) in nodes {
        t.add_node(id, Vec2::new(x, y))?;
    }
    for &(a, b, l) in edges {
        t.add_edge(a, b, l)?;
    }
    Ok(t)
}

/// Star with centre `0` and leaves `1..=n` fanned over the lower half-plane.
pub fn star_tree(lengths: &[f64]) -> Result<TreeGraph> {
    let mut t = TreeGraph::new();
    t.add_node("0", Vec2::zeros())?;
    let step = PI / lengths.len() as f64;
    let first = step / 2.0 - PI;
    for (i, &l) in lengths.iter().enumerate() {
        let angle = first + i as f64 * step;
        let id = (i + 1).to_string();
        t.add_node(id.clone(), Vec2::new(l * angle.cos(), l * angle.sin()))?;
        t.add_edge(&id, "0", l)?;
    }
    Ok(t)
}

/// Packing with leaves `1..=n` at `locations`.
pub fn star_packing(scale_factor: f64, locations: &[(f64, f64)]) -> Packing {
    locations
        .iter()
        .enumerate()
        .fold(Packing::new(scale_factor), |p, (i, &(x, y))| {
            p.with_node((i + 1).to_string(), x, y)
        })
}

fn design(tree: TreeGraph, packing: Packing, root: &str) -> Result<Design> {
    Ok(Design {
        tree,
        packing,
        root: Some(root.to_string()),
    })
}

/// Centre `1` with four legs of length 3, leaves on the square's corners.
pub fn four_leaf_star() -> Result<Design> {
    let t = tree(
        &[
            ("1", 0.0, 0.0),
            ("2", 1.0, 0.0),
            ("3", 0.0, 1.0),
            ("4", -1.0, 0.0),
            ("5", 0.0, -1.0),
        ],
        &[
            ("2", "1", 3.0),
            ("3", "1", 3.0),
            ("4", "1", 3.0),
            ("5", "1", 3.0),
        ],
    )?;
    let p = Packing::new(1.0 / 6.0)
        .with_node("2", 1.0, 0.0)
        .with_node("3", 1.0, 1.0)
        .with_node("4", 0.0, 1.0)
        .with_node("5", 0.0, 0.0);
    design(t, p, "1")
}

/// Two legs {5, 2.5} with the short leaf left floating.
pub fn three_node_suboptimal() -> Result<Design> {
    design(
        star_tree(&[5.0, 2.5])?,
        star_packing(1.0 / 16.0, &[(1.0, 0.0), (11.5 / 16.0, 6.0 / 16.0)]),
        "0",
    )
}

pub fn rabbit_ear() -> Result<Design> {
    design(
        star_tree(&[1.0, 4.0, 4.0])?,
        star_packing(1.0 / 8.0, &[(1.0, 0.5), (5.0 / 8.0, 0.0), (5.0 / 8.0, 1.0)]),
        "0",
    )
}

pub fn two_molecule() -> Result<Design> {
    design(
        star_tree(&[1.0, 4.0, 1.0, 4.0])?,
        star_packing(
            1.0 / 8.0,
            &[(0.75, 0.5), (3.0 / 8.0, 1.0), (0.0, 0.5), (3.0 / 8.0, 0.0)],
        ),
        "0",
    )
}

/// Ten legs; leaf `6` starts off its constraints and must grow.
pub fn ten_star_suboptimal() -> Result<Design> {
    design(
        star_tree(&[3.0, 2.0, 3.0, 3.0, 5.0, 2.5, 3.0, 2.0, 2.0, 5.0])?,
        star_packing(
            1.0 / 16.0,
            &[
                (0.0, 1.0),
                (5.0 / 16.0, 1.0),
                (10.0 / 16.0, 1.0),
                (1.0, 1.0),
                (0.0, 8.0 / 16.0),
                (11.5 / 16.0, 6.0 / 16.0),
                (0.0, 0.0),
                (5.0 / 16.0, 0.0),
                (9.0 / 16.0, 0.0),
                (1.0, 0.0),
            ],
        ),
        "0",
    )
}

fn bone_tree() -> Result<TreeGraph> {
    tree(
        &[
            ("1", 0.0, 1.0),
            ("2", 1.0, 1.0),
            ("3", 0.5, 0.8),
            ("4", 0.5, 0.5),
            ("5", 0.5, 0.2),
            ("6", 0.0, 0.0),
            ("7", 1.0, 0.0),
        ],
        &[
            ("3", "1", 2.0),
            ("3", "2", 2.0),
            ("4", "3", 1.0),
            ("5", "4", 1.0),
            ("6", "5", 2.0),
            ("7", "5", 2.0),
        ],
    )
}

/// Seven-node bone: two forks joined by a two-edge spine.
pub fn bone() -> Result<Design> {
    let p = Packing::new(1.0 / 6.0)
        .with_node("1", 0.0, 1.0)
        .with_node("2", 2.0 / 3.0, 1.0)
        .with_node("6", 0.0, 0.0)
        .with_node("7", 2.0 / 3.0, 0.0);
    design(bone_tree()?, p, "3")
}

/// The bone with leaves `2` and `7` swapped.
pub fn twisted_bone() -> Result<Design> {
    let p = Packing::new(1.0 / 15.0)
        .with_node("1", 0.3, 0.7)
        .with_node("7", 0.7, 0.7)
        .with_node("6", 0.3, 0.3)
        .with_node("2", 0.7, 0.3);
    design(bone_tree()?, p, "3")
}

/// The small example from Lang and Demaine's facet-ordering paper.
pub fn lang_demaine_paper() -> Result<Design> {
    let t = tree(
        &[
            ("1", 0.0, 1.0),
            ("2", 1.0, 1.0),
            ("3", 0.5, 0.7),
            ("4", 0.5, 0.3),
            ("5", 0.0, 0.0),
            ("6", 0.5, 0.0),
            ("7", 1.0, 0.0),
        ],
        &[
            ("3", "1", 1.0),
            ("3", "2", 1.0),
            ("4", "3", 1.0),
            ("5", "4", 1.0),
            ("6", "4", 1.0),
            ("7", "4", 1.0),
        ],
    )?;
    let p = Packing::new(0.2754)
        .with_node("1", 0.0, 1.0)
        .with_node("2", 0.551, 1.0)
        .with_node("5", 0.0, 0.1)
        .with_node("6", 0.5418, 0.0)
        .with_node("7", 0.9999, 0.3061);
    design(t, p, "3")
}

/// Two forks of three leaves each, reached from the root by crossing legs.
pub fn crossing_swords() -> Result<Design> {
    let t = tree(
        &[
            ("1", 0.0, 0.0),
            ("2", -3.0, -3.0),
            ("3", 3.0, -3.0),
            ("4", -1.0, 1.0),
            ("5", 1.0, 1.0),
            ("6", -4.0, -2.0),
            ("7", -4.0, -4.0),
            ("8", -2.0, -4.0),
            ("9", 4.0, -2.0),
            ("10", 4.0, -4.0),
            ("11", 2.0, -4.0),
            ("12", -5.0, -3.0),
        ],
        &[
            ("2", "1", 3.0),
            ("3", "1", 3.0),
            ("4", "1", 1.0),
            ("5", "1", 1.0),
            ("6", "2", 1.0),
            ("7", "2", 1.0),
            ("8", "2", 1.0),
            ("9", "3", 1.0),
            ("10", "3", 1.0),
            ("11", "3", 1.0),
            ("12", "2", 3.0),
        ],
    )?;
    let p = Packing::new(1.0 / 12.0)
        .with_node("4", 8.0 / 12.0, 9.0 / 12.0)
        .with_node("5", 8.0 / 12.0, 3.0 / 12.0)
        .with_node("6", 4.0 / 12.0, 1.0)
        .with_node("7", 4.0 / 12.0, 6.0 / 12.0)
        .with_node("8", 4.0 / 12.0, 0.0)
        .with_node("9", 1.0, 1.0)
        .with_node("10", 1.0, 6.0 / 12.0)
        .with_node("11", 1.0, 0.0)
        .with_node("12", 0.0, 6.0 / 12.0);
    design(t, p, "1")
}

/// Three leaves whose pseudohinge facets sit at several elevations.
pub fn pseudohinge_elevation() -> Result<Design> {
    let t = tree(
        &[
            ("1", -1.0, 1.0),
            ("2", 0.0, 0.0),
            ("3", -2.0, 2.0),
            ("4", -1.0, -1.0),
            ("5", 1.0, 1.0),
        ],
        &[
            ("2", "1", 0.6),
            ("3", "1", 0.25),
            ("4", "2", 0.15),
            ("5", "2", 0.15),
        ],
    )?;
    let p = Packing::new(1.0)
        .with_node("3", 0.0, 1.0)
        .with_node("4", 0.0, 0.0)
        .with_node("5", 1.0, 1.0);
    design(t, p, "1")
}

/// An unfolded run between two pseudohinge facets, reached from both ends.
pub fn corridor_after_pseudohinge() -> Result<Design> {
    let t = tree(
        &[
            ("1", 5.0, 4.0),
            ("2", 5.0, 6.0),
            ("5", 4.5504087193460485, 2.506811989100817),
            ("6", 5.640326975476839, 3.215258855585831),
            ("3", 3.514986376021798, 7.275204359673024),
            ("4", 6.076294277929155, 7.68392370572207),
            ("7", 7.1117166212534055, 7.68392370572207),
            ("8", 6.757493188010899, 8.77384196185286),
            ("9", 3.1335149863760217, 8.119891008174386),
            ("10", 2.7247956403269753, 6.975476839237056),
        ],
        &[
            ("1", "5", 4.150476717883663),
            ("1", "6", 2.654521076821072),
            ("1", "2", 2.0),
            ("2", "4", 1.9985015435059814),
            ("2", "3", 1.9573991985106054),
            ("3", "9", 0.9529317277948539),
            ("3", "10", 1.1282162660313555),
            ("4", "7", 1.0631695901529052),
            ("4", "8", 3.6352767380799076),
        ],
    )?;
    let p = Packing::new(0.0873900315629287)
        .with_node("10", 0.9999999971164418, 0.13695020600926255)
        .with_node("5", 0.0, 0.10156788020638523)
        .with_node("6", -3.017856131659613e-9, 0.6962568522712922)
        .with_node("7", 0.6020342518673453, 1.0)
        .with_node("8", 0.9999999986129633, 0.8989383006929783)
        .with_node("9", 0.8803257897397259, 0.0);
    design(t, p, "4")
}

/// Eight leaves on a long spine; molecules merge far from the global source
/// and the outer boundary is twisted.
pub fn deep_merge() -> Result<Design> {
    let t = tree(
        &[
            ("1", 5.0, 4.0),
            ("2", 5.0, 6.0),
            ("3", 3.5267857142857144, 3.035714285714286),
            ("4", 6.026785714285714, 3.325892857142857),
            ("5", 6.026785714285714, 6.71875),
            ("6", 4.776785714285714, 7.343750000000001),
            ("7", 2.03125, 6.227678571428572),
            ("8", 2.1205357142857144, 7.276785714285714),
            ("9", 0.9375000000000001, 6.40625),
            ("10", 2.1205357142857144, 2.96875),
            ("11", 2.834821428571429, 2.1651785714285716),
            ("12", 1.1607142857142858, 2.232142857142857),
        ],
        &[
            ("1", "4", 15.761812131503053),
            ("3", "1", 39.726212926513504),
            ("1", "2", 2.0),
            ("2", "6", 46.46729352139373),
            ("5", "2", 37.36025003041873),
            ("2", "7", 2.9774677318801888),
            ("7", "9", 15.001887942990807),
            ("8", "7", 1.1443317883360984),
            ("7", "10", 3.260151433974959),
            ("10", "11", 62.276098123250016),
            ("10", "12", 153.78043821836764),
        ],
    )?;
    let p = Packing::new(0.00445064931456961)
        .with_node("11", 0.6002975636558101, 1.0)
        .with_node("12", -1.8485998287687266e-9, 0.24879978192179975)
        .with_node("3", 0.999999999208625, 0.7154567587617131)
        .with_node("4", 0.7971095092142312, 0.5746605416350531)
        .with_node("5", 0.932417886312053, 0.3700195268893871)
        .with_node("6", 0.8846741930276222, 2.0510018683417286e-9)
        .with_node("8", 1.0, 0.1933763774956242)
        .with_node("9", 0.6547918075274544, 0.6457195548347869);
    design(t, p, "1")
}

/// Two forks whose leaves are packed crosswise, twisting the outer boundary.
pub fn twisted_merge() -> Result<Design> {
    let t = tree(
        &[
            ("1", 0.0, 0.0),
            ("2", 0.0, 1.0),
            ("3", 2.0, 2.0),
            ("4", -2.0, 2.0),
            ("5", -1.0, -1.0),
            ("6", 1.0, -1.0),
        ],
        &[
            ("2", "1", 1.0),
            ("3", "2", 10.0),
            ("4", "2", 10.0),
            ("5", "1", 1.0),
            ("6", "1", 1.0),
        ],
    )?;
    let p = Packing::new(1.0 / 16.0)
        .with_node("3", 0.75, 1.0)
        .with_node("5", 0.0, 1.0)
        .with_node("4", 0.0, 0.0)
        .with_node("6", 0.75, 0.0);
    design(t, p, "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_resolves() {
        for name in NAMES {
            let d = by_name(name).unwrap();
            assert!(d.root.is_some(), "{name} has a root");
            assert!(!d.packing.nodes.is_empty());
        }
        assert_eq!(
            by_name("crab").unwrap_err(),
            PatternError::UnknownSample("crab".to_string())
        );
    }

    #[test]
    fn star_tree_has_centre_and_leaves() {
        let t = star_tree(&[1.0, 4.0, 4.0]).unwrap();
        let g = t.graph();
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 3);
        let centre = g.node_by_id("0").unwrap();
        assert_eq!(g[centre].degree(), 3);
        assert!((t.distances().distance("2", "3").unwrap() - 8.0).abs() < 1e-12);
    }
}
