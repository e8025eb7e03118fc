//! Crease patterns from origami trees.
//!
//! Given a weighted tree and a disk packing of its leaves in the unit square,
//! the pipeline in [`api::crease_pattern`] produces a flat-foldable crease
//! pattern with every crease assigned mountain, valley, unfolded or boundary.
//!
//! Phases, each gated by [`creases::GraphState`]:
//! - [`creases::clean_packing`]: grow leaves until every node is taut.
//! - [`creases::build_faces`]: convex hull, active/inactive hull creases, faces.
//! - [`molecule::generate_molecules`]: Universal Molecule insetting.
//! - [`ordering::order_facets`]: facet ordering and mountain/valley.
//!
//! API Policy
//! - Graph handles (`NodeId`, `EdgeId`, `FaceId`) index into one graph and
//!   are meaningless across graphs.
//! - Every phase mutates the graph in place and fails fast with a
//!   [`PatternError`]; a failed graph should be discarded.

pub mod api;
pub(crate) mod cfg;
pub mod creases;
pub mod error;
pub mod fold;
pub mod geometry;
pub mod graph;
pub mod molecule;
pub mod ordering;
pub mod packing;
pub mod samples;
pub mod tree;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use api::{crease_pattern, packing_is_twisted, Design, DesignFile};
pub use error::{ErrorKind, PatternError};

/// Common exports for callers driving the pipeline phase by phase.
pub mod prelude {
    pub use crate::api::{crease_pattern, Design, DesignFile};
    pub use crate::creases::{
        build_faces, clean_packing, is_twisted, Assignment, CreaseType, CreasesGraph, GraphState,
    };
    pub use crate::error::{PatternError, Result};
    pub use crate::fold::{fold_document, FoldDocument};
    pub use crate::geometry::Vec2;
    pub use crate::graph::{EdgeId, FaceId, NodeId, PlanarGraph};
    pub use crate::molecule::generate_molecules;
    pub use crate::ordering::order_facets;
    pub use crate::packing::Packing;
    pub use crate::tree::{DiscreteDepth, DistanceTable, TreeGraph};
}
