//! Tolerances and iteration caps for the crease-pattern pipeline (internal).
//!
//! Policy
//! - Defaults are fixed constants. They are not caller-tunable: a design that
//!   only works with a looser tolerance is reported as infeasible instead.
//! - Every loop that could spin on degenerate geometry is bounded by one of the
//!   caps below and fails with `PatternError::Diverged` when exhausted.

/// Geometric tolerance for activeness, collinearity, dedup and hull turns.
pub(crate) const TOLERANCE: f64 = 1e-3;
/// Two incident edges closer than this angle (radians) are parallel.
pub(crate) const ANGLE_TOLERANCE: f64 = 1e-6;
/// Stop width for the convex-gap radius search during cleanup.
pub(crate) const BINARY_SEARCH_TOLERANCE: f64 = 1e-9;
/// Step cap for the convex-gap radius search.
pub(crate) const BINARY_SEARCH_STEPS: usize = 100;
/// Upper bracket for the radius growth searched during cleanup.
pub(crate) const BINARY_SEARCH_MAX_RADIUS: f64 = 2.0;
/// Degenerate denominators in inset and circle solves.
pub(crate) const SOLVE_EPS: f64 = 1e-12;
/// Smallest inset distance accepted as a root; also the slack on a flat corner.
pub(crate) const ROOT_EPS: f64 = 1e-9;

pub(crate) const CLEANUP_MAX_ITERATIONS: usize = 500;
/// Recursive inset calls per molecule.
pub(crate) const MOLECULE_MAX_ITERATIONS: usize = 200;
/// Steps along a molecule ring or a boundary walk.
pub(crate) const RING_WALK_MAX_ITERATIONS: usize = 200;
pub(crate) const CORRIDOR_MAX_ITERATIONS: usize = 100;
/// Face traces longer than this many sides indicate a broken rotation system.
pub(crate) const FACE_TRACE_MAX_STEPS: usize = 100_000;

/// Depth reported for tree nodes that are not reachable from the chosen root.
pub const UNSET_DEPTH: u32 = 1000;
