//! Error type shared by every pipeline phase.
//!
//! Nothing here is retried: a geometric contradiction in one phase invalidates
//! all downstream state, so each variant carries the ids and values needed to
//! diagnose the input instead.

use std::fmt;

use crate::creases::GraphState;

/// Coarse classification of [`PatternError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Graph API contract violation (duplicate id, parallel edge, ...).
    Structural,
    /// A phase function was invoked against the wrong graph state.
    StateOrder,
    /// The tree and packing cannot be realized as given.
    GeometricInfeasibility,
    /// Twisted or otherwise non-realizable input detected mid-pipeline.
    ConsistencyViolation,
    /// An iteration cap was exceeded.
    Divergence,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PatternError {
    DuplicateNode(String),
    UnknownNode(String),
    UnknownEdge(String),
    UnknownSample(String),
    SelfLoop { node: String },
    NodeHasEdges { node: String, degree: usize },
    ParallelEdge { node: String, from: String, to: String },
    EdgeExists { from: String, to: String },
    EdgeNotIncident { node: String },
    MissingEdge { from: String, to: String },
    StateOrder {
        op: &'static str,
        expected: GraphState,
        found: GraphState,
    },
    Infeasible(String),
    Inconsistent(String),
    Diverged { during: &'static str },
}

impl PatternError {
    pub fn infeasible(msg: impl Into<String>) -> Self {
        PatternError::Infeasible(msg.into())
    }

    pub fn inconsistent(msg: impl Into<String>) -> Self {
        PatternError::Inconsistent(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PatternError::DuplicateNode(_)
            | PatternError::UnknownNode(_)
            | PatternError::UnknownEdge(_)
            | PatternError::UnknownSample(_)
            | PatternError::SelfLoop { .. }
            | PatternError::NodeHasEdges { .. }
            | PatternError::ParallelEdge { .. }
            | PatternError::EdgeExists { .. }
            | PatternError::EdgeNotIncident { .. }
            | PatternError::MissingEdge { .. } => ErrorKind::Structural,
            PatternError::StateOrder { .. } => ErrorKind::StateOrder,
            PatternError::Infeasible(_) => ErrorKind::GeometricInfeasibility,
            PatternError::Inconsistent(_) => ErrorKind::ConsistencyViolation,
            PatternError::Diverged { .. } => ErrorKind::Divergence,
        }
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::DuplicateNode(id) => write!(f, "node {id} already exists"),
            PatternError::UnknownNode(id) => write!(f, "unknown node {id}"),
            PatternError::UnknownEdge(id) => write!(f, "unknown edge {id}"),
            PatternError::UnknownSample(name) => write!(f, "unknown sample design {name}"),
            PatternError::SelfLoop { node } => write!(f, "self-loop at node {node}"),
            PatternError::NodeHasEdges { node, degree } => {
                write!(f, "cannot remove node {node} with {degree} incident edges")
            }
            PatternError::ParallelEdge { node, from, to } => write!(
                f,
                "edge {from}-{to} is parallel to an existing edge at node {node}"
            ),
            PatternError::EdgeExists { from, to } => {
                write!(f, "an edge already joins {from} and {to}")
            }
            PatternError::EdgeNotIncident { node } => {
                write!(f, "edge list of node {node} does not contain the edge")
            }
            PatternError::MissingEdge { from, to } => write!(f, "no edge joins {from} and {to}"),
            PatternError::StateOrder {
                op,
                expected,
                found,
            } => write!(f, "{op} requires state {expected:?}, found {found:?}"),
            PatternError::Infeasible(msg) => write!(f, "geometrically infeasible: {msg}"),
            PatternError::Inconsistent(msg) => write!(f, "inconsistent pattern: {msg}"),
            PatternError::Diverged { during } => {
                write!(f, "caught in infinite loop while {during}")
            }
        }
    }
}

impl std::error::Error for PatternError {}

pub type Result<T> = std::result::Result<T, PatternError>;
