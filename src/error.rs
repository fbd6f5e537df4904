//! Error types for the planner.

use std::path::PathBuf;
use thiserror::Error;

use crate::rrt::NodeId;

/// Planner error type.
///
/// Only input problems surface here. A blocked extension, an infeasible maneuver or a budget
/// that runs out before the goal is reached are ordinary planning outcomes, not errors.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {path} at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Missing {what} record in {path}")]
    MissingRecord { path: PathBuf, what: &'static str },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("JSON error: {0}")]
    Json(#[from] json::Error),

    #[error("Node {0} is not present in the graph")]
    NodeNotFound(NodeId),
}

impl PlannerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlannerError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        PlannerError::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
