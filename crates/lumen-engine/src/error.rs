//! Error taxonomy.
//!
//! - `SetupError`: a creation step failed before the loop started. Fatal.
//! - `FrameError`: a fallible step inside a frame failed. Ends the loop cleanly.
//! - `BackendError`: what a binding reports; wrapped into one of the above.
//! - `SceneError`: invalid scene graph edits.
//!
//! A streaming source reporting "nothing processed" is not an error and never
//! shows up here.

use thiserror::Error;

use crate::pipeline::Stage;
use crate::scene::NodeId;

/// Failure reported by a backend binding (scene, render, UI or window/device).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to create {what}: {reason}")]
    Creation { what: &'static str, reason: String },

    #[error("update rejected: {0}")]
    Update(String),

    #[error("device error: {0}")]
    Device(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Fatal failure of a single frame.
///
/// The presentation loop stops on the first one; the remainder of the frame is
/// never executed and nothing past the failing stage is presented.
#[derive(Debug, Error)]
pub enum FrameError {
    /// A boolean step (begin, present, device check) reported failure.
    #[error("{stage} reported failure")]
    Rejected { stage: Stage },

    #[error("{stage} failed: {source}")]
    Failed {
        stage: Stage,
        #[source]
        source: BackendError,
    },
}

impl FrameError {
    /// Stage at which the frame was aborted.
    pub fn stage(&self) -> Stage {
        match self {
            FrameError::Rejected { stage } | FrameError::Failed { stage, .. } => *stage,
        }
    }

    /// Adapter for `map_err` at a given stage.
    pub(crate) fn at(stage: Stage) -> impl FnOnce(BackendError) -> FrameError {
        move |source| FrameError::Failed { stage, source }
    }
}

/// Fatal startup failure. No partial run begins.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to create {what}")]
    Backend {
        what: &'static str,
        #[source]
        source: BackendError,
    },

    #[error("failed to spawn streaming thread")]
    Spawn(#[source] std::io::Error),
}

/// Invalid scene graph operation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("reparenting {child:?} under {parent:?} would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },
}
