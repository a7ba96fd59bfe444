#![forbid(unsafe_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FrameStageError>;

/// Failure reported by an environment while mutating the node tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("reference node is not a child of the target parent")]
    NotAChild,

    #[error("insertion would make a node its own ancestor")]
    HierarchyRequest,

    #[error("node handle is unknown to this document")]
    UnknownNode,

    #[error("host rejected DOM operation: {message}")]
    Host { message: String },
}

impl DomError {
    #[must_use]
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }
}

/// Controller lifecycle and construction failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameStageError {
    #[error("frame has no parent element")]
    NoParent,

    #[error("document has no body to host the overlay")]
    NoBody,

    #[error("controller {id} is already attached")]
    AlreadyAttached { id: String },

    #[error("controller {id} is not attached")]
    NotAttached { id: String },

    #[error("DOM error: {0}")]
    Dom(#[from] DomError),
}
