//! Error Types
//!
//! Session-level errors for the reporter. A task that fails is *not* an error
//! here: it is rendered as a failure line and the session carries on. Only
//! misuse by the caller and faults in the settlement plumbing surface as
//! [`ReporterError`].

use thiserror::Error;

use crate::registry::TaskId;

/// Errors returned by reporter operations or yielded by the frame stream
#[derive(Debug, Error)]
pub enum ReporterError {
    /// A task was registered after `close()`
    #[error("cannot register task {name:?}: reporter is already closed")]
    AlreadyClosed {
        /// Name of the rejected task
        name: String,
    },

    /// The settlement mechanism malfunctioned; the session cannot continue
    #[error("subscription fault: {0}")]
    SubscriptionFault(#[from] SubscriptionFault),

    /// A frame stream has already been taken from this reporter
    #[error("a frame stream is already attached to this reporter")]
    StreamAttached,

    /// Writing a frame to the output sink failed
    #[error("failed to write frame: {0}")]
    Io(#[from] std::io::Error),
}

impl ReporterError {
    /// Whether this error ends the reporting session
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SubscriptionFault(_) | Self::Io(_))
    }
}

/// Malfunctions of an outcome subscription, distinct from a task failing
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SubscriptionFault {
    /// A settlement arrived for a task that is not pending
    #[error("settlement for task {id} which is not pending")]
    UnknownTask {
        /// The offending task id
        id: TaskId,
    },

    /// The settlement handle was dropped before the task settled
    #[error("task {name:?} was abandoned without settling")]
    Abandoned {
        /// Name of the abandoned task
        name: String,
    },

    /// The outcome future panicked instead of resolving
    #[error("outcome of task {name:?} panicked: {message}")]
    Panicked {
        /// Name of the task whose outcome panicked
        name: String,
        /// Panic payload, when it was a string
        message: String,
    },
}

/// Convenience result type
pub type Result<T> = std::result::Result<T, ReporterError>;
