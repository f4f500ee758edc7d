//! Task Registry
//!
//! Owns the two ordered task collections a reporting session renders:
//!
//! ```text
//!   register("A")  register("B")          B settles        A settles
//!   pending: [A]   pending: [A, B]   ->   pending: [A]  -> pending: []
//!   settled: []    settled: []            settled: [B]     settled: [B, A]
//! ```
//!
//! Pending keeps registration order, settled keeps settlement order. A task is
//! moved between the two in a single write-locked step, so a snapshot never
//! sees it in both collections or in neither.
//!
//! # Thread Safety
//!
//! All state sits behind one `parking_lot::RwLock`. Settlement notifications
//! arrive from arbitrary tokio tasks; the emitter takes read-locked snapshots.
//! The lock is task-fair, so a steady stream of snapshots can't starve a
//! settlement and vice versa.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ReporterError, Result, SubscriptionFault};

/// Registry-assigned task identifier
///
/// Names are caller-supplied and may repeat; ids never do within a registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Get the raw numeric value
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

/// Display status of a task
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// Outcome not yet known
    Pending,
    /// Outcome resolved successfully
    Succeeded,
    /// Outcome rejected
    Failed {
        /// Human-readable failure reason
        reason: String,
    },
}

impl TaskStatus {
    /// Whether this status can no longer change
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// How a task's outcome settled
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Resolved
    Success,
    /// Rejected with a reason
    Failure(String),
}

impl Outcome {
    fn into_status(self) -> TaskStatus {
        match self {
            Self::Success => TaskStatus::Succeeded,
            Self::Failure(reason) => TaskStatus::Failed { reason },
        }
    }
}

/// A registered task
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    /// Unique id within the registry
    pub id: TaskId,
    /// Display name
    pub name: String,
    /// Current status
    pub status: TaskStatus,
}

/// Point-in-time view of the registry
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    /// Settled tasks in settlement order
    pub settled: Vec<Task>,
    /// Pending tasks in registration order
    pub pending: Vec<Task>,
    /// Whether `close()` has been called
    pub closed: bool,
}

impl RegistrySnapshot {
    /// Closed and nothing left to wait for
    #[must_use]
    pub fn is_drained(&self) -> bool {
        self.closed && self.pending.is_empty()
    }

    /// Total number of registered tasks
    #[must_use]
    pub fn total(&self) -> usize {
        self.settled.len() + self.pending.len()
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    pending: Vec<Task>,
    settled: Vec<Task>,
    closed: bool,
    next_id: u64,
    /// First fault, waiting to be delivered to the frame stream
    fault: Option<SubscriptionFault>,
    /// Set once any fault has been recorded; later ones are only logged
    faulted: bool,
}

/// Shared registry of pending and settled tasks
#[derive(Debug, Default)]
pub struct TaskRegistry {
    state: RwLock<RegistryState>,
}

impl TaskRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending task
    ///
    /// Returns the one-shot [`Settler`] through which its outcome is reported.
    /// Fails with [`ReporterError::AlreadyClosed`] after [`close`](Self::close),
    /// leaving the registry untouched.
    pub fn register(self: &Arc<Self>, name: impl Into<String>) -> Result<Settler> {
        let name = name.into();
        let mut state = self.state.write();

        if state.closed {
            tracing::warn!(task = %name, "Rejected registration after close");
            return Err(ReporterError::AlreadyClosed { name });
        }

        let id = TaskId(state.next_id);
        state.next_id += 1;
        state.pending.push(Task {
            id,
            name: name.clone(),
            status: TaskStatus::Pending,
        });
        drop(state);

        tracing::debug!(task_id = %id, task = %name, "Task registered");

        Ok(Settler {
            registry: Arc::clone(self),
            id,
            name,
            done: false,
        })
    }

    /// Move a pending task to the settled collection
    ///
    /// This is the raw settlement notification. A task that is not pending
    /// (unknown id, or already settled) is a subscription fault: it is
    /// recorded for the frame stream and returned.
    pub fn settle(
        &self,
        id: TaskId,
        outcome: Outcome,
    ) -> std::result::Result<(), SubscriptionFault> {
        let mut state = self.state.write();

        let Some(index) = state.pending.iter().position(|t| t.id == id) else {
            drop(state);
            let fault = SubscriptionFault::UnknownTask { id };
            self.record_fault(fault.clone());
            return Err(fault);
        };

        let mut task = state.pending.remove(index);
        task.status = outcome.into_status();

        match &task.status {
            TaskStatus::Failed { reason } => {
                tracing::debug!(task_id = %id, task = %task.name, reason = %reason, "Task failed");
            }
            _ => tracing::debug!(task_id = %id, task = %task.name, "Task succeeded"),
        }

        state.settled.push(task);
        Ok(())
    }

    /// Stop accepting registrations
    ///
    /// Returns `true` if this call closed the registry; repeated calls are a
    /// harmless no-op returning `false`.
    pub fn close(&self) -> bool {
        let mut state = self.state.write();
        if state.closed {
            tracing::debug!("Registry already closed");
            return false;
        }

        state.closed = true;
        tracing::info!(
            pending = state.pending.len(),
            settled = state.settled.len(),
            "Registry closed to new tasks"
        );
        true
    }

    /// Whether `close()` has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    /// Consistent point-in-time copy of both collections
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.read();
        RegistrySnapshot {
            settled: state.settled.clone(),
            pending: state.pending.clone(),
            closed: state.closed,
        }
    }

    /// Number of tasks still pending
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.read().pending.len()
    }

    /// Number of settled tasks
    #[must_use]
    pub fn settled_count(&self) -> usize {
        self.state.read().settled.len()
    }

    /// Take the undelivered fault, if any
    pub(crate) fn take_fault(&self) -> Option<SubscriptionFault> {
        self.state.write().fault.take()
    }

    pub(crate) fn record_fault(&self, fault: SubscriptionFault) {
        let mut state = self.state.write();
        if state.faulted {
            tracing::warn!(fault = %fault, "Additional subscription fault after session failure");
            return;
        }

        tracing::error!(fault = %fault, "Subscription fault");
        state.faulted = true;
        state.fault = Some(fault);
    }
}

/// One-shot settlement capability for a registered task
///
/// Consumed by settling, so a task can't be settled twice through it.
/// Dropping a `Settler` without settling records
/// [`SubscriptionFault::Abandoned`].
#[derive(Debug)]
#[must_use = "a task that is never settled keeps the reporter open"]
pub struct Settler {
    registry: Arc<TaskRegistry>,
    id: TaskId,
    name: String,
    done: bool,
}

impl Settler {
    /// Id of the task this settler reports for
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Name of the task this settler reports for
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Report the outcome
    pub fn settle(mut self, outcome: Outcome) -> std::result::Result<(), SubscriptionFault> {
        self.done = true;
        self.registry.settle(self.id, outcome)
    }

    /// Report success
    pub fn succeed(self) -> std::result::Result<(), SubscriptionFault> {
        self.settle(Outcome::Success)
    }

    /// Report failure with a human-readable reason
    pub fn fail(self, reason: impl Into<String>) -> std::result::Result<(), SubscriptionFault> {
        self.settle(Outcome::Failure(reason.into()))
    }

    /// Give up on the task and report why the subscription broke
    pub(crate) fn fault(mut self, fault: SubscriptionFault) {
        self.done = true;
        self.registry.record_fault(fault);
    }
}

impl Drop for Settler {
    fn drop(&mut self) {
        if !self.done {
            self.registry.record_fault(SubscriptionFault::Abandoned {
                name: std::mem::take(&mut self.name),
            });
        }
    }
}
