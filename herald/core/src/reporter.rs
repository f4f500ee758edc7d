//! Reporting Session
//!
//! [`Reporter`] ties the pieces together: callers register tasks on it, and a
//! single [`FrameStream`] (or [`Reporter::pipe`]) turns the registry into
//! redrawn terminal output.
//!
//! ```ignore
//! let reporter = Reporter::default();
//! reporter.add("Query database", query())?;
//! reporter.add("Download S3 file", download())?;
//! reporter.close();
//! reporter.pipe(tokio::io::stderr()).await?;
//! ```

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{FutureExt, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::task::{JoinError, JoinHandle};

use crate::config::{ConfigError, ReporterConfig};
use crate::emitter::FrameStream;
use crate::error::{ReporterError, Result, SubscriptionFault};
use crate::registry::{Outcome, RegistrySnapshot, Settler, TaskId, TaskRegistry};
use crate::render::FrameRenderer;
use crate::spinner::Spinner;
use crate::term::{AnsiDecorator, Decorator, PlainDecorator, Symbols};

/// Handle to a reporting session
///
/// Cheap to clone; all clones share one registry.
#[derive(Clone)]
pub struct Reporter {
    inner: Arc<ReporterInner>,
}

struct ReporterInner {
    registry: Arc<TaskRegistry>,
    renderer: FrameRenderer,
    spinner: Spinner,
    attached: AtomicBool,
}

impl Reporter {
    /// Create a session from resolved options
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for an invalid spinner setup.
    pub fn new(config: &ReporterConfig) -> std::result::Result<Self, ConfigError> {
        let spinner = config.spinner()?;
        let decorator: Arc<dyn Decorator> = if config.color {
            Arc::new(AnsiDecorator)
        } else {
            Arc::new(PlainDecorator)
        };

        Ok(Self::with_parts(
            spinner,
            FrameRenderer::new(decorator, Symbols::default()),
        ))
    }

    /// Create a session from an explicit spinner and renderer
    #[must_use]
    pub fn with_parts(spinner: Spinner, renderer: FrameRenderer) -> Self {
        Self {
            inner: Arc::new(ReporterInner {
                registry: Arc::new(TaskRegistry::new()),
                renderer,
                spinner,
                attached: AtomicBool::new(false),
            }),
        }
    }

    /// Register a task whose outcome is reported by hand
    ///
    /// # Errors
    ///
    /// Returns [`ReporterError::AlreadyClosed`] after [`close`](Self::close).
    pub fn register(&self, name: impl Into<String>) -> Result<Settler> {
        self.inner.registry.register(name)
    }

    /// Register a task backed by `outcome`
    ///
    /// The future is spawned on the current tokio runtime; its result settles
    /// the task (`Err` values are displayed with their `Display` text). The
    /// returned handle resolves to the future's own output.
    ///
    /// # Errors
    ///
    /// Returns [`ReporterError::AlreadyClosed`] after [`close`](Self::close).
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn add<F, T, E>(&self, name: impl Into<String>, outcome: F) -> Result<TaskHandle<T, E>>
    where
        F: Future<Output = std::result::Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let settler = self.register(name)?;
        let id = settler.id();

        let join = tokio::spawn(async move {
            match AssertUnwindSafe(outcome).catch_unwind().await {
                Ok(result) => {
                    let settled = match &result {
                        Ok(_) => Outcome::Success,
                        Err(e) => Outcome::Failure(e.to_string()),
                    };
                    // A failed settlement is recorded as a session fault
                    let _ = settler.settle(settled);
                    result
                }
                Err(payload) => {
                    let fault = SubscriptionFault::Panicked {
                        name: settler.name().to_string(),
                        message: panic_message(payload.as_ref()),
                    };
                    settler.fault(fault);
                    std::panic::resume_unwind(payload)
                }
            }
        });

        Ok(TaskHandle { id, join })
    }

    /// Stop accepting tasks; the stream ends once pending tasks settle
    ///
    /// Returns `false` if the session was already closed.
    pub fn close(&self) -> bool {
        self.inner.registry.close()
    }

    /// Whether [`close`](Self::close) has been called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.registry.is_closed()
    }

    /// Point-in-time view of all tasks
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.inner.registry.snapshot()
    }

    /// Take the session's frame stream
    ///
    /// # Errors
    ///
    /// Returns [`ReporterError::StreamAttached`] if a stream was already taken.
    pub fn frames(&self) -> Result<FrameStream> {
        if self.inner.attached.swap(true, Ordering::SeqCst) {
            return Err(ReporterError::StreamAttached);
        }

        tracing::debug!(
            interval_ms = self.inner.spinner.interval().as_millis() as u64,
            "Frame stream attached"
        );

        Ok(FrameStream::new(
            Arc::clone(&self.inner.registry),
            self.inner.renderer.clone(),
            self.inner.spinner.clone(),
        ))
    }

    /// Write every frame to `writer` until the session ends
    ///
    /// Each frame is fully written and flushed before the next one is pulled,
    /// so a slow writer slows the animation instead of queueing frames.
    ///
    /// # Errors
    ///
    /// Returns the session's subscription fault, a write failure, or
    /// [`ReporterError::StreamAttached`].
    pub async fn pipe<W>(&self, mut writer: W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let mut frames = self.frames()?;

        while let Some(frame) = frames.next().await {
            let frame = frame?;
            writer.write_all(&frame.to_bytes()).await?;
            writer.flush().await?;
        }

        tracing::debug!(frames = frames.frames_emitted(), "Output finished");
        Ok(())
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::with_parts(Spinner::default(), FrameRenderer::default())
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("registry", &self.inner.registry)
            .field("spinner", &self.inner.spinner)
            .field("attached", &self.inner.attached.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Handle to a task registered with [`Reporter::add`]
///
/// Resolves to the outcome future's own result. A panic inside the outcome
/// surfaces here as a [`JoinError`] (and as a fault on the frame stream).
#[derive(Debug)]
pub struct TaskHandle<T, E> {
    id: TaskId,
    join: JoinHandle<std::result::Result<T, E>>,
}

impl<T, E> TaskHandle<T, E> {
    /// Registry id of the task
    #[must_use]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Whether the outcome has settled
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl<T, E> Future for TaskHandle<T, E> {
    type Output = std::result::Result<std::result::Result<T, E>, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.join).poll(cx)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
