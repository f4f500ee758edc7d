//! Pull-Driven Emitter
//!
//! [`FrameStream`] is the scheduling core. It is a [`Stream`] of frames and
//! every `poll_next` is a pull from the consumer:
//!
//! ```text
//!            pull                      tick elapsed + pull
//!   Idle ──────────▶ render ──▶ AwaitingTick ─────────────▶ render ──▶ ...
//!                      │                                      │
//!                      └── drained (closed, nothing pending) ─┴──▶ Closed
//! ```
//!
//! - The first pull renders immediately.
//! - After a frame the tick timer is armed for one spinner interval. A pull
//!   that arrives earlier waits for it; one that arrives later (the consumer
//!   was busy) renders at once.
//! - A consumer that stops pulling leaves the stream suspended. Nothing is
//!   rendered or queued in the meantime, so at most one frame is ever in
//!   flight.
//! - The frame whose snapshot shows the registry drained is the last one.
//! - A subscription fault ends the stream with an error instead of a frame.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use futures::stream::{FusedStream, Stream, StreamExt};
use tokio::time::{sleep_until, Instant, Sleep};

use crate::error::ReporterError;
use crate::registry::TaskRegistry;
use crate::render::{Frame, FrameRenderer};
use crate::spinner::Spinner;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EmitterState {
    /// Nothing rendered yet; the next pull renders at once
    Idle,
    /// A frame was emitted; the next one is due when the tick elapses
    AwaitingTick,
    /// End of stream
    Closed,
}

/// Stream of rendered frames for one reporting session
///
/// Obtained from [`Reporter::frames`](crate::Reporter::frames).
pub struct FrameStream {
    registry: Arc<TaskRegistry>,
    renderer: FrameRenderer,
    spinner: Spinner,
    state: EmitterState,
    /// Created on first use so the stream can be built outside a runtime
    tick: Option<Pin<Box<Sleep>>>,
    prev_line_count: usize,
    frames_emitted: u64,
}

impl FrameStream {
    pub(crate) fn new(
        registry: Arc<TaskRegistry>,
        renderer: FrameRenderer,
        spinner: Spinner,
    ) -> Self {
        Self {
            registry,
            renderer,
            spinner,
            state: EmitterState::Idle,
            tick: None,
            prev_line_count: 0,
            frames_emitted: 0,
        }
    }

    /// Pull the next frame
    ///
    /// Returns `None` once the session has drained or failed.
    pub async fn read(&mut self) -> Option<Result<Frame, ReporterError>> {
        self.next().await
    }

    /// Number of frames yielded so far
    #[must_use]
    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    fn emit(&mut self) -> Frame {
        let snapshot = self.registry.snapshot();
        let frame = self
            .renderer
            .render(&snapshot, self.spinner.next(), self.prev_line_count);

        self.prev_line_count = frame.line_count;
        self.frames_emitted += 1;

        tracing::trace!(
            frame = self.frames_emitted,
            settled = snapshot.settled.len(),
            pending = snapshot.pending.len(),
            lines = frame.line_count,
            "Rendered frame"
        );

        if snapshot.is_drained() {
            tracing::debug!(frames = self.frames_emitted, "All tasks settled, ending stream");
            self.state = EmitterState::Closed;
        } else {
            let deadline = Instant::now() + self.spinner.interval();
            match self.tick.as_mut() {
                Some(tick) => tick.as_mut().reset(deadline),
                None => self.tick = Some(Box::pin(sleep_until(deadline))),
            }
            self.state = EmitterState::AwaitingTick;
        }

        frame
    }
}

impl Stream for FrameStream {
    type Item = Result<Frame, ReporterError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        if this.state == EmitterState::Closed {
            return Poll::Ready(None);
        }

        if let Some(fault) = this.registry.take_fault() {
            this.state = EmitterState::Closed;
            return Poll::Ready(Some(Err(fault.into())));
        }

        if this.state == EmitterState::AwaitingTick {
            if let Some(tick) = this.tick.as_mut() {
                ready!(tick.as_mut().poll(cx));
            }

            // A fault may have landed while we waited
            if let Some(fault) = this.registry.take_fault() {
                this.state = EmitterState::Closed;
                return Poll::Ready(Some(Err(fault.into())));
            }
        }

        Poll::Ready(Some(Ok(this.emit())))
    }
}

impl FusedStream for FrameStream {
    fn is_terminated(&self) -> bool {
        self.state == EmitterState::Closed
    }
}

impl std::fmt::Debug for FrameStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStream")
            .field("state", &self.state)
            .field("prev_line_count", &self.prev_line_count)
            .field("frames_emitted", &self.frames_emitted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio_test::{assert_pending, assert_ready};

    use super::*;
    use crate::error::SubscriptionFault;
    use crate::term::{PlainDecorator, Symbols};

    const TICK: Duration = Duration::from_millis(50);

    fn stream_for(registry: &Arc<TaskRegistry>) -> FrameStream {
        FrameStream::new(
            Arc::clone(registry),
            FrameRenderer::new(Arc::new(PlainDecorator), Symbols::UNICODE),
            Spinner::custom(["a", "b", "c"], Some(TICK)).unwrap(),
        )
    }

    fn text(item: Option<Result<Frame, ReporterError>>) -> String {
        item.expect("stream ended").expect("stream failed").text
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_pull_renders_immediately() {
        let registry = Arc::new(TaskRegistry::new());
        let task = registry.register("A").unwrap();
        let mut stream = tokio_test::task::spawn(stream_for(&registry));

        let first = assert_ready!(stream.poll_next());
        assert_eq!(text(first), " b A\n");

        task.succeed().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_frame_waits_for_tick() {
        let registry = Arc::new(TaskRegistry::new());
        let task = registry.register("A").unwrap();
        let mut stream = tokio_test::task::spawn(stream_for(&registry));

        assert_ready!(stream.poll_next());
        assert_pending!(stream.poll_next());

        tokio::time::advance(TICK / 2).await;
        assert_pending!(stream.poll_next());

        tokio::time::advance(TICK / 2).await;
        let second = assert_ready!(stream.poll_next());
        assert_eq!(text(second), " c A\n");

        task.succeed().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_suspended_consumer_gets_one_frame() {
        let registry = Arc::new(TaskRegistry::new());
        let task = registry.register("A").unwrap();
        let mut stream = tokio_test::task::spawn(stream_for(&registry));

        assert_ready!(stream.poll_next());

        // Consumer stalls for many ticks; nothing piles up
        tokio::time::advance(TICK * 10).await;
        assert_ready!(stream.poll_next());
        assert_pending!(stream.poll_next());
        assert_eq!(stream.frames_emitted(), 2);

        task.succeed().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_drained_frame_is_last() {
        let registry = Arc::new(TaskRegistry::new());
        let task = registry.register("A").unwrap();
        let mut stream = tokio_test::task::spawn(stream_for(&registry));

        assert_ready!(stream.poll_next());
        task.fail("nope").unwrap();
        registry.close();

        tokio::time::advance(TICK).await;
        let last = assert_ready!(stream.poll_next());
        assert_eq!(text(last), " ✖ A - nope\n");
        assert!(stream.is_terminated());
        assert!(assert_ready!(stream.poll_next()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fault_ends_stream_without_frame() {
        let registry = Arc::new(TaskRegistry::new());
        let mut stream = tokio_test::task::spawn(stream_for(&registry));

        drop(registry.register("A").unwrap());

        let item = assert_ready!(stream.poll_next());
        assert!(matches!(
            item,
            Some(Err(ReporterError::SubscriptionFault(SubscriptionFault::Abandoned { .. })))
        ));
        assert!(assert_ready!(stream.poll_next()).is_none());
        assert_eq!(stream.frames_emitted(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_erase_tracks_previous_frame() {
        let registry = Arc::new(TaskRegistry::new());
        let a = registry.register("A").unwrap();
        let b = registry.register("B").unwrap();
        let mut stream = stream_for(&registry);

        let first = stream.read().await.unwrap().unwrap();
        assert_eq!(first.erase, "");
        assert_eq!(first.line_count, 2);

        a.succeed().unwrap();
        let second = stream.read().await.unwrap().unwrap();
        assert_eq!(second.erase, crate::term::erase_lines(2));
        assert_eq!(second.text, " ✔ A\n\n c B\n");
        assert_eq!(second.line_count, 3);

        b.succeed().unwrap();
    }
}
