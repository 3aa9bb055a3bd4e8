//! Non-blocking Results
//!
//! A `Publisher` is a lazy handle over a fragment stream. Subscribing with
//! value, error and completion callbacks starts the work on the client's
//! runtime and hands back a `Subscription` the caller can join.

use crate::error::{Result, SampleError};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, warn};

/// What a subscriber observes: values, then exactly one terminal signal
#[derive(Debug)]
pub enum Signal<T> {
    Next(T),
    Error(SampleError),
    Complete,
}

pin_project! {
    /// Adapts a fallible stream into a `Signal` stream.
    ///
    /// Emits `Complete` when the inner stream ends and stops after the
    /// first error, so exactly one terminal signal is produced.
    pub struct Signals<S> {
        #[pin]
        inner: S,
        terminated: bool,
    }
}

impl<S> Signals<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            terminated: false,
        }
    }
}

impl<S, T> Stream for Signals<S>
where
    S: Stream<Item = Result<T>>,
{
    type Item = Signal<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        if *this.terminated {
            return Poll::Ready(None);
        }

        let signal = match ready!(this.inner.poll_next(cx)) {
            Some(Ok(value)) => Signal::Next(value),
            Some(Err(e)) => {
                *this.terminated = true;
                Signal::Error(e)
            }
            None => {
                *this.terminated = true;
                Signal::Complete
            }
        };
        Poll::Ready(Some(signal))
    }
}

/// Lazy, subscribable result of a non-blocking call
pub struct Publisher<T> {
    source: BoxStream<'static, Result<T>>,
    executor: Handle,
}

impl<T: Send + 'static> Publisher<T> {
    /// A publisher over many values
    pub fn from_stream<S>(executor: Handle, source: S) -> Self
    where
        S: Stream<Item = Result<T>> + Send + 'static,
    {
        Self {
            source: source.boxed(),
            executor,
        }
    }

    /// A publisher over one value
    pub fn from_future<F>(executor: Handle, future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        Self::from_stream(executor, stream::once(future))
    }

    /// The tagged signal stream, for callers that prefer a receive loop
    pub fn into_signals(self) -> Signals<BoxStream<'static, Result<T>>> {
        Signals::new(self.source)
    }

    /// Register the three callbacks and start the work.
    ///
    /// Returns immediately. `on_next` sees values in delivery order; then
    /// either `on_error` or `on_complete` runs, once. No callback starts
    /// after the subscription is cancelled.
    pub fn subscribe<N, E, C>(self, mut on_next: N, on_error: E, on_complete: C) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnOnce(SampleError) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        let executor = self.executor.clone();
        let mut signals = self.into_signals();
        let cancelled = Arc::new(AtomicBool::new(false));
        let stop = cancelled.clone();

        let task = executor.spawn(async move {
            while let Some(signal) = signals.next().await {
                if stop.load(Ordering::Acquire) {
                    return;
                }
                match signal {
                    Signal::Next(value) => on_next(value),
                    Signal::Error(e) => return on_error(e),
                    Signal::Complete => return on_complete(),
                }
            }
        });

        Subscription {
            task,
            executor,
            cancelled,
        }
    }
}

/// Handle on started non-blocking work
pub struct Subscription {
    task: JoinHandle<()>,
    executor: Handle,
    cancelled: Arc<AtomicBool>,
}

impl Subscription {
    /// Whether the callbacks have all run
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Block until the work finishes or `timeout` elapses.
    ///
    /// Returns `true` if the work terminated normally. On timeout the work
    /// is cancelled, and a callback already running is allowed to finish
    /// before this returns, so nothing prints into whatever runs next. Must
    /// not be called from inside an async context.
    pub fn wait(self, timeout: Duration) -> bool {
        let Subscription {
            mut task,
            executor,
            cancelled,
        } = self;

        match executor.block_on(async { tokio::time::timeout(timeout, &mut task).await }) {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                error!(error = %e, "Subscriber task failed");
                false
            }
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Subscription did not finish in time, cancelling");
                cancelled.store(true, Ordering::Release);
                task.abort();
                // Resolves once an in-flight callback has returned
                let _ = executor.block_on(task);
                false
            }
        }
    }

    /// Stop the work without waiting. A callback already running finishes;
    /// none start afterwards.
    pub fn cancel(self) {
        self.cancelled.store(true, Ordering::Release);
        self.task.abort();
    }
}
