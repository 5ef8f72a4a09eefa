//! The per-connection session bridge.
//!
//! A [`Session`] owns one [`Model`] instance and the client's geometry, and
//! runs three loops for the lifetime of a connection:
//!
//! * the **reader loop** ([`Session::run`]) receives frames with a rolling
//!   deadline, classifies them and dispatches keystrokes or resizes;
//! * the **render loop** repaints on a slow heartbeat so no state change is
//!   ever left undrawn;
//! * the **writer loop** is the only code that writes to the transport. It
//!   drains the [`OutputQueue`] one whole frame at a time.
//!
//! Keystrokes and resizes additionally force an immediate render. All loops
//! watch one [`CancellationToken`] and exit promptly once it is cancelled.

mod effects;
mod reader;
mod render;
mod writer;

pub use effects::MAX_EFFECT_DEPTH;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::BoxFuture;
use log::{debug, error, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::event::{Geometry, InputEvent};
use crate::model::Model;
use crate::queue::OutputQueue;
use crate::transport::{FrameSink, FrameSource, TransportError};
use effects::{dispatch, resolve, Effects};

/// Errors surfaced by [`Session`] operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// [`Session::start`] was called twice.
    #[error("session already started")]
    AlreadyStarted,
    /// The operation requires a started session.
    #[error("session not started")]
    NotStarted,
    /// The connection failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Tuning knobs for a [`Session`].
///
/// # Example
///
/// ```rust,ignore
/// let options = SessionOptions {
///     geometry: Geometry::new(120, 40),
///     ..SessionOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Heartbeat repaint period (default: 500 ms).
    pub render_interval: Duration,
    /// Delay before the first repaint after [`Session::start`] (default: 50 ms).
    pub settle_delay: Duration,
    /// Delay of the second repaint after each keystroke (default: 50 ms).
    pub follow_up_delay: Duration,
    /// How long a single receive may block before the reader loop re-checks
    /// termination (default: 5 s).
    pub read_deadline: Duration,
    /// Output queue capacity in frames (default: 256).
    pub queue_capacity: usize,
    /// How long a render waits for a free queue slot (default: 100 ms).
    pub enqueue_wait: Duration,
    /// Geometry assumed until the client reports one (default: 80x24).
    pub geometry: Geometry,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            render_interval: Duration::from_millis(500),
            settle_delay: Duration::from_millis(50),
            follow_up_delay: Duration::from_millis(50),
            read_deadline: Duration::from_secs(5),
            queue_capacity: 256,
            enqueue_wait: Duration::from_millis(100),
            geometry: Geometry::FALLBACK,
        }
    }
}

/// A cloneable handle to one connection's session.
///
/// # Example
///
/// ```rust,ignore
/// let session = Session::<Portfolio>::new(flags, SessionOptions::default());
/// session.serve(source, sink).await?;
/// ```
pub struct Session<M: Model> {
    inner: Arc<Inner<M>>,
}

impl<M: Model> Clone for Session<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<M: Model> {
    id: Uuid,
    flags: M::Flags,
    options: SessionOptions,
    state: Mutex<State<M>>,
    queue: OutputQueue,
    shutdown: CancellationToken,
    sink: tokio::sync::Mutex<Option<Box<dyn FrameSink>>>,
    loops: Mutex<Vec<JoinHandle<()>>>,
}

struct State<M> {
    program: Option<M>,
    geometry: Geometry,
    started: bool,
}

impl<M: Model> Session<M> {
    /// Create an idle session. Nothing runs until [`start`](Session::start).
    pub fn new(flags: M::Flags, options: SessionOptions) -> Self {
        Self::with_shutdown(flags, options, CancellationToken::new())
    }

    /// Like [`new`](Session::new), but the session also ends when `shutdown`
    /// is cancelled. Pass a child of a server-wide token to stop every
    /// session at once.
    pub fn with_shutdown(
        flags: M::Flags,
        options: SessionOptions,
        shutdown: CancellationToken,
    ) -> Self {
        let queue = OutputQueue::new(options.queue_capacity, options.enqueue_wait);
        Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                flags,
                state: Mutex::new(State {
                    program: None,
                    geometry: options.geometry,
                    started: false,
                }),
                options,
                queue,
                shutdown,
                sink: tokio::sync::Mutex::new(None),
                loops: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Unique id, used as logging context.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Current client geometry.
    pub fn geometry(&self) -> Geometry {
        self.state().geometry
    }

    /// Number of frames waiting for the writer loop.
    pub fn queued_frames(&self) -> usize {
        self.inner.queue.len()
    }

    /// Capacity of the output queue.
    pub fn queue_capacity(&self) -> usize {
        self.inner.queue.capacity()
    }

    /// Whether the session has been shut down.
    pub fn is_terminated(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Run `f` against the program, if the session has started.
    pub fn inspect<R>(&self, f: impl FnOnce(&M) -> R) -> Option<R> {
        self.state().program.as_ref().map(f)
    }

    /// Create the program, spawn the render and writer loops and schedule
    /// the first repaint after the settle delay.
    pub async fn start<S: FrameSink>(&self, sink: S) -> Result<(), SessionError> {
        let (effects, geometry) = {
            let mut state = self.state();
            if state.started {
                return Err(SessionError::AlreadyStarted);
            }
            state.started = true;
            let geometry = state.geometry;
            let (mut program, cmd) = M::init(self.inner.flags.clone(), geometry);
            let mut effects = Effects::default();
            resolve(&mut program, cmd, 0, &mut effects);
            state.program = Some(program);
            (effects, geometry)
        };
        *self.inner.sink.lock().await = Some(Box::new(sink));
        info!("session {}: started at {geometry}", self.inner.id);

        let render = tokio::spawn(self.clone().render_loop());
        let writer = tokio::spawn(self.clone().writer_loop());
        self.loops().extend([render, writer]);

        self.apply(effects).await;
        self.render_after(self.inner.options.settle_delay);
        Ok(())
    }

    /// Feed one decoded keystroke to the program, then repaint immediately
    /// and once more after the follow-up delay.
    pub async fn handle_input_event(&self, event: InputEvent) {
        let effects = {
            let mut state = self.state();
            let Some(program) = state.program.as_mut() else {
                warn!(
                    "session {}: input {event:?} before start, ignored",
                    self.inner.id
                );
                return;
            };
            let mut effects = Effects::default();
            dispatch(program, M::Message::from(event), 0, &mut effects);
            effects
        };
        debug!("session {}: input {event:?}", self.inner.id);
        self.apply(effects).await;
        self.force_render().await;
        self.render_after(self.inner.options.follow_up_delay);
    }

    /// Record a new geometry, notify the program and repaint.
    pub async fn handle_resize(&self, geometry: Geometry) {
        let effects = {
            let mut state = self.state();
            let State {
                program, geometry: current, ..
            } = &mut *state;
            let Some(program) = program.as_mut() else {
                warn!(
                    "session {}: resize to {geometry} before start, ignored",
                    self.inner.id
                );
                return;
            };
            *current = geometry;
            let mut effects = Effects::default();
            let cmd = program.resize(geometry);
            resolve(program, cmd, 0, &mut effects);
            effects
        };
        debug!("session {}: resized to {geometry}", self.inner.id);
        self.apply(effects).await;
        self.force_render().await;
    }

    /// Stop every loop and close the transport. Safe to call any number of
    /// times from any task.
    pub async fn shutdown(&self) {
        if !self.inner.shutdown.is_cancelled() {
            info!("session {}: shutting down", self.inner.id);
            self.inner.shutdown.cancel();
        }
        self.inner.queue.close();
        let sink = self.inner.sink.lock().await.take();
        if let Some(mut sink) = sink {
            if let Err(err) = sink.close().await {
                debug!("session {}: close failed: {err}", self.inner.id);
            }
        }
    }

    /// Wait for the render and writer loops to exit.
    pub async fn join(&self) {
        let loops = std::mem::take(&mut *self.loops());
        for handle in loops {
            if let Err(err) = handle.await {
                if err.is_panic() {
                    error!("session {}: loop panicked: {err}", self.inner.id);
                }
            }
        }
    }

    /// Start the session, run the reader loop until the connection ends,
    /// then wait for the other loops.
    pub async fn serve<R, S>(&self, source: R, sink: S) -> Result<(), SessionError>
    where
        R: FrameSource,
        S: FrameSink,
    {
        self.start(sink).await?;
        let result = self.run(source).await;
        self.join().await;
        result
    }

    /// Spawn async effects and honor a quit request.
    async fn apply(&self, effects: Effects<M::Message>) {
        if self.spawn_effects(effects) {
            info!("session {}: program quit", self.inner.id);
            self.shutdown().await;
        }
    }

    /// Spawn every pending future; returns whether the program asked to quit.
    fn spawn_effects(&self, effects: Effects<M::Message>) -> bool {
        for (depth, fut) in effects.pending {
            let session = self.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = session.inner.shutdown.cancelled() => {}
                    msg = fut => session.follow_up(msg, depth).await,
                }
            });
        }
        effects.quit
    }

    fn follow_up(self, msg: M::Message, depth: usize) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            if depth >= MAX_EFFECT_DEPTH {
                debug!(
                    "session {}: dropping async follow-up beyond depth {MAX_EFFECT_DEPTH}",
                    self.inner.id
                );
                return;
            }
            let effects = {
                let mut state = self.state();
                let Some(program) = state.program.as_mut() else {
                    return;
                };
                let mut effects = Effects::default();
                dispatch(program, msg, depth + 1, &mut effects);
                effects
            };
            self.apply(effects).await;
            self.force_render().await;
        })
    }

    fn state(&self) -> MutexGuard<'_, State<M>> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn loops(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.inner
            .loops
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests;
