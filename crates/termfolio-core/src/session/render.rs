use std::time::Duration;

use log::{debug, error, trace};
use tokio::time::{Instant, MissedTickBehavior};

use super::Session;
use crate::frame::{render_model, OutputFrame};
use crate::model::Model;
use crate::queue::Enqueued;

impl<M: Model> Session<M> {
    /// Render the current view and enqueue it for the writer loop.
    ///
    /// The program lock is held only while the view is drawn; the enqueue,
    /// which may wait for a free slot, happens after it is released. Empty
    /// renders are skipped.
    pub async fn force_render(&self) {
        if self.is_terminated() {
            return;
        }
        let Some(frame) = self.render_frame() else {
            return;
        };
        let bytes = frame.len();
        match self.inner.queue.push(frame).await {
            Enqueued::Queued => trace!("session {}: queued {bytes} bytes", self.inner.id),
            Enqueued::Evicted => debug!(
                "session {}: output queue full, dropped oldest frame",
                self.inner.id
            ),
            Enqueued::Closed => {}
        }
    }

    fn render_frame(&self) -> Option<OutputFrame> {
        let rendered = {
            let state = self.state();
            let program = state.program.as_ref()?;
            render_model(program, state.geometry)
        };
        let text = match rendered {
            Ok(text) => text,
            Err(err) => {
                error!("session {}: render failed: {err}", self.inner.id);
                return None;
            }
        };
        if text.is_empty() {
            return None;
        }
        match OutputFrame::repaint(&text) {
            Ok(frame) => Some(frame),
            Err(err) => {
                error!("session {}: render failed: {err}", self.inner.id);
                None
            }
        }
    }

    /// Schedule a forced render after `delay` unless the session ends first.
    pub(super) fn render_after(&self, delay: Duration) {
        let session = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = session.inner.shutdown.cancelled() => {}
                _ = tokio::time::sleep(delay) => session.force_render().await,
            }
        });
    }

    /// Heartbeat repaint on a fixed interval until termination.
    pub(super) async fn render_loop(self) {
        let period = self.inner.options.render_interval;
        let mut ticks = tokio::time::interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                biased;

                _ = self.inner.shutdown.cancelled() => break,
                _ = ticks.tick() => self.force_render().await,
            }
        }
        trace!("session {}: render loop exited", self.inner.id);
    }
}
