use log::{debug, error, trace};

use super::Session;
use crate::model::Model;

impl<M: Model> Session<M> {
    /// Drain the output queue, one whole frame per write.
    ///
    /// The sink lock is held for the duration of each write so no other path
    /// can interleave bytes. A failed write ends the session.
    pub(super) async fn writer_loop(self) {
        loop {
            let frame = tokio::select! {
                biased;

                _ = self.inner.shutdown.cancelled() => break,
                frame = self.inner.queue.pop() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
            };

            let sent = {
                let mut sink = self.inner.sink.lock().await;
                let Some(sink) = sink.as_mut() else {
                    break;
                };
                tokio::select! {
                    biased;

                    _ = self.inner.shutdown.cancelled() => break,
                    sent = sink.send(&frame) => sent,
                }
            };

            match sent {
                Ok(()) => debug!("session {}: wrote {} bytes", self.inner.id, frame.len()),
                Err(err) => {
                    error!("session {}: write failed: {err}", self.inner.id);
                    self.shutdown().await;
                    break;
                }
            }
        }
        trace!("session {}: writer loop exited", self.inner.id);
    }
}
