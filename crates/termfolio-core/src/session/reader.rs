use log::{debug, error, info, trace};

use super::{Session, SessionError};
use crate::control::{classify, Classified, ControlMessage};
use crate::decoder::decode;
use crate::model::Model;
use crate::transport::{FrameSource, Inbound};

impl<M: Model> Session<M> {
    /// The reader loop: receive frames until the peer goes away or the
    /// session terminates, then shut the session down.
    ///
    /// Each receive is bounded by the read deadline so an idle connection
    /// still notices termination. An elapsed deadline is not an error.
    pub async fn run<S: FrameSource>(&self, mut source: S) -> Result<(), SessionError> {
        let started = self.state().started;
        if !started {
            return Err(SessionError::NotStarted);
        }
        let deadline = self.inner.options.read_deadline;
        let result = loop {
            let received = tokio::select! {
                biased;

                _ = self.inner.shutdown.cancelled() => break Ok(()),
                received = tokio::time::timeout(deadline, source.recv()) => received,
            };
            match received {
                Err(_elapsed) => trace!("session {}: read deadline elapsed", self.inner.id),
                Ok(Ok(Some(frame))) => self.dispatch_frame(&frame).await,
                Ok(Ok(None)) => {
                    info!("session {}: peer closed the connection", self.inner.id);
                    break Ok(());
                }
                Ok(Err(err)) => {
                    error!("session {}: read failed: {err}", self.inner.id);
                    break Err(SessionError::Transport(err));
                }
            }
        };
        self.shutdown().await;
        result
    }

    async fn dispatch_frame(&self, frame: &Inbound) {
        debug!("session {}: received {} bytes", self.inner.id, frame.len());
        match classify(frame) {
            Classified::Control(ControlMessage::Resize(geometry)) => {
                self.handle_resize(geometry).await
            }
            // One decode per frame: a burst of keystrokes in a single frame
            // yields only its first event.
            Classified::Raw(bytes) => self.handle_input_event(decode(bytes)).await,
        }
    }
}
