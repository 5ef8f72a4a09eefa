//! Bounded frame queue between renderers and the writer loop.
//!
//! Producers never block for longer than the configured enqueue wait. When
//! the queue is still full after that wait the oldest queued frame is evicted
//! to make room: every frame is a full repaint, so the newest one always
//! supersedes whatever it displaces.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;

use crate::frame::OutputFrame;

/// What happened to a pushed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// Stored without displacing anything.
    Queued,
    /// Stored after evicting the oldest queued frame.
    Evicted,
    /// The queue is closed; the frame was discarded.
    Closed,
}

/// A cloneable handle to a bounded FIFO of [`OutputFrame`]s.
///
/// Any number of producers may [`push`](OutputQueue::push); exactly one
/// consumer (the writer loop) should [`pop`](OutputQueue::pop).
#[derive(Clone)]
pub struct OutputQueue {
    inner: Arc<Inner>,
}

struct Inner {
    frames: Mutex<VecDeque<OutputFrame>>,
    capacity: usize,
    enqueue_wait: Duration,
    readable: Notify,
    writable: Notify,
    closed: AtomicBool,
}

impl OutputQueue {
    /// Create a queue holding at most `capacity` frames (minimum 1).
    pub fn new(capacity: usize, enqueue_wait: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Inner {
                frames: Mutex::new(VecDeque::with_capacity(capacity)),
                capacity,
                enqueue_wait,
                readable: Notify::new(),
                writable: Notify::new(),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Maximum number of retained frames.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Number of frames currently waiting.
    pub fn len(&self) -> usize {
        self.frames().len()
    }

    /// Whether no frame is waiting.
    pub fn is_empty(&self) -> bool {
        self.frames().is_empty()
    }

    /// Whether [`close`](OutputQueue::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Enqueue a frame, waiting at most the configured enqueue wait for a
    /// free slot before evicting the oldest frame.
    pub async fn push(&self, frame: OutputFrame) -> Enqueued {
        let mut frame = match self.try_push(frame) {
            Ok(outcome) => return outcome,
            Err(frame) => frame,
        };

        let deadline = tokio::time::Instant::now() + self.inner.enqueue_wait;
        while tokio::time::timeout_at(deadline, self.inner.writable.notified())
            .await
            .is_ok()
        {
            frame = match self.try_push(frame) {
                Ok(outcome) => return outcome,
                Err(frame) => frame,
            };
        }

        let mut frames = self.frames();
        if self.is_closed() {
            return Enqueued::Closed;
        }
        let outcome = if frames.len() >= self.inner.capacity {
            frames.pop_front();
            Enqueued::Evicted
        } else {
            Enqueued::Queued
        };
        frames.push_back(frame);
        drop(frames);
        self.inner.readable.notify_one();
        outcome
    }

    /// Wait for the next frame. Returns `None` once the queue is closed.
    pub async fn pop(&self) -> Option<OutputFrame> {
        loop {
            if self.is_closed() {
                return None;
            }
            if let Some(frame) = self.frames().pop_front() {
                self.inner.writable.notify_one();
                return Some(frame);
            }
            self.inner.readable.notified().await;
        }
    }

    /// Close the queue: wakes the consumer, discards waiting frames, and
    /// turns later pushes into no-ops. Idempotent.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            self.frames().clear();
        }
        self.inner.readable.notify_one();
        self.inner.writable.notify_waiters();
    }

    fn try_push(&self, frame: OutputFrame) -> Result<Enqueued, OutputFrame> {
        let mut frames = self.frames();
        if self.is_closed() {
            return Ok(Enqueued::Closed);
        }
        if frames.len() >= self.inner.capacity {
            return Err(frame);
        }
        frames.push_back(frame);
        drop(frames);
        self.inner.readable.notify_one();
        Ok(Enqueued::Queued)
    }

    fn frames(&self) -> MutexGuard<'_, VecDeque<OutputFrame>> {
        self.inner
            .frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: usize) -> OutputFrame {
        OutputFrame::repaint(&format!("frame {n}")).unwrap()
    }

    #[tokio::test]
    async fn fifo_order() {
        let queue = OutputQueue::new(8, Duration::from_millis(10));
        for n in 0..3 {
            assert_eq!(queue.push(frame(n)).await, Enqueued::Queued);
        }
        for n in 0..3 {
            assert_eq!(queue.pop().await.unwrap().body(), format!("frame {n}"));
        }
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn overflow_keeps_most_recent_frames() {
        let capacity = 4;
        let queue = OutputQueue::new(capacity, Duration::from_millis(5));
        let mut evicted = 0;
        for n in 0..10 {
            if queue.push(frame(n)).await == Enqueued::Evicted {
                evicted += 1;
            }
            assert!(queue.len() <= capacity);
        }
        assert_eq!(evicted, 6);
        assert_eq!(queue.len(), capacity);

        let mut survivors = Vec::new();
        while !queue.is_empty() {
            survivors.push(queue.pop().await.unwrap().body().to_string());
        }
        assert_eq!(survivors, vec!["frame 6", "frame 7", "frame 8", "frame 9"]);
    }

    #[tokio::test]
    async fn blocked_push_succeeds_when_consumer_frees_a_slot() {
        let queue = OutputQueue::new(1, Duration::from_secs(5));
        assert_eq!(queue.push(frame(0)).await, Enqueued::Queued);

        let consumer = queue.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            consumer.pop().await
        });

        assert_eq!(queue.push(frame(1)).await, Enqueued::Queued);
        assert_eq!(handle.await.unwrap().unwrap().body(), "frame 0");
        assert_eq!(queue.pop().await.unwrap().body(), "frame 1");
    }

    #[tokio::test]
    async fn pop_waits_for_push() {
        let queue = OutputQueue::new(4, Duration::from_millis(10));
        let consumer = queue.clone();
        let handle = tokio::spawn(async move { consumer.pop().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        queue.push(frame(42)).await;
        assert_eq!(handle.await.unwrap().unwrap().body(), "frame 42");
    }

    #[tokio::test]
    async fn close_wakes_consumer_and_rejects_pushes() {
        let queue = OutputQueue::new(4, Duration::from_millis(10));
        let consumer = queue.clone();
        let handle = tokio::spawn(async move { consumer.pop().await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        queue.close();
        queue.close();
        assert!(handle.await.unwrap().is_none());
        assert_eq!(queue.push(frame(1)).await, Enqueued::Closed);
        assert!(queue.is_empty());
    }
}
