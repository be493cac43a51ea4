// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded FIFO work queue with drop-on-full admission.
//!
//! Producers never wait: [`WorkQueue::try_enqueue`] hands the task back when
//! the queue is at capacity. Every worker shares the single receiver behind
//! an async mutex, so each task is delivered to exactly one worker.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use snapclaim_core::{EventSource, MessageSnapshot};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Instant;

/// One pending click attempt.
#[derive(Debug, Clone)]
pub struct QueuedTask {
    pub snapshot: Arc<MessageSnapshot>,
    pub source: EventSource,
    /// Monotonic instant the event reached the ingestion handler.
    pub received_at: Instant,
    /// Wall-clock receipt time, compared against message timestamps.
    pub received_wall: DateTime<Utc>,
    /// Set when the task enters the queue.
    pub enqueued_at: Instant,
}

impl QueuedTask {
    pub fn new(snapshot: Arc<MessageSnapshot>, source: EventSource) -> Self {
        let now = Instant::now();
        Self {
            snapshot,
            source,
            received_at: now,
            received_wall: Utc::now(),
            enqueued_at: now,
        }
    }
}

/// Why an enqueue was refused. The task is handed back to the caller.
#[derive(Debug)]
pub enum EnqueueError {
    Full(QueuedTask),
    Closed(QueuedTask),
}

impl EnqueueError {
    pub fn into_task(self) -> QueuedTask {
        match self {
            EnqueueError::Full(task) | EnqueueError::Closed(task) => task,
        }
    }
}

/// Shared bounded queue between the ingestion handler and the worker pool.
#[derive(Debug)]
pub struct WorkQueue {
    tx: mpsc::Sender<QueuedTask>,
    rx: Mutex<mpsc::Receiver<QueuedTask>>,
}

impl WorkQueue {
    /// Creates a queue holding at most `capacity` tasks (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Enqueues without waiting. Stamps `enqueued_at` on success.
    pub fn try_enqueue(&self, mut task: QueuedTask) -> Result<(), EnqueueError> {
        task.enqueued_at = Instant::now();
        self.tx.try_send(task).map_err(|e| match e {
            mpsc::error::TrySendError::Full(task) => EnqueueError::Full(task),
            mpsc::error::TrySendError::Closed(task) => EnqueueError::Closed(task),
        })
    }

    /// Waits for the next task in FIFO order.
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn dequeue(&self) -> Option<QueuedTask> {
        self.rx.lock().await.recv().await
    }

    /// Number of tasks currently waiting.
    pub fn depth(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Stops further dequeues once the remaining tasks are drained.
    pub async fn close(&self) {
        self.rx.lock().await.close();
    }
}

#[cfg(test)]
mod tests {
    use snapclaim_core::MessageId;

    use super::*;

    fn task(id: u64) -> QueuedTask {
        let snapshot = MessageSnapshot {
            id: MessageId(id),
            guild_id: None,
            channel_id: None,
            author_id: None,
            application_id: None,
            authored_by_self: false,
            created_at: Utc::now(),
            edited_at: None,
            rows: Vec::new(),
        };
        QueuedTask::new(Arc::new(snapshot), EventSource::Created)
    }

    #[tokio::test]
    async fn fifo_order() {
        let queue = WorkQueue::new(4);
        for id in 1..=3 {
            queue.try_enqueue(task(id)).unwrap();
        }
        assert_eq!(queue.depth(), 3);
        for id in 1..=3 {
            assert_eq!(queue.dequeue().await.unwrap().snapshot.id, MessageId(id));
        }
        assert_eq!(queue.depth(), 0);
    }

    #[tokio::test]
    async fn full_queue_rejects_without_partial_insert() {
        let queue = WorkQueue::new(2);
        queue.try_enqueue(task(1)).unwrap();
        queue.try_enqueue(task(2)).unwrap();

        let err = queue.try_enqueue(task(3)).unwrap_err();
        assert!(matches!(err, EnqueueError::Full(_)));
        assert_eq!(err.into_task().snapshot.id, MessageId(3));
        assert_eq!(queue.depth(), 2);

        assert_eq!(queue.dequeue().await.unwrap().snapshot.id, MessageId(1));
        assert_eq!(queue.dequeue().await.unwrap().snapshot.id, MessageId(2));
    }

    #[tokio::test]
    async fn zero_capacity_is_raised_to_one() {
        let queue = WorkQueue::new(0);
        assert_eq!(queue.capacity(), 1);
        queue.try_enqueue(task(1)).unwrap();
        assert!(queue.try_enqueue(task(2)).is_err());
    }

    #[tokio::test]
    async fn closed_queue_refuses_and_drains() {
        let queue = WorkQueue::new(4);
        queue.try_enqueue(task(1)).unwrap();
        queue.close().await;

        assert!(matches!(queue.try_enqueue(task(2)), Err(EnqueueError::Closed(_))));
        assert!(queue.dequeue().await.is_some());
        assert!(queue.dequeue().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn enqueue_stamps_time() {
        let queue = WorkQueue::new(1);
        let t = task(1);
        let received = t.received_at;
        tokio::time::advance(std::time::Duration::from_millis(5)).await;
        queue.try_enqueue(t).unwrap();
        let dequeued = queue.dequeue().await.unwrap();
        assert_eq!(dequeued.enqueued_at - received, std::time::Duration::from_millis(5));
    }
}
