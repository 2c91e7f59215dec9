use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::job::JobId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("job queue is closed; job {0} was not enqueued")]
    Closed(JobId),
}

/// Producer half of the bulk job queue. Cheap to clone; every submission
/// path holds one.
#[derive(Clone, Debug)]
pub struct JobQueue {
    sender: mpsc::UnboundedSender<JobId>,
}

/// Consumer half. Not `Clone`, so at most one worker drains the queue.
#[derive(Debug)]
pub struct JobQueueReceiver {
    receiver: mpsc::UnboundedReceiver<JobId>,
}

pub fn job_queue() -> (JobQueue, JobQueueReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (JobQueue { sender }, JobQueueReceiver { receiver })
}

impl JobQueue {
    /// Never blocks. Fails only once the receiver has been dropped.
    pub fn enqueue(&self, id: JobId) -> Result<(), QueueError> {
        self.sender.send(id).map_err(|rejected| QueueError::Closed(rejected.0))
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl JobQueueReceiver {
    /// Waits for the next id. `None` means every producer is gone.
    pub async fn dequeue(&mut self) -> Option<JobId> {
        self.receiver.recv().await
    }

    /// Stops accepting new ids; already queued ids can still be drained.
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{job_queue, QueueError};
    use crate::domain::job::JobId;

    fn id(value: &str) -> JobId {
        JobId(value.to_string())
    }

    #[tokio::test]
    async fn dequeues_in_enqueue_order() {
        let (queue, mut receiver) = job_queue();
        for value in ["a", "b", "c"] {
            queue.enqueue(id(value)).expect("enqueue");
        }

        assert_eq!(receiver.dequeue().await, Some(id("a")));
        assert_eq!(receiver.dequeue().await, Some(id("b")));
        assert_eq!(receiver.dequeue().await, Some(id("c")));
    }

    #[tokio::test]
    async fn producers_on_many_tasks_share_one_queue() {
        let (queue, mut receiver) = job_queue();

        let handles: Vec<_> = (0..8)
            .map(|index| {
                let queue = queue.clone();
                tokio::spawn(async move { queue.enqueue(id(&format!("job-{index}"))) })
            })
            .collect();
        for handle in handles {
            handle.await.expect("producer task").expect("enqueue");
        }
        drop(queue);

        let mut drained = Vec::new();
        while let Some(next) = receiver.dequeue().await {
            drained.push(next);
        }
        assert_eq!(drained.len(), 8);
    }

    #[tokio::test]
    async fn dequeue_waits_until_an_id_arrives() {
        let (queue, mut receiver) = job_queue();

        let pending = tokio::time::timeout(Duration::from_millis(20), receiver.dequeue()).await;
        assert!(pending.is_err(), "empty queue should suspend the consumer");

        queue.enqueue(id("late")).expect("enqueue");
        assert_eq!(receiver.dequeue().await, Some(id("late")));
    }

    #[tokio::test]
    async fn dequeue_returns_none_once_producers_are_gone() {
        let (queue, mut receiver) = job_queue();
        queue.enqueue(id("last")).expect("enqueue");
        drop(queue);

        assert_eq!(receiver.dequeue().await, Some(id("last")));
        assert_eq!(receiver.dequeue().await, None);
    }

    #[tokio::test]
    async fn enqueue_fails_after_consumer_is_dropped() {
        let (queue, receiver) = job_queue();
        drop(receiver);

        assert!(queue.is_closed());
        assert_eq!(queue.enqueue(id("orphan")), Err(QueueError::Closed(id("orphan"))));
    }
}
