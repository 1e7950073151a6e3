// Background task runner.
//
// One "submit async unit of work" port over an unbounded mpsc channel,
// drained by a small pool of workers spawned at startup. Callers enqueue
// only after the prerequisite row is committed, so a worker can always
// load what it needs.
//
// Retry policy is per task kind. Reply generation runs once; a failure
// is logged and the task abandoned. Dispatch retries up to the configured
// ceiling with a fixed delay, re-enqueued from a detached sleep so a
// waiting retry never blocks the queue. When the ceiling is exhausted the
// reply is transitioned to failed with the last error recorded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::app_config::DeliveryConfig;
use crate::db::DieselPool;
use crate::services::ai_client::AiClient;
use crate::services::delivery::{dispatch_reply, DispatchOutcome};
use crate::services::orchestrator::generate_email_reply;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    GenerateEmailReply { email_id: Uuid },
    DispatchReply { reply_id: Uuid, attempt: u32 },
}

impl Task {
    pub fn dispatch(reply_id: Uuid) -> Self {
        Task::DispatchReply {
            reply_id,
            attempt: 1,
        }
    }
}

/// Cheap cloneable handle for submitting work
#[derive(Clone)]
pub struct TaskQueue {
    sender: mpsc::UnboundedSender<Task>,
}

impl TaskQueue {
    pub fn enqueue(&self, task: Task) {
        if self.sender.send(task).is_err() {
            error!("Task queue is closed, dropping task");
        }
    }
}

/// True when a failed attempt has budget left for another try.
/// `max_attempts` counts the first attempt.
pub fn should_retry(attempt: u32, max_attempts: u32) -> bool {
    attempt < max_attempts
}

/// Spawn the worker pool and return the submission handle
pub fn start_task_runner(
    pool: DieselPool,
    ai: AiClient,
    config: DeliveryConfig,
) -> TaskQueue {
    let (sender, receiver) = mpsc::unbounded_channel::<Task>();
    let receiver = Arc::new(Mutex::new(receiver));
    let queue = TaskQueue { sender };

    for worker in 0..config.worker_count.max(1) {
        let receiver = Arc::clone(&receiver);
        let pool = pool.clone();
        let ai = ai.clone();
        let queue = queue.clone();
        let config = config.clone();

        tokio::spawn(async move {
            info!(worker = worker, "Task worker started");
            loop {
                let task = {
                    let mut rx = receiver.lock().await;
                    rx.recv().await
                };
                match task {
                    Some(task) => execute(task, &pool, &ai, &queue, &config).await,
                    None => {
                        info!(worker = worker, "Task queue closed, worker exiting");
                        break;
                    },
                }
            }
        });
    }

    queue
}

async fn execute(
    task: Task,
    pool: &DieselPool,
    ai: &AiClient,
    queue: &TaskQueue,
    config: &DeliveryConfig,
) {
    match task {
        Task::GenerateEmailReply { email_id } => {
            let mut conn = match pool.get().await {
                Ok(conn) => conn,
                Err(e) => {
                    error!(email_id = %email_id, "No connection for reply generation: {}", e);
                    return;
                },
            };
            match generate_email_reply(&mut conn, ai, email_id).await {
                Ok(Some(reply)) => queue.enqueue(Task::dispatch(reply.id)),
                Ok(None) => {},
                Err(e) => {
                    // No retry for generation; the email stays unprocessed
                    error!(email_id = %email_id, "Reply generation failed: {}", e);
                },
            }
        },
        Task::DispatchReply { reply_id, attempt } => {
            let outcome = match pool.get().await {
                Ok(mut conn) => dispatch_reply(&mut conn, reply_id).await,
                Err(e) => {
                    error!(reply_id = %reply_id, "No connection for dispatch: {}", e);
                    Err(crate::services::delivery::DeliveryError::Provider(
                        e.to_string(),
                    ))
                },
            };

            let last_error = match outcome {
                Ok(DispatchOutcome::Retry(reason)) => reason,
                Err(e) => e.to_string(),
                Ok(_) => return,
            };

            if should_retry(attempt, config.max_retries) {
                let queue = queue.clone();
                let delay = Duration::from_secs(config.retry_delay_seconds);
                warn!(
                    reply_id = %reply_id,
                    attempt = attempt,
                    "Dispatch attempt failed, retrying in {}s: {}",
                    delay.as_secs(),
                    last_error
                );
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    queue.enqueue(Task::DispatchReply {
                        reply_id,
                        attempt: attempt + 1,
                    });
                });
            } else {
                error!(
                    reply_id = %reply_id,
                    attempts = attempt,
                    "Dispatch retries exhausted: {}",
                    last_error
                );
                if let Ok(mut conn) = pool.get().await {
                    let error_text =
                        format!("retries exhausted after {} attempts: {}", attempt, last_error);
                    if let Err(e) =
                        crate::models::EmailReply::mark_failed(&mut conn, reply_id, &error_text)
                            .await
                    {
                        error!(reply_id = %reply_id, "Failed to record exhaustion: {}", e);
                    }
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_budget_counts_first_attempt() {
        assert!(should_retry(1, 3));
        assert!(should_retry(2, 3));
        assert!(!should_retry(3, 3));
        assert!(!should_retry(1, 1));
    }

    #[tokio::test]
    async fn test_enqueue_delivers_to_receiver() {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let queue = TaskQueue { sender };
        let id = Uuid::new_v4();
        queue.enqueue(Task::dispatch(id));
        assert_eq!(
            receiver.recv().await,
            Some(Task::DispatchReply {
                reply_id: id,
                attempt: 1
            })
        );
    }

    #[tokio::test]
    async fn test_enqueue_after_close_does_not_panic() {
        let (sender, receiver) = mpsc::unbounded_channel();
        drop(receiver);
        let queue = TaskQueue { sender };
        queue.enqueue(Task::GenerateEmailReply {
            email_id: Uuid::new_v4(),
        });
    }
}
