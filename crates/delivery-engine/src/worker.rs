//! Worker pool: each worker blocks on the ready queue, runs a task through
//! [`crate::execute::run`], and loops. No in-process sleep-based retry —
//! a retryable failure is re-submitted to the delay set instead, so the
//! worker is free to pick up the next task immediately.

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::state::AppState;

const POP_TIMEOUT_SECS: f64 = 5.0;

pub async fn run(worker_id: usize, state: AppState, mut shutdown_rx: broadcast::Receiver<()>) {
    info!(worker_id, "worker starting");
    let mut tasks_processed: u64 = 0;

    loop {
        if shutdown_rx.try_recv().is_ok() {
            info!(worker_id, "worker received shutdown signal");
            break;
        }

        let task = match state.queue.pop_ready::<webhook_domain::DeliveryTask>(POP_TIMEOUT_SECS).await {
            Some(task) => task,
            None => continue,
        };

        tasks_processed += 1;
        crate::metrics::TASKS_CONSUMED_TOTAL
            .with_label_values(&[&worker_id.to_string()])
            .inc();

        let delivery_id = task.delivery_id;
        let outcome = crate::execute::run(&state, task).await;
        debug!(worker_id, %delivery_id, ?outcome, "task processed");

        if tasks_processed.is_multiple_of(100) {
            info!(worker_id, tasks_processed, "worker throughput checkpoint");
        }
    }

    info!(worker_id, tasks_processed, "worker stopped");
}

/// Periodically promotes due delayed tasks into the ready queue, and
/// reports the ready-queue depth for the `DELIVERY_QUEUE_LENGTH` gauge.
pub async fn run_scheduler(state: AppState, mut shutdown_rx: broadcast::Receiver<()>) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let now = state.clock.now();
                match state.queue.promote_due(now).await {
                    Ok(promoted) if promoted > 0 => {
                        debug!(promoted, "scheduler promoted delayed tasks");
                    }
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "scheduler failed to promote delayed tasks"),
                }

                if let Ok(len) = state.queue.ready_len().await {
                    crate::metrics::DELIVERY_QUEUE_LENGTH
                        .with_label_values(&["ready"])
                        .set(len);
                }
            }
            _ = shutdown_rx.recv() => {
                info!("scheduler received shutdown signal");
                break;
            }
        }
    }
}
