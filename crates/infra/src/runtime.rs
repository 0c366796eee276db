//! Worker runtime: spawns the ingestion worker loop and a periodic cleanup
//! loop as two cooperating tasks sharing one cancellation token, mirroring
//! the processing-worker/cleanup-worker split of a standalone worker
//! process. `shutdown()` cancels both and waits for them to exit.

use resumariner_app::{IngestionDeps, run_cleanup, run_worker};
use resumariner_shared::{CancellationToken, CorrelationId, ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// How often the cleanup task sweeps for queue entries past their
/// visibility timeout, when no other signal wakes it sooner.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(30);

/// A running worker process: the ingestion loop plus the periodic cleanup
/// sweep, both cancellable through one shared token.
pub struct WorkerRuntime {
    cancellation: CancellationToken,
    worker_task: JoinHandle<()>,
    cleanup_task: JoinHandle<()>,
}

impl WorkerRuntime {
    /// Spawn the ingestion worker and cleanup loops.
    #[must_use]
    pub fn spawn(deps: Arc<IngestionDeps>, poll_timeout: Duration, visibility_timeout: Duration) -> Self {
        let cancellation = CancellationToken::new();

        let worker_deps = Arc::clone(&deps);
        let worker_cancellation = cancellation.clone();
        let worker_task = tokio::spawn(async move {
            let ctx =
                RequestContext::with_cancellation(CorrelationId::new_job_id(), worker_cancellation);
            if let Err(error) = run_worker(&ctx, &worker_deps, poll_timeout).await {
                error!(error = %error, "ingestion worker loop exited with an error");
            }
            info!("ingestion worker loop stopped");
        });

        let cleanup_deps = deps;
        let cleanup_cancellation = cancellation.clone();
        let cleanup_task = tokio::spawn(async move {
            loop {
                if cleanup_cancellation.is_cancelled() {
                    break;
                }
                let ctx = RequestContext::with_cancellation(
                    CorrelationId::new_job_id(),
                    cleanup_cancellation.clone(),
                );
                match run_cleanup(&ctx, &cleanup_deps, visibility_timeout).await {
                    Ok(0) => {}
                    Ok(count) => info!(count, "cleaned up expired queue entries"),
                    Err(error) => error!(error = %error, "cleanup sweep failed"),
                }
                tokio::select! {
                    () = tokio::time::sleep(CLEANUP_INTERVAL) => {}
                    () = cleanup_cancellation.cancelled() => break,
                }
            }
            info!("cleanup loop stopped");
        });

        Self {
            cancellation,
            worker_task,
            cleanup_task,
        }
    }

    /// Cancel both loops and wait for them to exit.
    pub async fn shutdown(self) -> Result<()> {
        self.cancellation.cancel();
        self.worker_task.await.map_err(join_error)?;
        self.cleanup_task.await.map_err(join_error)?;
        Ok(())
    }
}

fn join_error(error: tokio::task::JoinError) -> ErrorEnvelope {
    ErrorEnvelope::expected(
        ErrorCode::new("infra", "worker_task_join_failed"),
        format!("worker task did not exit cleanly: {error}"),
    )
}
