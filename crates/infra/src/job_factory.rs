//! Job queue/store adapter construction: both are Redis-backed, sharing the
//! same connection URL but independent timing knobs (queue visibility vs.
//! job record TTL).

use crate::env_check::InfraResult;
use resumariner_adapters::job_queue::RedisJobQueue;
use resumariner_adapters::job_store::RedisJobStore;
use resumariner_config::JobQueueConfig;
use resumariner_ports::{JobQueuePort, JobStorePort};
use std::sync::Arc;
use std::time::Duration;

/// A job record survives seven days past its last write before expiring
/// from the store, regardless of the queue's visibility timeout.
const JOB_RECORD_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Build the Redis-backed job queue.
pub fn build_job_queue(config: &JobQueueConfig) -> InfraResult<Arc<dyn JobQueuePort>> {
    let visibility_timeout = Duration::from_millis(config.visibility_timeout_ms);
    let queue = RedisJobQueue::new(&config.redis_url, visibility_timeout, config.max_retries)?;
    Ok(Arc::new(queue))
}

/// Build the Redis-backed job store.
pub fn build_job_store(config: &JobQueueConfig) -> InfraResult<Arc<dyn JobStorePort>> {
    let store = RedisJobStore::new(&config.redis_url, JOB_RECORD_TTL)?;
    Ok(Arc::new(store))
}
