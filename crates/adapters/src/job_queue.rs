//! Redis-backed job queue adapter: a FIFO primary queue, a delayed-retry
//! zset, and an in-flight zset plus hash, all on the same store.

use redis::AsyncCommands;
use resumariner_domain::{JobId, TaskEnvelope};
use resumariner_ports::{BoxFuture, JobQueuePort};
use resumariner_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::time::Duration;

const QUEUE_KEY: &str = "resumariner:queue:main";
const RETRY_KEY: &str = "resumariner:queue:retry";
const INFLIGHT_ZSET_KEY: &str = "resumariner:queue:inflight";
const INFLIGHT_HASH_KEY: &str = "resumariner:queue:inflight:data";
const DEQUEUE_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Redis-backed implementation of [`JobQueuePort`].
pub struct RedisJobQueue {
    client: redis::Client,
    visibility_timeout: Duration,
    max_retries: u32,
}

impl RedisJobQueue {
    /// Build a job queue from a Redis connection URL.
    pub fn new(redis_url: &str, visibility_timeout: Duration, max_retries: u32) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(|error| {
            ErrorEnvelope::expected(
                ErrorCode::new("job_queue", "invalid_redis_url"),
                format!("invalid Redis connection string: {error}"),
            )
        })?;
        Ok(Self {
            client,
            visibility_timeout,
            max_retries,
        })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_redis_error)
    }
}

impl JobQueuePort for RedisJobQueue {
    fn enqueue(
        &self,
        ctx: &RequestContext,
        job_id: JobId,
        file_path: String,
    ) -> BoxFuture<'_, Result<String>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("redis_job_queue.enqueue")?;
            let task_id = uuid::Uuid::new_v4().to_string();
            let task = TaskEnvelope::new(task_id.clone(), job_id, file_path, chrono::Utc::now());
            let payload = encode(&task)?;

            let mut conn = self.connection().await?;
            let _: () = conn.rpush(QUEUE_KEY, payload).await.map_err(map_redis_error)?;
            Ok(task_id)
        })
    }

    fn dequeue(
        &self,
        ctx: &RequestContext,
        timeout: Duration,
    ) -> BoxFuture<'_, Result<Option<TaskEnvelope>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("redis_job_queue.dequeue")?;
            let mut conn = self.connection().await?;
            let deadline = tokio::time::Instant::now() + timeout;

            loop {
                ctx.ensure_not_cancelled("redis_job_queue.dequeue")?;
                let popped: Option<(String, String)> = conn
                    .blpop(QUEUE_KEY, DEQUEUE_POLL_INTERVAL.as_secs_f64())
                    .await
                    .map_err(map_redis_error)?;

                if let Some((_, payload)) = popped {
                    return Ok(Some(decode(&payload)?));
                }
                if tokio::time::Instant::now() >= deadline {
                    return Ok(None);
                }
            }
        })
    }

    fn mark_processing(&self, ctx: &RequestContext, task: &TaskEnvelope) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        let task = task.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("redis_job_queue.mark_processing")?;
            let payload = encode(&task)?;
            let expiry = chrono::Utc::now().timestamp() + self.visibility_timeout.as_secs() as i64;

            let mut conn = self.connection().await?;
            let _: () = conn
                .hset(INFLIGHT_HASH_KEY, &task.task_id, payload)
                .await
                .map_err(map_redis_error)?;
            let _: () = conn
                .zadd(INFLIGHT_ZSET_KEY, &task.task_id, expiry)
                .await
                .map_err(map_redis_error)?;
            Ok(())
        })
    }

    fn mark_completed(&self, ctx: &RequestContext, task_id: &str) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        let task_id = task_id.to_owned();
        Box::pin(async move {
            ctx.ensure_not_cancelled("redis_job_queue.mark_completed")?;
            let mut conn = self.connection().await?;
            let _: () = conn.hdel(INFLIGHT_HASH_KEY, &task_id).await.map_err(map_redis_error)?;
            let _: () = conn.zrem(INFLIGHT_ZSET_KEY, &task_id).await.map_err(map_redis_error)?;
            Ok(())
        })
    }

    fn mark_failed(
        &self,
        ctx: &RequestContext,
        mut task: TaskEnvelope,
        retryable: bool,
        retry_delay: Option<Duration>,
    ) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("redis_job_queue.mark_failed")?;
            let mut conn = self.connection().await?;
            let _: () = conn
                .hdel(INFLIGHT_HASH_KEY, &task.task_id)
                .await
                .map_err(map_redis_error)?;
            let _: () = conn
                .zrem(INFLIGHT_ZSET_KEY, &task.task_id)
                .await
                .map_err(map_redis_error)?;

            if !retryable || task.attempts >= self.max_retries {
                return Ok(());
            }

            task.record_attempt();
            let delay_seconds = retry_delay.unwrap_or_default().as_secs_f64();
            let retry_at = chrono::Utc::now().timestamp() as f64 + delay_seconds;
            let payload = encode(&task)?;
            let _: () = conn
                .zadd(RETRY_KEY, payload, retry_at)
                .await
                .map_err(map_redis_error)?;
            Ok(())
        })
    }

    fn process_retries(&self, ctx: &RequestContext) -> BoxFuture<'_, Result<u64>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("redis_job_queue.process_retries")?;
            let mut conn = self.connection().await?;
            let now = chrono::Utc::now().timestamp();
            let due: Vec<String> = conn
                .zrangebyscore(RETRY_KEY, f64::MIN, now as f64)
                .await
                .map_err(map_redis_error)?;

            let mut moved = 0_u64;
            for payload in due {
                let removed: u64 = conn.zrem(RETRY_KEY, &payload).await.map_err(map_redis_error)?;
                if removed == 0 {
                    continue;
                }
                let _: () = conn.rpush(QUEUE_KEY, &payload).await.map_err(map_redis_error)?;
                moved += 1;
            }
            Ok(moved)
        })
    }

    fn cleanup_expired(&self, ctx: &RequestContext, visibility_timeout: Duration) -> BoxFuture<'_, Result<u64>> {
        let _ = visibility_timeout;
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("redis_job_queue.cleanup_expired")?;
            let mut conn = self.connection().await?;
            let now = chrono::Utc::now().timestamp();
            let expired: Vec<String> = conn
                .zrangebyscore(INFLIGHT_ZSET_KEY, f64::MIN, now as f64)
                .await
                .map_err(map_redis_error)?;

            let mut reclaimed = 0_u64;
            for task_id in expired {
                let removed: u64 = conn
                    .zrem(INFLIGHT_ZSET_KEY, &task_id)
                    .await
                    .map_err(map_redis_error)?;
                if removed == 0 {
                    continue;
                }
                let payload: Option<String> = conn
                    .hget(INFLIGHT_HASH_KEY, &task_id)
                    .await
                    .map_err(map_redis_error)?;
                let _: () = conn
                    .hdel(INFLIGHT_HASH_KEY, &task_id)
                    .await
                    .map_err(map_redis_error)?;

                let Some(payload) = payload else {
                    continue;
                };
                let mut task = decode(&payload)?;
                if task.attempts < self.max_retries {
                    task.record_attempt();
                    let requeued = encode(&task)?;
                    let _: () = conn.rpush(QUEUE_KEY, requeued).await.map_err(map_redis_error)?;
                }
                reclaimed += 1;
            }
            Ok(reclaimed)
        })
    }
}

fn encode(task: &TaskEnvelope) -> Result<String> {
    serde_json::to_string(task).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to encode task envelope: {error}"),
            ErrorClass::NonRetriable,
        )
    })
}

fn decode(raw: &str) -> Result<TaskEnvelope> {
    serde_json::from_str(raw).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to decode task envelope: {error}"),
            ErrorClass::NonRetriable,
        )
    })
}

fn map_redis_error(error: redis::RedisError) -> ErrorEnvelope {
    let class = if error.is_timeout() || error.is_io_error() {
        ErrorClass::Retriable
    } else {
        ErrorClass::NonRetriable
    };
    ErrorEnvelope::unexpected(
        ErrorCode::new("job_queue", "redis_error"),
        format!("Redis operation failed: {error}"),
        class,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_redis_url_is_rejected() {
        let result = RedisJobQueue::new("not a url", Duration::from_secs(60), 3);
        assert!(result.is_err());
    }
}
