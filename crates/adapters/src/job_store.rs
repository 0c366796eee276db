//! Redis-backed job store adapter. One hash per job, keyed
//! `{prefix}{job_id}`, TTL refreshed on every write.

use redis::AsyncCommands;
use resumariner_domain::{Job, JobId};
use resumariner_ports::{BoxFuture, JobPatch, JobStorePort};
use resumariner_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use std::time::Duration;

const KEY_PREFIX: &str = "resumariner:job:";
const LIST_KEY: &str = "resumariner:job:index";
const DEFAULT_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Redis-backed implementation of [`JobStorePort`].
pub struct RedisJobStore {
    client: redis::Client,
    ttl: Duration,
}

impl RedisJobStore {
    /// Build a job store from a Redis connection URL.
    pub fn new(redis_url: &str, ttl: Duration) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(map_redis_client_error)?;
        Ok(Self { client, ttl })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_redis_error)
    }

    fn key(job_id: JobId) -> String {
        format!("{KEY_PREFIX}{job_id}")
    }
}

impl JobStorePort for RedisJobStore {
    fn create(
        &self,
        ctx: &RequestContext,
        job_id: JobId,
        file_path: String,
    ) -> BoxFuture<'_, Result<Job>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("redis_job_store.create")?;
            let job = Job::new(job_id, file_path, chrono::Utc::now());
            let payload = encode(&job)?;

            let mut conn = self.connection().await?;
            let key = Self::key(job_id);
            let ttl_seconds = self.ttl.as_secs().max(1);
            let _: () = conn
                .set_ex(&key, payload, ttl_seconds)
                .await
                .map_err(map_redis_error)?;
            let _: () = conn
                .zadd(LIST_KEY, key, job.created_at.timestamp())
                .await
                .map_err(map_redis_error)?;
            Ok(job)
        })
    }

    fn get(&self, ctx: &RequestContext, job_id: JobId) -> BoxFuture<'_, Result<Option<Job>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("redis_job_store.get")?;
            let mut conn = self.connection().await?;
            let raw: Option<String> = conn.get(Self::key(job_id)).await.map_err(map_redis_error)?;
            raw.map(|value| decode(&value)).transpose()
        })
    }

    fn update(
        &self,
        ctx: &RequestContext,
        job_id: JobId,
        patch: JobPatch,
    ) -> BoxFuture<'_, Result<Option<Job>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("redis_job_store.update")?;
            let mut conn = self.connection().await?;
            let key = Self::key(job_id);
            let raw: Option<String> = conn.get(&key).await.map_err(map_redis_error)?;
            let Some(raw) = raw else {
                return Ok(None);
            };
            let mut job = decode(&raw)?;

            if let Some(status) = patch.status {
                job.status = status;
            }
            if let Some(result) = patch.result {
                job.result = Some(result);
            }
            if let Some(result_url) = patch.result_url {
                job.result_url = Some(result_url);
            }
            if let Some(error) = patch.error {
                job.error = Some(error);
            }
            job.updated_at = chrono::Utc::now();

            let payload = encode(&job)?;
            let ttl_seconds = self.ttl.as_secs().max(1);
            let _: () = conn
                .set_ex(&key, payload, ttl_seconds)
                .await
                .map_err(map_redis_error)?;
            Ok(Some(job))
        })
    }

    fn delete(&self, ctx: &RequestContext, job_id: JobId) -> BoxFuture<'_, Result<bool>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("redis_job_store.delete")?;
            let mut conn = self.connection().await?;
            let key = Self::key(job_id);
            let removed: u64 = conn.del(&key).await.map_err(map_redis_error)?;
            let _: u64 = conn.zrem(LIST_KEY, &key).await.map_err(map_redis_error)?;
            Ok(removed > 0)
        })
    }

    fn list(&self, ctx: &RequestContext, limit: u32) -> BoxFuture<'_, Result<Vec<Job>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("redis_job_store.list")?;
            let mut conn = self.connection().await?;
            let limit = i64::from(limit.max(1)).saturating_sub(1);
            let keys: Vec<String> = conn
                .zrevrange(LIST_KEY, 0, limit)
                .await
                .map_err(map_redis_error)?;

            let mut jobs = Vec::with_capacity(keys.len());
            for key in keys {
                let raw: Option<String> = conn.get(&key).await.map_err(map_redis_error)?;
                if let Some(raw) = raw {
                    jobs.push(decode(&raw)?);
                }
            }
            Ok(jobs)
        })
    }
}

fn encode(job: &Job) -> Result<String> {
    serde_json::to_string(job).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to encode job record: {error}"),
            ErrorClass::NonRetriable,
        )
    })
}

fn decode(raw: &str) -> Result<Job> {
    serde_json::from_str(raw).map_err(|error| {
        ErrorEnvelope::unexpected(
            ErrorCode::internal(),
            format!("failed to decode job record: {error}"),
            ErrorClass::NonRetriable,
        )
    })
}

fn map_redis_client_error(error: redis::RedisError) -> ErrorEnvelope {
    ErrorEnvelope::expected(
        ErrorCode::new("job_store", "invalid_redis_url"),
        format!("invalid Redis connection string: {error}"),
    )
}

fn map_redis_error(error: redis::RedisError) -> ErrorEnvelope {
    let class = if error.is_timeout() || error.is_io_error() {
        ErrorClass::Retriable
    } else {
        ErrorClass::NonRetriable
    };
    ErrorEnvelope::unexpected(
        ErrorCode::new("job_store", "redis_error"),
        format!("Redis operation failed: {error}"),
        class,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_redis_url_is_rejected() {
        let result = RedisJobStore::new("not a url", Duration::from_secs(60));
        assert!(result.is_err());
    }
}
