//! Local vector database adapter backed by a linear-scan cosine index, with
//! optional snapshot persistence to disk. Intended for development and the
//! `--local` CLI mode; `vectordb_qdrant` is the production-scale counterpart.

use resumariner_ports::{
    BoxFuture, EmbeddingPoint, PayloadFilter, Uid, VectorDbPort, VectorSearchHit,
    VectorSearchOptions,
};
use resumariner_shared::{ErrorClass, ErrorCode, ErrorEnvelope, RequestContext, Result};
use resumariner_vector::{IndexParams, VectorIndex, VectorRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use uuid::Uuid;

const LOCAL_SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LocalSnapshot {
    version: u32,
    dimension: u32,
    points: Vec<EmbeddingPoint>,
}

struct LocalState {
    dimension: Option<u32>,
    index: Option<VectorIndex>,
    points: HashMap<Uuid, EmbeddingPoint>,
    points_by_uid: HashMap<Uid, Vec<Uuid>>,
}

impl LocalState {
    const fn empty() -> Self {
        Self {
            dimension: None,
            index: None,
            points: HashMap::new(),
            points_by_uid: HashMap::new(),
        }
    }

    fn from_points(dimension: u32, points: Vec<EmbeddingPoint>) -> Result<Self> {
        let mut state = Self {
            dimension: Some(dimension),
            index: Some(VectorIndex::new(dimension, IndexParams::default())?),
            points: HashMap::new(),
            points_by_uid: HashMap::new(),
        };
        for point in points {
            state.insert_point(point)?;
        }
        Ok(state)
    }

    fn insert_point(&mut self, point: EmbeddingPoint) -> Result<()> {
        let Some(index) = self.index.as_mut() else {
            return Err(ErrorEnvelope::unexpected(
                ErrorCode::internal(),
                "vector index not initialized",
                ErrorClass::NonRetriable,
            ));
        };
        index.insert(vec![VectorRecord {
            id: point.id.to_string().into_boxed_str(),
            vector: point.vector.clone(),
        }])?;
        self.points_by_uid
            .entry(point.uid)
            .or_default()
            .push(point.id);
        self.points.insert(point.id, point);
        Ok(())
    }

    fn snapshot(&self) -> Option<LocalSnapshot> {
        let dimension = self.dimension?;
        let mut points: Vec<EmbeddingPoint> = self.points.values().cloned().collect();
        points.sort_by(|a, b| a.id.cmp(&b.id));
        Some(LocalSnapshot {
            version: LOCAL_SNAPSHOT_VERSION,
            dimension,
            points,
        })
    }
}

/// Local vector DB backed by a linear-scan cosine index, with optional
/// snapshot persistence to a directory on disk.
pub struct LocalVectorDb {
    snapshot_path: Option<PathBuf>,
    state: RwLock<LocalState>,
}

impl LocalVectorDb {
    /// Create a local vector DB adapter. If `snapshot_dir` is set, the
    /// collection is persisted to `<snapshot_dir>/collection.json` after
    /// every mutation and restored from it on first use.
    #[must_use]
    pub fn new(snapshot_dir: Option<&str>) -> Self {
        let snapshot_path = snapshot_dir
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|dir| PathBuf::from(dir).join("collection.json"));
        Self {
            snapshot_path,
            state: RwLock::new(LocalState::empty()),
        }
    }

    async fn load_snapshot_if_present(&self) -> Result<()> {
        let Some(path) = self.snapshot_path.as_ref() else {
            return Ok(());
        };
        if {
            let state = self.state.read().await;
            state.dimension.is_some()
        } {
            return Ok(());
        }

        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let snapshot: LocalSnapshot = serde_json::from_slice(&bytes).map_err(|error| {
                    ErrorEnvelope::unexpected(
                        ErrorCode::new("vectordb", "snapshot_decode_failed"),
                        format!("failed to decode vector snapshot: {error}"),
                        ErrorClass::NonRetriable,
                    )
                })?;
                if snapshot.version != LOCAL_SNAPSHOT_VERSION {
                    return Err(ErrorEnvelope::unexpected(
                        ErrorCode::new("vectordb", "snapshot_version_mismatch"),
                        "local vector snapshot version mismatch",
                        ErrorClass::NonRetriable,
                    ));
                }
                let restored = LocalState::from_points(snapshot.dimension, snapshot.points)?;
                *self.state.write().await = restored;
                Ok(())
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(ErrorEnvelope::unexpected(
                ErrorCode::io(),
                format!("failed to read vector snapshot: {error}"),
                ErrorClass::Retriable,
            )),
        }
    }

    async fn persist_snapshot(&self) -> Result<()> {
        let Some(path) = self.snapshot_path.as_ref() else {
            return Ok(());
        };
        let snapshot = {
            let state = self.state.read().await;
            state.snapshot()
        };
        let Some(snapshot) = snapshot else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                ErrorEnvelope::unexpected(
                    ErrorCode::io(),
                    format!("failed to create vector snapshot directory: {error}"),
                    ErrorClass::Retriable,
                )
            })?;
        }

        let json = serde_json::to_vec(&snapshot).map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::internal(),
                format!("failed to encode vector snapshot: {error}"),
                ErrorClass::NonRetriable,
            )
        })?;
        tokio::fs::write(path, json).await.map_err(|error| {
            ErrorEnvelope::unexpected(
                ErrorCode::io(),
                format!("failed to write vector snapshot: {error}"),
                ErrorClass::Retriable,
            )
        })
    }
}

impl VectorDbPort for LocalVectorDb {
    fn ensure_collection(&self, ctx: &RequestContext, dimension: u32) -> BoxFuture<'_, Result<()>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("local_vectordb.ensure_collection")?;
            self.load_snapshot_if_present().await?;

            let mut state = self.state.write().await;
            match state.dimension {
                Some(existing) if existing != dimension => {
                    return Err(ErrorEnvelope::expected(
                        ErrorCode::new("vectordb", "dimension_mismatch"),
                        "collection already exists with a different dimension",
                    )
                    .with_metadata("existing", existing.to_string())
                    .with_metadata("requested", dimension.to_string()));
                },
                Some(_) => {},
                None => {
                    state.dimension = Some(dimension);
                    state.index = Some(VectorIndex::new(dimension, IndexParams::default())?);
                },
            }
            Ok(())
        })
    }

    fn store_vectors(
        &self,
        ctx: &RequestContext,
        uid: Uid,
        points: Vec<EmbeddingPoint>,
    ) -> BoxFuture<'_, Result<Vec<Uuid>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("local_vectordb.store_vectors")?;
            self.load_snapshot_if_present().await?;

            let mut written = Vec::with_capacity(points.len());
            {
                let mut state = self.state.write().await;
                let dimension = state.dimension.ok_or_else(|| {
                    ErrorEnvelope::expected(
                        ErrorCode::new("vectordb", "collection_not_initialized"),
                        "collection must be created via ensure_collection before writing",
                    )
                })?;

                if let Some(existing_ids) = state.points_by_uid.remove(&uid) {
                    for id in existing_ids {
                        state.points.remove(&id);
                        if let Some(index) = state.index.as_mut() {
                            index.delete(&[id.to_string().into_boxed_str()])?;
                        }
                    }
                }

                for point in points {
                    if !point.has_dimension(dimension as usize) {
                        continue;
                    }
                    written.push(point.id);
                    state.insert_point(point)?;
                }
            }

            self.persist_snapshot().await?;
            Ok(written)
        })
    }

    fn delete_resume_vectors(&self, ctx: &RequestContext, uid: Uid) -> BoxFuture<'_, Result<u64>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("local_vectordb.delete_resume_vectors")?;
            self.load_snapshot_if_present().await?;

            let removed = {
                let mut state = self.state.write().await;
                let ids = state.points_by_uid.remove(&uid).unwrap_or_default();
                for id in &ids {
                    state.points.remove(id);
                    if let Some(index) = state.index.as_mut() {
                        index.delete(&[id.to_string().into_boxed_str()])?;
                    }
                }
                ids.len() as u64
            };

            if removed > 0 {
                self.persist_snapshot().await?;
            }
            Ok(removed)
        })
    }

    fn search(
        &self,
        ctx: &RequestContext,
        query_vector: Vec<f32>,
        options: VectorSearchOptions,
    ) -> BoxFuture<'_, Result<Vec<VectorSearchHit>>> {
        let ctx = ctx.clone();
        Box::pin(async move {
            ctx.ensure_not_cancelled("local_vectordb.search")?;
            self.load_snapshot_if_present().await?;

            let state = self.state.read().await;
            let Some(index) = state.index.as_ref() else {
                return Ok(Vec::new());
            };

            let limit = usize::try_from(options.limit.max(1)).unwrap_or(usize::MAX);
            let oversample = limit.saturating_mul(4).max(limit);
            let matches = index.search(&query_vector, oversample)?;

            let mut hits = Vec::with_capacity(limit.min(matches.len()));
            for candidate in matches {
                if let Some(min_score) = options.min_score
                    && candidate.score < min_score
                {
                    continue;
                }

                let Ok(point_id) = Uuid::parse_str(&candidate.id) else {
                    continue;
                };
                let Some(point) = state.points.get(&point_id) else {
                    continue;
                };
                if !matches_filter(point, &options.filter) {
                    continue;
                }

                hits.push(VectorSearchHit {
                    point_id,
                    uid: point.uid,
                    score: candidate.score,
                    point: point.clone(),
                });
                if hits.len() >= limit {
                    break;
                }
            }
            Ok(hits)
        })
    }
}

fn matches_filter(point: &EmbeddingPoint, filter: &PayloadFilter) -> bool {
    filter.iter().all(|(key, value)| match key.as_ref() {
        "uid" => value_matches_string(value, &point.uid.to_string()),
        "name" => value_matches_string(value, &point.name),
        "email" => value_matches_string(value, &point.email),
        "role" => point
            .role
            .as_deref()
            .is_some_and(|role| value_matches_string(value, role)),
        "location" => point
            .location
            .as_deref()
            .is_some_and(|location| value_matches_string(value, location)),
        "skills" => value_matches_any(value, &point.skills),
        "companies" => value_matches_any(value, &point.companies),
        "years_experience" => value
            .as_f64()
            .is_some_and(|expected| (point.years_experience - expected).abs() < f64::EPSILON),
        _ => true,
    })
}

fn value_matches_string(value: &Value, actual: &str) -> bool {
    match value {
        Value::String(expected) => expected == actual,
        Value::Array(values) => values.iter().any(|entry| value_matches_string(entry, actual)),
        _ => false,
    }
}

fn value_matches_any(value: &Value, actual: &[String]) -> bool {
    match value {
        Value::String(expected) => actual.iter().any(|entry| entry == expected),
        Value::Array(values) => values.iter().any(|entry| value_matches_any(entry, actual)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumariner_domain::EmbeddingSource;
    use std::collections::BTreeMap;

    fn sample_point(uid: Uid, name: &str, vector: Vec<f32>) -> EmbeddingPoint {
        EmbeddingPoint {
            id: Uuid::new_v4(),
            uid,
            vector,
            text: "sample".into(),
            source: EmbeddingSource::Summary,
            context: None,
            name: name.into(),
            email: format!("{name}@example.com"),
            skills: vec!["Rust".into()],
            technologies: vec![],
            companies: vec!["Acme".into()],
            role: Some("Engineer".into()),
            location: None,
            years_experience: 5.0,
        }
    }

    #[tokio::test]
    async fn store_and_search_returns_matching_point() -> Result<()> {
        let db = LocalVectorDb::new(None);
        let ctx = RequestContext::new_request();
        db.ensure_collection(&ctx, 3).await?;

        let uid = Uid::new_random();
        let point = sample_point(uid, "Max", vec![0.1, 0.1, 0.1]);
        let written = db.store_vectors(&ctx, uid, vec![point]).await?;
        assert_eq!(written.len(), 1);

        let hits = db
            .search(&ctx, vec![0.1, 0.1, 0.1], VectorSearchOptions {
                limit: 5,
                min_score: None,
                filter: BTreeMap::new(),
            })
            .await?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].uid, uid);
        Ok(())
    }

    #[tokio::test]
    async fn delete_resume_vectors_removes_all_points_for_uid() -> Result<()> {
        let db = LocalVectorDb::new(None);
        let ctx = RequestContext::new_request();
        db.ensure_collection(&ctx, 3).await?;

        let uid = Uid::new_random();
        let point = sample_point(uid, "Max", vec![0.2, 0.2, 0.2]);
        db.store_vectors(&ctx, uid, vec![point]).await?;

        let removed = db.delete_resume_vectors(&ctx, uid).await?;
        assert_eq!(removed, 1);

        let hits = db
            .search(&ctx, vec![0.2, 0.2, 0.2], VectorSearchOptions {
                limit: 5,
                min_score: None,
                filter: BTreeMap::new(),
            })
            .await?;
        assert!(hits.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn search_applies_payload_filter() -> Result<()> {
        let db = LocalVectorDb::new(None);
        let ctx = RequestContext::new_request();
        db.ensure_collection(&ctx, 2).await?;

        let uid_a = Uid::new_random();
        let uid_b = Uid::new_random();
        db.store_vectors(&ctx, uid_a, vec![sample_point(uid_a, "Alice", vec![0.1, 0.1])])
            .await?;
        db.store_vectors(&ctx, uid_b, vec![sample_point(uid_b, "Bob", vec![0.1, 0.1])])
            .await?;

        let mut filter = BTreeMap::new();
        filter.insert("name".into(), Value::String("Bob".into()));
        let hits = db
            .search(&ctx, vec![0.1, 0.1], VectorSearchOptions {
                limit: 5,
                min_score: None,
                filter,
            })
            .await?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].uid, uid_b);
        Ok(())
    }
}
