//! # resumariner-vector
//!
//! Vector indexing kernel and related APIs.
//! This crate depends only on `shared`.
//!
//! Per-resume point counts are small (tens, not millions): the index here is
//! a linear-scan cosine index, not an ANN structure. It exists to back tests
//! and the `--local` CLI mode; production search goes through the Qdrant
//! adapter instead.

use resumariner_shared::{ErrorClass, ErrorCode, ErrorEnvelope, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

const VECTOR_SNAPSHOT_VERSION: u32 = 1;

/// Tuning for the linear-scan index. Kept as a config knob even though the
/// current engine only consults `max_elements` as an allocation hint, so
/// callers configuring an ANN-backed engine later don't need to change
/// their config shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexParams {
    /// Expected number of elements (allocation hint).
    pub max_elements: usize,
}

impl Default for IndexParams {
    fn default() -> Self {
        Self {
            max_elements: 100_000,
        }
    }
}

/// Record stored inside the vector kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorRecord {
    /// Stable external identifier for this vector.
    pub id: Box<str>,
    /// Dense vector payload.
    pub vector: Vec<f32>,
}

/// Serialized snapshot for local persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorSnapshot {
    /// Snapshot schema version.
    pub version: u32,
    /// Vector dimensionality.
    pub dimension: u32,
    /// Index parameters.
    pub params: IndexParams,
    /// Stored vector records.
    pub records: Vec<VectorRecord>,
}

/// Search match with similarity score.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    /// External identifier for this vector.
    pub id: Box<str>,
    /// Similarity score in [0, 1].
    pub score: f32,
}

/// In-memory linear-scan cosine-similarity vector index.
pub struct VectorIndex {
    dimension: u32,
    params: IndexParams,
    records: Vec<VectorRecord>,
    id_to_index: HashMap<Box<str>, usize>,
    deleted: HashSet<usize>,
}

impl VectorIndex {
    /// Create a new vector index for the given dimension.
    pub fn new(dimension: u32, params: IndexParams) -> Result<Self> {
        if dimension == 0 {
            return Err(ErrorEnvelope::expected(
                ErrorCode::new("vector", "invalid_dimension"),
                "dimension must be greater than zero",
            ));
        }
        Ok(Self {
            dimension,
            params,
            records: Vec::new(),
            id_to_index: HashMap::new(),
            deleted: HashSet::new(),
        })
    }

    /// Return the vector dimension.
    #[must_use]
    pub const fn dimension(&self) -> u32 {
        self.dimension
    }

    /// Insert or update records in the index.
    pub fn insert(&mut self, records: Vec<VectorRecord>) -> Result<()> {
        for record in records {
            ensure_dimension(self.dimension, &record.vector)?;

            let index = self.records.len();
            if let Some(previous) = self.id_to_index.insert(record.id.clone(), index) {
                self.deleted.insert(previous);
            }

            self.records.push(record);
        }
        Ok(())
    }

    /// Delete records by external id (best-effort).
    pub fn delete(&mut self, ids: &[Box<str>]) -> Result<()> {
        for id in ids {
            if let Some(index) = self.id_to_index.remove(id.as_ref()) {
                self.deleted.insert(index);
            }
        }
        Ok(())
    }

    /// Search for nearest neighbours and return sorted matches.
    pub fn search(&self, query: &[f32], limit: usize) -> Result<Vec<VectorMatch>> {
        if self.records.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        ensure_dimension(self.dimension, query)?;

        let mut matches: Vec<VectorMatch> = self
            .records
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.deleted.contains(index))
            .map(|(_, record)| VectorMatch {
                id: record.id.clone(),
                score: cosine_similarity(query, &record.vector),
            })
            .collect();

        matches.sort_by(|a, b| {
            let score = b.score.total_cmp(&a.score);
            if score != std::cmp::Ordering::Equal {
                return score;
            }
            a.id.cmp(&b.id)
        });
        matches.truncate(limit);
        Ok(matches)
    }

    /// Return the record for a given id.
    #[must_use]
    pub fn record_for_id(&self, id: &str) -> Option<&VectorRecord> {
        self.id_to_index
            .get(id)
            .and_then(|index| self.records.get(*index))
    }

    /// Export the index into a snapshot.
    #[must_use]
    pub fn snapshot(&self) -> VectorSnapshot {
        let mut ordered: BTreeMap<&str, &VectorRecord> = BTreeMap::new();
        for (id, index) in &self.id_to_index {
            if let Some(record) = self.records.get(*index) {
                ordered.insert(id.as_ref(), record);
            }
        }

        let records = ordered
            .into_values()
            .cloned()
            .collect::<Vec<VectorRecord>>();

        VectorSnapshot {
            version: VECTOR_SNAPSHOT_VERSION,
            dimension: self.dimension,
            params: self.params,
            records,
        }
    }

    /// Restore a vector index from a snapshot.
    pub fn from_snapshot(snapshot: VectorSnapshot) -> Result<Self> {
        if snapshot.version != VECTOR_SNAPSHOT_VERSION {
            return Err(ErrorEnvelope::expected(
                ErrorCode::new("vector", "snapshot_version_mismatch"),
                "snapshot version mismatch",
            )
            .with_metadata("found", snapshot.version.to_string())
            .with_metadata("expected", VECTOR_SNAPSHOT_VERSION.to_string()));
        }

        let mut params = snapshot.params;
        params.max_elements = params.max_elements.max(snapshot.records.len().max(1));

        let mut index = Self::new(snapshot.dimension, params)?;
        index.insert(snapshot.records)?;
        Ok(index)
    }
}

fn ensure_dimension(dimension: u32, vector: &[f32]) -> Result<()> {
    let dimension = usize::try_from(dimension).map_err(|_| {
        ErrorEnvelope::unexpected(
            ErrorCode::new("vector", "invalid_dimension"),
            "dimension conversion overflow",
            ErrorClass::NonRetriable,
        )
    })?;
    if vector.len() != dimension {
        return Err(ErrorEnvelope::expected(
            ErrorCode::new("vector", "invalid_dimension"),
            "vector dimension mismatch",
        )
        .with_metadata("expected", dimension.to_string())
        .with_metadata("found", vector.len().to_string()));
    }
    Ok(())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Returns the vector crate version.
#[must_use]
pub const fn vector_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumariner_shared::shared_crate_version;

    #[test]
    fn vector_crate_compiles() {
        let version = vector_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn vector_can_use_shared() {
        let shared_version = shared_crate_version();
        assert!(!shared_version.is_empty());
    }

    #[test]
    fn snapshot_roundtrip_restores_index() -> Result<()> {
        let mut index = VectorIndex::new(2, IndexParams::default())?;
        index.insert(vec![VectorRecord {
            id: "a".into(),
            vector: vec![0.5, 0.5],
        }])?;

        let snapshot = index.snapshot();
        let restored = VectorIndex::from_snapshot(snapshot)?;
        let matches = restored.search(&[0.5, 0.5], 1)?;

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].id, "a".into());
        Ok(())
    }

    #[test]
    fn search_prefers_closer_vectors() -> Result<()> {
        let mut index = VectorIndex::new(2, IndexParams::default())?;
        index.insert(vec![
            VectorRecord {
                id: "near".into(),
                vector: vec![0.1, 0.1],
            },
            VectorRecord {
                id: "far".into(),
                vector: vec![0.9, 0.1],
            },
        ])?;

        let matches = index.search(&[0.1, 0.1], 2)?;
        assert_eq!(matches.first().map(|m| m.id.as_ref()), Some("near"));
        Ok(())
    }

    #[test]
    fn deleted_records_are_excluded_from_search() -> Result<()> {
        let mut index = VectorIndex::new(2, IndexParams::default())?;
        index.insert(vec![VectorRecord {
            id: "a".into(),
            vector: vec![0.2, 0.2],
        }])?;
        index.delete(&["a".into()])?;

        let matches = index.search(&[0.2, 0.2], 5)?;
        assert!(matches.is_empty());
        Ok(())
    }

    #[test]
    fn invalid_dimension_rejected() {
        let result = VectorIndex::new(0, IndexParams::default());
        assert!(result.is_err());
    }
}
