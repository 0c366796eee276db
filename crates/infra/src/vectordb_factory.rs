//! Vector store adapter selection: local linear-scan index for development
//! and `--local` CLI runs, Qdrant for production, chosen by
//! `VectorDbConfig::mode`.

use crate::env_check::InfraResult;
use resumariner_adapters::vectordb_local::LocalVectorDb;
use resumariner_adapters::vectordb_qdrant::{QdrantAdapterConfig, QdrantVectorDb};
use resumariner_config::{VectorDbConfig, VectorDbMode};
use resumariner_ports::VectorDbPort;
use resumariner_shared::SecretString;
use std::sync::Arc;

/// Build the vector store adapter selected by `config.mode`.
pub fn build_vectordb_port(
    config: &VectorDbConfig,
    qdrant_api_key: Option<&SecretString>,
) -> InfraResult<Arc<dyn VectorDbPort>> {
    match config.mode {
        VectorDbMode::Local => Ok(Arc::new(LocalVectorDb::new(
            config.local.snapshot_dir.as_deref(),
        ))),
        VectorDbMode::Qdrant => {
            let adapter_config = QdrantAdapterConfig::from_qdrant_config(
                &config.qdrant,
                qdrant_api_key.map(|key| key.expose().into()),
                config.timeout_ms,
            );
            let adapter = QdrantVectorDb::new(&adapter_config)?;
            Ok(Arc::new(adapter))
        }
    }
}
