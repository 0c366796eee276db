//! Composition root: wires every adapter into the use-case dependency
//! bundles `resumariner-app` expects, plus the logger/telemetry/circuit
//! breaker singletons shared across all of them.

use crate::embedding_factory::build_embedding_port;
use crate::env_check::InfraResult;
use crate::graph_store_factory::build_graph_store;
use crate::job_factory::{build_job_queue, build_job_store};
use crate::llm_factory::build_llm_port;
use crate::telemetry_factory::{build_circuit_breaker, build_logger, build_telemetry};
use crate::vectordb_factory::build_vectordb_port;
use resumariner_adapters::document_extractor::ReferencePdfExtractor;
use resumariner_app::{IngestionDeps, RagDeps, SearchCoordinatorDeps};
use resumariner_config::BackendEnv;
use resumariner_config::ValidatedBackendConfig;
use resumariner_ports::{LlmPort, LoggerPort, TelemetryPort};
use resumariner_shared::CircuitBreaker;
use std::sync::Arc;

/// Every assembled dependency bundle plus the shared observability
/// singletons, built once per process from validated config and the raw
/// environment.
pub struct BackendDeps {
    pub ingestion: Arc<IngestionDeps>,
    pub search: Arc<SearchCoordinatorDeps>,
    pub rag: Arc<RagDeps>,
    pub llm: Arc<dyn LlmPort>,
    pub logger: Arc<dyn LoggerPort>,
    pub telemetry: Arc<dyn TelemetryPort>,
    pub circuit_breaker: Arc<CircuitBreaker>,
}

/// Build every adapter and assemble the use-case dependency bundles.
pub fn build_deps(config: &ValidatedBackendConfig, env: &BackendEnv) -> InfraResult<BackendDeps> {
    let config = config.as_ref();

    let circuit_breaker = build_circuit_breaker(&config.core.circuit_breaker);

    let document_extractor = Arc::new(ReferencePdfExtractor);
    let embedding = build_embedding_port(
        &config.embedding,
        env.embedding_api_key.as_ref(),
        Arc::clone(&circuit_breaker),
    )?;
    let vector_db = build_vectordb_port(&config.vector_db, env.vector_db_qdrant_api_key.as_ref())?;
    let graph_store = build_graph_store(&config.graph_store, env.graph_store_auth.as_ref())?;
    let llm = build_llm_port(&config.llm, env.llm_api_key.as_ref(), &config.core.retry)?;
    let job_queue = build_job_queue(&config.job_queue)?;
    let job_store = build_job_store(&config.job_queue)?;

    let logger = build_logger();
    let telemetry = build_telemetry();

    let ingestion = Arc::new(IngestionDeps {
        document_extractor,
        llm: Arc::clone(&llm),
        embedding: Arc::clone(&embedding),
        vector_db: Arc::clone(&vector_db),
        graph_store: Arc::clone(&graph_store),
        job_store,
        job_queue,
    });
    let search = Arc::new(SearchCoordinatorDeps {
        embedding: Arc::clone(&embedding),
        vector_db: Arc::clone(&vector_db),
        graph_store: Arc::clone(&graph_store),
    });
    let rag = Arc::new(RagDeps {
        llm: Arc::clone(&llm),
        embedding,
        vector_db,
        graph_store,
        telemetry: Arc::clone(&telemetry),
    });

    Ok(BackendDeps {
        ingestion,
        search,
        rag,
        llm,
        logger,
        telemetry,
        circuit_breaker,
    })
}
