//! Graph store adapter construction. Production always talks to Neo4j over
//! HTTP/Cypher; the in-memory adapter is reserved for tests and lives in
//! `resumariner-adapters::graph_store::in_memory` directly, with no factory
//! path of its own (there is no config knob to select it).

use crate::env_check::InfraResult;
use resumariner_adapters::graph_store::neo4j::{Neo4jGraphConfig, Neo4jGraphStore};
use resumariner_config::GraphStoreConfig;
use resumariner_ports::GraphStorePort;
use resumariner_shared::SecretString;
use std::sync::Arc;

/// Split a combined `user:password` secret into its two halves.
fn split_credentials(auth: &SecretString) -> (Box<str>, Box<str>) {
    let exposed = auth.expose();
    match exposed.split_once(':') {
        Some((username, password)) => (username.into(), password.into()),
        None => (exposed.into(), "".into()),
    }
}

/// Build the Neo4j graph store adapter, splitting the combined
/// `graph_store_auth` secret into HTTP basic-auth username/password.
pub fn build_graph_store(
    config: &GraphStoreConfig,
    auth: Option<&SecretString>,
) -> InfraResult<Arc<dyn GraphStorePort>> {
    let (username, password) = match auth {
        Some(auth) => {
            let (username, password) = split_credentials(auth);
            (Some(username), Some(password))
        }
        None => (None, None),
    };
    let adapter_config = Neo4jGraphConfig::from_graph_store_config(config, username, password);
    let adapter = Neo4jGraphStore::new(&adapter_config)?;
    Ok(Arc::new(adapter))
}
