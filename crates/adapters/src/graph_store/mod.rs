//! Graph store adapters: an HTTP/Cypher adapter for Neo4j, and an in-memory
//! adjacency-map adapter for tests.

pub mod in_memory;
pub mod neo4j;

pub use in_memory::InMemoryGraphStore;
pub use neo4j::{Neo4jGraphConfig, Neo4jGraphStore};
