//! # resumariner-testkit
//!
//! Test helpers and in-memory adapters: fakes for the ports that have no
//! in-process adapter of their own (LLM, embedding, job queue/store,
//! document extraction), plus shared error fixtures. Depends on `domain`,
//! `ports`, and `shared` only; never on `app`, `adapters`, or `infra`, so
//! every crate that depends on those can still pull in `testkit` for tests
//! without a dependency cycle.

pub mod errors;
pub mod in_memory;

/// Returns the testkit crate version.
#[must_use]
pub const fn testkit_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumariner_domain::domain_crate_version;
    use resumariner_ports::ports_crate_version;
    use resumariner_shared::shared_crate_version;

    fn workspace_deps() -> Vec<String> {
        let cargo_toml = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml"));
        let mut deps = Vec::new();
        let mut in_deps = false;

        for raw_line in cargo_toml.lines() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') {
                in_deps = line == "[dependencies]";
                continue;
            }
            if !in_deps {
                continue;
            }
            if line.starts_with("resumariner-") {
                let key = line.split('=').next().unwrap_or("").trim();
                let name = key.split('.').next().unwrap_or("").trim();
                deps.push(name.to_string());
            }
        }

        deps
    }

    /// testkit depends only on domain + ports + shared
    #[test]
    fn testkit_depends_only_on_domain_ports_and_shared() {
        let deps = workspace_deps();
        let allowed = ["resumariner-domain", "resumariner-ports", "resumariner-shared"];

        for dep in &deps {
            assert!(allowed.contains(&dep.as_str()), "unexpected dependency found: {dep}");
        }
    }

    #[test]
    fn testkit_crate_compiles() {
        let version = testkit_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn testkit_can_use_domain_ports_and_shared() {
        let domain_version = domain_crate_version();
        let ports_version = ports_crate_version();
        let shared_version = shared_crate_version();

        assert!(!domain_version.is_empty());
        assert!(!ports_version.is_empty());
        assert!(!shared_version.is_empty());
    }

    #[test]
    fn error_fixtures_are_available() {
        let codes = errors::common_error_codes();
        assert!(!codes.is_empty());
    }

    #[test]
    fn in_memory_adapters_are_available() {
        let _ = in_memory::NoopLogger;
    }
}
