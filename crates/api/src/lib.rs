//! # resumariner-api
//!
//! Wire-format DTOs and external contracts for resumariner-agents.
//! This crate depends only on `domain`, `shared`, and `validate-derive`;
//! never on `app`, `ports`, `adapters`, or `infra`, so the API shape can be
//! consumed from both the HTTP surface and `bins/cli` without pulling in
//! infrastructure.

/// API v1 request/response DTOs.
pub mod v1;

/// Returns the API crate version.
#[must_use]
pub const fn api_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use resumariner_domain::domain_crate_version;
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

    /// api depends only on domain + shared + validate-derive
    #[test]
    fn api_depends_only_on_domain_shared_and_validate_derive() {
        let deps = workspace_deps();
        let allowed = [
            "resumariner-domain",
            "resumariner-shared",
            "resumariner-validate-derive",
        ];

        for dep in &deps {
            assert!(allowed.contains(&dep.as_str()), "unexpected dependency found: {dep}");
        }
    }

    #[test]
    fn api_crate_compiles() {
        let version = api_crate_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn api_can_use_domain_and_shared() {
        let domain_version = domain_crate_version();
        let shared_version = shared_crate_version();

        assert!(!domain_version.is_empty());
        assert!(!shared_version.is_empty());
    }
}
