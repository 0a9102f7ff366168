use dashmap::DashSet;
use log::{debug, info, trace, warn};
use std::sync::Arc;
use tokio::task::JoinSet;

use packprobe_core::{
    FetchedModule, Location, ManifestCache, ProbeError, dependencies_of, fetch, resolve,
};

use crate::bundle::Bundle;

/// Owns all traversal state for one run: the manifest cache, the visited
/// set, and the HTTP client shared across tasks. Nothing survives the run.
pub struct Orchestrator {
    shared: Arc<Shared>,
}

struct Shared {
    client: reqwest::Client,
    manifests: ManifestCache,
    visited: DashSet<String>,
}

impl Orchestrator {
    pub fn new(cdn_base: &str) -> Self {
        let client = reqwest::Client::new();
        let manifests = ManifestCache::new(client.clone(), cdn_base);
        Self { shared: Arc::new(Shared { client, manifests, visited: DashSet::new() }) }
    }

    /// Drive the fan-out traversal from one entry specifier. Every newly
    /// discovered specifier spawns an independent task; the run completes,
    /// exactly once, when the join set drains. A single module's failure is
    /// logged and swallowed without touching its siblings.
    pub async fn run(&self, entry: &str) -> Result<Bundle, ProbeError> {
        info!("Resolving dependency graph for '{}'", entry);
        let mut tasks: JoinSet<Result<Option<Expansion>, ProbeError>> = JoinSet::new();
        tasks.spawn(process(Arc::clone(&self.shared), entry.to_string(), None));

        let mut bundle = Bundle::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(Some(expansion))) => {
                    let Expansion { module, discovered } = expansion;
                    debug!(
                        "Bundled {} ({:?}, {} new edge(s))",
                        module.location,
                        module.origin,
                        discovered.len()
                    );
                    for request in discovered {
                        tasks.spawn(process(
                            Arc::clone(&self.shared),
                            request,
                            Some(module.location.clone()),
                        ));
                    }
                    bundle.push(module);
                }
                // Builtin specifier or an already-visited location.
                Ok(Ok(None)) => {}
                Ok(Err(e)) => warn!("Skipping module: {}", e),
                Err(e) => warn!("Resolution task failed: {}", e),
            }
        }

        if bundle.is_empty() {
            return Err(ProbeError::EmptyBundle(entry.to_string()));
        }
        info!("Bundled {} module(s)", bundle.len());
        Ok(bundle)
    }
}

struct Expansion {
    module: FetchedModule,
    discovered: Vec<String>,
}

async fn process(
    shared: Arc<Shared>,
    request: String,
    base: Option<Location>,
) -> Result<Option<Expansion>, ProbeError> {
    trace!("Resolving '{}'", request);
    let Some(candidates) = resolve(&request, base.as_ref(), &shared.manifests).await? else {
        return Ok(None);
    };

    // Reserve before any I/O so two tasks can never fetch the same
    // preferred candidate.
    if !shared.visited.insert(candidates[0].to_string()) {
        trace!("Already visited: {}", candidates[0]);
        return Ok(None);
    }

    let module = fetch(&shared.client, &candidates, &request).await?;

    // Suffix fallbacks and redirects can land two reservations on the same
    // canonical location; a second insert on the canonical key closes that
    // window before the bundle append.
    let canonical = module.location.to_string();
    if canonical != candidates[0].to_string() && !shared.visited.insert(canonical) {
        trace!("Canonical location already bundled: {}", module.location);
        return Ok(None);
    }

    let discovered = match dependencies_of(&module.content, &module.location) {
        Ok(specs) => specs.into_iter().map(|s| s.request).collect(),
        Err(e) => {
            // Unparseable modules still count toward the bundle; they just
            // contribute no edges.
            warn!("{}", e);
            Vec::new()
        }
    };

    Ok(Some(Expansion { module, discovered }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
    }

    fn entry_spec(dir: &Path, name: &str) -> String {
        dir.join(name).to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_entry_with_zero_dependencies() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "index.js", "export const x = 1;");

        let orchestrator = Orchestrator::new("https://cdn.invalid/npm");
        let bundle = orchestrator.run(&entry_spec(temp_dir.path(), "index.js")).await.unwrap();
        assert_eq!(bundle.len(), 1);
    }

    #[tokio::test]
    async fn test_diamond_graph_dedups() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "index.js", "import './a'; import './b';");
        create_test_file(temp_dir.path(), "a.js", "import './c';");
        create_test_file(temp_dir.path(), "b.js", "import './c';");
        create_test_file(temp_dir.path(), "c.js", "export const c = 3;");

        let orchestrator = Orchestrator::new("https://cdn.invalid/npm");
        let bundle = orchestrator.run(&entry_spec(temp_dir.path(), "index.js")).await.unwrap();
        assert_eq!(bundle.len(), 4);

        let c_count = bundle
            .modules()
            .iter()
            .filter(|m| m.location.to_string().ends_with("c.js"))
            .count();
        assert_eq!(c_count, 1);
    }

    #[tokio::test]
    async fn test_alias_specifiers_dedup_on_canonical_location() {
        let temp_dir = TempDir::new().unwrap();
        // Both specifiers resolve to the same canonical file through the
        // extension fallback; only one may reach the bundle.
        create_test_file(temp_dir.path(), "index.js", "import './c'; import './c.js';");
        create_test_file(temp_dir.path(), "c.js", "export const c = 3;");

        let orchestrator = Orchestrator::new("https://cdn.invalid/npm");
        let bundle = orchestrator.run(&entry_spec(temp_dir.path(), "index.js")).await.unwrap();
        assert_eq!(bundle.len(), 2);

        let c_count = bundle
            .modules()
            .iter()
            .filter(|m| m.location.to_string().ends_with("c.js"))
            .count();
        assert_eq!(c_count, 1);
    }

    #[tokio::test]
    async fn test_circular_graph_completes() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "index.js", "import './a';");
        create_test_file(temp_dir.path(), "a.js", "import './b';");
        create_test_file(temp_dir.path(), "b.js", "import './a';");

        let orchestrator = Orchestrator::new("https://cdn.invalid/npm");
        let bundle = orchestrator.run(&entry_spec(temp_dir.path(), "index.js")).await.unwrap();
        assert_eq!(bundle.len(), 3);
    }

    #[tokio::test]
    async fn test_pruned_branch_never_fetched() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(
            temp_dir.path(),
            "index.js",
            r#"if (process.env.NODE_ENV !== "production") { require("./dev"); }"#,
        );
        create_test_file(temp_dir.path(), "dev.js", "// dev only");

        let orchestrator = Orchestrator::new("https://cdn.invalid/npm");
        let bundle = orchestrator.run(&entry_spec(temp_dir.path(), "index.js")).await.unwrap();
        assert_eq!(bundle.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_dependency_is_swallowed() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "index.js", "import './missing'; import './a';");
        create_test_file(temp_dir.path(), "a.js", "// a");

        let orchestrator = Orchestrator::new("https://cdn.invalid/npm");
        let bundle = orchestrator.run(&entry_spec(temp_dir.path(), "index.js")).await.unwrap();
        // The unresolvable sibling does not take down the run.
        assert_eq!(bundle.len(), 2);
    }

    #[tokio::test]
    async fn test_builtin_imports_are_not_dependencies() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "index.js", "import fs from 'fs'; import 'node:path';");

        let orchestrator = Orchestrator::new("https://cdn.invalid/npm");
        let bundle = orchestrator.run(&entry_spec(temp_dir.path(), "index.js")).await.unwrap();
        assert_eq!(bundle.len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_module_bundled_raw() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "index.js", "import './broken';");
        create_test_file(temp_dir.path(), "broken.js", "function { nope");

        let orchestrator = Orchestrator::new("https://cdn.invalid/npm");
        let bundle = orchestrator.run(&entry_spec(temp_dir.path(), "index.js")).await.unwrap();
        assert_eq!(bundle.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_bundle_is_fatal() {
        let temp_dir = TempDir::new().unwrap();

        let orchestrator = Orchestrator::new("https://cdn.invalid/npm");
        let err =
            orchestrator.run(&entry_spec(temp_dir.path(), "nope.js")).await.unwrap_err();
        assert!(matches!(err, ProbeError::EmptyBundle(_)));
    }
}
