use dashmap::DashMap;
use log::{debug, trace, warn};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::constants::EXPORT_CONDITIONS;

/// Subset of `package.json` the resolver cares about. The export map is kept
/// as raw JSON and walked on demand.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub exports: Option<Value>,
}

impl PackageManifest {
    /// Look up `key` ("." or "./<subpath>") in the export map, resolving
    /// nested condition objects by fixed priority. Returns the relative
    /// target path on a hit.
    pub fn resolve_export(&self, key: &str) -> Option<String> {
        let exports = self.exports.as_ref()?;
        match exports {
            Value::String(s) if key == "." => Some(s.clone()),
            Value::Object(map) => {
                if let Some(entry) = map.get(key) {
                    return resolve_conditions(entry);
                }
                // A map with no "./" keys is itself a conditions object for
                // the root export.
                if key == "." && !map.keys().any(|k| k.starts_with('.')) {
                    return resolve_conditions(exports);
                }
                None
            }
            _ => None,
        }
    }
}

fn resolve_conditions(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => {
            // First present condition wins; no fallthrough to later ones.
            for cond in EXPORT_CONDITIONS {
                if let Some(v) = map.get(*cond) {
                    trace!("Export condition matched: '{}'", cond);
                    return resolve_conditions(v);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(resolve_conditions),
        _ => None,
    }
}

/// Run-scoped manifest cache keyed by the package spec as written
/// (`name` or `name@version`). Misses are cached too so an unavailable
/// package is only requested once.
pub struct ManifestCache {
    client: reqwest::Client,
    cdn_base: String,
    entries: DashMap<String, Option<Arc<PackageManifest>>>,
}

impl ManifestCache {
    pub fn new(client: reqwest::Client, cdn_base: &str) -> Self {
        Self {
            client,
            cdn_base: cdn_base.trim_end_matches('/').to_string(),
            entries: DashMap::new(),
        }
    }

    pub fn cdn_base(&self) -> &str {
        &self.cdn_base
    }

    pub async fn lookup(&self, package: &str) -> Option<Arc<PackageManifest>> {
        if let Some(hit) = self.entries.get(package) {
            trace!("Cache hit for manifest: '{}'", package);
            return hit.clone();
        }

        let url = format!("{}/{}/package.json", self.cdn_base, package);
        debug!("Fetching manifest: {}", url);
        let fetched = self.fetch_manifest(&url).await;
        if fetched.is_none() {
            warn!("No manifest available for '{}'", package);
        }

        let entry = fetched.map(Arc::new);
        self.entries.insert(package.to_string(), entry.clone());
        entry
    }

    async fn fetch_manifest(&self, url: &str) -> Option<PackageManifest> {
        let resp = self.client.get(url).send().await.ok()?;
        if !resp.status().is_success() {
            trace!("Manifest request returned {}", resp.status());
            return None;
        }
        let text = resp.text().await.ok()?;
        serde_json::from_str(&text).ok()
    }

    /// Seed an entry directly, bypassing the network.
    pub fn insert(&self, package: &str, manifest: PackageManifest) {
        self.entries.insert(package.to_string(), Some(Arc::new(manifest)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest_with_exports(exports: Value) -> PackageManifest {
        PackageManifest { exports: Some(exports), ..Default::default() }
    }

    #[test]
    fn test_string_exports_resolves_root_only() {
        let m = manifest_with_exports(json!("./dist/index.js"));
        assert_eq!(m.resolve_export("."), Some("./dist/index.js".to_string()));
        assert_eq!(m.resolve_export("./sub"), None);
    }

    #[test]
    fn test_subpath_lookup() {
        let m = manifest_with_exports(json!({"./isEqual": "./isEqual.js"}));
        assert_eq!(m.resolve_export("./isEqual"), Some("./isEqual.js".to_string()));
        assert_eq!(m.resolve_export("./other"), None);
    }

    #[test]
    fn test_condition_priority() {
        // "production" outranks "import" regardless of key order.
        let m = manifest_with_exports(json!({
            ".": {"import": "./esm.js", "production": "./prod.js"}
        }));
        assert_eq!(m.resolve_export("."), Some("./prod.js".to_string()));
    }

    #[test]
    fn test_nested_conditions_recurse() {
        let m = manifest_with_exports(json!({
            ".": {"node": {"require": "./cjs.js", "default": "./node.js"}}
        }));
        assert_eq!(m.resolve_export("."), Some("./cjs.js".to_string()));
    }

    #[test]
    fn test_first_condition_wins_without_fallthrough() {
        // "node" is present but resolves to nothing; later conditions are
        // not consulted.
        let m = manifest_with_exports(json!({
            ".": {"node": {}, "default": "./fallback.js"}
        }));
        assert_eq!(m.resolve_export("."), None);
    }

    #[test]
    fn test_root_conditions_object() {
        let m = manifest_with_exports(json!({"require": "./cjs.js", "import": "./esm.js"}));
        assert_eq!(m.resolve_export("."), Some("./cjs.js".to_string()));
    }

    #[test]
    fn test_array_target_takes_first_resolvable() {
        let m = manifest_with_exports(json!({"./sub": [{"unknown": "./a.js"}, "./b.js"]}));
        assert_eq!(m.resolve_export("./sub"), Some("./b.js".to_string()));
    }

    #[test]
    fn test_no_exports_field() {
        let m = PackageManifest::default();
        assert_eq!(m.resolve_export("."), None);
    }
}
