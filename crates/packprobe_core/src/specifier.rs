use log::{debug, trace};
use path_clean::clean;
use std::path::Path;
use url::Url;

use crate::{
    constants::NODE_BUILTINS,
    error::ProbeError,
    manifest::{ManifestCache, PackageManifest},
    types::Location,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierKind {
    Builtin,
    AbsoluteUrl,
    Path,
    Bare,
}

pub fn classify(request: &str) -> SpecifierKind {
    let bare_name = request.strip_prefix("node:").unwrap_or(request);
    let head = bare_name.split('/').next().unwrap_or(bare_name);
    if request.starts_with("node:") || NODE_BUILTINS.contains(&head) {
        return SpecifierKind::Builtin;
    }
    if request.starts_with("http://") || request.starts_with("https://") {
        return SpecifierKind::AbsoluteUrl;
    }
    if request.starts_with("./") || request.starts_with("../") || request.starts_with('/') {
        return SpecifierKind::Path;
    }
    SpecifierKind::Bare
}

/// Resolve a specifier against an optional base into an ordered candidate
/// list. `Ok(None)` means the specifier is a builtin and not a dependency
/// at all; every other classification yields at least one candidate.
pub async fn resolve(
    request: &str,
    base: Option<&Location>,
    manifests: &ManifestCache,
) -> Result<Option<Vec<Location>>, ProbeError> {
    match classify(request) {
        SpecifierKind::Builtin => {
            trace!("Skipping builtin specifier: '{}'", request);
            Ok(None)
        }
        SpecifierKind::AbsoluteUrl => {
            let url = Url::parse(request).map_err(|e| ProbeError::InvalidLocation {
                specifier: request.to_string(),
                reason: e.to_string(),
            })?;
            Ok(Some(vec![Location::Remote(url)]))
        }
        SpecifierKind::Path => Ok(Some(vec![resolve_path(request, base)?])),
        SpecifierKind::Bare => Ok(Some(resolve_bare(request, manifests).await?)),
    }
}

fn resolve_path(request: &str, base: Option<&Location>) -> Result<Location, ProbeError> {
    match base {
        Some(Location::Local(from)) => {
            let dir = from.parent().unwrap_or(Path::new("."));
            let joined = clean(dir.join(request));
            trace!("Joined '{}' against {} -> {}", request, from.display(), joined.display());
            Ok(Location::Local(joined))
        }
        Some(Location::Remote(from)) => {
            let joined = from.join(request).map_err(|e| ProbeError::InvalidLocation {
                specifier: request.to_string(),
                reason: e.to_string(),
            })?;
            trace!("Joined '{}' against {} -> {}", request, from, joined);
            Ok(Location::Remote(joined))
        }
        // No base: this is the entry itself, taken as a raw local location.
        None => Ok(Location::Local(clean(request))),
    }
}

async fn resolve_bare(
    request: &str,
    manifests: &ManifestCache,
) -> Result<Vec<Location>, ProbeError> {
    let (pkg_spec, subpath) = split_bare(request);
    let manifest = manifests.lookup(pkg_spec).await;
    let base = package_base(manifests.cdn_base(), pkg_spec, manifest.as_deref());
    let targets = candidate_targets(manifest.as_deref(), subpath);
    debug!("Bare specifier '{}' -> {} candidate(s) under {}", request, targets.len(), base);

    targets
        .into_iter()
        .map(|rel| {
            let url = Url::parse(&format!("{}/{}", base, rel)).map_err(|e| {
                ProbeError::InvalidLocation {
                    specifier: request.to_string(),
                    reason: e.to_string(),
                }
            })?;
            Ok(Location::Remote(url))
        })
        .collect()
}

/// Split a bare specifier into its package part (scoped names keep both
/// segments, an inline `@version` stays attached) and optional subpath.
pub(crate) fn split_bare(request: &str) -> (&str, Option<&str>) {
    if let Some(rest) = request.strip_prefix('@') {
        match rest.find('/') {
            Some(i) => {
                let after = &rest[i + 1..];
                match after.find('/') {
                    Some(j) => (&request[..2 + i + j], Some(&after[j + 1..])),
                    None => (request, None),
                }
            }
            None => (request, None),
        }
    } else {
        match request.find('/') {
            Some(i) => (&request[..i], Some(&request[i + 1..])),
            None => (request, None),
        }
    }
}

/// Base location every candidate joins against: the manifest's resolved
/// `name@version` when the fetch succeeded, the spec as written otherwise.
pub(crate) fn package_base(
    cdn_base: &str,
    pkg_spec: &str,
    manifest: Option<&PackageManifest>,
) -> String {
    if let Some(m) = manifest
        && !m.name.is_empty()
        && let Some(v) = &m.version
    {
        format!("{}/{}@{}", cdn_base, m.name, v)
    } else {
        format!("{}/{}", cdn_base, pkg_spec)
    }
}

/// Ordered, deduplicated relative targets for a package, most preferred
/// first. Always non-empty.
pub(crate) fn candidate_targets(
    manifest: Option<&PackageManifest>,
    subpath: Option<&str>,
) -> Vec<String> {
    let mut rels: Vec<String> = Vec::new();
    match subpath {
        Some(sub) => {
            if let Some(m) = manifest {
                for key in [format!("./{}", sub), format!("./{}.js", sub)] {
                    if let Some(target) = m.resolve_export(&key) {
                        push_unique(&mut rels, &target);
                    }
                }
            }
            // Raw subpath stays as the final fallback.
            push_unique(&mut rels, sub);
        }
        None => {
            if let Some(m) = manifest {
                if let Some(target) = m.resolve_export(".") {
                    push_unique(&mut rels, &target);
                }
                if let Some(target) = &m.main {
                    push_unique(&mut rels, target);
                }
                if let Some(target) = &m.module {
                    push_unique(&mut rels, target);
                }
            }
            push_unique(&mut rels, "index.js");
        }
    }
    rels
}

fn push_unique(rels: &mut Vec<String>, target: &str) {
    let trimmed = target.trim_start_matches("./").to_string();
    if !trimmed.is_empty() && !rels.contains(&trimmed) {
        rels.push(trimmed);
    }
}
