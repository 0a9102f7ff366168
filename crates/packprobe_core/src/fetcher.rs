use log::{trace, warn};
use reqwest::Client;
use std::path::PathBuf;
use url::Url;

use crate::{
    constants::{LOCAL_SUFFIXES, REMOTE_SUFFIXES, SOURCE_EXTENSIONS},
    error::ProbeError,
    types::{FetchedModule, Location},
};

/// Try each candidate in order, with suffix fallbacks, and return the first
/// hit together with its canonical location (post-resolution for local
/// files, post-redirect for remote ones).
pub async fn fetch(
    client: &Client,
    candidates: &[Location],
    specifier: &str,
) -> Result<FetchedModule, ProbeError> {
    let mut tried = 0usize;

    for candidate in candidates {
        match candidate {
            Location::Local(path) => {
                for suffix in LOCAL_SUFFIXES {
                    tried += 1;
                    let attempt = PathBuf::from(format!("{}{}", path.display(), suffix));
                    let Ok(meta) = tokio::fs::metadata(&attempt).await else {
                        continue;
                    };
                    if !meta.is_file() {
                        continue;
                    }
                    match tokio::fs::read_to_string(&attempt).await {
                        Ok(content) => {
                            let canonical = match tokio::fs::canonicalize(&attempt).await {
                                Ok(p) => p,
                                Err(_) => attempt.clone(),
                            };
                            trace!("Fetched local module: {}", canonical.display());
                            return Ok(FetchedModule::new(content, Location::Local(canonical)));
                        }
                        Err(e) => {
                            warn!("Failed to read {}: {}", attempt.display(), e);
                            continue;
                        }
                    }
                }
            }
            Location::Remote(url) => {
                tried += 1;
                if let Some(module) = fetch_remote(client, url).await {
                    return Ok(module);
                }
                if looks_like_source_file(url) {
                    continue;
                }
                for suffix in REMOTE_SUFFIXES {
                    tried += 1;
                    let Ok(retry) = Url::parse(&format!("{}{}", url, suffix)) else {
                        continue;
                    };
                    if let Some(module) = fetch_remote(client, &retry).await {
                        return Ok(module);
                    }
                }
            }
        }
    }

    Err(ProbeError::FetchNotFound { specifier: specifier.to_string(), tried })
}

async fn fetch_remote(client: &Client, url: &Url) -> Option<FetchedModule> {
    trace!("GET {}", url);
    let resp = client.get(url.clone()).send().await.ok()?;
    if !resp.status().is_success() {
        trace!("{} -> {}", url, resp.status());
        return None;
    }
    // The final URL after redirects is the canonical identity.
    let canonical = resp.url().clone();
    let content = resp.text().await.ok()?;
    Some(FetchedModule::new(content, Location::Remote(canonical)))
}

fn looks_like_source_file(url: &Url) -> bool {
    let path = url.path();
    SOURCE_EXTENSIONS.iter().any(|ext| path.ends_with(&format!(".{}", ext)))
}
