//! Core resolution engine for packprobe.
//!
//! This crate provides the pieces the size estimator is built from:
//! - Classifying and resolving module specifiers (builtin, absolute URL,
//!   relative/absolute path, bare package) into candidate locations
//! - Fetching package manifests from a CDN and walking their export maps
//! - Fetching module content with extension/suffix fallbacks
//! - Extracting dependency specifiers from parsed source, pruning branches
//!   that are unreachable in a production build

mod constants;
mod error;
mod fetcher;
mod manifest;
mod parser;
mod specifier;
mod types;

// Re-export public API
pub use constants::{DEFAULT_CDN_BASE, EXPORT_CONDITIONS, LOCAL_SUFFIXES, NODE_BUILTINS, REMOTE_SUFFIXES};
pub use error::ProbeError;
pub use fetcher::fetch;
pub use manifest::{ManifestCache, PackageManifest};
pub use parser::dependencies_of;
pub use specifier::{SpecifierKind, classify, resolve};
pub use types::{FetchedModule, Location, Origin, SpecKind, Specifier};
