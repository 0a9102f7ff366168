use std::{fmt, path::PathBuf};

use url::Url;

/// Canonical identity of module content: a resolved filesystem path or a
/// fully-qualified URL on the CDN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    Local(PathBuf),
    Remote(Url),
}

impl Location {
    pub fn origin(&self) -> Origin {
        match self {
            Location::Local(_) => Origin::Local,
            Location::Remote(_) => Origin::Remote,
        }
    }

    /// Extension of the final path segment, if any.
    pub fn extension(&self) -> Option<&str> {
        match self {
            Location::Local(p) => p.extension().and_then(|e| e.to_str()),
            Location::Remote(u) => u.path().rsplit('/').next().and_then(|seg| {
                let (_, ext) = seg.rsplit_once('.')?;
                if ext.is_empty() { None } else { Some(ext) }
            }),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Local(p) => write!(f, "{}", p.display()),
            Location::Remote(u) => write!(f, "{}", u),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    Remote,
}

#[derive(Debug, Clone)]
pub struct Specifier {
    pub request: String,
    pub kind: SpecKind,
}

#[derive(Debug, Clone)]
pub enum SpecKind {
    Static,
    Dynamic,
}

/// One successfully fetched module: its source text, the canonical location
/// dedup keys on, and where the content came from.
#[derive(Debug, Clone)]
pub struct FetchedModule {
    pub content: String,
    pub location: Location,
    pub origin: Origin,
}

impl FetchedModule {
    pub fn new(content: String, location: Location) -> Self {
        let origin = location.origin();
        Self { content, location, origin }
    }
}
