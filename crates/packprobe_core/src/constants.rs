//! Constants for specifier classification and candidate fallbacks.
//!
//! Suffix lists are ordered: the fetcher tries them front to back and the
//! first hit wins, so reordering changes which file a directory import
//! resolves to.

/// Default CDN serving npm package contents and manifests.
pub const DEFAULT_CDN_BASE: &str = "https://cdn.jsdelivr.net/npm";

/// Suffixes tried against a local candidate path, in order. The empty suffix
/// accepts an exact path that is already a regular file.
pub const LOCAL_SUFFIXES: &[&str] = &["", ".js", ".mjs", ".cjs", ".ts", "/index.js"];

/// Suffixes retried against a remote candidate URL after the direct request
/// failed, provided the URL does not already name a source file.
pub const REMOTE_SUFFIXES: &[&str] = &[".js", ".mjs", "/index.js"];

/// Extensions that mark a URL path as already pointing at a source file,
/// which disables the remote suffix retries.
pub const SOURCE_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "jsx", "ts", "tsx", "json"];

/// Export-map condition names in resolution priority order. The first
/// condition present in a conditions object wins.
pub const EXPORT_CONDITIONS: &[&str] =
    &["production", "node", "require", "default", "import", "browser"];

/// Node.js builtin module names. Specifiers naming these (with or without
/// the `node:` prefix) are not dependencies and resolve to nothing.
pub const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];
