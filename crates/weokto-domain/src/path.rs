//! Tenant namespace rewriting for page paths.

use crate::tenant::Tenant;

/// Path prefixes that are never rewritten (API routes, probes, build output, static files).
const PASSTHROUGH_PREFIXES: &[&str] = &[
    "/api",
    "/healthz",
    "/readyz",
    "/_next",
    "/_build",
    "/static",
    "/assets",
];

/// Returns `true` when the path must reach the router untouched.
///
/// Covers API and build/static prefixes plus anything whose last segment
/// carries a file extension (`/robots.txt`, `/img/logo.svg`).
pub fn is_passthrough(path: &str) -> bool {
    if PASSTHROUGH_PREFIXES
        .iter()
        .any(|prefix| has_segment_prefix(path, prefix))
    {
        return true;
    }
    path.rsplit('/')
        .next()
        .is_some_and(|last| last.contains('.'))
}

/// Compute the tenant-namespaced path, or `None` when no rewrite is needed.
///
/// `/` maps to `/<prefix>`; any other path becomes `/<prefix>/<path>`.
/// Paths already under the tenant prefix are left alone, so applying the
/// rewrite twice never double-prefixes.
pub fn tenant_path(path: &str, tenant: Tenant) -> Option<String> {
    if is_passthrough(path) {
        return None;
    }
    let prefix = format!("/{}", tenant.prefix());
    if has_segment_prefix(path, &prefix) {
        return None;
    }
    let rest = path.trim_start_matches('/');
    if rest.is_empty() {
        Some(prefix)
    } else {
        Some(format!("{prefix}/{rest}"))
    }
}

/// `path` equals `prefix` or continues with a `/` right after it.
fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
