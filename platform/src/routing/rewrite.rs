//! Hostname and path rewriting for the artifact router
//!
//! Routing is a pure, stateless, per-request string transformation: the
//! subdomain names the deployment and the path names the artifact.

use crate::store::OUTPUT_PREFIX;

/// Subdomain of a request host: the label before the first `.`, with any
/// port stripped. `None` when the host yields no label at all.
pub fn subdomain_of(host: &str) -> Option<String> {
    let without_port = host.split(':').next().unwrap_or("");
    let label = without_port.split('.').next().unwrap_or("");

    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

/// Rewrite a request path into a store key path.
///
/// Root and explicit `/index.html` requests normalize to the default
/// document. Without a subdomain the path falls through under the bare
/// prefix so the origin answers not-found instead of the router failing.
pub fn rewrite_path(subdomain: Option<&str>, path: &str) -> String {
    let document = if path.is_empty() || path == "/" || path == "/index.html" {
        "/index.html"
    } else {
        path
    };

    match subdomain {
        Some(slug) => format!("{}/{}{}", OUTPUT_PREFIX, slug, document),
        None => format!("{}{}", OUTPUT_PREFIX, document),
    }
}
