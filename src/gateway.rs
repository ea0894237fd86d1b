use crate::error::ClientResult;
use url::Url;

/// Supplies the scheme+host prefix prepended to every request path
pub trait GatewayResolver: Send + Sync {
    fn base_url(&self) -> Url;
}

/// Gateway fixed at construction time
#[derive(Debug, Clone)]
pub struct StaticGateway {
    base_url: Url,
}

impl StaticGateway {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }
}

impl GatewayResolver for StaticGateway {
    fn base_url(&self) -> Url {
        self.base_url.clone()
    }
}

/// Gateway prefix without trailing slash, e.g. `https://host/prefix`
fn prefix(base: &Url) -> &str {
    base.as_str().trim_end_matches('/')
}

/// Append `path` to the gateway.
///
/// Unlike `Url::join`, a path prefix on the gateway itself is kept.
pub fn join_path(base: &Url, path: &str) -> ClientResult<Url> {
    let separator = if path.starts_with('/') { "" } else { "/" };
    Ok(Url::parse(&format!("{}{}{}", prefix(base), separator, path))?)
}

/// Turn a "next" cursor back into a gateway-relative path.
///
/// URLs under the gateway lose the gateway prefix. Anything else keeps only
/// its path and query so the follow-up call still goes to the gateway.
/// A leading gateway path (e.g. `/gw` for `https://host/gw`) is dropped from
/// relative cursors too, since [`join_path`] adds it back.
pub fn strip_gateway(base: &Url, cursor: &str) -> String {
    let gateway = prefix(base);
    if let Some(rest) = cursor.strip_prefix(gateway) {
        if is_boundary(rest) {
            return rest.to_string();
        }
    }

    let relative = match Url::parse(cursor) {
        Ok(url) => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
        Err(_) => cursor.to_string(),
    };
    strip_base_path(base, relative)
}

fn strip_base_path(base: &Url, path: String) -> String {
    let base_path = base.path().trim_end_matches('/');
    if base_path.is_empty() {
        return path;
    }
    if let Some(rest) = path.strip_prefix(base_path) {
        if is_boundary(rest) {
            return rest.to_string();
        }
    }
    path
}

fn is_boundary(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with('/') || rest.starts_with('?')
}
