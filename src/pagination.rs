use crate::models::PageLinks;
use crate::request::RequestDescriptor;
use reqwest::header::{HeaderMap, LINK};
use serde_json::Value;

/// One page of a collection endpoint
#[derive(Debug, Clone)]
pub struct PagedEnvelope<T> {
    pub items: Vec<T>,
    /// Opaque pointer to the following page, usually an absolute URL
    pub next_cursor: Option<String>,
    request: RequestDescriptor,
}

impl<T> PagedEnvelope<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>, request: RequestDescriptor) -> Self {
        Self {
            items,
            next_cursor,
            request,
        }
    }

    /// Descriptor this page was fetched with
    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// Cursor for the next page: the `Link` header wins over the body
pub fn next_cursor(headers: &HeaderMap, body: &Value) -> Option<String> {
    next_from_link_header(headers).or_else(|| next_from_body(body))
}

/// `rel="next"` target of an RFC 8288 `Link` header
pub fn next_from_link_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_next_link)
}

fn parse_next_link(header: &str) -> Option<String> {
    let mut rest = header;
    while let Some(open) = rest.find('<') {
        let after_open = &rest[open + 1..];
        let close = after_open.find('>')?;
        let target = &after_open[..close];
        let params_and_more = &after_open[close + 1..];
        let params_end = params_and_more.find('<').unwrap_or(params_and_more.len());
        let params = &params_and_more[..params_end];

        let is_next = params.split(';').any(|param| {
            let Some((name, value)) = param.split_once('=') else {
                return false;
            };
            name.trim().eq_ignore_ascii_case("rel")
                && value
                    .trim()
                    .trim_end_matches(',')
                    .trim_end()
                    .trim_matches('"')
                    .split_whitespace()
                    .any(|rel| rel.eq_ignore_ascii_case("next"))
        });
        if is_next && !target.is_empty() {
            return Some(target.to_string());
        }
        rest = &params_and_more[params_end..];
    }
    None
}

/// Next link embedded in the body: `_links.next.href`, `links.next.href`
/// or a top-level `next` string
pub fn next_from_body(body: &Value) -> Option<String> {
    for key in ["_links", "links"] {
        if let Some(links) = body.get(key) {
            if let Ok(links) = serde_json::from_value::<PageLinks>(links.clone()) {
                if let Some(next) = links.next {
                    return Some(next.href);
                }
            }
            if let Some(Value::String(next)) = links.get("next") {
                return Some(next.clone());
            }
        }
    }

    match body.get("next") {
        Some(Value::String(next)) if !next.is_empty() => Some(next.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn link_headers(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(LINK, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_link_header_next() {
        let headers = link_headers(&[
            r#"<https://gw.example.com/api/items?page=0>; rel="prev", <https://gw.example.com/api/items?page=2>; rel="next""#,
        ]);
        assert_eq!(
            next_from_link_header(&headers).as_deref(),
            Some("https://gw.example.com/api/items?page=2")
        );
    }

    #[test]
    fn test_link_header_with_comma_in_url_and_multiple_rels() {
        let headers = link_headers(&[
            r#"<https://gw.example.com/api/items?sort=name,asc&page=1>; rel="next last""#,
        ]);
        assert_eq!(
            next_from_link_header(&headers).as_deref(),
            Some("https://gw.example.com/api/items?sort=name,asc&page=1")
        );
    }

    #[test]
    fn test_link_header_next_before_other_links() {
        let headers = link_headers(&[
            r#"<https://gw.example.com/api/items?page=3>; rel="next", <https://gw.example.com/api/items?page=9>; rel="last""#,
        ]);
        assert_eq!(
            next_from_link_header(&headers).as_deref(),
            Some("https://gw.example.com/api/items?page=3")
        );
    }

    #[test]
    fn test_link_header_without_next() {
        let headers = link_headers(&[r#"<https://gw.example.com/api/items?page=0>; rel="first""#]);
        assert_eq!(next_from_link_header(&headers), None);
    }

    #[test]
    fn test_hal_links_in_body() {
        let body = json!({
            "_embedded": {"assets": []},
            "_links": {
                "self": {"href": "https://gw.example.com/api/assets?page=0"},
                "next": {"href": "https://gw.example.com/api/assets?page=1"}
            }
        });
        assert_eq!(
            next_from_body(&body).as_deref(),
            Some("https://gw.example.com/api/assets?page=1")
        );
    }

    #[test]
    fn test_plain_next_in_body() {
        assert_eq!(
            next_from_body(&json!({"links": {"next": "/api/jobs?page=4"}})).as_deref(),
            Some("/api/jobs?page=4")
        );
        assert_eq!(
            next_from_body(&json!({"items": [], "next": "/api/jobs?page=5"})).as_deref(),
            Some("/api/jobs?page=5")
        );
        assert_eq!(next_from_body(&json!({"content": [], "last": true})), None);
    }

    #[test]
    fn test_header_takes_precedence_over_body() {
        let headers = link_headers(&[r#"</api/a?page=2>; rel=next"#]);
        let body = json!({"next": "/api/b?page=9"});
        assert_eq!(next_cursor(&headers, &body).as_deref(), Some("/api/a?page=2"));
    }
}
