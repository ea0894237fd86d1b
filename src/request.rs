use crate::error::{ClientError, ClientResult};
use crate::multipart::MultipartBody;
use reqwest::Method;
use serde_json::Value;
use std::fmt;

/// HTTP verbs used by the platform REST APIs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn as_method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method().as_str())
    }
}

/// How a successful response is handed back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Parse the body as JSON
    #[default]
    Json,
    /// Hand back the unread response (binary downloads)
    Raw,
    /// Ignore the body (DELETE, fire-and-forget PUT/POST)
    None,
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartBody),
}

/// One pending HTTP call
///
/// Built once through the constructor and builder methods; there are no
/// setters afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    verb: Verb,
    path: String,
    query: Vec<(String, Value)>,
    body: Option<RequestBody>,
    headers: Vec<(String, String)>,
    response_mode: ResponseMode,
}

impl RequestDescriptor {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: Vec::new(),
            response_mode: ResponseMode::Json,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Verb::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Verb::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Verb::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Verb::Patch, path)
    }

    /// DELETE requests default to [`ResponseMode::None`]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Verb::Delete, path).response_mode(ResponseMode::None)
    }

    /// Add a query parameter.
    ///
    /// `None`/`null` values are dropped when the query string is built;
    /// arrays and objects are sent JSON-encoded.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
        self
    }

    /// Optimistic-locking precondition used by update and delete endpoints
    pub fn if_match(self, etag: impl fmt::Display) -> Self {
        self.header("If-Match", etag.to_string())
    }

    pub fn json(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(RequestBody::Json(body.into()));
        self
    }

    pub fn multipart(mut self, body: MultipartBody) -> Self {
        self.body = Some(RequestBody::Multipart(body));
        self
    }

    pub fn response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = mode;
        self
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &[(String, Value)] {
        &self.query
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn mode(&self) -> ResponseMode {
        self.response_mode
    }

    /// Same verb, headers and response mode against another path, without
    /// query or body
    pub(crate) fn follow(&self, path: String) -> Self {
        Self {
            verb: self.verb,
            path,
            query: Vec::new(),
            body: None,
            headers: self.headers.clone(),
            response_mode: self.response_mode,
        }
    }

    /// Path with the encoded query string appended
    pub fn path_and_query(&self) -> ClientResult<String> {
        if self.path.trim().is_empty() {
            return Err(ClientError::invalid_argument("request path must not be empty"));
        }

        let query = build_query_string(&self.query);
        if query.is_empty() {
            return Ok(self.path.clone());
        }
        let separator = if self.path.contains('?') { '&' } else { '?' };
        Ok(format!("{}{}{}", self.path, separator, query))
    }
}

/// Encode query parameters in definition order.
///
/// Null entries are skipped, strings are sent as-is, other scalars are
/// stringified and arrays/objects are JSON-stringified. Keys and values are
/// percent-encoded.
pub fn build_query_string(params: &[(String, Value)]) -> String {
    params
        .iter()
        .filter_map(|(key, value)| {
            let raw = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => value.to_string(),
            };
            Some(format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&raw)
            ))
        })
        .collect::<Vec<_>>()
        .join("&")
}
