use crate::{
    auth::TokenProvider,
    config::ClientConfig,
    error::{ClientError, ClientResult, ErrorBody},
    gateway::{self, GatewayResolver, StaticGateway},
    models::{ApiResponse, RawResponse},
    pagination::{self, PagedEnvelope},
    request::{RequestBody, RequestDescriptor, ResponseMode},
    transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse},
};
use bytes::Bytes;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Shared request engine for the platform REST APIs
///
/// Resource clients hold a clone of this and hand it one
/// [`RequestDescriptor`] per call. Every call is independent: no state is
/// kept between requests, so clones can be used concurrently.
#[derive(Clone)]
pub struct PlatformClient {
    transport: Arc<dyn Transport>,
    gateway: Arc<dyn GatewayResolver>,
    tokens: Arc<dyn TokenProvider>,
}

impl PlatformClient {
    /// Create a client talking to `config.gateway` over reqwest
    pub fn new(config: ClientConfig, tokens: impl TokenProvider + 'static) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(config.http_client()?);
        Ok(Self::with_parts(
            transport,
            StaticGateway::new(config.gateway),
            tokens,
        ))
    }

    /// Assemble a client from explicit collaborators
    pub fn with_parts(
        transport: impl Transport + 'static,
        gateway: impl GatewayResolver + 'static,
        tokens: impl TokenProvider + 'static,
    ) -> Self {
        Self {
            transport: Arc::new(transport),
            gateway: Arc::new(gateway),
            tokens: Arc::new(tokens),
        }
    }

    /// Current gateway prefix
    pub fn base_url(&self) -> url::Url {
        self.gateway.base_url()
    }

    /// Perform the one HTTP call described by `descriptor`
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> ClientResult<ApiResponse> {
        let response = self.dispatch(descriptor).await?;

        match descriptor.mode() {
            ResponseMode::None => Ok(ApiResponse::Empty),
            ResponseMode::Raw => Ok(ApiResponse::Raw(RawResponse {
                status: response.status,
                headers: response.headers,
                body: response.body,
            })),
            ResponseMode::Json => {
                let bytes = response.body.bytes().await?;
                Ok(ApiResponse::Json(parse_json(&bytes)?))
            }
        }
    }

    /// Execute and decode the JSON body into `T`
    pub async fn execute_json<T>(&self, descriptor: &RequestDescriptor) -> ClientResult<T>
    where
        T: DeserializeOwned,
    {
        let value = self.execute_value(descriptor).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Execute and hand back the unread response
    pub async fn execute_raw(&self, descriptor: &RequestDescriptor) -> ClientResult<RawResponse> {
        if descriptor.mode() != ResponseMode::Raw {
            return Err(ClientError::invalid_argument(
                "execute_raw requires ResponseMode::Raw",
            ));
        }
        match self.execute(descriptor).await? {
            ApiResponse::Raw(raw) => Ok(raw),
            _ => Err(ClientError::invalid_argument("expected a raw response")),
        }
    }

    /// Execute, ignoring any response body
    pub async fn execute_empty(&self, descriptor: &RequestDescriptor) -> ClientResult<()> {
        self.dispatch(descriptor).await.map(|_| ())
    }

    /// Execute a collection request and split the result into items and cursor.
    ///
    /// `items_pointer` is a JSON pointer such as `/content` or
    /// `/_embedded/assets`; a pointer that matches nothing yields an empty
    /// page. The empty pointer selects the whole body.
    pub async fn execute_page<T>(
        &self,
        descriptor: &RequestDescriptor,
        items_pointer: &str,
    ) -> ClientResult<PagedEnvelope<T>>
    where
        T: DeserializeOwned,
    {
        if descriptor.mode() != ResponseMode::Json {
            return Err(ClientError::invalid_argument(
                "paged requests require ResponseMode::Json",
            ));
        }
        if !items_pointer.is_empty() && !items_pointer.starts_with('/') {
            return Err(ClientError::invalid_argument(format!(
                "items pointer must be empty or start with '/', got {:?}",
                items_pointer
            )));
        }

        let response = self.dispatch(descriptor).await?;
        let headers = response.headers;
        let mut body = parse_json(&response.body.bytes().await?)?;

        let next_cursor = pagination::next_cursor(&headers, &body);
        let items = match body.pointer_mut(items_pointer).map(Value::take) {
            Some(Value::Null) | None => Vec::new(),
            Some(items) => serde_json::from_value(items)?,
        };

        Ok(PagedEnvelope::new(items, next_cursor, descriptor.clone()))
    }

    /// Descriptor for the page after `envelope`, or `None` on the last page
    pub fn resolve_next_page<T>(&self, envelope: &PagedEnvelope<T>) -> Option<RequestDescriptor> {
        let cursor = envelope.next_cursor.as_deref()?;
        let path = gateway::strip_gateway(&self.gateway.base_url(), cursor);
        Some(envelope.request().follow(path))
    }

    async fn execute_value(&self, descriptor: &RequestDescriptor) -> ClientResult<Value> {
        if descriptor.mode() != ResponseMode::Json {
            return Err(ClientError::invalid_argument(
                "JSON decoding requires ResponseMode::Json",
            ));
        }
        match self.execute(descriptor).await? {
            ApiResponse::Json(value) => Ok(value),
            _ => Err(ClientError::invalid_argument("expected a JSON response")),
        }
    }

    /// Authenticate, send, and turn error statuses into `ClientError::Api`
    async fn dispatch(&self, descriptor: &RequestDescriptor) -> ClientResult<TransportResponse> {
        let path = descriptor.path_and_query()?;
        let url = gateway::join_path(&self.gateway.base_url(), &path)?;
        let (mut headers, body) = build_headers_and_body(descriptor)?;

        let token = self.tokens.resolve_token().await.map_err(|e| match e {
            ClientError::Authentication(_) => e,
            other => ClientError::auth_error(format!("token resolution failed: {}", other)),
        })?;
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&token.bearer())
                .map_err(|e| ClientError::auth_error(format!("Invalid auth header: {}", e)))?,
        );

        debug!("HTTP {} {}", descriptor.verb(), url);
        let response = self
            .transport
            .send(TransportRequest {
                method: descriptor.verb().as_method(),
                url,
                headers,
                body,
            })
            .await?;
        debug!("HTTP {} {} -> {}", descriptor.verb(), path, response.status);

        if response.status.as_u16() >= 400 {
            return Err(error_from_response(response).await);
        }
        Ok(response)
    }
}

fn build_headers_and_body(
    descriptor: &RequestDescriptor,
) -> ClientResult<(HeaderMap, Option<Bytes>)> {
    let mut headers = HeaderMap::new();
    if descriptor.mode() == ResponseMode::Json {
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    }

    let body = match descriptor.body() {
        None => None,
        Some(RequestBody::Json(value)) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Some(Bytes::from(serde_json::to_vec(value)?))
        }
        Some(RequestBody::Multipart(multipart)) => {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_str(&multipart.content_type())
                    .map_err(|e| ClientError::invalid_argument(e.to_string()))?,
            );
            Some(Bytes::from(multipart.as_str().to_owned()))
        }
    };

    for (name, value) in descriptor.headers() {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ClientError::invalid_argument(format!("invalid header name {:?}: {}", name, e))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            ClientError::invalid_argument(format!("invalid value for header {}: {}", name, e))
        })?;
        headers.insert(name, value);
    }

    Ok((headers, body))
}

/// Empty 2xx bodies decode to `null`
fn parse_json(bytes: &[u8]) -> ClientResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(bytes)?)
}

async fn error_from_response(response: TransportResponse) -> ClientError {
    let status = response.status.as_u16();
    let is_json = response
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false);

    // Keep the status even when the body cannot be read
    let text = match response.body.text().await {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read body of HTTP {} response: {}", status, e);
            String::new()
        }
    };

    let body = if is_json {
        match serde_json::from_str(&text) {
            Ok(value) => ErrorBody::Json(value),
            Err(_) => ErrorBody::Text(text),
        }
    } else {
        ErrorBody::Text(text)
    };

    debug!("HTTP error {}: {}", status, body);
    ClientError::api_error(status, body)
}
