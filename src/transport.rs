use crate::error::{ClientError, ClientResult};
use bytes::{Bytes, BytesMut};
use futures_util::stream::{self, BoxStream, StreamExt};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use std::fmt;
use url::Url;

/// One outgoing HTTP call, fully resolved
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Status, headers and the not-yet-read body of a response
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

/// Unconsumed response body
pub struct ResponseBody {
    stream: BoxStream<'static, ClientResult<Bytes>>,
}

impl ResponseBody {
    pub fn from_stream(stream: BoxStream<'static, ClientResult<Bytes>>) -> Self {
        Self { stream }
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self::from_stream(stream::iter(vec![Ok(bytes)]).boxed())
    }

    pub fn empty() -> Self {
        Self::from_stream(stream::empty().boxed())
    }

    /// Read the whole body into memory
    pub async fn bytes(mut self) -> ClientResult<Bytes> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        Ok(buffer.freeze())
    }

    /// Read the whole body as (lossy) UTF-8 text
    pub async fn text(self) -> ClientResult<String> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn into_stream(self) -> BoxStream<'static, ClientResult<Bytes>> {
        self.stream
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResponseBody { .. }")
    }
}

/// Underlying request/response mechanism
///
/// TLS, pooling and redirects live behind this trait.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> ClientResult<TransportResponse>;
}

/// Transport backed by a `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> ClientResult<TransportResponse> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = ResponseBody::from_stream(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(ClientError::from))
                .boxed(),
        );

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
