use crate::error::ClientResult;
use crate::transport::ResponseBody;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Result of a single `execute` call, shaped by the descriptor's response mode
#[derive(Debug)]
pub enum ApiResponse {
    /// Decoded JSON body; no schema validation is applied
    Json(serde_json::Value),
    /// Response handle whose body has not been read yet
    Raw(RawResponse),
    /// Body ignored
    Empty,
}

/// Successful response handed over with its body still unread
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl RawResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    pub async fn bytes(self) -> ClientResult<Bytes> {
        self.body.bytes().await
    }

    pub async fn text(self) -> ClientResult<String> {
        self.body.text().await
    }
}

/// OAuth2 token endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

/// HAL style link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Href {
    pub href: String,
}

/// Links block carried by paged collection responses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_link: Option<Href>,
    pub first: Option<Href>,
    pub prev: Option<Href>,
    pub next: Option<Href>,
    pub last: Option<Href>,
}
