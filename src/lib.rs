/*
 * Platform client core - typed request engine shared by the REST resource clients
 */

// Internal modules
mod client;
pub mod models;
mod error;
mod auth;
mod config;
pub mod gateway;
pub mod multipart;
pub mod pagination;
pub mod request;
pub mod retry;
pub mod transport;


// Re-export public types and interfaces
pub use client::PlatformClient;
pub use models::{ApiResponse, RawResponse};
pub use error::{BoxError, ClientError, ClientResult, ErrorBody};
pub use auth::{AuthToken, ClientCredentials, StaticToken, TokenProvider};
pub use config::ClientConfig;
pub use gateway::{GatewayResolver, StaticGateway};
pub use multipart::{MultipartBody, MultipartForm};
pub use pagination::PagedEnvelope;
pub use request::{RequestBody, RequestDescriptor, ResponseMode, Verb};
pub use retry::{retry, RetryPolicy};
pub use transport::{ReqwestTransport, ResponseBody, Transport, TransportRequest, TransportResponse};

// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        PlatformClient, ClientConfig,
        StaticToken, ClientCredentials, TokenProvider,
        ClientError, ClientResult,
        RequestDescriptor, ResponseMode, ApiResponse,
        PagedEnvelope, MultipartForm,
        retry, RetryPolicy,
    };
}
