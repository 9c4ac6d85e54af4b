pub mod https;

use async_trait::async_trait;
use ember_dns_domain::{ErrorCode, HttpErrorDetail};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub use https::HttpsTransport;

/// A transport-level failure, already folded into the taxonomy but still
/// carrying the HTTP detail for `return_http_errors`.
#[derive(Debug, Clone)]
pub struct TransportError {
    pub code: ErrorCode,
    pub message: String,
    pub http: Option<HttpErrorDetail>,
}

impl TransportError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            http: None,
        }
    }

    pub fn timeout(server: &str, deadline: Duration) -> Self {
        Self::new(
            ErrorCode::Timeout,
            format!("request to {server} timed out after {}ms", deadline.as_millis()),
        )
    }

    pub fn cancelled(server: &str) -> Self {
        Self::new(ErrorCode::Cancelled, format!("request to {server} was cancelled"))
    }

    pub fn http(server: &str, detail: HttpErrorDetail) -> Self {
        Self {
            code: crate::classify::code_for_status(detail.status),
            message: format!("{server} answered HTTP {}", detail.status),
            http: Some(detail),
        }
    }
}

/// Sends one RFC 8484 request to one server under a deadline and a
/// cancellation handle, yielding the raw response body.
#[async_trait]
pub trait DohTransport: Send + Sync {
    async fn send(
        &self,
        server: &str,
        packet: &[u8],
        deadline: Duration,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, TransportError>;
}
