//! HTTPS transport for DNS queries — DNS-over-HTTPS (RFC 8484).
//!
//! GET carries the query as `?dns=<base64url>`, POST as the binary body.
//! Either way the response body is the raw DNS wire-format message and only
//! a 2xx status is consumed.

use super::{DohTransport, TransportError};
use crate::classify;
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ember_dns_domain::{ArgumentError, DohProtocol, HttpErrorDetail, HttpMethod, ResolverConfig};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Media type both request and response carry (RFC 8484 §6).
const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

const RESOLVER_USER_AGENT: &str = concat!("ember-dns/", env!("CARGO_PKG_VERSION"));

pub struct HttpsTransport {
    client: reqwest::Client,
    protocol: DohProtocol,
    method: HttpMethod,
    headers: HeaderMap,
}

impl HttpsTransport {
    pub fn new(config: &ResolverConfig) -> Result<Self, ArgumentError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(4);

        if let Some(addr) = config.local_address_v4.or(config.local_address_v6) {
            builder = builder.local_address(addr);
        }

        let client = builder
            .build()
            .map_err(|e| ArgumentError::InvalidArgValue(format!("http client: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(DNS_MESSAGE_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(DNS_MESSAGE_CONTENT_TYPE));
        headers.insert(USER_AGENT, HeaderValue::from_static(RESOLVER_USER_AGENT));
        for (name, value) in &config.headers {
            let name: HeaderName = name
                .parse()
                .map_err(|_| ArgumentError::InvalidArgValue(format!("bad header name: {name}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ArgumentError::InvalidArgValue("bad header value".into()))?;
            headers.insert(name, value);
        }

        Ok(Self {
            client,
            protocol: config.protocol,
            method: config.method,
            headers,
        })
    }

    fn request(&self, server: &str, packet: &[u8]) -> reqwest::RequestBuilder {
        match self.method {
            HttpMethod::Get => {
                let url = format!(
                    "{}://{}/dns-query?dns={}",
                    self.protocol.as_str(),
                    server,
                    URL_SAFE_NO_PAD.encode(packet)
                );
                self.client.get(url)
            }
            HttpMethod::Post => {
                let url = format!("{}://{}/dns-query", self.protocol.as_str(), server);
                self.client.post(url).body(packet.to_vec())
            }
        }
        .headers(self.headers.clone())
    }
}

#[async_trait]
impl DohTransport for HttpsTransport {
    async fn send(
        &self,
        server: &str,
        packet: &[u8],
        deadline: Duration,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, TransportError> {
        debug!(
            server = %server,
            method = ?self.method,
            packet_len = packet.len(),
            deadline_ms = deadline.as_millis() as u64,
            "Sending DoH query"
        );

        let send = self.request(server, packet).send();
        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(TransportError::cancelled(server)),
            outcome = tokio::time::timeout(deadline, send) => match outcome {
                Err(_) => {
                    // The attempt timer owns its handle: expiry cancels it.
                    cancel.cancel();
                    return Err(TransportError::timeout(server, deadline));
                }
                Ok(Err(e)) => {
                    return Err(TransportError::new(
                        classify::code_for_reqwest(&e),
                        format!("request to {server} failed: {e}"),
                    ));
                }
                Ok(Ok(response)) => response,
            },
        };

        let status = response.status();
        if !status.is_success() {
            let headers = response
                .headers()
                .iter()
                .map(|(k, v)| {
                    (
                        k.as_str().to_string(),
                        String::from_utf8_lossy(v.as_bytes()).into_owned(),
                    )
                })
                .collect();
            // Draining the body releases the connection back to the pool.
            let body = response.bytes().await.unwrap_or_default().to_vec();
            return Err(TransportError::http(
                server,
                HttpErrorDetail {
                    status: status.as_u16(),
                    headers,
                    body,
                },
            ));
        }

        let body = tokio::select! {
            _ = cancel.cancelled() => return Err(TransportError::cancelled(server)),
            outcome = tokio::time::timeout(deadline, response.bytes()) => match outcome {
                Err(_) => {
                    cancel.cancel();
                    return Err(TransportError::timeout(server, deadline));
                }
                Ok(Err(e)) => {
                    return Err(TransportError::new(
                        classify::code_for_reqwest(&e),
                        format!("failed to read DoH response from {server}: {e}"),
                    ));
                }
                Ok(Ok(bytes)) => bytes,
            },
        };

        debug!(
            server = %server,
            response_len = body.len(),
            "DoH response received"
        );

        Ok(body.to_vec())
    }
}
