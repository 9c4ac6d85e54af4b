//! The per-query resolution pipeline: server iteration, per-server retry
//! with exponential deadlines, error classification and accumulation.

use crate::classify;
use crate::codec::{self, DecodedResponse};
use crate::rotation::ServerSet;
use crate::transport::{DohTransport, TransportError};
use ember_dns_domain::{DnsQuery, ErrorCode, QueryIdMode, ResolveError};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct QueryEngine {
    transport: Arc<dyn DohTransport>,
    servers: Arc<ServerSet>,
    timeout_ms: u64,
    tries: u32,
    smart_rotate: bool,
    query_id: QueryIdMode,
}

impl QueryEngine {
    pub fn new(
        transport: Arc<dyn DohTransport>,
        servers: Arc<ServerSet>,
        timeout_ms: u64,
        tries: u32,
        smart_rotate: bool,
        query_id: QueryIdMode,
    ) -> Self {
        Self {
            transport,
            servers,
            timeout_ms,
            tries,
            smart_rotate,
            query_id,
        }
    }

    fn next_id(&self) -> u16 {
        match self.query_id {
            QueryIdMode::Fixed(id) => id,
            QueryIdMode::Random => fastrand::u16(..),
        }
    }

    fn attempt_deadline(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.timeout_ms.saturating_mul(factor))
    }

    fn to_resolve_error(&self, query: &DnsQuery, error: TransportError) -> ResolveError {
        let mut resolved =
            ResolveError::new(error.code, query.syscall(), query.name.as_ref(), error.message);
        if let Some(http) = error.http {
            resolved = resolved.with_http(http);
        }
        resolved
    }

    fn apply_demotions(&self, failed: &[String]) {
        if !self.smart_rotate || self.servers.len() < 2 {
            return;
        }
        for server in failed {
            warn!(server = %server, "Smart rotation demoting server");
            self.servers.demote(server);
        }
    }

    /// Run one query to completion against the current server order.
    pub async fn execute(
        &self,
        query: &DnsQuery,
        cancel: &CancellationToken,
    ) -> Result<DecodedResponse, ResolveError> {
        if cancel.is_cancelled() {
            return Err(self.cancelled_error(query));
        }

        let packet = codec::build_query(
            self.next_id(),
            &query.name,
            query.record_type,
            query.ecs.as_ref(),
        )?;

        let servers = self.servers.snapshot();
        let mut errors: Vec<ResolveError> = Vec::new();
        let mut failed: Vec<String> = Vec::new();
        let mut buffer: Option<Vec<u8>> = None;

        'servers: for server in &servers {
            let mut server_errors: Vec<ResolveError> = Vec::new();

            for attempt in 0..self.tries {
                if cancel.is_cancelled() {
                    self.apply_demotions(&failed);
                    return Err(self.cancelled_error(query));
                }

                let deadline = self.attempt_deadline(attempt);
                let attempt_token = cancel.child_token();

                debug!(
                    server = %server,
                    attempt,
                    deadline_ms = deadline.as_millis() as u64,
                    domain = %query.name,
                    record_type = %query.record_type,
                    "Query attempt"
                );

                match self
                    .transport
                    .send(server, &packet, deadline, &attempt_token)
                    .await
                {
                    Ok(bytes) => {
                        buffer = Some(bytes);
                        break 'servers;
                    }
                    Err(error) => {
                        let code = error.code;
                        let resolved = self.to_resolve_error(query, error);

                        if code == ErrorCode::NotFound {
                            // Authoritative negative terminates the whole query.
                            self.apply_demotions(&failed);
                            return Err(resolved);
                        }

                        debug!(
                            server = %server,
                            attempt,
                            code = %code,
                            retryable = classify::is_retryable(code),
                            "Query attempt failed"
                        );
                        server_errors.push(resolved);

                        if !classify::is_retryable(code) {
                            break;
                        }
                    }
                }
            }

            if !server_errors.is_empty() {
                errors.append(&mut server_errors);
                failed.push(server.clone());
            }
        }

        self.apply_demotions(&failed);

        let buffer = match buffer {
            Some(buffer) => buffer,
            None if errors.is_empty() => {
                // Every request suspended without producing an answer.
                return Err(self.cancelled_error(query));
            }
            None => return Err(ResolveError::combine(errors)),
        };

        codec::decode_response(&buffer, &query.name)
            .map_err(|e| e.with_syscall(query.syscall()))
    }

    fn cancelled_error(&self, query: &DnsQuery) -> ResolveError {
        ResolveError::new(
            ErrorCode::Cancelled,
            query.syscall(),
            query.name.as_ref(),
            "query was cancelled",
        )
    }
}
