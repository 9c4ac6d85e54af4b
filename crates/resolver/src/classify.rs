//! Folding of HTTP and transport failures into the DNS error taxonomy.
//!
//! Several distinct failure modes intentionally collapse to `TIMEOUT` or
//! `CONNREFUSED` for parity with the platform resolver; finer-grained
//! detail survives only on the `http` field when `return_http_errors` is
//! set.

use ember_dns_domain::ErrorCode;
use std::io;

/// HTTP statuses worth retrying against the same server.
pub const RETRYABLE_STATUS_CODES: [u16; 10] =
    [408, 413, 429, 500, 502, 503, 504, 521, 522, 524];

pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUS_CODES.contains(&status)
}

/// Fold a non-2xx status into the taxonomy.
pub fn code_for_status(status: u16) -> ErrorCode {
    if is_retryable_status(status) {
        ErrorCode::Timeout
    } else {
        ErrorCode::BadResp
    }
}

/// An error classified retryable is recovered inside the attempt loop;
/// anything else moves on to the next server.
pub fn is_retryable(code: ErrorCode) -> bool {
    matches!(code, ErrorCode::Timeout | ErrorCode::ConnRefused)
}

pub fn code_for_io_kind(kind: io::ErrorKind) -> ErrorCode {
    use io::ErrorKind::*;
    match kind {
        ConnectionRefused | ConnectionReset | ConnectionAborted | NetworkDown
        | NetworkUnreachable | HostUnreachable | AddrInUse | AddrNotAvailable => {
            ErrorCode::ConnRefused
        }
        TimedOut | BrokenPipe => ErrorCode::Timeout,
        Interrupted => ErrorCode::Cancelled,
        _ => ErrorCode::BadResp,
    }
}

/// Fold a `reqwest` failure. Statuses are handled separately; this covers
/// connect/timeout/body errors.
pub fn code_for_reqwest(error: &reqwest::Error) -> ErrorCode {
    if error.is_timeout() {
        return ErrorCode::Timeout;
    }
    if error.is_connect() {
        return ErrorCode::ConnRefused;
    }

    // Walk the source chain looking for an io error with a known kind.
    let mut source = std::error::Error::source(error);
    while let Some(err) = source {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            return code_for_io_kind(io_err.kind());
        }
        source = err.source();
    }

    ErrorCode::BadResp
}
