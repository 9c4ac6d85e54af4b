use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The DNS error taxonomy the resolver surfaces.
///
/// Transport and HTTP failures are folded into this set before they reach a
/// caller; see `ember-dns-resolver`'s classification module for the folding
/// rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    FormErr,
    ServFail,
    NotFound,
    NotImp,
    Refused,
    NoData,
    BadResp,
    BadName,
    BadFamily,
    BadFlags,
    BadHints,
    Timeout,
    ConnRefused,
    Cancelled,
    Einval,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::FormErr => "FORMERR",
            ErrorCode::ServFail => "SERVFAIL",
            ErrorCode::NotFound => "NOTFOUND",
            ErrorCode::NotImp => "NOTIMP",
            ErrorCode::Refused => "REFUSED",
            ErrorCode::NoData => "NODATA",
            ErrorCode::BadResp => "BADRESP",
            ErrorCode::BadName => "BADNAME",
            ErrorCode::BadFamily => "BADFAMILY",
            ErrorCode::BadFlags => "BADFLAGS",
            ErrorCode::BadHints => "BADHINTS",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::ConnRefused => "CONNREFUSED",
            ErrorCode::Cancelled => "CANCELLED",
            ErrorCode::Einval => "EINVAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Detail kept from a non-2xx DoH response.
///
/// Only attached to errors when `return_http_errors` is set; otherwise the
/// status is folded into [`ErrorCode`] and the body dropped.
#[derive(Debug, Clone, Default)]
pub struct HttpErrorDetail {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// A resolution failure.
///
/// Carries the fields the platform resolver contract requires: the folded
/// `code`, the `syscall` label (`queryTxt`, `getaddrinfo`, ...) and the
/// hostname the query was for.
#[derive(Debug, Clone, Error)]
#[error("{syscall} {code} {hostname}: {message}")]
pub struct ResolveError {
    pub code: ErrorCode,
    pub syscall: String,
    pub hostname: String,
    pub message: String,
    pub errno: Option<i32>,
    pub http: Option<HttpErrorDetail>,
    /// Individual messages of a combined multi-server failure.
    pub errors: Vec<String>,
}

impl ResolveError {
    pub fn new(
        code: ErrorCode,
        syscall: impl Into<String>,
        hostname: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            syscall: syscall.into(),
            hostname: hostname.into(),
            message: message.into(),
            errno: None,
            http: None,
            errors: Vec::new(),
        }
    }

    pub fn with_errno(mut self, errno: i32) -> Self {
        self.errno = Some(errno);
        self
    }

    pub fn with_http(mut self, http: HttpErrorDetail) -> Self {
        self.http = Some(http);
        self
    }

    /// Relabel the syscall, keeping everything else.
    pub fn with_syscall(mut self, syscall: impl Into<String>) -> Self {
        self.syscall = syscall.into();
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Collapse the per-server errors of a failed query into one.
    ///
    /// Messages are de-duplicated and joined with `"; "`. The code and errno
    /// survive only when identical across every member; a mixed set falls
    /// back to `BADRESP`.
    pub fn combine(errors: Vec<ResolveError>) -> ResolveError {
        debug_assert!(!errors.is_empty());
        let first = errors[0].clone();
        if errors.len() == 1 {
            return first;
        }

        let uniform_code = errors.iter().all(|e| e.code == first.code);
        let uniform_errno = errors.iter().all(|e| e.errno == first.errno);

        let mut messages: Vec<&str> = Vec::new();
        for err in &errors {
            if !messages.contains(&err.message.as_str()) {
                messages.push(&err.message);
            }
        }

        let message = messages.join("; ");
        ResolveError {
            code: if uniform_code {
                first.code
            } else {
                ErrorCode::BadResp
            },
            syscall: first.syscall,
            hostname: first.hostname,
            message,
            errno: if uniform_errno { first.errno } else { None },
            http: None,
            errors: errors.iter().map(|e| e.message.clone()).collect(),
        }
    }
}

/// Argument and configuration validation failures.
#[derive(Debug, Clone, Error)]
pub enum ArgumentError {
    #[error("invalid argument type: {0}")]
    InvalidArgType(String),

    #[error("invalid argument value: {0}")]
    InvalidArgValue(String),

    #[error("missing required argument: {0}")]
    MissingArgs(String),

    #[error("port should be >= 0 and < 65536, received {0}")]
    SocketBadPort(String),
}

impl ArgumentError {
    pub fn code(&self) -> &'static str {
        match self {
            ArgumentError::InvalidArgType(_) => "ERR_INVALID_ARG_TYPE",
            ArgumentError::InvalidArgValue(_) => "ERR_INVALID_ARG_VALUE",
            ArgumentError::MissingArgs(_) => "ERR_MISSING_ARGS",
            ArgumentError::SocketBadPort(_) => "ERR_SOCKET_BAD_PORT",
        }
    }
}

/// The unified public error surface.
#[derive(Debug, Clone, Error)]
pub enum DnsError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Argument(#[from] ArgumentError),
}

impl DnsError {
    /// The error code string: DNS taxonomy for resolution failures,
    /// `ERR_*` for argument failures.
    pub fn code(&self) -> &str {
        match self {
            DnsError::Resolve(e) => e.code.as_str(),
            DnsError::Argument(e) => e.code(),
        }
    }

    pub fn resolve_code(&self) -> Option<ErrorCode> {
        match self {
            DnsError::Resolve(e) => Some(e.code),
            DnsError::Argument(_) => None,
        }
    }
}
