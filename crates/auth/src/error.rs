//! Denial taxonomy and the verdict type every guard returns.

use serde::Serialize;
use thiserror::Error;

/// Why a pipeline stopped.
///
/// The HTTP layer maps each kind to exactly one status code; nothing inside
/// this crate knows about status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthenticated,
    NotAMember,
    InsufficientRole,
    InsufficientPermission,
    RoleMissing,
    InvalidRole,
    /// A guard ran before the guard that populates its prerequisite.
    ConfigError,
    /// The membership (or identity) backend failed; never a permission decision.
    UpstreamLookupFailure,
    /// Aggregated denial of an `any` composition. Individual reasons are hidden.
    Forbidden,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::NotAMember => "not_a_member",
            ErrorKind::InsufficientRole => "insufficient_role",
            ErrorKind::InsufficientPermission => "insufficient_permission",
            ErrorKind::RoleMissing => "role_missing",
            ErrorKind::InvalidRole => "invalid_role",
            ErrorKind::ConfigError => "config_error",
            ErrorKind::UpstreamLookupFailure => "upstream_lookup_failure",
            ErrorKind::Forbidden => "forbidden",
        }
    }

    /// Kinds that signal a fault on our side rather than a decision about the caller.
    pub fn is_server_fault(self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidRole | ErrorKind::ConfigError | ErrorKind::UpstreamLookupFailure
        )
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal denial: kind plus a human readable message.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("{kind}: {message}")]
pub struct Denial {
    pub kind: ErrorKind,
    pub message: String,
}

impl Denial {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthenticated, message)
    }

    pub fn role_missing() -> Self {
        Self::new(ErrorKind::RoleMissing, "user role not found")
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigError, message)
    }
}

/// Outcome of a single guard or a whole pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(Denial),
}

impl Verdict {
    pub fn deny(kind: ErrorKind, message: impl Into<String>) -> Self {
        Verdict::Deny(Denial::new(kind, message))
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Verdict::Allow)
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Verdict::Allow => None,
            Verdict::Deny(d) => Some(d),
        }
    }
}

impl From<Result<(), Denial>> for Verdict {
    fn from(value: Result<(), Denial>) -> Self {
        match value {
            Ok(()) => Verdict::Allow,
            Err(denial) => Verdict::Deny(denial),
        }
    }
}

/// Errors from the permission checker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("role '{0}' is not defined in the role table")]
    InvalidRole(String),
}

impl From<AuthzError> for Denial {
    fn from(err: AuthzError) -> Self {
        match &err {
            AuthzError::InvalidRole(_) => Denial::new(ErrorKind::InvalidRole, err.to_string()),
        }
    }
}
