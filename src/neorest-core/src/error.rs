//! Error types for response decoding and result access

use std::fmt;
use std::num::ParseIntError;
use thiserror::Error;

/// Coarse category of a non-2xx HTTP status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    BadRequest,
    NotFound,
    Conflict,
    Server,
    Other,
}

impl StatusKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => StatusKind::BadRequest,
            404 => StatusKind::NotFound,
            409 => StatusKind::Conflict,
            500..=599 => StatusKind::Server,
            _ => StatusKind::Other,
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusKind::BadRequest => "Bad request",
            StatusKind::NotFound => "Not found",
            StatusKind::Conflict => "Conflict",
            StatusKind::Server => "Server error",
            StatusKind::Other => "Unexpected status",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// Server answered with a non-2xx status
    #[error("{kind} ({status}): {body}")]
    Status {
        kind: StatusKind,
        status: u16,
        body: String,
    },

    /// Non-empty body that is not valid JSON
    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Attribute missing from the raw result object
    #[error("No attribute '{0}' in result")]
    Lookup(String),

    /// Locator whose last segment is not a decimal ID
    #[error("Invalid element ID in locator '{uri}'")]
    InvalidId {
        uri: String,
        #[source]
        source: ParseIntError,
    },

    /// Type token other than "node" or "relationship"
    #[error("Unknown element type: {0:?}")]
    UnknownType(Option<String>),

    #[error("Script not found: {0}")]
    MissingScript(String),

    #[error("Result is not a JSON object")]
    NotAnObject,
}

impl Error {
    pub fn status_kind(&self) -> Option<StatusKind> {
        match self {
            Error::Status { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
