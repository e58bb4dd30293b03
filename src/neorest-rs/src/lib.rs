//! Neorest Client Library
//!
//! HTTP client mapping graph operations onto the Neo4j Server REST API.

mod client;
pub mod paths;
mod request;
mod transport;

pub use client::{remove_null_values, Client, IndexOptions};
pub use neorest_core::{
    Config, ElementId, ElementType, LogLevel, Record, RecordKind, Response, Results, Script,
    Scripts, StatusKind,
};
pub use request::Request;
pub use transport::{query_pairs, HttpTransport, Transport};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Response(#[from] neorest_core::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Category of a non-2xx status, if that is what failed
    pub fn status_kind(&self) -> Option<StatusKind> {
        match self {
            ClientError::Response(err) => err.status_kind(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_kind() == Some(StatusKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
