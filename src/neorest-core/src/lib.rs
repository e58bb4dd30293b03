//! Neorest Core Library
//!
//! Transport-free building blocks of the Neo4j Server REST client:
//! - Client configuration
//! - Identifier codec for server-issued locators
//! - Result records and response decoding
//! - Gremlin-Groovy script registry

pub mod config;
pub mod error;
pub mod ids;
pub mod record;
pub mod response;
pub mod scripts;

// Re-export commonly used types
pub use config::{Config, LogLevel};
pub use error::{Error, Result, StatusKind};
pub use ids::{ElementId, ElementType};
pub use record::{Record, RecordKind};
pub use response::{RawResponse, Records, Response, ResponseOptions, Results};
pub use scripts::{Script, Scripts};
