//! Identifier codec
//!
//! Neo4j Server never sends bare IDs. Every element carries a `self` URI
//! such as `http://host/db/data/node/42`, and the ID and element kind are
//! recovered by splitting that URI on `/`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Public element type, independent of the server's vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Vertex,
    Edge,
}

impl ElementType {
    /// Maps the server's "node"/"relationship" token
    pub fn from_token(token: Option<&str>) -> Result<Self> {
        match token {
            Some("node") => Ok(ElementType::Vertex),
            Some("relationship") => Ok(ElementType::Edge),
            other => Err(Error::UnknownType(other.map(str::to_string))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Vertex => "vertex",
            ElementType::Edge => "edge",
        }
    }

    /// Resource name used by the REST API
    pub fn resource(&self) -> &'static str {
        match self {
            ElementType::Vertex => "node",
            ElementType::Edge => "relationship",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the trailing decimal ID out of a locator.
///
/// An absent locator is not an error; a present one whose last segment is
/// not numeric is.
pub fn parse_id(uri: Option<&str>) -> Result<Option<u64>> {
    let Some(uri) = uri.filter(|u| !u.is_empty()) else {
        return Ok(None);
    };
    let tail = uri.rsplit('/').next().unwrap_or(uri);
    tail.parse::<u64>()
        .map(Some)
        .map_err(|source| Error::InvalidId {
            uri: uri.to_string(),
            source,
        })
}

/// Resource-kind token of an element locator (`.../node/42` -> `node`)
pub fn parse_type(uri: Option<&str>) -> Option<&str> {
    let uri = uri.filter(|u| !u.is_empty())?;
    let root = uri.rsplit_once('/').map(|(head, _)| head).unwrap_or("");
    Some(root.rsplit('/').next().unwrap_or(root))
}

/// Resource-kind token of an index template.
///
/// Templates look like `.../index/node/{name}/{key}/{value}`, so the kind
/// sits four segments from the end of the URI path.
pub fn parse_index_type(uri: Option<&str>) -> Option<&str> {
    let uri = uri.filter(|u| !u.is_empty())?;
    let segments: Vec<&str> = uri_path(uri).split('/').collect();
    segments
        .len()
        .checked_sub(4)
        .map(|pos| segments[pos])
}

/// Path component of a URI: no scheme, authority, query or fragment
fn uri_path(uri: &str) -> &str {
    let rest = match uri.split_once("://") {
        Some((_, after_scheme)) => match after_scheme.find('/') {
            Some(pos) => &after_scheme[pos..],
            None => "",
        },
        None => uri,
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    &rest[..end]
}

/// Identifier accepted by the path builders: a real ID, or a batch
/// placeholder like `{0}` naming an element created earlier in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ElementId {
    Id(u64),
    Placeholder(String),
}

impl ElementId {
    /// The placeholder token, if this ID is one: `{`, any single line, `}`,
    /// optionally followed by one newline
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            ElementId::Placeholder(token) if is_placeholder(token) => Some(token),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<u64> {
        match self {
            ElementId::Id(id) => Some(*id),
            ElementId::Placeholder(_) => None,
        }
    }
}

// `^{.*}$` with regex line semantics: `.` stops at a newline, and `$` also
// matches just before one trailing newline
fn is_placeholder(token: &str) -> bool {
    let body = token.strip_suffix('\n').unwrap_or(token);
    body.len() >= 2 && body.starts_with('{') && body.ends_with('}') && !body.contains('\n')
}

impl From<u64> for ElementId {
    fn from(id: u64) -> Self {
        ElementId::Id(id)
    }
}

impl From<&str> for ElementId {
    fn from(token: &str) -> Self {
        match token.parse::<u64>() {
            Ok(id) => ElementId::Id(id),
            Err(_) => ElementId::Placeholder(token.to_string()),
        }
    }
}

impl From<String> for ElementId {
    fn from(token: String) -> Self {
        match token.parse::<u64>() {
            Ok(id) => ElementId::Id(id),
            Err(_) => ElementId::Placeholder(token),
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementId::Id(id) => write!(f, "{}", id),
            ElementId::Placeholder(token) => f.write_str(token),
        }
    }
}
