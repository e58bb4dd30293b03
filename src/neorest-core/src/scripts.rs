//! Gremlin-Groovy script registry
//!
//! Operations the REST resources cannot express (indexed writes, deletes,
//! traversals, metadata) are sent as Gremlin scripts. Scripts are kept as
//! Groovy source; every top-level `def name(args) { ... }` block becomes one
//! named script body.

use crate::error::{Error, Result};
use std::collections::HashMap;

const GREMLIN_SOURCE: &str = include_str!("../scripts/gremlin.groovy");
const NEO4J_SOURCE: &str = include_str!("../scripts/neo4j.groovy");

/// Every operation of the client that is implemented as a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    DeleteVertex,
    OutE,
    InE,
    BothE,
    OutV,
    InV,
    BothV,
    CreateIndexedVertex,
    UpdateIndexedVertex,
    CreateIndexedEdge,
    UpdateIndexedEdge,
    GetMetadata,
    SetMetadata,
    RemoveMetadata,
}

impl Script {
    pub const ALL: [Script; 14] = [
        Script::DeleteVertex,
        Script::OutE,
        Script::InE,
        Script::BothE,
        Script::OutV,
        Script::InV,
        Script::BothV,
        Script::CreateIndexedVertex,
        Script::UpdateIndexedVertex,
        Script::CreateIndexedEdge,
        Script::UpdateIndexedEdge,
        Script::GetMetadata,
        Script::SetMetadata,
        Script::RemoveMetadata,
    ];

    /// Name of the Groovy def implementing this operation
    pub fn name(&self) -> &'static str {
        match self {
            Script::DeleteVertex => "delete_vertex",
            Script::OutE => "outE",
            Script::InE => "inE",
            Script::BothE => "bothE",
            Script::OutV => "outV",
            Script::InV => "inV",
            Script::BothV => "bothV",
            Script::CreateIndexedVertex => "create_indexed_vertex",
            Script::UpdateIndexedVertex => "update_indexed_vertex",
            Script::CreateIndexedEdge => "create_indexed_edge",
            Script::UpdateIndexedEdge => "update_indexed_edge",
            Script::GetMetadata => "get_metadata",
            Script::SetMetadata => "set_metadata",
            Script::RemoveMetadata => "remove_metadata",
        }
    }
}

/// Name -> script body
#[derive(Debug, Clone, Default)]
pub struct Scripts {
    methods: HashMap<String, String>,
}

impl Scripts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generic library overlaid with the Neo4j Server scripts
    pub fn builtin() -> Self {
        let mut scripts = Self::parse(GREMLIN_SOURCE);
        scripts.update(NEO4J_SOURCE);
        scripts
    }

    pub fn parse(source: &str) -> Self {
        let mut scripts = Self::new();
        scripts.update(source);
        scripts
    }

    /// Adds every def in `source`, replacing scripts of the same name.
    /// Returns the number of defs read.
    pub fn update(&mut self, source: &str) -> usize {
        let methods = parse_defs(source);
        let count = methods.len();
        for (name, body) in methods {
            tracing::trace!(script = %name, "Registered script");
            self.methods.insert(name, body);
        }
        count
    }

    pub fn insert(&mut self, name: impl Into<String>, body: impl Into<String>) {
        self.methods.insert(name.into(), body.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.methods.get(name).map(String::as_str)
    }

    pub fn script(&self, script: Script) -> Result<&str> {
        self.get(script.name())
            .ok_or_else(|| Error::MissingScript(script.name().to_string()))
    }

    /// Fails on the first operation without a script
    pub fn validate(&self) -> Result<()> {
        for script in Script::ALL {
            self.script(script)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Splits Groovy source into (name, body) pairs.
///
/// A def starts with `def name(...) {` at column 0 and ends at the next
/// line starting with `}`.
fn parse_defs(source: &str) -> Vec<(String, String)> {
    let mut defs = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in source.lines() {
        if current.is_none() {
            if let Some(name) = def_name(line) {
                current = Some((name.to_string(), Vec::new()));
            }
            continue;
        }
        if line.starts_with('}') {
            if let Some((name, body)) = current.take() {
                defs.push((name, dedent(&body)));
            }
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    defs
}

fn def_name(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("def ")?;
    if !line.trim_end().ends_with('{') {
        return None;
    }
    let name = rest[..rest.find('(')?].trim();
    (!name.is_empty()).then_some(name)
}

fn dedent(lines: &[&str]) -> String {
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| l.get(indent..).unwrap_or("").trim_end())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
