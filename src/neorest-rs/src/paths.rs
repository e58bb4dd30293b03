//! Resource paths of the Neo4j Server REST API

use neorest_core::{ElementId, ElementType};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const VERTEX_PATH: &str = "node";
pub const EDGE_PATH: &str = "relationship";
pub const INDEX_PATH: &str = "index";
pub const GREMLIN_PATH: &str = "ext/GremlinPlugin/graphdb/execute_script";
pub const CYPHER_PATH: &str = "ext/CypherPlugin/graphdb/execute_query";

/// Characters left alone by `quote_plus`
const QUOTE_PLUS: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// Joins segments with `/`.
///
/// Empty segments are kept: `index/node/people/name/` looks up the empty
/// value, which is a different resource from `index/node/people/name`.
pub fn build_path<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    segments
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Form encoding for index keys and values (space becomes `+`)
pub fn quote_plus(value: &str) -> String {
    utf8_percent_encode(value, QUOTE_PLUS)
        .to_string()
        .replace("%20", "+")
}

/// `node/{id}/...`, or the placeholder itself followed by `extra`
pub fn vertex_path(id: &ElementId, extra: &[&str]) -> String {
    element_path(ElementType::Vertex, id, extra)
}

/// `relationship/{id}/...`, or the placeholder itself followed by `extra`
pub fn edge_path(id: &ElementId, extra: &[&str]) -> String {
    element_path(ElementType::Edge, id, extra)
}

pub fn element_path(kind: ElementType, id: &ElementId, extra: &[&str]) -> String {
    let head = match id.placeholder() {
        Some(placeholder) => vec![placeholder.to_string()],
        None => vec![kind.resource().to_string(), id.to_string()],
    };
    build_path(head.iter().map(String::as_str).chain(extra.iter().copied()))
}

/// Absolute vertex URI; placeholders are returned verbatim
pub fn vertex_uri(root_uri: &str, id: &ElementId) -> String {
    element_uri(root_uri, ElementType::Vertex, id)
}

/// Absolute edge URI; placeholders are returned verbatim
pub fn edge_uri(root_uri: &str, id: &ElementId) -> String {
    element_uri(root_uri, ElementType::Edge, id)
}

pub fn element_uri(root_uri: &str, kind: ElementType, id: &ElementId) -> String {
    match id.placeholder() {
        Some(placeholder) => placeholder.to_string(),
        None => format!(
            "{}/{}",
            root_uri.trim_end_matches('/'),
            element_path(kind, id, &[])
        ),
    }
}

/// `index/node` or `index/relationship` followed by `segments`
pub fn index_path(kind: ElementType, segments: &[&str]) -> String {
    build_path(
        [INDEX_PATH, kind.resource()]
            .into_iter()
            .chain(segments.iter().copied()),
    )
}
