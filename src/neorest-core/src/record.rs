//! A single decoded result object
//!
//! One JSON object from a response body may describe a vertex, an edge, an
//! index or a bare script value. `Record` keeps the raw object and decodes
//! the interesting fields on demand.

use crate::error::{Error, Result};
use crate::ids::{self, ElementType};
use serde_json::{Map, Value};

/// Role of a record, inferred from the shape of its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Vertex,
    Edge,
    Index,
    /// Script output or anything else without element fields
    Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    raw: Value,
}

impl Record {
    pub fn new(raw: Value) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn kind(&self) -> RecordKind {
        let Some(object) = self.raw.as_object() else {
            return RecordKind::Value;
        };
        if object.contains_key("template") {
            RecordKind::Index
        } else if object.contains_key("start") && object.contains_key("end") {
            RecordKind::Edge
        } else if object.contains_key("self") {
            match ids::parse_type(self.uri()) {
                Some("relationship") => RecordKind::Edge,
                _ => RecordKind::Vertex,
            }
        } else {
            RecordKind::Value
        }
    }

    /// Element ID decoded from the `self` locator
    pub fn id(&self) -> Result<Option<u64>> {
        ids::parse_id(self.uri())
    }

    /// Vertex or edge, decoded from the `self` locator
    pub fn element_type(&self) -> Result<ElementType> {
        ElementType::from_token(ids::parse_type(self.uri()))
    }

    /// Property map; absent for edges created without properties
    pub fn map(&self) -> Option<&Map<String, Value>> {
        self.raw.get("data").and_then(Value::as_object)
    }

    pub fn uri(&self) -> Option<&str> {
        self.str_field("self")
    }

    /// ID of the edge's outgoing (start) vertex; `None` unless this is an edge
    pub fn out_v(&self) -> Result<Option<u64>> {
        ids::parse_id(self.edge_field("start"))
    }

    /// ID of the edge's incoming (end) vertex; `None` unless this is an edge
    pub fn in_v(&self) -> Result<Option<u64>> {
        ids::parse_id(self.edge_field("end"))
    }

    /// Edge label (the relationship `type` field)
    pub fn label(&self) -> Option<&str> {
        self.edge_field("type")
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_field("name")
    }

    /// Whether an index holds vertices or edges, decoded from its template
    pub fn index_class(&self) -> Result<ElementType> {
        ElementType::from_token(ids::parse_index_type(self.index_field("template")))
    }

    /// Raw attribute access; unlike the typed accessors a missing field is an error
    pub fn get(&self, attribute: &str) -> Result<&Value> {
        self.raw
            .get(attribute)
            .ok_or_else(|| Error::Lookup(attribute.to_string()))
    }

    /// Overwrites the `name` field.
    ///
    /// Index create/lookup payloads from the server do not carry the index
    /// name, so the caller-supplied one is patched in afterwards.
    pub fn set_index_name(&mut self, name: &str) -> Result<()> {
        let object = self.raw.as_object_mut().ok_or(Error::NotAnObject)?;
        object.insert("name".to_string(), Value::String(name.to_string()));
        Ok(())
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.raw.get(field).and_then(Value::as_str)
    }

    // an index descriptor also has a `type`, and a vertex may carry a `name`
    fn edge_field(&self, field: &str) -> Option<&str> {
        match self.kind() {
            RecordKind::Edge => self.str_field(field),
            _ => None,
        }
    }

    fn index_field(&self, field: &str) -> Option<&str> {
        match self.kind() {
            RecordKind::Index => self.str_field(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vertex() -> Record {
        Record::new(json!({
            "self": "http://localhost:7474/db/data/node/42",
            "data": {"name": "alice"},
            "properties": "http://localhost:7474/db/data/node/42/properties"
        }))
    }

    fn edge() -> Record {
        Record::new(json!({
            "self": "http://localhost:7474/db/data/relationship/7",
            "start": "http://localhost:7474/db/data/node/1",
            "end": "http://localhost:7474/db/data/node/2",
            "type": "knows"
        }))
    }

    #[test]
    fn test_vertex_accessors() {
        let record = vertex();
        assert_eq!(record.kind(), RecordKind::Vertex);
        assert_eq!(record.id().unwrap(), Some(42));
        assert_eq!(record.element_type().unwrap(), ElementType::Vertex);
        assert_eq!(record.map().unwrap().get("name"), Some(&json!("alice")));
        assert_eq!(record.uri(), Some("http://localhost:7474/db/data/node/42"));
    }

    #[test]
    fn test_edge_accessors() {
        let record = edge();
        assert_eq!(record.kind(), RecordKind::Edge);
        assert_eq!(record.id().unwrap(), Some(7));
        assert_eq!(record.element_type().unwrap(), ElementType::Edge);
        assert_eq!(record.out_v().unwrap(), Some(1));
        assert_eq!(record.in_v().unwrap(), Some(2));
        assert_eq!(record.label(), Some("knows"));
        // no properties means no data field, which is not an error
        assert!(record.map().is_none());
    }

    #[test]
    fn test_vertex_has_no_endpoints() {
        let record = vertex();
        assert_eq!(record.out_v().unwrap(), None);
        assert_eq!(record.in_v().unwrap(), None);
        assert_eq!(record.label(), None);
    }

    #[test]
    fn test_unknown_type_token_is_error() {
        let record = Record::new(json!({"self": "http://localhost:7474/db/data/index/9"}));
        assert!(matches!(
            record.element_type(),
            Err(Error::UnknownType(Some(ref t))) if t == "index"
        ));
    }

    #[test]
    fn test_get_missing_attribute_is_lookup_error() {
        let record = vertex();
        assert_eq!(
            record.get("properties").unwrap(),
            "http://localhost:7474/db/data/node/42/properties"
        );
        assert!(matches!(record.get("missing"), Err(Error::Lookup(ref a)) if a == "missing"));
    }

    #[test]
    fn test_index_record() {
        let mut record = Record::new(json!({
            "template": "http://localhost:7474/db/data/index/node/people/{key}/{value}",
            "provider": "lucene",
            "type": "exact"
        }));
        assert_eq!(record.kind(), RecordKind::Index);
        assert_eq!(record.index_name(), None);
        assert_eq!(record.index_class().unwrap(), ElementType::Vertex);

        record.set_index_name("people").unwrap();
        assert_eq!(record.index_name(), Some("people"));
    }

    #[test]
    fn test_edge_accessors_ignore_index_records() {
        let record = Record::new(json!({
            "template": "http://localhost:7474/db/data/index/node/people/{key}/{value}",
            "provider": "lucene",
            "type": "exact",
            "start": "http://localhost:7474/db/data/node/1"
        }));
        assert_eq!(record.kind(), RecordKind::Index);
        assert_eq!(record.label(), None);
        assert_eq!(record.out_v().unwrap(), None);
        assert_eq!(record.in_v().unwrap(), None);
    }

    #[test]
    fn test_index_accessors_ignore_elements() {
        let mut record = vertex();
        record.set_index_name("people").unwrap();
        assert_eq!(record.index_name(), None);
        assert!(matches!(record.index_class(), Err(Error::UnknownType(None))));
        assert_eq!(edge().index_name(), None);
    }

    #[test]
    fn test_scalar_record() {
        let mut record = Record::new(json!("some value"));
        assert_eq!(record.kind(), RecordKind::Value);
        assert_eq!(record.id().unwrap(), None);
        assert!(record.map().is_none());
        assert!(matches!(record.get("self"), Err(Error::Lookup(_))));
        assert!(matches!(record.set_index_name("x"), Err(Error::NotAnObject)));
    }
}
