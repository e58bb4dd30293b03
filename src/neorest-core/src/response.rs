//! Decoding of one HTTP round trip into records
//!
//! The server answers with one of a handful of body shapes: nothing at all
//! (updates), a JSON array (lists of elements), a JSON object (a single
//! element or an index map) or the JSON string `"null"` (a Gremlin script
//! that returned nothing). `Results` makes that shape explicit.

use crate::error::{Error, Result, StatusKind};
use crate::record::Record;
use serde_json::Value;
use std::collections::HashMap;

/// Body returned by Gremlin scripts that produced no value
const NULL_SENTINEL: &str = "null";

/// Undecoded reply as handed over by the transport
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Decoding options fixed at construction time
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseOptions {
    /// Keep the untouched `RawResponse` on the decoded `Response`
    pub retain_raw: bool,
}

/// Status line plus header fields, keyed by lowercase name
#[derive(Debug, Clone, Default)]
pub struct Headers {
    status: u16,
    fields: HashMap<String, String>,
}

impl Headers {
    fn from_raw(raw: &RawResponse) -> Self {
        let fields = raw
            .headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect();
        Self {
            status: raw.status,
            fields,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// `Location` of a newly created resource
    pub fn location(&self) -> Option<&str> {
        self.get("location")
    }
}

/// Single-pass sequence of records decoded from a JSON array
#[derive(Debug)]
pub struct Records {
    rows: std::vec::IntoIter<Value>,
}

impl Records {
    fn new(rows: Vec<Value>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl Iterator for Records {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        self.rows.next().map(Record::new)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Records {}

/// Decoded results of a response
#[derive(Debug)]
pub enum Results {
    Empty,
    Single(Record),
    Many(Records),
}

impl Results {
    /// Classifies decoded content; returns the results and their count.
    ///
    /// Only a missing body, JSON `null` and the `"null"` string mean no
    /// results. Falsy values such as `{}`, `0`, `false` or `""` are still
    /// present and become a single record.
    fn from_content(content: Option<&Value>) -> (Self, usize) {
        match content {
            Some(Value::Array(rows)) => (Results::Many(Records::new(rows.clone())), rows.len()),
            None | Some(Value::Null) => (Results::Empty, 0),
            Some(Value::String(s)) if s == NULL_SENTINEL => (Results::Empty, 0),
            Some(object) => (Results::Single(Record::new(object.clone())), 1),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Results::Empty)
    }

    pub fn single(&self) -> Option<&Record> {
        match self {
            Results::Single(record) => Some(record),
            _ => None,
        }
    }

    pub fn single_mut(&mut self) -> Option<&mut Record> {
        match self {
            Results::Single(record) => Some(record),
            _ => None,
        }
    }
}

impl IntoIterator for Results {
    type Item = Record;
    type IntoIter = ResultsIter;

    fn into_iter(self) -> ResultsIter {
        match self {
            Results::Empty => ResultsIter::Done,
            Results::Single(record) => ResultsIter::One(Some(record)),
            Results::Many(records) => ResultsIter::Many(records),
        }
    }
}

#[derive(Debug)]
pub enum ResultsIter {
    Done,
    One(Option<Record>),
    Many(Records),
}

impl Iterator for ResultsIter {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        match self {
            ResultsIter::Done => None,
            ResultsIter::One(record) => record.take(),
            ResultsIter::Many(records) => records.next(),
        }
    }
}

/// One decoded server response. Built once per HTTP call.
#[derive(Debug)]
pub struct Response {
    headers: Headers,
    content: Option<Value>,
    results: Results,
    total_size: usize,
    raw: Option<RawResponse>,
}

impl Response {
    /// Checks the status, decodes the body and materializes the results.
    pub fn new(raw: RawResponse, options: ResponseOptions) -> Result<Self> {
        check_status(&raw)?;

        let headers = Headers::from_raw(&raw);
        let content = decode_body(&raw.body)?;
        let (results, total_size) = Results::from_content(content.as_ref());
        tracing::trace!(status = raw.status, total_size, "Decoded response");

        let raw = options.retain_raw.then_some(raw);
        Ok(Self {
            headers,
            content,
            results,
            total_size,
            raw,
        })
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Parsed body; `None` when the server sent no body
    pub fn content(&self) -> Option<&Value> {
        self.content.as_ref()
    }

    pub fn results(&self) -> &Results {
        &self.results
    }

    pub fn into_results(self) -> Results {
        self.results
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Untouched reply, only present when built with `retain_raw`
    pub fn raw(&self) -> Option<&RawResponse> {
        self.raw.as_ref()
    }

    /// Patches the caller-supplied index name into a single result.
    pub fn set_index_name(&mut self, name: &str) -> Result<()> {
        match self.results.single_mut() {
            Some(record) => record.set_index_name(name),
            None => Ok(()),
        }
    }

    /// Narrows an index map (`{name: descriptor, ...}`) to the named entry.
    pub fn select_index(&mut self, name: &str) -> Result<()> {
        let entry = self.content.as_ref().and_then(|c| c.get(name)).cloned();
        match entry {
            Some(descriptor) => {
                let mut record = Record::new(descriptor);
                record.set_index_name(name)?;
                self.results = Results::Single(record);
                self.total_size = 1;
            }
            None => {
                self.results = Results::Empty;
                self.total_size = 0;
            }
        }
        Ok(())
    }

    /// Replaces the results with the rows of a tabular query body.
    ///
    /// Cypher answers `{"columns": [...], "data": [[cell], ...]}`; each row is
    /// unwrapped to its first cell and the count is taken from the unwrapped
    /// rows.
    pub fn unwrap_rows(&mut self) {
        let rows = self.content.as_ref().and_then(|c| c.get("data"));
        let (results, total_size) = match rows.and_then(Value::as_array) {
            Some(rows) => {
                let cells: Vec<Value> = rows
                    .iter()
                    .filter_map(|row| match row {
                        Value::Array(cells) => cells.first().cloned(),
                        other => Some(other.clone()),
                    })
                    .collect();
                let total_size = cells.len();
                (Results::Many(Records::new(cells)), total_size)
            }
            None => (Results::Empty, 0),
        };
        self.results = results;
        self.total_size = total_size;
    }
}

fn check_status(raw: &RawResponse) -> Result<()> {
    if (200..300).contains(&raw.status) {
        return Ok(());
    }
    Err(Error::Status {
        kind: StatusKind::from_status(raw.status),
        status: raw.status,
        body: String::from_utf8_lossy(&raw.body).into_owned(),
    })
}

/// Empty bodies (e.g. property updates) decode to `None`
fn decode_body(body: &[u8]) -> Result<Option<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(body)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(status: u16, body: &str) -> Result<Response> {
        Response::new(RawResponse::new(status, body), ResponseOptions::default())
    }

    #[test]
    fn test_array_body_yields_every_element_in_order() {
        let body = json!([
            {"self": "http://h/db/data/node/1", "data": {"n": 1}},
            {"self": "http://h/db/data/node/2", "data": {"n": 2}},
            {"self": "http://h/db/data/node/3", "data": {"n": 3}}
        ]);
        let resp = decode(200, &body.to_string()).unwrap();
        assert_eq!(resp.total_size(), 3);

        let ids: Vec<u64> = resp
            .into_results()
            .into_iter()
            .map(|r| r.id().unwrap().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_array_body() {
        let resp = decode(200, "[]").unwrap();
        assert_eq!(resp.total_size(), 0);
        assert_eq!(resp.into_results().into_iter().count(), 0);
    }

    #[test]
    fn test_null_sentinel_means_no_results() {
        let resp = decode(200, "\"null\"").unwrap();
        assert!(resp.results().is_empty());
        assert_eq!(resp.total_size(), 0);

        let resp = Response::new(
            RawResponse::new(200, "\"null\"").with_header("Content-Type", "text/plain"),
            ResponseOptions::default(),
        )
        .unwrap();
        assert!(resp.results().is_empty());
    }

    #[test]
    fn test_single_object_body() {
        let resp = decode(200, r#"{"self": "http://h/db/data/node/5", "data": {}}"#).unwrap();
        assert_eq!(resp.total_size(), 1);
        let record = resp.results().single().unwrap();
        assert_eq!(record.id().unwrap(), Some(5));
    }

    #[test]
    fn test_scalar_body_is_single_result() {
        let resp = decode(200, "\"some value\"").unwrap();
        assert_eq!(resp.total_size(), 1);
        assert_eq!(resp.results().single().unwrap().raw(), &json!("some value"));
    }

    #[test]
    fn test_empty_body() {
        let resp = decode(204, "").unwrap();
        assert!(resp.content().is_none());
        assert!(resp.results().is_empty());
        assert_eq!(resp.total_size(), 0);
        assert_eq!(resp.headers().status(), 204);
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = decode(200, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_status_errors_carry_kind_and_body() {
        let err = decode(404, "Cannot find node with id [99]").unwrap_err();
        match err {
            Error::Status { kind, status, body } => {
                assert_eq!(kind, StatusKind::NotFound);
                assert_eq!(status, 404);
                assert!(body.contains("[99]"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // status is checked before the body is parsed
        let err = decode(500, "not json").unwrap_err();
        assert_eq!(err.status_kind(), Some(StatusKind::Server));
        assert_eq!(decode(409, "").unwrap_err().status_kind(), Some(StatusKind::Conflict));
    }

    #[test]
    fn test_falsy_bodies_are_single_results() {
        for body in ["{}", "0", "false", "\"\""] {
            let resp = decode(200, body).unwrap();
            assert!(resp.results().single().is_some(), "body {body}");
            assert_eq!(resp.total_size(), 1);
        }
    }

    #[test]
    fn test_raw_retained_only_when_asked() {
        let resp = decode(200, "{}").unwrap();
        assert!(resp.raw().is_none());

        let raw = RawResponse::new(201, "{}").with_header("Location", "http://h/db/data/node/1");
        let resp = Response::new(raw, ResponseOptions { retain_raw: true }).unwrap();
        assert_eq!(resp.raw().unwrap().status, 201);
        assert_eq!(resp.headers().location(), Some("http://h/db/data/node/1"));
    }

    #[test]
    fn test_set_index_name_patches_single_result() {
        let mut resp = decode(
            201,
            r#"{"template": "http://h/db/data/index/node/people/{key}/{value}"}"#,
        )
        .unwrap();
        resp.set_index_name("people").unwrap();
        assert_eq!(resp.results().single().unwrap().index_name(), Some("people"));

        let mut resp = decode(204, "").unwrap();
        resp.set_index_name("people").unwrap();
        assert!(resp.results().is_empty());
    }

    #[test]
    fn test_select_index_from_map() {
        let body = json!({
            "people": {"template": "http://h/db/data/index/node/people/{key}/{value}", "type": "exact"},
            "places": {"template": "http://h/db/data/index/node/places/{key}/{value}", "type": "exact"}
        });
        let mut resp = decode(200, &body.to_string()).unwrap();
        resp.select_index("places").unwrap();
        assert_eq!(resp.total_size(), 1);
        let record = resp.results().single().unwrap();
        assert_eq!(record.index_name(), Some("places"));

        resp.select_index("missing").unwrap();
        assert!(resp.results().is_empty());
        assert_eq!(resp.total_size(), 0);
    }

    #[test]
    fn test_unwrap_rows() {
        let body = json!({
            "columns": ["n"],
            "data": [
                [{"self": "http://h/db/data/node/1", "data": {}}],
                [{"self": "http://h/db/data/node/2", "data": {}}]
            ]
        });
        let mut resp = decode(200, &body.to_string()).unwrap();
        assert_eq!(resp.total_size(), 1);

        resp.unwrap_rows();
        assert_eq!(resp.total_size(), 2);
        let ids: Vec<Option<u64>> = resp
            .into_results()
            .into_iter()
            .map(|r| r.id().unwrap())
            .collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_unwrap_rows_skips_empty_rows() {
        let body = json!({"columns": ["n"], "data": [[], ["x"]]});
        let mut resp = decode(200, &body.to_string()).unwrap();
        resp.unwrap_rows();
        assert_eq!(resp.total_size(), 1);
    }
}
