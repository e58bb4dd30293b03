use crate::paths::{self, CYPHER_PATH, GREMLIN_PATH, VERTEX_PATH};
use crate::request::Request;
use crate::transport::{HttpTransport, Transport};
use crate::Result;
use neorest_core::{Config, ElementId, ElementType, Response, Script, Scripts};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Index configuration sent on index creation
#[derive(Debug, Clone)]
pub struct IndexOptions {
    /// "exact" or "fulltext"
    pub index_type: String,
    pub provider: String,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            index_type: "exact".to_string(),
            provider: "lucene".to_string(),
        }
    }
}

/// Neo4j Server REST client
///
/// One method per remote operation. Every call is a single request whose
/// reply comes back as a decoded `Response`.
pub struct Client {
    config: Arc<Config>,
    scripts: Scripts,
    request: Request,
}

impl Client {
    /// Create a client talking HTTP to `config.root_uri`
    pub fn new(config: Config) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client over a custom transport.
    ///
    /// Fails if a script needed by any operation is missing.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let scripts = Scripts::builtin();
        scripts.validate()?;
        let request = Request::new(&config, transport);
        Ok(Self {
            config: Arc::new(config),
            scripts,
            request,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn scripts(&self) -> &Scripts {
        &self.scripts
    }

    /// For registering additional script namespaces
    pub fn scripts_mut(&mut self) -> &mut Scripts {
        &mut self.scripts
    }

    // Gremlin / Cypher

    /// Execute a Gremlin script with bound params
    pub async fn gremlin(&self, script: &str, params: Option<Value>) -> Result<Response> {
        let params = json!({ "script": script, "params": params });
        self.request.post(GREMLIN_PATH, Some(params)).await
    }

    /// Execute a Cypher query; each result row is unwrapped to its first column
    pub async fn cypher(&self, query: &str, params: Option<Value>) -> Result<Response> {
        let params = json!({ "query": query, "params": params });
        let mut resp = self.request.post(CYPHER_PATH, Some(params)).await?;
        resp.unwrap_rows();
        Ok(resp)
    }

    async fn run(&self, script: Script, params: Value) -> Result<Response> {
        let body = self.scripts.script(script)?;
        tracing::debug!(script = script.name(), "Running script");
        self.gremlin(body, Some(params)).await
    }

    // Vertices

    pub async fn create_vertex(&self, data: Map<String, Value>) -> Result<Response> {
        if self.config.autoindex {
            return self
                .create_indexed_vertex(data, &self.config.vertex_index, None)
                .await;
        }
        let params = remove_null_values(data);
        self.request.post(VERTEX_PATH, Some(Value::Object(params))).await
    }

    pub async fn get_vertex(&self, id: impl Into<ElementId>) -> Result<Response> {
        let path = paths::vertex_path(&id.into(), &[]);
        self.request.get(&path, None).await
    }

    /// Replace all properties of a vertex
    pub async fn update_vertex(
        &self,
        id: impl Into<ElementId>,
        data: Map<String, Value>,
    ) -> Result<Response> {
        let id: ElementId = id.into();
        if self.config.autoindex {
            return self
                .update_indexed_vertex(id, data, &self.config.vertex_index, None)
                .await;
        }
        let path = paths::vertex_path(&id, &["properties"]);
        let params = remove_null_values(data);
        self.request.put(&path, Some(Value::Object(params))).await
    }

    pub async fn delete_vertex(&self, id: impl Into<ElementId>) -> Result<Response> {
        let id: ElementId = id.into();
        self.run(Script::DeleteVertex, json!({ "_id": id })).await
    }

    // Edges

    pub async fn create_edge(
        &self,
        out_v: impl Into<ElementId>,
        label: &str,
        in_v: impl Into<ElementId>,
        data: Map<String, Value>,
    ) -> Result<Response> {
        let (out_v, in_v): (ElementId, ElementId) = (out_v.into(), in_v.into());
        if self.config.autoindex {
            return self
                .create_indexed_edge(out_v, label, in_v, data, &self.config.edge_index, None)
                .await;
        }
        let data = remove_null_values(data);
        let to = paths::vertex_uri(&self.config.root_uri, &in_v);
        let path = paths::vertex_path(&out_v, &["relationships"]);
        let params = json!({ "to": to, "type": label, "data": data });
        self.request.post(&path, Some(params)).await
    }

    pub async fn get_edge(&self, id: impl Into<ElementId>) -> Result<Response> {
        let path = paths::edge_path(&id.into(), &[]);
        self.request.get(&path, None).await
    }

    /// Replace all properties of an edge
    pub async fn update_edge(
        &self,
        id: impl Into<ElementId>,
        data: Map<String, Value>,
    ) -> Result<Response> {
        let id: ElementId = id.into();
        if self.config.autoindex {
            return self
                .update_indexed_edge(id, data, &self.config.edge_index, None)
                .await;
        }
        let path = paths::edge_path(&id, &["properties"]);
        let params = remove_null_values(data);
        self.request.put(&path, Some(Value::Object(params))).await
    }

    pub async fn delete_edge(&self, id: impl Into<ElementId>) -> Result<Response> {
        let path = paths::edge_path(&id.into(), &[]);
        self.request.delete(&path, None).await
    }

    // Adjacency

    /// Outgoing edges of a vertex, optionally only those with `label`
    pub async fn out_e(&self, id: impl Into<ElementId>, label: Option<&str>) -> Result<Response> {
        self.traverse(Script::OutE, id.into(), label).await
    }

    pub async fn in_e(&self, id: impl Into<ElementId>, label: Option<&str>) -> Result<Response> {
        self.traverse(Script::InE, id.into(), label).await
    }

    pub async fn both_e(&self, id: impl Into<ElementId>, label: Option<&str>) -> Result<Response> {
        self.traverse(Script::BothE, id.into(), label).await
    }

    /// Vertices reached over outgoing edges
    pub async fn out_v(&self, id: impl Into<ElementId>, label: Option<&str>) -> Result<Response> {
        self.traverse(Script::OutV, id.into(), label).await
    }

    pub async fn in_v(&self, id: impl Into<ElementId>, label: Option<&str>) -> Result<Response> {
        self.traverse(Script::InV, id.into(), label).await
    }

    pub async fn both_v(&self, id: impl Into<ElementId>, label: Option<&str>) -> Result<Response> {
        self.traverse(Script::BothV, id.into(), label).await
    }

    async fn traverse(&self, script: Script, id: ElementId, label: Option<&str>) -> Result<Response> {
        self.run(script, json!({ "_id": id, "label": label })).await
    }

    // Index management

    pub async fn create_vertex_index(&self, name: &str, options: IndexOptions) -> Result<Response> {
        self.create_index(ElementType::Vertex, name, options).await
    }

    pub async fn get_vertex_indices(&self) -> Result<Response> {
        self.get_indices(ElementType::Vertex).await
    }

    pub async fn get_vertex_index(&self, name: &str) -> Result<Response> {
        self.get_index(ElementType::Vertex, name).await
    }

    pub async fn delete_vertex_index(&self, name: &str) -> Result<Response> {
        self.delete_index(ElementType::Vertex, name).await
    }

    pub async fn create_edge_index(&self, name: &str, options: IndexOptions) -> Result<Response> {
        self.create_index(ElementType::Edge, name, options).await
    }

    pub async fn get_edge_indices(&self) -> Result<Response> {
        self.get_indices(ElementType::Edge).await
    }

    pub async fn get_edge_index(&self, name: &str) -> Result<Response> {
        self.get_index(ElementType::Edge, name).await
    }

    pub async fn delete_edge_index(&self, name: &str) -> Result<Response> {
        self.delete_index(ElementType::Edge, name).await
    }

    async fn create_index(
        &self,
        kind: ElementType,
        name: &str,
        options: IndexOptions,
    ) -> Result<Response> {
        let path = paths::index_path(kind, &[]);
        let params = json!({
            "name": name,
            "config": { "type": options.index_type, "provider": options.provider },
        });
        let mut resp = self.request.post(&path, Some(params)).await?;
        // the server's payload does not include the name
        resp.set_index_name(name)?;
        Ok(resp)
    }

    async fn get_indices(&self, kind: ElementType) -> Result<Response> {
        let path = paths::index_path(kind, &[]);
        self.request.get(&path, None).await
    }

    async fn get_index(&self, kind: ElementType, name: &str) -> Result<Response> {
        let mut resp = self.get_indices(kind).await?;
        resp.select_index(name)?;
        Ok(resp)
    }

    async fn delete_index(&self, kind: ElementType, name: &str) -> Result<Response> {
        let path = paths::index_path(kind, &[name]);
        self.request.delete(&path, None).await
    }

    // Index membership

    /// Add a vertex to an index under `key`/`value`
    pub async fn put_vertex(
        &self,
        index_name: &str,
        key: &str,
        value: impl Serialize,
        id: impl Into<ElementId>,
    ) -> Result<Response> {
        self.put_element(ElementType::Vertex, index_name, key, value, id.into())
            .await
    }

    pub async fn lookup_vertex(&self, index_name: &str, key: &str, value: &str) -> Result<Response> {
        self.lookup(ElementType::Vertex, index_name, key, value).await
    }

    /// Query an index, e.g. `{"query": "name:al*"}`
    pub async fn query_vertex(
        &self,
        index_name: &str,
        params: Map<String, Value>,
    ) -> Result<Response> {
        self.query(ElementType::Vertex, index_name, params).await
    }

    /// Remove a vertex from an index, narrowed by key and value when given
    pub async fn remove_vertex(
        &self,
        index_name: &str,
        id: impl Into<ElementId>,
        key: Option<&str>,
        value: Option<&str>,
    ) -> Result<Response> {
        self.remove_element(ElementType::Vertex, index_name, id.into(), key, value)
            .await
    }

    pub async fn put_edge(
        &self,
        index_name: &str,
        key: &str,
        value: impl Serialize,
        id: impl Into<ElementId>,
    ) -> Result<Response> {
        self.put_element(ElementType::Edge, index_name, key, value, id.into())
            .await
    }

    pub async fn lookup_edge(&self, index_name: &str, key: &str, value: &str) -> Result<Response> {
        self.lookup(ElementType::Edge, index_name, key, value).await
    }

    pub async fn query_edge(
        &self,
        index_name: &str,
        params: Map<String, Value>,
    ) -> Result<Response> {
        self.query(ElementType::Edge, index_name, params).await
    }

    pub async fn remove_edge(
        &self,
        index_name: &str,
        id: impl Into<ElementId>,
        key: Option<&str>,
        value: Option<&str>,
    ) -> Result<Response> {
        self.remove_element(ElementType::Edge, index_name, id.into(), key, value)
            .await
    }

    async fn put_element(
        &self,
        kind: ElementType,
        index_name: &str,
        key: &str,
        value: impl Serialize,
        id: ElementId,
    ) -> Result<Response> {
        let uri = paths::element_uri(&self.config.root_uri, kind, &id);
        let path = paths::index_path(kind, &[index_name]);
        let params = json!({ "key": key, "value": serde_json::to_value(value)?, "uri": uri });
        self.request.post(&path, Some(params)).await
    }

    async fn lookup(
        &self,
        kind: ElementType,
        index_name: &str,
        key: &str,
        value: &str,
    ) -> Result<Response> {
        let (key, value) = (paths::quote_plus(key), paths::quote_plus(value));
        let path = paths::index_path(kind, &[index_name, &key, &value]);
        self.request.get(&path, None).await
    }

    async fn query(
        &self,
        kind: ElementType,
        index_name: &str,
        params: Map<String, Value>,
    ) -> Result<Response> {
        let path = paths::index_path(kind, &[index_name]);
        self.request.get(&path, Some(Value::Object(params))).await
    }

    async fn remove_element(
        &self,
        kind: ElementType,
        index_name: &str,
        id: ElementId,
        key: Option<&str>,
        value: Option<&str>,
    ) -> Result<Response> {
        let mut segments = vec![index_name.to_string()];
        // a value only narrows the removal together with its key
        if let Some(key) = key {
            segments.push(paths::quote_plus(key));
            if let Some(value) = value {
                segments.push(paths::quote_plus(value));
            }
        }
        segments.push(id.to_string());
        let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
        let path = paths::index_path(kind, &segments);
        self.request.delete(&path, None).await
    }

    // Indexed model writes

    /// Create a vertex and index the given keys (all keys when `None`)
    pub async fn create_indexed_vertex(
        &self,
        data: Map<String, Value>,
        index_name: &str,
        keys: Option<&[&str]>,
    ) -> Result<Response> {
        let data = remove_null_values(data);
        let params = json!({ "data": data, "index_name": index_name, "keys": keys });
        self.run(Script::CreateIndexedVertex, params).await
    }

    pub async fn update_indexed_vertex(
        &self,
        id: impl Into<ElementId>,
        data: Map<String, Value>,
        index_name: &str,
        keys: Option<&[&str]>,
    ) -> Result<Response> {
        let id: ElementId = id.into();
        let data = remove_null_values(data);
        let params = json!({
            "_id": id,
            "data": data,
            "index_name": index_name,
            "keys": keys,
        });
        self.run(Script::UpdateIndexedVertex, params).await
    }

    pub async fn create_indexed_edge(
        &self,
        out_v: impl Into<ElementId>,
        label: &str,
        in_v: impl Into<ElementId>,
        data: Map<String, Value>,
        index_name: &str,
        keys: Option<&[&str]>,
    ) -> Result<Response> {
        let (out_v, in_v): (ElementId, ElementId) = (out_v.into(), in_v.into());
        let data = remove_null_values(data);
        let params = json!({
            "outV": out_v,
            "label": label,
            "inV": in_v,
            "data": data,
            "index_name": index_name,
            "keys": keys,
        });
        self.run(Script::CreateIndexedEdge, params).await
    }

    pub async fn update_indexed_edge(
        &self,
        id: impl Into<ElementId>,
        data: Map<String, Value>,
        index_name: &str,
        keys: Option<&[&str]>,
    ) -> Result<Response> {
        let id: ElementId = id.into();
        let data = remove_null_values(data);
        let params = json!({
            "_id": id,
            "data": data,
            "index_name": index_name,
            "keys": keys,
        });
        self.run(Script::UpdateIndexedEdge, params).await
    }

    // Metadata

    pub async fn get_metadata(&self, key: &str, default_value: Option<Value>) -> Result<Response> {
        let params = json!({ "key": key, "default_value": default_value });
        self.run(Script::GetMetadata, params).await
    }

    pub async fn set_metadata(&self, key: &str, value: impl Serialize) -> Result<Response> {
        let params = json!({ "key": key, "value": serde_json::to_value(value)? });
        self.run(Script::SetMetadata, params).await
    }

    pub async fn remove_metadata(&self, key: &str) -> Result<Response> {
        self.run(Script::RemoveMetadata, json!({ "key": key })).await
    }
}

/// Drops null-valued properties, which the server rejects.
///
/// Updates overwrite the whole property map, so an omitted key is cleared.
pub fn remove_null_values(data: Map<String, Value>) -> Map<String, Value> {
    data.into_iter().filter(|(_, value)| !value.is_null()).collect()
}
