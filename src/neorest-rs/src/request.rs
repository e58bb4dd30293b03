use crate::transport::Transport;
use crate::Result;
use neorest_core::{Config, Response, ResponseOptions};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;

/// Sends requests relative to the configured root URI and decodes each
/// reply into exactly one `Response`. One attempt per call.
pub struct Request {
    base_uri: String,
    options: ResponseOptions,
    transport: Arc<dyn Transport>,
}

impl Request {
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_uri: config.base_uri().to_string(),
            options: ResponseOptions {
                retain_raw: config.retain_raw(),
            },
            transport,
        }
    }

    pub async fn get(&self, path: &str, params: Option<Value>) -> Result<Response> {
        self.send(Method::GET, path, params).await
    }

    pub async fn put(&self, path: &str, params: Option<Value>) -> Result<Response> {
        self.send(Method::PUT, path, params).await
    }

    pub async fn post(&self, path: &str, params: Option<Value>) -> Result<Response> {
        self.send(Method::POST, path, params).await
    }

    pub async fn delete(&self, path: &str, params: Option<Value>) -> Result<Response> {
        self.send(Method::DELETE, path, params).await
    }

    #[tracing::instrument(skip(self, params))]
    async fn send(&self, method: Method, path: &str, params: Option<Value>) -> Result<Response> {
        let url = self.url(path);
        tracing::debug!(%url, "Sending request");

        let raw = self.transport.send(method, &url, params.as_ref()).await?;
        if (200..300).contains(&raw.status) {
            tracing::debug!(status = raw.status, bytes = raw.body.len(), "Received response");
        } else {
            tracing::warn!(status = raw.status, %url, "Server returned error status");
        }

        Ok(Response::new(raw, self.options)?)
    }

    /// Absolute URIs (e.g. from a `self` field) are used as given
    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_uri, path.trim_start_matches('/'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use neorest_core::LogLevel;
    use serde_json::json;

    fn request(config: &Config, mock: Arc<MockTransport>) -> Request {
        Request::new(config, mock)
    }

    #[tokio::test]
    async fn test_paths_are_joined_to_root() {
        let mock = Arc::new(MockTransport::new());
        let req = request(&Config::new("http://db:7474/db/data/"), mock.clone());

        req.get("node/1", None).await.unwrap();
        req.get("/node/2", None).await.unwrap();
        req.get("http://other:7474/db/data/node/3", None).await.unwrap();

        let urls: Vec<String> = mock.sent().into_iter().map(|s| s.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://db:7474/db/data/node/1",
                "http://db:7474/db/data/node/2",
                "http://other:7474/db/data/node/3",
            ]
        );
    }

    #[tokio::test]
    async fn test_verbs_and_params_are_forwarded() {
        let mock = Arc::new(MockTransport::new());
        let req = request(&Config::default(), mock.clone());

        req.put("node/1/properties", Some(json!({"a": 1}))).await.unwrap();
        req.delete("relationship/4", None).await.unwrap();

        let sent = mock.sent();
        assert_eq!(sent[0].method, Method::PUT);
        assert_eq!(sent[0].params, Some(json!({"a": 1})));
        assert_eq!(sent[1].method, Method::DELETE);
        assert_eq!(sent[1].params, None);
    }

    #[tokio::test]
    async fn test_raw_kept_at_debug_level() {
        let mut config = Config::default();
        config.log_level = LogLevel::Debug;

        let mock = Arc::new(MockTransport::new().reply(200, "{}"));
        let resp = request(&config, mock).get("node/0", None).await.unwrap();
        assert!(resp.raw().is_some());

        let mock = Arc::new(MockTransport::new().reply(200, "{}"));
        let resp = request(&Config::default(), mock).get("node/0", None).await.unwrap();
        assert!(resp.raw().is_none());
    }

    #[tokio::test]
    async fn test_error_status_surfaces() {
        let mock = Arc::new(MockTransport::new().reply(404, "not found"));
        let err = request(&Config::default(), mock)
            .get("node/99", None)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
