use crate::Result;
use async_trait::async_trait;
use neorest_core::{Config, RawResponse};
use reqwest::header::ACCEPT;
use reqwest::{Client as HttpClient, Method};
use serde_json::Value;
use std::time::Duration;

/// Performs one HTTP exchange. No retries.
#[async_trait]
pub trait Transport: Send + Sync {
    /// `params` go into the JSON body for POST/PUT and into the query
    /// string for every other method.
    async fn send(&self, method: Method, url: &str, params: Option<&Value>) -> Result<RawResponse>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: HttpClient,
    credentials: Option<(String, String)>,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = HttpClient::builder();
        if config.insecure_skip_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let credentials = match (&config.username, &config.password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        };

        Ok(Self {
            client: builder.build()?,
            credentials,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: Method, url: &str, params: Option<&Value>) -> Result<RawResponse> {
        let in_body = method == Method::POST || method == Method::PUT;

        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json");
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }
        if let Some(params) = params {
            request = if in_body {
                request.json(params)
            } else {
                request.query(&query_pairs(params))
            };
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Flattens a params object into query-string pairs; nulls are dropped
pub fn query_pairs(params: &Value) -> Vec<(String, String)> {
    let Some(object) = params.as_object() else {
        return Vec::new();
    };
    object
        .iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key.clone(), s.clone())),
            other => Some((key.clone(), other.to_string())),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone)]
    pub struct Sent {
        pub method: Method,
        pub url: String,
        pub params: Option<Value>,
    }

    /// Records every request and replays queued replies (empty 200 otherwise)
    #[derive(Default)]
    pub struct MockTransport {
        sent: Mutex<Vec<Sent>>,
        replies: Mutex<VecDeque<RawResponse>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, status: u16, body: &str) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(RawResponse::new(status, body));
            self
        }

        pub fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        pub fn last(&self) -> Sent {
            self.sent().pop().expect("no request sent")
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(
            &self,
            method: Method,
            url: &str,
            params: Option<&Value>,
        ) -> Result<RawResponse> {
            self.sent.lock().unwrap().push(Sent {
                method,
                url: url.to_string(),
                params: params.cloned(),
            });
            let reply = self.replies.lock().unwrap().pop_front();
            Ok(reply.unwrap_or_else(|| RawResponse::new(200, "")))
        }
    }
}
