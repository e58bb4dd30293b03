use serde::{Deserialize, Serialize};

/// Default Neo4j Server REST root
pub const NEO4J_URI: &str = "http://localhost:7474/db/data/";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_root_uri")]
    pub root_uri: String,

    // Basic auth, sent only when both are set
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,

    #[serde(default)]
    pub log_level: LogLevel,

    /// Mirror every vertex/edge create and update into the default indices
    #[serde(default = "default_autoindex")]
    pub autoindex: bool,
    #[serde(default = "default_vertex_index")]
    pub vertex_index: String,
    #[serde(default = "default_edge_index")]
    pub edge_index: String,

    /// Per-request timeout handed to the HTTP transport
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

fn default_root_uri() -> String {
    NEO4J_URI.to_string()
}

fn default_autoindex() -> bool {
    true
}

fn default_vertex_index() -> String {
    "vertex".to_string()
}

fn default_edge_index() -> String {
    "edge".to_string()
}

impl Config {
    /// Config with defaults for the server at `root_uri`
    pub fn new(root_uri: impl Into<String>) -> Self {
        Self {
            root_uri: root_uri.into(),
            ..Self::default()
        }
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Raw HTTP responses are only kept around when debugging
    pub fn retain_raw(&self) -> bool {
        self.log_level == LogLevel::Debug
    }

    /// Root URI without the trailing slash
    pub fn base_uri(&self) -> &str {
        self.root_uri.trim_end_matches('/')
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_uri: default_root_uri(),
            username: None,
            password: None,
            log_level: LogLevel::default(),
            autoindex: default_autoindex(),
            vertex_index: default_vertex_index(),
            edge_index: default_edge_index(),
            timeout_secs: None,
            insecure_skip_verify: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"root_uri": "http://db:7474/db/data", "autoindex": false}"#)
                .unwrap();

        assert_eq!(config.root_uri, "http://db:7474/db/data");
        assert!(!config.autoindex);
        assert_eq!(config.vertex_index, "vertex");
        assert_eq!(config.edge_index, "edge");
        assert_eq!(config.log_level, LogLevel::Info);
        assert!(config.username.is_none());
    }

    #[test]
    fn test_retain_raw_only_at_debug() {
        let mut config = Config::default();
        assert!(!config.retain_raw());

        config.log_level = LogLevel::Debug;
        assert!(config.retain_raw());
    }

    #[test]
    fn test_log_level_parses_lowercase() {
        let level: LogLevel = serde_json::from_str(r#""warning""#).unwrap();
        assert_eq!(level, LogLevel::Warning);
        assert_eq!(level.as_filter(), "warn");
    }

    #[test]
    fn test_base_uri_trims_slash() {
        let config = Config::new("http://localhost:7474/db/data/");
        assert_eq!(config.base_uri(), "http://localhost:7474/db/data");
        assert!(config.autoindex);
    }
}
