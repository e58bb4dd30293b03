//! neorest — run single Neo4j Server operations from the command line
//!
//! Prints every decoded result as JSON on stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use neorest_core::{Config, ElementId, Response};
use neorest_rs::Client;
use serde_json::Value;

mod telemetry;

#[derive(Parser)]
#[command(name = "neorest", version, about = "Neo4j Server REST client")]
struct Cli {
    /// Path to the JSON config file
    #[arg(long, default_value = "config.json", global = true)]
    config: String,

    /// Server root URI, overrides the config file
    #[arg(long, global = true, env = "NEOREST_URI")]
    uri: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a vertex by ID
    Vertex { id: String },
    /// Fetch an edge by ID
    Edge { id: String },
    /// Outgoing edges of a vertex
    OutE {
        id: String,
        #[arg(long)]
        label: Option<String>,
    },
    /// Execute a Gremlin script
    Gremlin {
        script: String,
        /// Params as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
    /// Execute a Cypher query
    Cypher {
        query: String,
        /// Params as a JSON object
        #[arg(long)]
        params: Option<String>,
    },
    /// List vertex (or edge) indices
    Indices {
        #[arg(long)]
        edges: bool,
    },
    /// Look up indexed elements by key and value
    Lookup {
        index: String,
        key: String,
        value: String,
        #[arg(long)]
        edges: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };
    if let Some(uri) = &cli.uri {
        config.root_uri = uri.clone();
    }

    let _guard = telemetry::init_telemetry(config.log_level)?;
    if let Err(e) = &loaded {
        tracing::warn!("Failed to load {}, using defaults: {}", cli.config, e);
    }
    tracing::info!(
        "Server: {} (autoindex={}, log_level={:?})",
        config.root_uri,
        config.autoindex,
        config.log_level
    );

    let client = Client::new(config)?;

    let resp = match cli.command {
        Commands::Vertex { id } => client.get_vertex(ElementId::from(id)).await?,
        Commands::Edge { id } => client.get_edge(ElementId::from(id)).await?,
        Commands::OutE { id, label } => {
            client
                .out_e(ElementId::from(id), label.as_deref())
                .await?
        }
        Commands::Gremlin { script, params } => {
            client.gremlin(&script, parse_params(params)?).await?
        }
        Commands::Cypher { query, params } => {
            client.cypher(&query, parse_params(params)?).await?
        }
        Commands::Indices { edges: false } => client.get_vertex_indices().await?,
        Commands::Indices { edges: true } => client.get_edge_indices().await?,
        Commands::Lookup {
            index,
            key,
            value,
            edges,
        } => {
            if edges {
                client.lookup_edge(&index, &key, &value).await?
            } else {
                client.lookup_vertex(&index, &key, &value).await?
            }
        }
    };

    print_results(resp)
}

fn parse_params(params: Option<String>) -> Result<Option<Value>> {
    params
        .map(|p| serde_json::from_str(&p).context("--params must be a JSON object"))
        .transpose()
}

fn print_results(resp: Response) -> Result<()> {
    let total = resp.total_size();
    for record in resp.into_results() {
        println!("{}", serde_json::to_string_pretty(record.raw())?);
    }
    eprintln!("{} result(s)", total);
    Ok(())
}
