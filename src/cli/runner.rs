//! CLI runner - executes commands

use crate::catalog::ENTITIES;
use crate::cli::commands::Cli;
use crate::config::Config;
use crate::engine::SyncEngine;
use crate::error::Result;
use crate::http::HttpClient;
use crate::output::Emitter;
use crate::schema::SchemaRegistry;
use crate::state::StateManager;
use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, returning the process exit code
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<i32> {
        if self.cli.discover {
            self.discover()?;
            return Ok(0);
        }
        self.sync(shutdown).await
    }

    /// Print the catalog
    fn discover(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(&catalog())?);
        Ok(())
    }

    /// Run a full sync to stdout
    async fn sync(&self, shutdown: watch::Receiver<bool>) -> Result<i32> {
        let config = Config::load(&self.cli.config).await?;
        debug!(?config, "Loaded config");

        let state = match &self.cli.state {
            Some(path) => StateManager::load(path).await?,
            None => StateManager::in_memory(),
        };

        let client = HttpClient::with_config(config.http_config())?;
        let sync_config = config.sync_config().with_strict(config.strict || self.cli.strict);

        let mut engine = SyncEngine::new(client, Emitter::stdout(), state)
            .with_config(sync_config)
            .with_paginator(config.paginator())
            .with_shutdown(shutdown);

        let report = engine.run().await?;
        info!(exit_code = report.exit_code(), "Done");
        Ok(report.exit_code())
    }
}

/// Every stream with its key properties, replication method and schema
pub fn catalog() -> Value {
    let mut registry = SchemaRegistry::new();
    let streams: Vec<Value> = ENTITIES
        .iter()
        .map(|descriptor| {
            json!({
                "stream": descriptor.name(),
                "tap_stream_id": descriptor.name(),
                "key_properties": descriptor.key_properties,
                "replication_method": descriptor.replication,
                "schema": registry.declare(descriptor),
            })
        })
        .collect();
    json!({ "streams": streams })
}
