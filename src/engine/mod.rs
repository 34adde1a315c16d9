//! Execution engine module
//!
//! Main read loop and entity orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - visits every entity in catalog order, emitting its schema,
//!   its validated records and a state checkpoint once it completes
//! - `SyncConfig` - strict mode, page ceiling and run deadline
//! - `SyncReport` - per-entity outcome and the process exit code
//!
//! A failing entity does not stop its siblings unless the run is strict,
//! the run deadline passes, or shutdown is requested. The final state is
//! emitted and persisted in every case.

mod types;

pub use types::{EntityOutcome, SyncConfig, SyncReport, SyncStats};

use crate::catalog::{EntityDescriptor, ENTITIES};
use crate::decode::{JsonPageDecoder, PageDecoder};
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::output::Emitter;
use crate::pagination::{Extractor, NextUrlPaginator, Paginator};
use crate::schema::SchemaRegistry;
use crate::state::StateManager;
use chrono::Utc;
use futures::StreamExt;
use std::future::Future;
use std::io::Write;
use std::pin::pin;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine<W: Write> {
    /// HTTP transport
    transport: Box<dyn Transport>,
    /// Page body decoder
    decoder: Box<dyn PageDecoder>,
    /// Pagination strategy
    paginator: Box<dyn Paginator>,
    /// Schemas declared this run
    registry: SchemaRegistry,
    /// Output stream
    emitter: Emitter<W>,
    /// State manager
    state: StateManager,
    /// Sync configuration
    config: SyncConfig,
    /// Set to `true` to stop the run
    shutdown: Option<watch::Receiver<bool>>,
}

impl<W: Write> SyncEngine<W> {
    /// Create a new sync engine
    pub fn new(
        transport: impl Transport + 'static,
        emitter: Emitter<W>,
        state: StateManager,
    ) -> Self {
        Self {
            transport: Box::new(transport),
            decoder: Box::new(JsonPageDecoder),
            paginator: Box::new(NextUrlPaginator::default()),
            registry: SchemaRegistry::new(),
            emitter,
            state,
            config: SyncConfig::default(),
            shutdown: None,
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the pagination strategy
    #[must_use]
    pub fn with_paginator(mut self, paginator: impl Paginator + 'static) -> Self {
        self.paginator = Box::new(paginator);
        self
    }

    /// Stop the run when the receiver observes `true`
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get the schema registry
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Consume the engine, returning the emitter
    pub fn into_emitter(self) -> Emitter<W> {
        self.emitter
    }

    /// Run a full sync of every entity
    ///
    /// Entity failures are reported in the [`SyncReport`]. An `Err` means
    /// the final state could not be emitted or persisted.
    pub async fn run(&mut self) -> Result<SyncReport> {
        let start = Instant::now();
        let deadline = self
            .config
            .run_timeout
            .map(|timeout| tokio::time::Instant::now() + timeout);
        let mut report = SyncReport::default();
        let mut aborted = false;

        info!(
            entities = ENTITIES.len(),
            strict = self.config.strict,
            prior_keys = self.state.state().len(),
            "Starting sync"
        );

        for descriptor in ENTITIES {
            if aborted {
                report.entities.push((descriptor.kind, EntityOutcome::Skipped));
                continue;
            }

            let outcome = self.sync_entity(descriptor, deadline).await;
            if let EntityOutcome::Failed { error, .. } = &outcome {
                let past_deadline =
                    deadline.is_some_and(|d| tokio::time::Instant::now() >= d);
                if self.config.strict || past_deadline || matches!(error, Error::Cancelled) {
                    warn!(entity = descriptor.name(), "Aborting remaining entities");
                    aborted = true;
                }
            }
            report.entities.push((descriptor.kind, outcome));
        }

        self.emitter.emit_state(self.state.state())?;
        self.state.save().await?;

        report.duration_ms = elapsed_ms(start);

        let failed: Vec<_> = report.incomplete().map(|kind| kind.name()).collect();
        info!(
            succeeded = report.entities.len() - failed.len(),
            incomplete = ?failed,
            duration_ms = report.duration_ms,
            "Sync finished"
        );

        Ok(report)
    }

    /// Extract one entity, then checkpoint it if extraction completed
    async fn sync_entity(
        &mut self,
        descriptor: EntityDescriptor,
        deadline: Option<tokio::time::Instant>,
    ) -> EntityOutcome {
        let entity = descriptor.name();
        let start = Instant::now();
        let mut stats = SyncStats::new();
        let mut shutdown = self.shutdown.clone();
        let timeout_ms = self
            .config
            .run_timeout
            .map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));

        info!(entity, "Syncing entity");

        let result = {
            let extraction = self.extract(descriptor, &mut stats);
            tokio::select! {
                biased;
                () = shutdown_requested(&mut shutdown) => Err(Error::Cancelled),
                result = within_deadline(deadline, timeout_ms, extraction) => result,
            }
        };
        let result = match result {
            Ok(()) => self.checkpoint(descriptor).await,
            Err(e) => Err(e),
        };

        stats.set_duration(elapsed_ms(start));

        match result {
            Ok(()) => {
                info!(
                    entity,
                    records_read = stats.records_read,
                    records_emitted = stats.records_emitted,
                    records_skipped = stats.records_skipped,
                    pages = stats.pages_fetched,
                    duration_ms = stats.duration_ms,
                    "Entity completed"
                );
                EntityOutcome::Succeeded { stats }
            }
            Err(error) => {
                error!(
                    entity,
                    error = %error,
                    records_emitted = stats.records_emitted,
                    pages = stats.pages_fetched,
                    "Entity failed"
                );
                EntityOutcome::Failed { error, stats }
            }
        }
    }

    /// Emit the schema, then every validated record
    async fn extract(&mut self, descriptor: EntityDescriptor, stats: &mut SyncStats) -> Result<()> {
        let entity = descriptor.name();
        let schema = self.registry.declare(&descriptor);
        self.emitter.emit_schema(&descriptor, schema)?;

        let extractor = Extractor::new(
            self.transport.as_ref(),
            self.decoder.as_ref(),
            self.paginator.as_ref(),
        )
        .with_max_pages(self.config.max_pages);
        let mut pages = pin!(extractor.pages(descriptor));

        while let Some(page) = pages.next().await {
            let page = page?;
            stats.add_page();

            for raw in page.records {
                stats.add_read();
                match self.registry.validate(descriptor.kind, raw) {
                    Ok(record) => {
                        self.emitter.emit_record(&record)?;
                        stats.add_emitted();
                    }
                    Err(e) if e.is_schema_violation() && !self.config.strict => {
                        warn!(entity, error = %e, "Skipping record");
                        stats.add_skipped();
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        Ok(())
    }

    /// Persist the entity's bookmark, then emit the state that holds it
    async fn checkpoint(&mut self, descriptor: EntityDescriptor) -> Result<()> {
        self.state.commit(descriptor.kind, Utc::now()).await?;
        self.emitter.emit_state(self.state.state())
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Resolves once shutdown is signalled; never resolves without a receiver
async fn shutdown_requested(shutdown: &mut Option<watch::Receiver<bool>>) {
    let Some(rx) = shutdown else {
        return std::future::pending().await;
    };
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // sender dropped without signalling
            return std::future::pending().await;
        }
    }
}

async fn within_deadline<F>(
    deadline: Option<tokio::time::Instant>,
    timeout_ms: u64,
    extraction: F,
) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, extraction)
            .await
            .unwrap_or(Err(Error::Timeout { timeout_ms })),
        None => extraction.await,
    }
}

#[cfg(test)]
mod tests;
