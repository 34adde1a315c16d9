//! Page reader
//!
//! Drives a transport through a pagination strategy, one request per pull.

use super::types::{NextPage, PaginationState, Paginator};
use crate::catalog::{EntityDescriptor, EntityKind};
use crate::decode::{Page, PageDecoder};
use crate::error::{Error, Result};
use crate::http::Transport;
use crate::types::RawRecord;
use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, error};

/// Upper bound on pages fetched for a single entity
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Lazily extracts one entity's collection
///
/// The returned streams are finite and not restartable: each pull issues at
/// most one request, and the stream ends after the page that signals
/// exhaustion. Exceeding the page ceiling, a malformed body, or a `next` URL
/// that would loop are reported as [`Error::Protocol`].
#[derive(Clone, Copy)]
pub struct Extractor<'a> {
    transport: &'a dyn Transport,
    decoder: &'a dyn PageDecoder,
    paginator: &'a dyn Paginator,
    max_pages: usize,
}

impl<'a> Extractor<'a> {
    /// Create an extractor with the default page ceiling
    pub fn new(
        transport: &'a dyn Transport,
        decoder: &'a dyn PageDecoder,
        paginator: &'a dyn Paginator,
    ) -> Self {
        Self {
            transport,
            decoder,
            paginator,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Set the page ceiling
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Stream of pages, in the order the API serves them
    pub fn pages(&self, descriptor: EntityDescriptor) -> impl Stream<Item = Result<Page>> + 'a {
        let reader = *self;
        stream::try_unfold(PaginationState::new(), move |state| async move {
            reader.fetch_page(descriptor, state).await
        })
    }

    /// Stream of raw records, flattened from [`Extractor::pages`]
    pub fn records(
        &self,
        descriptor: EntityDescriptor,
    ) -> impl Stream<Item = Result<RawRecord>> + 'a {
        self.pages(descriptor)
            .map_ok(|page| stream::iter(page.records.into_iter().map(Ok::<_, Error>)))
            .try_flatten()
    }

    async fn fetch_page(
        self,
        descriptor: EntityDescriptor,
        mut state: PaginationState,
    ) -> Result<Option<(Page, PaginationState)>> {
        if state.done {
            return Ok(None);
        }

        let entity = descriptor.name();
        let url = match state.cursor.clone() {
            Some(url) => self.transport.resolve_url(&url)?,
            None => self
                .paginator
                .initial_url(&self.transport.resolve_url(descriptor.path)?)?,
        };

        if state.pages_fetched >= self.max_pages {
            return Err(Error::protocol(
                entity,
                url,
                format!(
                    "pagination did not terminate within {} pages",
                    self.max_pages
                ),
            ));
        }

        debug!(entity, cursor = %url, page = state.pages_fetched + 1, "Fetching page");

        let body = self.transport.get_json(&url).await.map_err(|e| {
            error!(entity, cursor = %url, error = %e, "Page request failed");
            match e {
                Error::JsonParse(e) => {
                    Error::protocol(entity, &url, format!("malformed page body: {e}"))
                }
                e => e,
            }
        })?;

        let page = self
            .decoder
            .decode(&body)
            .map_err(|e| Error::protocol(entity, &url, e.to_string()))?;

        if let NextPage::Continue { url: next } = self.paginator.process_page(&page, &mut state) {
            let next = self.transport.resolve_url(&next)?;
            check_next_url(descriptor, &url, &next)?;
            state.set_cursor(next);
        }

        debug!(
            entity,
            records = page.len(),
            total = state.total_fetched,
            done = state.done,
            "Page fetched"
        );

        Ok(Some((page, state)))
    }
}

impl std::fmt::Debug for Extractor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("max_pages", &self.max_pages)
            .finish_non_exhaustive()
    }
}

/// Reject a next-page URL that repeats the current page or leaves the
/// entity's collection
fn check_next_url(descriptor: EntityDescriptor, current: &str, next: &str) -> Result<()> {
    if next == current {
        return Err(Error::protocol(
            descriptor.name(),
            current,
            "next page URL repeats the current page",
        ));
    }

    match EntityKind::from_url(next) {
        Some(kind) if kind != descriptor.kind => Err(Error::protocol(
            descriptor.name(),
            current,
            format!("next page URL {next} points at '{kind}'"),
        )),
        _ => Ok(()),
    }
}
