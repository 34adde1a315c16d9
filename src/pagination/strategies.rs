//! Pagination strategy implementations

use super::types::{NextPage, PaginationState, Paginator};
use crate::decode::Page;
use crate::error::Result;
use url::Url;

/// Default number of records requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Next URL pagination (URL in response body)
///
/// The first request asks for `?results=<page_size>`; every following
/// request uses the `next` URL from the previous response verbatim.
/// Pagination ends when `next` is absent or the page is empty.
#[derive(Debug, Clone)]
pub struct NextUrlPaginator {
    /// Query parameter carrying the page size
    pub page_size_param: String,
    /// Records requested per page
    pub page_size: u32,
}

impl Default for NextUrlPaginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl NextUrlPaginator {
    /// Create a paginator requesting `page_size` records per page
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size_param: "results".to_string(),
            page_size,
        }
    }
}

impl Paginator for NextUrlPaginator {
    fn initial_url(&self, endpoint: &str) -> Result<String> {
        let mut url = Url::parse(endpoint)?;
        url.query_pairs_mut()
            .append_pair(&self.page_size_param, &self.page_size.to_string());
        Ok(url.into())
    }

    fn process_page(&self, page: &Page, state: &mut PaginationState) -> NextPage {
        state.add_page();
        state.add_fetched(page.len() as u64);

        if page.is_empty() {
            state.mark_done();
            return NextPage::Done;
        }

        match &page.next {
            Some(next_url) => {
                state.set_cursor(next_url.clone());
                NextPage::with_url(next_url.clone())
            }
            None => {
                state.mark_done();
                NextPage::Done
            }
        }
    }
}
