//! Pagination module
//!
//! Walks a collection endpoint page by page until the API signals
//! exhaustion, yielding records lazily.
//!
//! # Overview
//!
//! - [`Paginator`] - strategy deciding the first request and the next cursor
//! - [`NextUrlPaginator`] - follows the `next` URL in each response body
//! - [`Extractor`] - drives a [`Transport`](crate::http::Transport) through
//!   the strategy as a `Stream` of pages or records, bounded by a page ceiling

mod reader;
mod strategies;
mod types;

pub use reader::{Extractor, DEFAULT_MAX_PAGES};
pub use strategies::{NextUrlPaginator, DEFAULT_PAGE_SIZE};
pub use types::{NextPage, PaginationState, Paginator};
