//! Response decoder module
//!
//! Turns a list-endpoint response body into the records it carries and the
//! cursor for the following page.

mod decoders;
mod types;

pub use decoders::JsonPageDecoder;
pub use types::{Page, PageDecoder};
