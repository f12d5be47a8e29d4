//! Webcomic crawling, downloading and archiving.
//!
//! The crawl walks a comic page by page through its "next page" link,
//! extracting image URLs with per-site selectors; unknown sites can be
//! handled by searching a space of candidate selectors until a pair
//! validates against the first few pages. Each crawl job runs inside an
//! isolated engine context so verify, download and discovery trials can
//! follow each other in one process.

pub mod archive;
pub mod comics;
pub mod config;
pub mod discover;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod models;
pub mod selector;
pub mod session;
pub mod storage;
pub mod traverse;

pub use error::{ComicDlError, Result};
