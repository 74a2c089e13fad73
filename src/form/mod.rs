//! Web boundary of the tax receipt page.
//!
//! `GET` renders the page (or streams the pending print receipt with
//! `download=1`); `POST` is the issue/re-issue button and redirects back to
//! the page, adding `file=1` when a print receipt is waiting.

pub mod handlers;
pub mod models;

pub use handlers::{config, download_url, page_url, RECEIPT_PATH};
