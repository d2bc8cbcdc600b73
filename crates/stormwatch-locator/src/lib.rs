//! Store-locator feed client and status-history tracking.
//!
//! The feed is a server-rendered locator page that embeds every store as
//! JSON inside a `<script type="application/json">` tag. The status history
//! is a small JSON file recording when each store last changed between open
//! and closed.

pub mod client;
pub mod embed;
pub mod error;
pub mod export;
pub(crate) mod fetch;
pub mod history;
pub mod parse;

pub use client::LocatorClient;
pub use error::{HistoryError, LocatorError};
pub use export::{write_csv, StoreRecord, CSV_HEADERS};
pub use history::{StatusEntry, StatusHistory, StatusHistoryStore};
