//! Common library for the broadcast services
//!
//! This crate provides functionality shared by the services that consume
//! the upstream broadcast API: the broadcast data model, the upstream
//! client and its error type.
//!
//! ```rust,no_run
//! use common::upstream::{BroadcastSource, HttpBroadcastSource, UpstreamConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = HttpBroadcastSource::new(UpstreamConfig::default())?;
//!     let batch = source.fetch_batch(0, 300).await?;
//!     println!("{} broadcasts live, got {}", batch.total, batch.items.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod models;
pub mod upstream;

pub use error::{UpstreamError, UpstreamResult};
pub use models::{BroadcastBatch, BroadcastItem, Preview, Tag};
pub use upstream::{BroadcastSource, HttpBroadcastSource, UpstreamConfig};
