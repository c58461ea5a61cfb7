//! Nebula Connect: client-side request bridge for the Nebula game-state service
//!
//! This crate lets synchronous-looking call sites obtain results that are
//! actually produced on a dispatcher-owned runtime: the request is described
//! once, executed asynchronously, and its outcome is handed back through a
//! write-once completion cell the caller blocks on.
//!
//! # Architecture
//!
//! - **ApiClient**: blocking façade — fetch, create, update, replace, delete
//! - **Dispatcher**: submission contract; `TransportDispatcher` runs requests
//!   on its own tokio runtime against a pluggable `Transport`
//! - **Request**: immutable descriptor of one operation, submitted exactly once
//! - **CompletionCell**: single-fill, many-reader bridge from async completion
//!   to a blocking read
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde::Deserialize;
//! use nebula_connect::{ApiClient, Transport, TransportDispatcher};
//!
//! #[derive(Deserialize)]
//! struct Motd {
//!     text: String,
//! }
//!
//! fn example(transport: Arc<dyn Transport>) -> anyhow::Result<()> {
//!     let dispatcher = Arc::new(TransportDispatcher::new(transport)?);
//!     let client = ApiClient::new(dispatcher);
//!
//!     let motd: Motd = client.fetch("/motd")?;
//!     println!("{}", motd.text);
//!
//!     client.delete_resource("/realms/1/fleets/42")?;
//!     Ok(())
//! }
//! ```

pub mod cell;
pub mod client;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod request;

pub use cell::CompletionCell;
pub use client::ApiClient;
pub use config::ClientConfig;
pub use dispatch::{Dispatcher, Transport, TransportDispatcher};
pub use error::{ApiError, Result};
pub use request::{CompletionHandler, Request, RequestBuilder, Response, Verb};
