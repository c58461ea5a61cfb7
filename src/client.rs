//! ApiClient: the blocking façade over the asynchronous dispatcher.
//!
//! Every operation follows the same protocol: build a request descriptor, wire
//! its completion handler to fill a [`CompletionCell`], submit, and (when a
//! result is needed) block the calling thread on the cell. The dispatcher is
//! injected at construction so tests can stand in deterministic fakes.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::cell::CompletionCell;
use crate::codec;
use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::error::{ApiError, Result};
use crate::request::{Request, Response, Verb};

/// The main client for the Nebula game-state API.
///
/// Call sites look synchronous; execution happens on the dispatcher's own
/// runtime and results are handed back through a per-request completion cell.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use serde::Deserialize;
/// use nebula_connect::{ApiClient, Dispatcher};
///
/// #[derive(Deserialize)]
/// struct Motd {
///     text: String,
/// }
///
/// fn example(dispatcher: Arc<dyn Dispatcher>) -> anyhow::Result<()> {
///     let client = ApiClient::new(dispatcher);
///     let motd: Motd = client.fetch("/motd")?;
///     println!("{}", motd.text);
///     Ok(())
/// }
/// ```
pub struct ApiClient {
    dispatcher: Arc<dyn Dispatcher>,
    config: ClientConfig,
}

impl ApiClient {
    /// Create a client with default configuration.
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self::with_config(dispatcher, ClientConfig::default())
    }

    /// Create a client with explicit configuration.
    pub fn with_config(dispatcher: Arc<dyn Dispatcher>, config: ClientConfig) -> Self {
        Self { dispatcher, config }
    }

    /// Fetch a typed message from the given target.
    ///
    /// Blocks until the dispatcher completes the request, up to the configured
    /// default wait bound.
    pub fn fetch<M: DeserializeOwned>(&self, target: &str) -> Result<M> {
        let response = self.round_trip(target, Verb::Fetch, None, self.config.default_wait())?;
        codec::decode(&response.body)
    }

    /// Fetch a typed message with an explicit wait bound.
    ///
    /// A timeout abandons the wait, not the request: the dispatcher may still
    /// complete it later and the result is discarded.
    pub fn fetch_with_timeout<M: DeserializeOwned>(
        &self,
        target: &str,
        timeout: Duration,
    ) -> Result<M> {
        let response = self.round_trip(target, Verb::Fetch, None, Some(timeout))?;
        codec::decode(&response.body)
    }

    /// Fetch the raw response body as a UTF-8 string.
    pub fn fetch_string(&self, target: &str) -> Result<String> {
        let response = self.round_trip(target, Verb::Fetch, None, self.config.default_wait())?;
        response.body_string()
    }

    /// Submit a body-carrying request without waiting for its result.
    ///
    /// Returns `Ok(true)` once the dispatcher accepts the request. Use this
    /// when only a 2xx-style acknowledgement matters, not a payload; any later
    /// failure surfaces only through the dispatcher's own error channel.
    pub fn submit_and_wait<B: Serialize>(&self, target: &str, verb: Verb, body: &B) -> Result<bool> {
        let payload = codec::encode(body)?;
        let request = Request::builder(self.config.resolve(target), verb)
            .body(payload)
            .build()?;

        debug!("Submitting {} {} (no result expected)", verb, target);
        self.dispatcher.submit(request)?;
        Ok(true)
    }

    /// Submit a body-carrying request and block for a typed response message.
    pub fn submit_and_fetch<B, M>(&self, target: &str, verb: Verb, body: &B) -> Result<M>
    where
        B: Serialize,
        M: DeserializeOwned,
    {
        let payload = codec::encode(body)?;
        let response = self.round_trip(target, verb, Some(payload), self.config.default_wait())?;
        codec::decode(&response.body)
    }

    /// CREATE a resource and return the server's view of it.
    pub fn create<B: Serialize, M: DeserializeOwned>(&self, target: &str, body: &B) -> Result<M> {
        self.submit_and_fetch(target, Verb::Create, body)
    }

    /// UPDATE a resource and return the server's view of it.
    pub fn update<B: Serialize, M: DeserializeOwned>(&self, target: &str, body: &B) -> Result<M> {
        self.submit_and_fetch(target, Verb::Update, body)
    }

    /// REPLACE a resource wholesale and return the server's view of it.
    pub fn replace<B: Serialize, M: DeserializeOwned>(&self, target: &str, body: &B) -> Result<M> {
        self.submit_and_fetch(target, Verb::Replace, body)
    }

    /// DELETE a resource, fire-and-forget.
    ///
    /// Returns once the dispatcher accepts the request; failures of the
    /// deletion itself are never surfaced to this caller.
    pub fn delete_resource(&self, target: &str) -> Result<()> {
        let request = Request::builder(self.config.resolve(target), Verb::Delete).build()?;

        debug!("Submitting DELETE {} (fire-and-forget)", target);
        self.dispatcher.submit(request)?;
        Ok(())
    }

    /// Shared request protocol: cell, completion handler, submit, wait.
    fn round_trip(
        &self,
        target: &str,
        verb: Verb,
        body: Option<Vec<u8>>,
        wait: Option<Duration>,
    ) -> Result<Response> {
        let cell: CompletionCell<Result<Response>> = CompletionCell::new();
        let writer = cell.clone();

        let mut builder = Request::builder(self.config.resolve(target), verb)
            .on_complete(move |outcome| {
                if writer.fill(outcome).is_err() {
                    // Collaborator bug: the dispatcher's exactly-once guarantee
                    // was violated. The first result stands.
                    error!("Second completion delivered for an already-completed request");
                }
            })
            // The waiting thread consumes the result through the cell, so the
            // handler must be allowed to run on the dispatcher's own context.
            .complete_on_any_thread();
        if let Some(payload) = body {
            builder = builder.body(payload);
        }
        let request = builder.build()?;

        debug!("Dispatching {} {}", verb, target);
        self.dispatcher.submit(request)?;

        let outcome = match wait {
            Some(bound) => cell.wait_timeout(bound)?,
            None => cell.wait(),
        };

        let response = outcome?;
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }
}
