//! Dispatcher: asynchronous execution of request descriptors.
//!
//! The [`Dispatcher`] trait is the submission contract the blocking façade
//! depends on; [`TransportDispatcher`] is the standard implementation, running
//! requests on its own tokio runtime against a pluggable [`Transport`].
//! Dispatchers are injected where they are used rather than reached for as
//! process-wide state, so tests can stand in deterministic fakes.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, warn};

use crate::error::{ApiError, Result};
use crate::request::{Request, Response, Verb};

/// The external I/O collaborator that actually performs one operation.
///
/// Connection setup, TLS, socket-level retries and the wire format all live
/// behind this seam. Implementations must be safe to call concurrently.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Perform the operation and return the raw response.
    ///
    /// A non-success status from the remote service is still an `Ok` response;
    /// `Err` is reserved for failures that produced no response at all.
    async fn perform(&self, target: &str, verb: Verb, body: Option<&[u8]>) -> Result<Response>;
}

/// Submission contract consumed by the blocking façade.
///
/// `submit` accepts a request descriptor and returns without blocking. If the
/// descriptor carries a completion handler, the dispatcher invokes it exactly
/// once, with either a [`Response`] or an [`ApiError`], at an unspecified later
/// time on a context consistent with the descriptor's any-thread flag.
pub trait Dispatcher: Send + Sync {
    /// Accept a request for asynchronous execution.
    ///
    /// Consumes the descriptor, so a request can only ever be submitted once.
    fn submit(&self, request: Request) -> Result<()>;
}

/// Dispatcher that executes requests on its own multi-thread tokio runtime.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use nebula_connect::{Transport, TransportDispatcher};
///
/// fn example(transport: Arc<dyn Transport>) -> anyhow::Result<()> {
///     let dispatcher = TransportDispatcher::new(transport)?;
///     // hand it to an ApiClient, or submit descriptors directly
///     Ok(())
/// }
/// ```
pub struct TransportDispatcher {
    transport: Arc<dyn Transport>,
    runtime: Runtime,
}

impl TransportDispatcher {
    /// Create a dispatcher with a default-sized worker pool.
    pub fn new(transport: Arc<dyn Transport>) -> Result<Self> {
        Self::with_worker_threads(transport, 2)
    }

    /// Create a dispatcher with an explicit worker pool size.
    pub fn with_worker_threads(transport: Arc<dyn Transport>, workers: usize) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(workers.max(1))
            .thread_name("nebula-dispatch")
            .enable_time()
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to start dispatch runtime: {}", e)))?;

        Ok(Self { transport, runtime })
    }
}

impl Dispatcher for TransportDispatcher {
    fn submit(&self, mut request: Request) -> Result<()> {
        let completion = request.take_completion();

        // Completions run on dispatch workers; there is no caller context to
        // marshal back to, so context-affine handlers cannot be honored.
        if completion.is_some() && !request.completes_on_any_thread() {
            return Err(ApiError::InvalidRequest(format!(
                "{} {} has a completion handler without the any-thread flag; \
                 this dispatcher cannot marshal completions back to the caller",
                request.verb(),
                request.target()
            )));
        }

        debug!("Submitting {} {}", request.verb(), request.target());

        let transport = Arc::clone(&self.transport);
        self.runtime.spawn(async move {
            let outcome = transport
                .perform(request.target(), request.verb(), request.body())
                .await;

            match completion {
                Some(handler) => handler(outcome),
                None => {
                    // Fire-and-forget: failures surface only here, by design.
                    if let Err(e) = outcome {
                        warn!(
                            "Fire-and-forget {} {} failed: {}",
                            request.verb(),
                            request.target(),
                            e
                        );
                    }
                }
            }
        });

        Ok(())
    }
}
