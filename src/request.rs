//! Request descriptor: immutable specification of one network operation.
//!
//! A `Request` is assembled through [`RequestBuilder`], submitted to a
//! [`Dispatcher`](crate::Dispatcher) exactly once (enforced by move semantics),
//! and completed exactly once by the dispatcher.

use std::fmt;

use crate::error::{ApiError, Result};

/// The operation a request performs against its target resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Read the resource (GET semantics).
    Fetch,
    /// Create a new resource (POST semantics).
    Create,
    /// Update an existing resource (PUT semantics).
    Update,
    /// Replace an existing resource wholesale (PUT semantics).
    Replace,
    /// Remove the resource (DELETE semantics).
    Delete,
}

impl Verb {
    /// The HTTP method this verb maps to on the wire.
    pub fn http_method(&self) -> &'static str {
        match self {
            Verb::Fetch => "GET",
            Verb::Create => "POST",
            Verb::Update | Verb::Replace => "PUT",
            Verb::Delete => "DELETE",
        }
    }

    /// Whether requests with this verb carry an outgoing body.
    pub fn carries_body(&self) -> bool {
        matches!(self, Verb::Create | Verb::Update | Verb::Replace)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.http_method())
    }
}

/// The raw outcome of a completed request: a status and an opaque payload.
///
/// Decoding the payload into a typed message is the caller's (or the
/// [`codec`](crate::codec) module's) concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP-style status code reported by the remote service.
    pub status: u16,
    /// Raw response payload (may be empty).
    pub body: Vec<u8>,
}

impl Response {
    /// Create a response with a status and payload.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Whether the status is in the 2xx success range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The payload interpreted as UTF-8 text.
    pub fn body_string(&self) -> Result<String> {
        String::from_utf8(self.body.clone())
            .map_err(|e| ApiError::Decode(format!("Response body is not valid UTF-8: {}", e)))
    }
}

/// Completion notification invoked by the dispatcher exactly once per request,
/// with either the raw response or the failure that prevented one.
pub type CompletionHandler = Box<dyn FnOnce(Result<Response>) + Send + 'static>;

/// Immutable description of a single network operation.
///
/// Constructed via [`Request::builder`]; never mutated after construction and
/// submitted exactly once (submission consumes the descriptor).
pub struct Request {
    target: String,
    verb: Verb,
    body: Option<Vec<u8>>,
    completion: Option<CompletionHandler>,
    complete_on_any_thread: bool,
}

impl Request {
    /// Start building a request against `target` with the given verb.
    pub fn builder(target: impl Into<String>, verb: Verb) -> RequestBuilder {
        RequestBuilder::new(target, verb)
    }

    /// The resource locator this request targets.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The operation verb.
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The outgoing payload, if the verb carries one.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Whether a completion handler is attached.
    pub fn has_completion(&self) -> bool {
        self.completion.is_some()
    }

    /// Whether the completion handler may run on any execution context.
    ///
    /// When false, the dispatcher must marshal the handler back to the
    /// submitting caller's context before invoking it.
    pub fn completes_on_any_thread(&self) -> bool {
        self.complete_on_any_thread
    }

    /// Detach the completion handler for invocation.
    ///
    /// Intended for [`Dispatcher`](crate::Dispatcher) implementations, which
    /// must invoke the handler exactly once.
    pub fn take_completion(&mut self) -> Option<CompletionHandler> {
        self.completion.take()
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("target", &self.target)
            .field("verb", &self.verb)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .field("has_completion", &self.completion.is_some())
            .field("complete_on_any_thread", &self.complete_on_any_thread)
            .finish()
    }
}

/// Builder for [`Request`].
///
/// Validation happens at [`build`](Self::build): body-carrying verbs require a
/// body and the others reject one, and a completion handler may be attached at
/// most once (a second attachment is an error rather than a silent overwrite).
pub struct RequestBuilder {
    target: String,
    verb: Verb,
    body: Option<Vec<u8>>,
    completion: Option<CompletionHandler>,
    completion_attached_twice: bool,
    complete_on_any_thread: bool,
}

impl RequestBuilder {
    /// Start a builder for `target` with the given verb.
    pub fn new(target: impl Into<String>, verb: Verb) -> Self {
        Self {
            target: target.into(),
            verb,
            body: None,
            completion: None,
            completion_attached_twice: false,
            complete_on_any_thread: false,
        }
    }

    /// Attach the outgoing payload.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach the completion handler.
    ///
    /// At most one handler per request; attaching a second causes
    /// [`build`](Self::build) to fail.
    pub fn on_complete<F>(mut self, handler: F) -> Self
    where
        F: FnOnce(Result<Response>) + Send + 'static,
    {
        if self.completion.is_some() {
            self.completion_attached_twice = true;
        }
        self.completion = Some(Box::new(handler));
        self
    }

    /// Allow the completion handler to run on any execution context.
    ///
    /// Required whenever the submitting thread will block on the result and
    /// must not be re-entered to deliver it.
    pub fn complete_on_any_thread(mut self) -> Self {
        self.complete_on_any_thread = true;
        self
    }

    /// Validate and produce the immutable request.
    pub fn build(self) -> Result<Request> {
        if self.completion_attached_twice {
            return Err(ApiError::InvalidRequest(
                "completion handler attached more than once".to_string(),
            ));
        }
        if self.verb.carries_body() && self.body.is_none() {
            return Err(ApiError::InvalidRequest(format!(
                "{} request to {} requires a body",
                self.verb, self.target
            )));
        }
        if !self.verb.carries_body() && self.body.is_some() {
            return Err(ApiError::InvalidRequest(format!(
                "{} request to {} must not carry a body",
                self.verb, self.target
            )));
        }

        Ok(Request {
            target: self.target,
            verb: self.verb,
            body: self.body,
            completion: self.completion,
            complete_on_any_thread: self.complete_on_any_thread,
        })
    }
}
