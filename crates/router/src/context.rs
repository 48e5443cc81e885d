//! The per-dispatch parameter bag.
//!
//! Built fresh for every dispatch, never shared across requests. The bag
//! merges the router's ambient values with the current match's captures
//! (captures win on collision), carries the live request and remainder,
//! and hands out the `next` factory for nested-router composition.

use crate::body::{OptionReqBody, ResponseBody};
use crate::error::BoxError;
use crate::router::{Protocol, Router, RouterBuilder};
use crate::ws::WebSocket;
use http::request::Parts;
use http::{HeaderMap, Method, Response, Uri, Version};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct Context {
    request: Arc<Parts>,
    body: OptionReqBody,
    params: Arc<HashMap<String, String>>,
    remainder: Arc<Vec<String>>,
    protocol: Protocol,
    error: Option<Arc<BoxError>>,
    socket: Arc<Mutex<Option<WebSocket>>>,
    upgrade_response: Arc<Mutex<Option<Response<ResponseBody>>>>,
}

impl Context {
    pub(crate) fn new(
        request: Arc<Parts>,
        body: OptionReqBody,
        params: HashMap<String, String>,
        remainder: Vec<String>,
        protocol: Protocol,
    ) -> Self {
        Self {
            request,
            body,
            params: Arc::new(params),
            remainder: Arc::new(remainder),
            protocol,
            error: None,
            socket: Arc::new(Mutex::new(None)),
            upgrade_response: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns a reference to the request head.
    pub fn request(&self) -> &Parts {
        &self.request
    }

    pub fn method(&self) -> &Method {
        &self.request.method
    }

    pub fn uri(&self) -> &Uri {
        &self.request.uri
    }

    pub fn version(&self) -> Version {
        self.request.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.request.headers
    }

    /// The consumable request body.
    pub fn body(&self) -> OptionReqBody {
        self.body.clone()
    }

    /// Gets a parameter by name: a capture from the current match, or an
    /// ambient value threaded in from a parent router.
    pub fn param(&self, name: impl AsRef<str>) -> Option<&str> {
        self.params.get(name.as_ref()).map(String::as_str)
    }

    /// Iterates all parameters, captures and ambient values alike.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The request segments the matched pattern left unconsumed.
    pub fn remainder(&self) -> &[String] {
        &self.remainder
    }

    /// The failure that routed this invocation to the error handler;
    /// `None` outside of `catch` handlers.
    pub fn error(&self) -> Option<&(dyn std::error::Error + Send + Sync)> {
        self.error.as_ref().map(|e| e.as_ref().as_ref())
    }

    /// Takes the upgraded socket on a socket route. Present exactly once,
    /// after a successful handshake.
    pub fn take_socket(&self) -> Option<WebSocket> {
        self.socket.lock().unwrap().take()
    }

    /// Builds a fresh router seeded with this bag's parameters as ambient
    /// values. The handler populates it fluently and returns it; dispatch
    /// then continues matching against the remainder.
    pub fn next(&self) -> RouterBuilder {
        Router::builder().ambient_all(self.params.as_ref().clone())
    }

    /// Like [`next`](Self::next), with extra ambient values merged in.
    /// Extra values win over the bag's on key collision.
    pub fn next_with(&self, extra: impl IntoIterator<Item = (String, String)>) -> RouterBuilder {
        let mut merged = self.params.as_ref().clone();
        merged.extend(extra);
        Router::builder().ambient_all(merged)
    }

    pub(crate) fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub(crate) fn request_arc(&self) -> Arc<Parts> {
        Arc::clone(&self.request)
    }

    pub(crate) fn with_error(mut self, error: BoxError) -> Self {
        self.error = Some(Arc::new(error));
        self
    }

    pub(crate) fn attach_upgrade(&self, socket: WebSocket, response: Response<ResponseBody>) {
        *self.socket.lock().unwrap() = Some(socket);
        *self.upgrade_response.lock().unwrap() = Some(response);
    }

    pub(crate) fn take_upgrade_response(&self) -> Option<Response<ResponseBody>> {
        self.upgrade_response.lock().unwrap().take()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("method", &self.request.method)
            .field("uri", &self.request.uri)
            .field("params", &self.params)
            .field("remainder", &self.remainder)
            .field("protocol", &self.protocol)
            .finish_non_exhaustive()
    }
}
