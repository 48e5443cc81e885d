//! WebSocket upgrade contract.
//!
//! Protocol framing lives behind [`SocketIo`]; the router only checks the
//! upgrade signature, asks the registered [`Upgrader`] for the handshake,
//! and hands the resulting socket to the handler. Socket handlers run
//! fire-and-forget: they usually spawn a session task owning the socket
//! and return `()` so the pre-upgraded response goes out immediately.

use crate::body::ResponseBody;
use crate::error::BoxError;
use async_trait::async_trait;
use bytes::Bytes;
use http::request::Parts;
use http::{Method, Response, header};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketMessage {
    Text(String),
    Binary(Bytes),
}

/// Object-safe message transport over an upgraded connection.
#[async_trait]
pub trait SocketIo: Send {
    async fn send(&mut self, message: SocketMessage) -> Result<(), BoxError>;

    /// `None` once the peer closed the connection.
    async fn recv(&mut self) -> Option<SocketMessage>;

    async fn close(&mut self) -> Result<(), BoxError>;
}

/// The socket handle a handler receives from the parameter bag.
pub struct WebSocket {
    io: Box<dyn SocketIo>,
}

impl WebSocket {
    pub fn new<S: SocketIo + 'static>(io: S) -> Self {
        Self { io: Box::new(io) }
    }

    pub async fn send(&mut self, message: SocketMessage) -> Result<(), BoxError> {
        self.io.send(message).await
    }

    pub async fn recv(&mut self) -> Option<SocketMessage> {
        self.io.recv().await
    }

    pub async fn close(&mut self) -> Result<(), BoxError> {
        self.io.close().await
    }
}

impl std::fmt::Debug for WebSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocket").finish_non_exhaustive()
    }
}

/// Result of a successful handshake: the socket for the handler and the
/// switching-protocols response for the caller.
pub struct Upgrade {
    pub socket: WebSocket,
    pub response: Response<ResponseBody>,
}

/// The external handshake collaborator registered on a router.
pub trait Upgrader: Send + Sync {
    fn upgrade(&self, request: &Parts) -> Result<Upgrade, BoxError>;
}

/// Whether the request carries the upgrade signature socket routes demand:
/// GET plus an `Upgrade` header requesting `websocket`. The header value is
/// treated as a comma-separated list, matched case-insensitively.
pub(crate) fn wants_websocket(request: &Parts) -> bool {
    if request.method != Method::GET {
        return false;
    }

    let Some(value) = request.headers.get(header::UPGRADE) else {
        return false;
    };
    let Ok(value) = value.to_str() else {
        return false;
    };

    value.split(',').any(|token| token.trim().eq_ignore_ascii_case("websocket"))
}
