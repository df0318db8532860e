//! Server-side collaborators of the connection engine.
//!
//! The engine never owns application policy: page handling, websocket
//! endpoint lookup, embedded assets and the static root all come through the
//! [`Server`] trait. [`Endpoints`] is the in-process implementation used by
//! the binary; embedders can supply their own.

pub mod listener;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::http::request::{Credentials, Request};
use crate::http::response::HandlerOutcome;

/// A static asset compiled into (or registered with) the server.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedContent {
    pub data: &'static [u8],
}

/// The engine's view of the server it belongs to.
pub trait Server: Send + Sync {
    /// Document root for static file serving.
    fn static_path(&self) -> &Path;

    /// File name appended when a static URI ends with `/`.
    fn index_file(&self) -> &str {
        "index.html"
    }

    /// Whether cross-origin websocket access is allowed for this URI.
    fn is_cross_origin_allowed(&self, _uri: &str) -> bool {
        false
    }

    /// Looks up a websocket endpoint for the URI.
    fn get_web_socket_handler(&self, uri: &str) -> Option<Arc<dyn WebSocketHandler>>;

    /// Offers the request to the application's page handlers.
    fn handle(&self, _request: &Request) -> HandlerOutcome {
        HandlerOutcome::NoResponse
    }

    /// Content of the live statistics script served at `/_livestats.js`.
    fn stats_document(&self) -> String {
        String::new()
    }

    /// Looks up an embedded asset by path.
    fn find_embedded_content(&self, _path: &str) -> Option<EmbeddedContent> {
        None
    }

    /// Asserts the caller is on the thread that owns the connections.
    /// Engine entry points call this; the default implementation trusts
    /// Rust's ownership rules instead of asserting.
    fn check_thread(&self) {}
}

/// A dynamic page endpoint.
pub trait PageHandler: Send + Sync {
    fn handle(&self, request: &Request) -> HandlerOutcome;
}

/// The engine-side surface a websocket handler talks back through.
/// Implemented by `Connection`; handlers receive it in every callback.
pub trait WebSocket {
    /// Sends a text message, framed for whichever dialect the connection
    /// negotiated.
    fn send_text(&mut self, message: &str);

    /// Sends a binary message. Hixie connections cannot carry binary data;
    /// the message is logged and dropped there.
    fn send_binary(&mut self, data: &[u8]);

    /// User-initiated close. Anything written after this is dropped with a
    /// diagnostic.
    fn close(&mut self);

    /// Closes once everything already written has drained.
    fn close_when_empty(&mut self);

    fn credentials(&self) -> Option<&Credentials>;

    fn get_header(&self, name: &str) -> Option<&str>;

    fn has_header(&self, name: &str) -> bool;
}

/// A websocket endpoint. `on_disconnect` is delivered exactly once, when the
/// connection is finalised.
pub trait WebSocketHandler: Send + Sync {
    fn on_connect(&self, _connection: &mut dyn WebSocket) {}
    fn on_text(&self, _connection: &mut dyn WebSocket, _message: &str) {}
    fn on_binary(&self, _connection: &mut dyn WebSocket, _data: &[u8]) {}
    fn on_disconnect(&self, _connection: &mut dyn WebSocket) {}
}

/// In-process registry of page and websocket endpoints plus the static root.
///
/// Lookups are exact-match on the query-stripped URI.
pub struct Endpoints {
    static_path: PathBuf,
    index_file: String,
    page_handlers: HashMap<String, Arc<dyn PageHandler>>,
    web_socket_handlers: HashMap<String, Arc<dyn WebSocketHandler>>,
    cross_origin_uris: Vec<String>,
}

impl Endpoints {
    pub fn new(static_path: impl Into<PathBuf>) -> Self {
        Self {
            static_path: static_path.into(),
            index_file: "index.html".to_string(),
            page_handlers: HashMap::new(),
            web_socket_handlers: HashMap::new(),
            cross_origin_uris: Vec::new(),
        }
    }

    /// Overrides the file served for directory URIs.
    pub fn set_index_file(&mut self, name: impl Into<String>) {
        self.index_file = name.into();
    }

    pub fn add_page_handler(&mut self, uri: impl Into<String>, handler: Arc<dyn PageHandler>) {
        self.page_handlers.insert(uri.into(), handler);
    }

    pub fn add_web_socket_handler(
        &mut self,
        uri: impl Into<String>,
        handler: Arc<dyn WebSocketHandler>,
    ) {
        self.web_socket_handlers.insert(uri.into(), handler);
    }

    /// Allows cross-origin websocket upgrades on this URI.
    pub fn allow_cross_origin(&mut self, uri: impl Into<String>) {
        self.cross_origin_uris.push(uri.into());
    }
}

fn strip_query(uri: &str) -> &str {
    match uri.find('?') {
        Some(pos) => &uri[..pos],
        None => uri,
    }
}

impl Server for Endpoints {
    fn static_path(&self) -> &Path {
        &self.static_path
    }

    fn index_file(&self) -> &str {
        &self.index_file
    }

    fn is_cross_origin_allowed(&self, uri: &str) -> bool {
        self.cross_origin_uris
            .iter()
            .any(|allowed| strip_query(uri) == allowed)
    }

    fn get_web_socket_handler(&self, uri: &str) -> Option<Arc<dyn WebSocketHandler>> {
        self.web_socket_handlers.get(strip_query(uri)).cloned()
    }

    fn handle(&self, request: &Request) -> HandlerOutcome {
        match self.page_handlers.get(strip_query(&request.uri)) {
            Some(handler) => handler.handle(request),
            None => HandlerOutcome::NoResponse,
        }
    }
}
