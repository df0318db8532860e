//! Breakwater - embeddable HTTP/1.1 + WebSocket server engine.
//!
//! The core of the crate is a per-connection protocol engine
//! ([`http::connection::Connection`]) driven by socket readiness: the engine
//! parses bytes, produces bytes, and dispatches decoded requests to the
//! collaborators defined in [`server`]. Eligible requests are upgraded to
//! WebSocket, in either the legacy draft-76 ("Hixie") dialect or RFC 6455
//! ("Hybi") at versions 8 and 13.

pub mod config;
pub mod http;
pub mod server;
pub mod ws;
