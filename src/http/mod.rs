//! HTTP protocol implementation.
//!
//! This module implements the per-connection HTTP/1.1 engine, including the
//! WebSocket upgrade paths and range-aware static file serving.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: the per-connection state machine driving everything
//! - **`parser`**: incremental parsing of the request head
//! - **`request`**: HTTP request representation and the header map
//! - **`response`**: HTTP response representation with builder pattern
//! - **`range`**: `Range: bytes=...` parsing and normalisation
//! - **`writer`**: the bounded non-blocking send path
//! - **`transport`**: the socket seam between the engine and tokio
//! - **`mime`**: content-type detection based on file extensions
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────────┐
//!        │ ReadingHeaders  │ ← accumulate bytes until CRLFCRLF
//!        └───────┬─────────┘
//!                │ headers parsed
//!                ├─ Content-Length > 0 → BufferingPostData → dispatch
//!                ├─ Hixie upgrade      → ReadingWebSocketKey3
//!                │                        → HandlingHixieWebSocket
//!                ├─ Hybi upgrade       → HandlingHybiWebSocket
//!                └─ plain request      → dispatch, stay in ReadingHeaders
//! ```
//!
//! Every transition re-invokes the input dispatcher while buffered bytes
//! remain, so several pipelined frames arriving in one read are all handled.

pub mod connection;
pub mod mime;
pub mod parser;
pub mod range;
pub mod request;
pub mod response;
pub mod transport;
pub mod writer;

/// Output buffer cap; exceeding it closes the connection.
pub const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Size of the scratch buffer used for socket reads and file copies.
pub const READ_WRITE_BUFFER_SIZE: usize = 16 * 1024;

/// Largest decoded WebSocket message accepted before the connection closes.
pub const MAX_WEBSOCKET_MESSAGE_SIZE: usize = 16 * 1024;

/// Largest request head accepted; exceeding it yields `501 Not Implemented`.
pub const MAX_HEADERS_SIZE: usize = 64 * 1024;
