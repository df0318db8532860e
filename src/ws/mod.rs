//! WebSocket support.
//!
//! Two dialects are spoken, matching what browsers have shipped over the
//! years:
//!
//! - **`hixie`**: the draft-76 handshake (two numeric keys plus an 8-byte
//!   trailer answered with an MD5 digest) and its 0x00/0xFF text framing
//! - **`hybi`**: RFC 6455 at `Sec-WebSocket-Version` 8 and 13
//!
//! `handshake` holds the key computations for both.

pub mod handshake;
pub mod hixie;
pub mod hybi;
