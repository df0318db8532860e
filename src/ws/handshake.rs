use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use md5::{Digest as _, Md5};
use sha1::{Digest as _, Sha1};

/// Fixed GUID appended to the client key for the RFC 6455 accept hash.
pub const WEBSOCKET_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Computes the `Sec-WebSocket-Accept` value for a Hybi handshake:
/// base64(SHA1(client_key ++ GUID)).
pub fn hybi_accept_key(client_key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(client_key.as_bytes());
    hasher.update(WEBSOCKET_GUID.as_bytes());
    BASE64.encode(hasher.finalize())
}

/// Computes the 16-byte Hixie draft-76 challenge response: the MD5 of both
/// keys in big-endian order followed by the 8 raw trailer bytes.
pub fn hixie_digest(key1: u32, key2: u32, key3: &[u8; 8]) -> [u8; 16] {
    let mut input = [0u8; 16];
    input[0..4].copy_from_slice(&key1.to_be_bytes());
    input[4..8].copy_from_slice(&key2.to_be_bytes());
    input[8..16].copy_from_slice(key3);
    Md5::digest(input).into()
}
