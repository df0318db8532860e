//! Hixie draft-76 framing: text messages delimited by 0x00 and 0xFF.
//! The dialect has no binary frames, no control frames and no lengths.

/// One step of Hixie decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedMessage {
    /// Need more bytes before anything can be delivered.
    NoMessage,
    /// A complete text message.
    Text(String),
    /// The stream is not positioned at a frame start.
    Error,
}

/// Encodes a text message: 0x00, UTF-8 payload, 0xFF.
pub fn encode_text(message: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(message.len() + 2);
    frame.push(0x00);
    frame.extend_from_slice(message.as_bytes());
    frame.push(0xFF);
    frame
}

/// Scans a byte stream for complete 0x00 ... 0xFF messages, tracking how
/// many bytes the caller can discard.
pub struct HixieDecoder<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> HixieDecoder<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    /// Bytes consumed by complete messages so far; the caller shifts its
    /// input buffer by this amount.
    pub fn bytes_decoded(&self) -> usize {
        self.offset
    }

    /// Decodes the next message starting at the cursor.
    pub fn decode_next_message(&mut self) -> DecodedMessage {
        let rest = &self.buffer[self.offset..];
        if rest.is_empty() {
            return DecodedMessage::NoMessage;
        }
        if rest[0] != 0x00 {
            tracing::warn!("Error in WebSocket input stream (got 0x{:02x})", rest[0]);
            return DecodedMessage::Error;
        }
        match rest.iter().position(|&b| b == 0xFF) {
            Some(end) => {
                let text = String::from_utf8_lossy(&rest[1..end]).into_owned();
                self.offset += end + 1;
                DecodedMessage::Text(text)
            }
            None => DecodedMessage::NoMessage,
        }
    }
}
