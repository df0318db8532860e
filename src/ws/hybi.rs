//! RFC 6455 ("Hybi") frame codec.
//!
//! Encoding always produces a single unfragmented, unmasked frame, which is
//! all a server may send. Decoding accepts masked client frames (the mask is
//! removed) as well as unmasked ones, replies to nothing itself: PINGs are
//! surfaced so the connection can answer, PONGs are swallowed.

pub const OPCODE_CONT: u8 = 0x0;
pub const OPCODE_TEXT: u8 = 0x1;
pub const OPCODE_BINARY: u8 = 0x2;
pub const OPCODE_CLOSE: u8 = 0x8;
pub const OPCODE_PING: u8 = 0x9;
pub const OPCODE_PONG: u8 = 0xA;

/// One step of Hybi decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedMessage {
    /// Need more bytes before anything can be delivered.
    NoMessage,
    /// A complete text message (unmasked).
    Text(String),
    /// A complete binary message (unmasked).
    Binary(Vec<u8>),
    /// A PING to be answered with a PONG carrying the same payload.
    Ping(Vec<u8>),
    /// The peer asked to close.
    Close,
    /// Protocol violation; the connection must be dropped.
    Error,
}

/// Builds the frame header for an unmasked server frame. Returns the header
/// bytes and their count (2, 4 or 10 depending on the payload length).
pub fn frame_header(opcode: u8, payload_len: usize) -> ([u8; 10], usize) {
    let mut header = [0u8; 10];
    header[0] = 0x80 | opcode;
    if payload_len < 126 {
        header[1] = payload_len as u8;
        (header, 2)
    } else if payload_len < 65536 {
        header[1] = 126;
        header[2..4].copy_from_slice(&(payload_len as u16).to_be_bytes());
        (header, 4)
    } else {
        header[1] = 127;
        header[2..10].copy_from_slice(&(payload_len as u64).to_be_bytes());
        (header, 10)
    }
}

/// Encodes a complete frame: header followed by the payload verbatim.
pub fn encode_frame(opcode: u8, payload: &[u8]) -> Vec<u8> {
    let (header, header_len) = frame_header(opcode, payload.len());
    let mut frame = Vec::with_capacity(header_len + payload.len());
    frame.extend_from_slice(&header[..header_len]);
    frame.extend_from_slice(payload);
    frame
}

/// Incremental frame decoder over a borrowed input buffer.
///
/// Complete frames advance an internal cursor; the caller shifts its input
/// buffer by [`bytes_decoded`](HybiDecoder::bytes_decoded) once done. An
/// incomplete trailing frame consumes nothing.
pub struct HybiDecoder<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> HybiDecoder<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn bytes_decoded(&self) -> usize {
        self.offset
    }

    /// Decodes the next frame at the cursor. PONG frames are consumed and
    /// skipped; everything else is returned to the caller.
    pub fn decode_next_message(&mut self) -> DecodedMessage {
        loop {
            let rest = &self.buffer[self.offset..];
            if rest.len() < 2 {
                return DecodedMessage::NoMessage;
            }
            let fin = rest[0] & 0x80 != 0;
            let opcode = rest[0] & 0x0F;
            if !fin {
                tracing::warn!("Received hybi frame without FIN set; fragmentation is unsupported");
                return DecodedMessage::Error;
            }
            let masked = rest[1] & 0x80 != 0;
            let mut payload_len = u64::from(rest[1] & 0x7F);
            let mut header_len = 2;
            if payload_len == 126 {
                if rest.len() < 4 {
                    return DecodedMessage::NoMessage;
                }
                payload_len = u64::from(u16::from_be_bytes([rest[2], rest[3]]));
                header_len = 4;
            } else if payload_len == 127 {
                if rest.len() < 10 {
                    return DecodedMessage::NoMessage;
                }
                payload_len = u64::from_be_bytes([
                    rest[2], rest[3], rest[4], rest[5], rest[6], rest[7], rest[8], rest[9],
                ]);
                header_len = 10;
            }
            if payload_len > i64::MAX as u64 {
                tracing::warn!("Hybi frame length {} out of range", payload_len);
                return DecodedMessage::Error;
            }
            let mask_len = if masked { 4 } else { 0 };
            let total = header_len + mask_len + payload_len as usize;
            if rest.len() < total {
                return DecodedMessage::NoMessage;
            }
            let mut payload = rest[header_len + mask_len..total].to_vec();
            if masked {
                let key = [
                    rest[header_len],
                    rest[header_len + 1],
                    rest[header_len + 2],
                    rest[header_len + 3],
                ];
                for (i, byte) in payload.iter_mut().enumerate() {
                    *byte ^= key[i % 4];
                }
            }
            self.offset += total;
            match opcode {
                OPCODE_TEXT => {
                    return DecodedMessage::Text(String::from_utf8_lossy(&payload).into_owned())
                }
                OPCODE_BINARY => return DecodedMessage::Binary(payload),
                OPCODE_PING => return DecodedMessage::Ping(payload),
                OPCODE_PONG => continue,
                OPCODE_CLOSE => return DecodedMessage::Close,
                _ => {
                    tracing::warn!("Unsupported hybi opcode 0x{:x}", opcode);
                    return DecodedMessage::Error;
                }
            }
        }
    }
}
