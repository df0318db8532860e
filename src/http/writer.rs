use bytes::{Buf, BytesMut};
use std::io;

use crate::http::transport::Transport;
use crate::http::MAX_BUFFER_SIZE;

/// The non-blocking send path of a connection.
///
/// Writes go straight to the socket when possible; whatever the socket does
/// not accept is buffered and drained on writability. The pending buffer is
/// capped at [`MAX_BUFFER_SIZE`]; hitting the cap shuts the connection down.
///
/// The buffer also owns the socket-lifecycle flags (`shutdown`,
/// `had_send_error`, `close_on_empty`) so every exit path of the send
/// machinery can act on them directly.
pub struct WriteBuffer {
    pending: BytesMut,
    shutdown: bool,
    had_send_error: bool,
    close_on_empty: bool,
    registered_for_write_events: bool,
    bytes_sent: u64,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self {
            pending: BytesMut::new(),
            shutdown: false,
            had_send_error: false,
            close_on_empty: false,
            registered_for_write_events: false,
            bytes_sent: 0,
        }
    }

    /// True once the socket has been shut down (by either side of the
    /// engine); all further writes are rejected.
    pub fn closed(&self) -> bool {
        self.shutdown
    }

    pub fn had_send_error(&self) -> bool {
        self.had_send_error
    }

    pub fn close_on_empty(&self) -> bool {
        self.close_on_empty
    }

    /// Whether the drive loop should wait for writability.
    pub fn wants_write_events(&self) -> bool {
        self.registered_for_write_events
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Shuts the transport down and marks the connection closed. Safe to
    /// call repeatedly; only the first call touches the socket.
    pub fn shut_down<T: Transport>(&mut self, transport: &mut T) {
        if !self.shutdown {
            if let Err(e) = transport.shutdown() {
                tracing::warn!("Unable to shutdown socket: {}", e);
            }
        }
        self.shutdown = true;
    }

    /// Closes as soon as the pending buffer drains; immediately if it is
    /// already empty.
    pub fn close_when_empty<T: Transport>(&mut self, transport: &mut T) {
        if self.pending.is_empty() {
            self.shut_down(transport);
        } else {
            self.close_on_empty = true;
        }
    }

    /// Sends what the socket will take right now. `WouldBlock` counts as
    /// zero bytes; any other error disables the connection.
    fn safe_send<T: Transport>(&mut self, transport: &mut T, data: &[u8]) -> Option<usize> {
        if self.shutdown || self.had_send_error {
            return None;
        }
        match transport.try_write(data) {
            Ok(sent) => {
                self.bytes_sent += sent as u64;
                Some(sent)
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Some(0),
            Err(e) => {
                tracing::warn!("Unable to write to socket: {} - disabling further writes", e);
                self.had_send_error = true;
                self.shut_down(transport);
                None
            }
        }
    }

    /// Queues `data`, attempting a direct send first when `flush` is set and
    /// nothing is already pending. Returns false if the connection is closed,
    /// close-pending, or the buffer cap was hit.
    pub fn write<T: Transport>(&mut self, transport: &mut T, data: &[u8], flush: bool) -> bool {
        if self.closed() || self.close_on_empty {
            return false;
        }
        if !data.is_empty() {
            let mut sent = 0;
            if self.pending.is_empty() && flush {
                match self.safe_send(transport, data) {
                    None => return false,
                    Some(n) if n == data.len() => return true,
                    Some(n) => sent = n,
                }
            }
            let tail = &data[sent..];
            if self.pending.len() + tail.len() >= MAX_BUFFER_SIZE {
                tracing::warn!(
                    "Closing connection: buffer size too large ({} > {})",
                    self.pending.len() + tail.len(),
                    MAX_BUFFER_SIZE
                );
                self.shut_down(transport);
                return false;
            }
            self.pending.extend_from_slice(tail);
        }
        if flush {
            return self.flush(transport);
        }
        true
    }

    /// Drains the pending buffer once and updates write-event registration:
    /// a non-empty buffer subscribes to writability, an empty one
    /// unsubscribes and fires a pending close-when-empty.
    pub fn flush<T: Transport>(&mut self, transport: &mut T) -> bool {
        if self.pending.is_empty() {
            return true;
        }
        let pending = std::mem::take(&mut self.pending);
        let result = self.safe_send(transport, &pending);
        self.pending = pending;
        let sent = match result {
            None => return false,
            Some(n) => n,
        };
        self.pending.advance(sent);
        if !self.pending.is_empty() && !self.registered_for_write_events {
            self.registered_for_write_events = true;
        } else if self.pending.is_empty() && self.registered_for_write_events {
            self.registered_for_write_events = false;
        }
        if self.pending.is_empty() && !self.closed() && self.close_on_empty {
            tracing::debug!("Ready for close, now empty");
            self.shut_down(transport);
        }
        true
    }
}

impl Default for WriteBuffer {
    fn default() -> Self {
        Self::new()
    }
}
