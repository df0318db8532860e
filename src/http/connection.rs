use bytes::{Buf, BytesMut};
use std::io;
use std::io::{Read, Seek, SeekFrom};
use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Instant, SystemTime};
use tokio::io::Interest;

use crate::http::parser::{self, ParseError};
use crate::http::range;
use crate::http::request::{Credentials, Request, Verb};
use crate::http::response::{HandlerOutcome, Response, ResponseCode};
use crate::http::transport::{TcpTransport, Transport};
use crate::http::writer::WriteBuffer;
use crate::http::{mime, MAX_BUFFER_SIZE, MAX_HEADERS_SIZE, MAX_WEBSOCKET_MESSAGE_SIZE, READ_WRITE_BUFFER_SIZE};
use crate::server::{Server, WebSocket, WebSocketHandler};
use crate::ws::{handshake, hixie, hybi};

const SERVER_HEADER: &str = concat!("Server: breakwater/", env!("CARGO_PKG_VERSION"));

/// Protocol state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Accumulating bytes until the CRLFCRLF head terminator
    ReadingHeaders,
    /// Accumulating a request body up to its declared Content-Length
    BufferingPostData,
    /// Waiting for the 8-byte Hixie challenge trailer
    ReadingWebSocketKey3,
    /// Speaking draft-76 framing
    HandlingHixieWebSocket,
    /// Speaking RFC 6455 framing
    HandlingHybiWebSocket,
}

/// A single client connection: the input buffer, the bounded write path and
/// the protocol state machine over both.
///
/// The connection is owned and mutated by exactly one drive task; the
/// external event loop reports readiness and the engine consumes or produces
/// bytes without ever blocking. Handlers talk back through the
/// [`WebSocket`] trait this type implements.
pub struct Connection<T: Transport> {
    server: Arc<dyn Server>,
    transport: T,
    peer: SocketAddr,
    span: tracing::Span,
    state: ConnectionState,
    input: BytesMut,
    writer: WriteBuffer,
    request: Option<Request>,
    web_socket_handler: Option<Arc<dyn WebSocketHandler>>,
    web_socket_keys: [u32; 2],
    hixie_extra_headers: String,
    bytes_received: u64,
    connected_at: Instant,
    shutdown_by_user: bool,
    finalised: bool,
}

fn now_date() -> String {
    httpdate::fmt_http_date(SystemTime::now())
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "(unknown)".to_string()
    }
}

impl<T: Transport> Connection<T> {
    pub fn new(server: Arc<dyn Server>, transport: T, peer: SocketAddr) -> Self {
        Self {
            server,
            transport,
            peer,
            span: tracing::debug_span!("connection", peer = %peer),
            state: ConnectionState::ReadingHeaders,
            input: BytesMut::new(),
            writer: WriteBuffer::new(),
            request: None,
            web_socket_handler: None,
            web_socket_keys: [0, 0],
            hixie_extra_headers: String::new(),
            bytes_received: 0,
            connected_at: Instant::now(),
            shutdown_by_user: false,
            finalised: false,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn bytes_sent(&self) -> u64 {
        self.writer.bytes_sent()
    }

    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// True once the socket has been shut down; no further I/O happens.
    pub fn closed(&self) -> bool {
        self.writer.closed()
    }

    /// Closes once the output buffer drains; immediately if it is empty.
    pub fn close_when_empty(&mut self) {
        self.writer.close_when_empty(&mut self.transport);
    }

    fn close_internal(&mut self) {
        self.server.check_thread();
        self.writer.shut_down(&mut self.transport);
    }

    /// Tears the connection down: delivers the single `on_disconnect` and
    /// leaves the transport for the caller (or Drop) to release.
    pub fn finalise(&mut self) {
        if self.finalised {
            return;
        }
        self.finalised = true;
        if let Some(handler) = self.web_socket_handler.take() {
            handler.on_disconnect(self);
        }
        tracing::debug!("Closing socket");
    }

    /// Feeds the engine on readability: pulls one chunk from the socket,
    /// appends it to the input buffer and runs the state machine.
    pub fn on_readable(&mut self) {
        let _span = self.span.clone().entered();
        self.server.check_thread();
        if self.closed() {
            return;
        }
        let mut chunk = [0u8; READ_WRITE_BUFFER_SIZE];
        let read = match self.transport.try_read(&mut chunk) {
            Ok(0) => {
                tracing::debug!("Remote end closed connection");
                self.close_internal();
                return;
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return,
            Err(e) => {
                tracing::warn!("Unable to read from socket: {}", e);
                return;
            }
        };
        self.bytes_received += read as u64;
        self.input.extend_from_slice(&chunk[..read]);
        self.handle_new_data();
    }

    /// Drains the write buffer on writability.
    pub fn on_writable(&mut self) {
        let _span = self.span.clone().entered();
        self.server.check_thread();
        if self.closed() {
            return;
        }
        self.writer.flush(&mut self.transport);
    }

    /// Whether the drive loop should wait for writability.
    pub fn wants_write_events(&self) -> bool {
        self.writer.wants_write_events()
    }

    fn write(&mut self, data: &[u8], flush: bool) -> bool {
        self.writer.write(&mut self.transport, data, flush)
    }

    fn flush(&mut self) -> bool {
        self.writer.flush(&mut self.transport)
    }

    fn buffer_line(&mut self, line: &str) -> bool {
        if !self.write(line.as_bytes(), false) {
            return false;
        }
        self.write(b"\r\n", false)
    }

    fn handle_new_data(&mut self) {
        match self.state {
            ConnectionState::ReadingHeaders => self.handle_headers(),
            ConnectionState::BufferingPostData => self.handle_buffering_post_data(),
            ConnectionState::ReadingWebSocketKey3 => self.handle_web_socket_key3(),
            ConnectionState::HandlingHixieWebSocket => self.handle_hixie_web_socket(),
            ConnectionState::HandlingHybiWebSocket => self.handle_hybi_web_socket(),
        }
    }

    fn handle_headers(&mut self) {
        if self.input.len() < 4 {
            return;
        }
        match parser::find_head_end(&self.input) {
            Some(end) => {
                let head = self.input[..end].to_vec();
                self.input.advance(end + 4);
                if !self.process_headers(&head) {
                    self.close_internal();
                    return;
                }
                self.handle_new_data();
            }
            None => {
                if self.input.len() > MAX_HEADERS_SIZE {
                    self.send_unsupported_error("Headers too big");
                }
            }
        }
    }

    fn handle_buffering_post_data(&mut self) {
        let (done, take) = match self.request.as_mut() {
            Some(request) => {
                let needed = request.content_length - request.body.len();
                let take = needed.min(self.input.len());
                request.body.extend_from_slice(&self.input[..take]);
                (request.body.len() == request.content_length, take)
            }
            None => {
                self.close_internal();
                return;
            }
        };
        self.input.advance(take);
        if done {
            self.state = ConnectionState::ReadingHeaders;
            if !self.handle_page_request() {
                self.close_internal();
                return;
            }
            if !self.input.is_empty() && !self.closed() {
                self.handle_new_data();
            }
        }
    }

    fn handle_web_socket_key3(&mut self) {
        if self.input.len() < 8 {
            return;
        }
        let mut key3 = [0u8; 8];
        key3.copy_from_slice(&self.input[..8]);
        let digest =
            handshake::hixie_digest(self.web_socket_keys[0], self.web_socket_keys[1], &key3);

        tracing::debug!("Attempting websocket upgrade");
        self.buffer_response_and_common_headers(ResponseCode::SwitchingProtocols);
        self.buffer_line("Upgrade: websocket");
        self.buffer_line("Connection: Upgrade");
        let extra_headers = std::mem::take(&mut self.hixie_extra_headers);
        self.write(extra_headers.as_bytes(), false);
        self.buffer_line("");
        self.write(&digest, true);

        self.state = ConnectionState::HandlingHixieWebSocket;
        self.input.advance(8);
        if let Some(handler) = self.web_socket_handler.clone() {
            handler.on_connect(self);
        }
        if !self.input.is_empty() {
            self.handle_new_data();
        }
    }

    fn handle_hixie_web_socket(&mut self) {
        if self.input.is_empty() {
            return;
        }
        loop {
            let (message, consumed) = {
                let mut decoder = hixie::HixieDecoder::new(&self.input);
                let message = decoder.decode_next_message();
                (message, decoder.bytes_decoded())
            };
            self.input.advance(consumed);
            match message {
                hixie::DecodedMessage::Text(text) => self.handle_text_message(&text),
                hixie::DecodedMessage::NoMessage => break,
                hixie::DecodedMessage::Error => {
                    self.close_internal();
                    return;
                }
            }
        }
        if self.input.len() > MAX_WEBSOCKET_MESSAGE_SIZE {
            tracing::warn!("WebSocket message too long");
            self.close_internal();
        }
    }

    fn handle_hybi_web_socket(&mut self) {
        if self.input.is_empty() {
            return;
        }
        loop {
            let (message, consumed) = {
                let mut decoder = hybi::HybiDecoder::new(&self.input);
                let message = decoder.decode_next_message();
                (message, decoder.bytes_decoded())
            };
            self.input.advance(consumed);
            match message {
                hybi::DecodedMessage::Text(text) => self.handle_text_message(&text),
                hybi::DecodedMessage::Binary(data) => self.handle_binary_message(&data),
                hybi::DecodedMessage::Ping(payload) => {
                    self.send_hybi_frame(hybi::OPCODE_PONG, &payload)
                }
                hybi::DecodedMessage::NoMessage => break,
                hybi::DecodedMessage::Close => {
                    tracing::debug!("Received WebSocket close");
                    self.close_internal();
                    return;
                }
                hybi::DecodedMessage::Error => {
                    self.close_internal();
                    return;
                }
            }
        }
        if self.input.len() > MAX_WEBSOCKET_MESSAGE_SIZE {
            tracing::warn!("WebSocket message too long");
            self.close_internal();
        }
    }

    fn handle_text_message(&mut self, message: &str) {
        tracing::debug!("Got text web socket message: '{}'", message);
        if let Some(handler) = self.web_socket_handler.clone() {
            handler.on_text(self, message);
        }
    }

    fn handle_binary_message(&mut self, data: &[u8]) {
        tracing::debug!("Got binary web socket message (size: {})", data.len());
        if let Some(handler) = self.web_socket_handler.clone() {
            handler.on_binary(self, data);
        }
    }

    fn send_hybi_frame(&mut self, opcode: u8, payload: &[u8]) {
        let (header, header_len) = hybi::frame_header(opcode, payload.len());
        if !self.write(&header[..header_len], false) {
            return;
        }
        self.write(payload, true);
    }

    fn process_headers(&mut self, head: &[u8]) -> bool {
        let server = Arc::clone(&self.server);
        let parsed = match parser::parse_head(head, &|uri| server.is_cross_origin_allowed(uri)) {
            Ok(parsed) => parsed,
            Err(ParseError::MalformedRequestLine) => {
                return self.send_bad_request("Malformed request line")
            }
            Err(ParseError::MalformedHeader) => return self.send_bad_request("Malformed header"),
            Err(ParseError::UnsupportedVersion) => {
                return self.send_unsupported_error("Unsupported HTTP version")
            }
        };
        tracing::info!("Request: {} {} {}", parsed.verb, parsed.uri, parsed.version);

        self.web_socket_keys = parsed.websocket_keys;
        self.hixie_extra_headers = parsed.hixie_extra_headers;

        let mut verb = parsed.verb;
        if parsed.connection_upgrade && parsed.websocket_upgrade {
            if verb != Verb::Get {
                return self.send_bad_request("Non-GET WebSocket request");
            }
            self.web_socket_handler = self.server.get_web_socket_handler(&parsed.uri);
            if self.web_socket_handler.is_none() {
                tracing::warn!("Couldn't find WebSocket end point for '{}'", parsed.uri);
                return self.send_404(&parsed.uri);
            }
            verb = Verb::WebSocket;
        }

        if verb == Verb::Get {
            if let Some(embedded) = self.server.find_embedded_content(&parsed.uri) {
                return self.send_data(mime::content_type(&parsed.uri), embedded.data);
            }
        }

        let content_length = parsed.content_length;
        self.request = Some(Request {
            peer: self.peer,
            verb,
            uri: parsed.uri,
            version: parsed.version,
            headers: parsed.headers,
            content_length,
            body: Vec::new(),
            credentials: None,
        });

        if content_length > MAX_BUFFER_SIZE {
            return self.send_bad_request("Content length too long");
        }
        if content_length == 0 {
            return self.handle_page_request();
        }
        self.state = ConnectionState::BufferingPostData;
        true
    }

    fn handle_page_request(&mut self) -> bool {
        let request = match self.request.as_ref() {
            Some(request) => request,
            None => return false,
        };
        let server = Arc::clone(&self.server);
        let result = catch_unwind(AssertUnwindSafe(|| server.handle(request)));
        let uri = request.uri.clone();
        let verb = request.verb;
        let range_header = request.header("Range").unwrap_or("").to_string();

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic);
                tracing::error!("page error: {}", message);
                return self.send_ise(&message);
            }
        };

        match outcome {
            HandlerOutcome::Handled(response) => self.send_response(response),
            HandlerOutcome::Unhandled => self.send_static_data(&uri, &range_header),
            HandlerOutcome::NoResponse => {
                if verb == Verb::WebSocket {
                    self.web_socket_handler = self.server.get_web_socket_handler(&uri);
                    if self.web_socket_handler.is_none() {
                        tracing::warn!("Couldn't find WebSocket end point for '{}'", uri);
                        return self.send_404(&uri);
                    }
                    let version: i32 = self
                        .request
                        .as_ref()
                        .and_then(|r| r.header("Sec-WebSocket-Version"))
                        .and_then(|v| v.trim().parse().ok())
                        .unwrap_or(0);
                    if version == 0 {
                        tracing::debug!(
                            "Got a hixie websocket with key1=0x{:x}, key2=0x{:x}",
                            self.web_socket_keys[0],
                            self.web_socket_keys[1]
                        );
                        self.state = ConnectionState::ReadingWebSocketKey3;
                        return true;
                    }
                    let key = self
                        .request
                        .as_ref()
                        .and_then(|r| r.header("Sec-WebSocket-Key"))
                        .unwrap_or("")
                        .to_string();
                    self.handle_hybi_handshake(version, &key)
                } else {
                    self.send_static_data(&uri, &range_header)
                }
            }
        }
    }

    fn send_response(&mut self, response: Response) -> bool {
        let uri = self
            .request
            .as_ref()
            .map(|r| r.uri.clone())
            .unwrap_or_default();
        if response.code == ResponseCode::NotFound {
            // 404 responses route through the embedded-content fallbacks.
            return self.send_404(&uri);
        }
        if !response.code.is_ok() {
            return self.send_error(
                response.code,
                &String::from_utf8_lossy(&response.body).into_owned(),
            );
        }

        self.buffer_response_and_common_headers(response.code);
        self.buffer_line(&format!("Content-Length: {}", response.body.len()));
        self.buffer_line(&format!("Content-Type: {}", response.content_type));
        if response.keep_alive {
            self.buffer_line("Connection: keep-alive");
        } else {
            self.buffer_line("Connection: close");
        }
        self.buffer_line(&format!("Last-Modified: {}", now_date()));
        self.buffer_line("Cache-Control: no-store");
        self.buffer_line("Pragma: no-cache");
        self.buffer_line(&format!("Expires: {}", now_date()));
        for (name, value) in &response.headers {
            self.buffer_line(&format!("{}: {}", name, value));
        }
        self.buffer_line("");

        if !self.write(&response.body, true) {
            return false;
        }
        if !response.keep_alive {
            self.close_when_empty();
        }
        true
    }

    fn handle_hybi_handshake(&mut self, version: i32, key: &str) -> bool {
        if version != 8 && version != 13 {
            return self.send_bad_request("Invalid websocket version");
        }
        tracing::debug!("Got a hybi-{} websocket with key={}", version, key);

        self.buffer_response_and_common_headers(ResponseCode::SwitchingProtocols);
        self.buffer_line("Upgrade: websocket");
        self.buffer_line("Connection: Upgrade");
        self.buffer_line(&format!(
            "Sec-WebSocket-Accept: {}",
            handshake::hybi_accept_key(key)
        ));
        self.buffer_line("");
        self.flush();

        self.state = ConnectionState::HandlingHybiWebSocket;
        if let Some(handler) = self.web_socket_handler.clone() {
            handler.on_connect(self);
        }
        true
    }

    fn send_error(&mut self, code: ResponseCode, body: &str) -> bool {
        let code_number = code.as_u16();
        let message = code.reason_phrase();
        self.buffer_response_and_common_headers(code);
        let document = match self.server.find_embedded_content("/_error.html") {
            Some(embedded) => String::from_utf8_lossy(embedded.data)
                .replace("%%ERRORCODE%%", &code_number.to_string())
                .replace("%%MESSAGE%%", message)
                .replace("%%BODY%%", body),
            None => format!(
                "<html><head><title>{code} - {message}</title></head>\
                 <body><h1>{code} - {message}</h1>\
                 <div>{body}</div><hr/><div><i>Powered by breakwater</i></div></body></html>",
                code = code_number,
                message = message,
                body = body
            ),
        };
        self.buffer_line(&format!("Content-Length: {}", document.len()));
        self.buffer_line("Connection: close");
        self.buffer_line("");
        self.buffer_line(&document);
        if !self.flush() {
            return false;
        }
        self.close_when_empty();
        true
    }

    fn send_unsupported_error(&mut self, reason: &str) -> bool {
        self.send_error(ResponseCode::NotImplemented, reason)
    }

    fn send_bad_request(&mut self, reason: &str) -> bool {
        self.send_error(ResponseCode::BadRequest, reason)
    }

    fn send_ise(&mut self, error: &str) -> bool {
        self.send_error(ResponseCode::InternalServerError, error)
    }

    fn send_404(&mut self, path: &str) -> bool {
        if let Some(embedded) = self.server.find_embedded_content(path) {
            return self.send_data(mime::content_type(path), embedded.data);
        }
        if path == "/_livestats.js" {
            let stats = self.server.stats_document();
            return self.send_data("text/javascript", stats.as_bytes());
        }
        self.send_error(
            ResponseCode::NotFound,
            &format!("Unable to find resource for: {}", path),
        )
    }

    fn send_data(&mut self, content_type: &str, data: &[u8]) -> bool {
        self.buffer_response_and_common_headers(ResponseCode::Ok);
        self.buffer_line(&format!("Content-Type: {}", content_type));
        self.buffer_line(&format!("Content-Length: {}", data.len()));
        self.buffer_line("Connection: keep-alive");
        self.buffer_line("");
        self.write(data, true)
    }

    fn send_static_data(&mut self, uri: &str, range_header: &str) -> bool {
        let uri_path = match uri.find('?') {
            Some(query) => &uri[..query],
            None => uri,
        };
        let mut path = format!("{}{}", self.server.static_path().display(), uri_path);
        if path.ends_with('/') {
            path += self.server.index_file();
        }

        let mut file = match std::fs::File::open(&path) {
            Ok(file) => file,
            Err(_) => return self.send_404(uri),
        };
        let metadata = match file.metadata() {
            Ok(metadata) => metadata,
            Err(_) => return self.send_404(uri),
        };
        let file_size = metadata.len() as i64;

        let ranges = if range_header.is_empty() {
            Vec::new()
        } else {
            match range::parse_ranges(range_header) {
                Ok(ranges) => ranges,
                Err(_) => {
                    tracing::warn!("Bad range request: '{}'", range_header);
                    return self.send_bad_request("Bad range header");
                }
            }
        };
        let plan = range::plan_ranges(&ranges, file_size);

        self.buffer_response_and_common_headers(plan.code);
        if let Some(content_range) = &plan.content_range {
            self.buffer_line(&format!("Content-Range: {}", content_range));
        }
        self.buffer_line(&format!("Content-Length: {}", plan.content_length));
        self.buffer_line(&format!("Content-Type: {}", mime::content_type(&path)));
        self.buffer_line("Connection: keep-alive");
        self.buffer_line("Accept-Ranges: bytes");
        let mtime = metadata.modified().unwrap_or_else(|_| SystemTime::now());
        self.buffer_line(&format!("Last-Modified: {}", httpdate::fmt_http_date(mtime)));
        if !mime::is_cacheable(&path) {
            self.buffer_line("Cache-Control: no-store");
            self.buffer_line("Pragma: no-cache");
            self.buffer_line(&format!("Expires: {}", now_date()));
        }
        self.buffer_line("");
        if !self.flush() {
            return false;
        }

        for send_range in &plan.send {
            if file.seek(SeekFrom::Start(send_range.start as u64)).is_err() {
                // Data may already be on the wire; nothing sensible to send.
                return false;
            }
            let mut bytes_left = send_range.length();
            while bytes_left > 0 {
                let mut buf = [0u8; READ_WRITE_BUFFER_SIZE];
                let to_read = (bytes_left as usize).min(buf.len());
                match file.read(&mut buf[..to_read]) {
                    Ok(0) | Err(_) => {
                        // Headers are already flushed; an error document is
                        // no longer possible.
                        tracing::error!("Error reading file: unexpected EOF");
                        return false;
                    }
                    Ok(read) => {
                        bytes_left -= read as i64;
                        if !self.write(&buf[..read], true) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    fn buffer_response_and_common_headers(&mut self, code: ResponseCode) {
        let response_line = format!("HTTP/1.1 {} {}", code.as_u16(), code.reason_phrase());
        tracing::info!("Response: {}", response_line);
        self.buffer_line(&response_line);
        self.buffer_line(SERVER_HEADER);
        self.buffer_line(&format!("Date: {}", now_date()));
        self.buffer_line("Access-Control-Allow-Origin: *");
    }
}

impl<T: Transport> WebSocket for Connection<T> {
    fn send_text(&mut self, message: &str) {
        let _span = self.span.clone().entered();
        self.server.check_thread();
        if self.closed() {
            if self.shutdown_by_user {
                tracing::error!("Server wrote to connection after closing it");
            }
            return;
        }
        if self.state == ConnectionState::HandlingHixieWebSocket {
            let frame = hixie::encode_text(message);
            self.write(&frame, true);
            return;
        }
        self.send_hybi_frame(hybi::OPCODE_TEXT, message.as_bytes());
    }

    fn send_binary(&mut self, data: &[u8]) {
        let _span = self.span.clone().entered();
        self.server.check_thread();
        if self.closed() {
            if self.shutdown_by_user {
                tracing::error!("Server wrote to connection after closing it");
            }
            return;
        }
        if self.state == ConnectionState::HandlingHixieWebSocket {
            tracing::error!("Hixie does not support binary");
            return;
        }
        self.send_hybi_frame(hybi::OPCODE_BINARY, data);
    }

    fn close(&mut self) {
        let _span = self.span.clone().entered();
        self.server.check_thread();
        self.shutdown_by_user = true;
        self.close_internal();
    }

    fn close_when_empty(&mut self) {
        self.server.check_thread();
        Connection::close_when_empty(self);
    }

    fn credentials(&self) -> Option<&Credentials> {
        self.server.check_thread();
        self.request.as_ref().and_then(|r| r.credentials.as_ref())
    }

    fn get_header(&self, name: &str) -> Option<&str> {
        self.request.as_ref().and_then(|r| r.header(name))
    }

    fn has_header(&self, name: &str) -> bool {
        self.request.as_ref().is_some_and(|r| r.has_header(name))
    }
}

impl Connection<TcpTransport> {
    /// Drives the connection until it closes: waits for socket readiness and
    /// feeds the matching engine entry point. Write interest is only
    /// requested while the write buffer has pending bytes.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        while !self.closed() {
            let interest = if self.wants_write_events() {
                Interest::READABLE | Interest::WRITABLE
            } else {
                Interest::READABLE
            };
            let ready = self.transport.stream().ready(interest).await?;
            if ready.is_readable() {
                self.on_readable();
            }
            if self.closed() {
                break;
            }
            if ready.is_writable() {
                self.on_writable();
            }
        }
        self.finalise();
        Ok(())
    }
}

impl<T: Transport> Drop for Connection<T> {
    fn drop(&mut self) {
        self.finalise();
    }
}
