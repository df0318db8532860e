//! Shared helpers: an in-memory transport and a scriptable server so the
//! connection engine can be driven without sockets.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use breakwater::http::connection::Connection;
use breakwater::http::request::Request;
use breakwater::http::response::HandlerOutcome;
use breakwater::http::transport::Transport;
use breakwater::server::{EmbeddedContent, Server, WebSocket, WebSocketHandler};

/// A transport backed by byte queues, with knobs for exercising the
/// non-blocking write path.
pub struct MemoryTransport {
    pub incoming: VecDeque<u8>,
    pub outgoing: Vec<u8>,
    /// Max bytes accepted per `try_write`; `None` accepts everything.
    pub write_limit: Option<usize>,
    /// When set, writes report `WouldBlock`.
    pub write_blocked: bool,
    /// When set, writes fail hard.
    pub write_error: bool,
    /// When set, an empty read queue reads as EOF rather than `WouldBlock`.
    pub peer_closed: bool,
    pub shutdown_calls: usize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            incoming: VecDeque::new(),
            outgoing: Vec::new(),
            write_limit: None,
            write_blocked: false,
            write_error: false,
            peer_closed: false,
            shutdown_calls: 0,
        }
    }

    pub fn push_input(&mut self, data: &[u8]) {
        self.incoming.extend(data.iter().copied());
    }
}

impl Transport for MemoryTransport {
    fn try_read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.incoming.is_empty() {
            if self.peer_closed {
                return Ok(0);
            }
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let mut read = 0;
        while read < buf.len() {
            match self.incoming.pop_front() {
                Some(byte) => {
                    buf[read] = byte;
                    read += 1;
                }
                None => break,
            }
        }
        Ok(read)
    }

    fn try_write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.write_error {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe"));
        }
        if self.write_blocked {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        let accepted = match self.write_limit {
            Some(limit) => data.len().min(limit),
            None => data.len(),
        };
        self.outgoing.extend_from_slice(&data[..accepted]);
        Ok(accepted)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.shutdown_calls += 1;
        Ok(())
    }
}

type PageFn = Box<dyn Fn(&Request) -> HandlerOutcome + Send + Sync>;

/// A [`Server`] whose behaviour each test scripts directly.
pub struct TestServer {
    pub static_root: PathBuf,
    pub index: String,
    pub page: Option<PageFn>,
    pub web_sockets: HashMap<String, Arc<dyn WebSocketHandler>>,
    pub embedded: HashMap<String, &'static [u8]>,
    pub stats: String,
    pub cross_origin: bool,
}

impl TestServer {
    pub fn new() -> Self {
        Self {
            static_root: PathBuf::from("/nonexistent"),
            index: "index.html".to_string(),
            page: None,
            web_sockets: HashMap::new(),
            embedded: HashMap::new(),
            stats: String::new(),
            cross_origin: false,
        }
    }

    pub fn with_static_root(root: impl Into<PathBuf>) -> Self {
        let mut server = Self::new();
        server.static_root = root.into();
        server
    }
}

impl Server for TestServer {
    fn static_path(&self) -> &std::path::Path {
        &self.static_root
    }

    fn index_file(&self) -> &str {
        &self.index
    }

    fn is_cross_origin_allowed(&self, _uri: &str) -> bool {
        self.cross_origin
    }

    fn get_web_socket_handler(&self, uri: &str) -> Option<Arc<dyn WebSocketHandler>> {
        self.web_sockets.get(uri).cloned()
    }

    fn handle(&self, request: &Request) -> HandlerOutcome {
        match &self.page {
            Some(page) => page(request),
            None => HandlerOutcome::NoResponse,
        }
    }

    fn stats_document(&self) -> String {
        self.stats.clone()
    }

    fn find_embedded_content(&self, path: &str) -> Option<EmbeddedContent> {
        self.embedded
            .get(path)
            .map(|data| EmbeddedContent { data: *data })
    }
}

/// Records every callback; optionally echoes text messages back.
#[derive(Default)]
pub struct RecordingHandler {
    pub events: Mutex<Vec<String>>,
    pub echo: bool,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn echoing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            echo: true,
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl WebSocketHandler for RecordingHandler {
    fn on_connect(&self, _connection: &mut dyn WebSocket) {
        self.events.lock().unwrap().push("connect".to_string());
    }

    fn on_text(&self, connection: &mut dyn WebSocket, message: &str) {
        self.events.lock().unwrap().push(format!("text:{}", message));
        if self.echo {
            connection.send_text(message);
        }
    }

    fn on_binary(&self, _connection: &mut dyn WebSocket, data: &[u8]) {
        self.events
            .lock()
            .unwrap()
            .push(format!("binary:{}", data.len()));
    }

    fn on_disconnect(&self, _connection: &mut dyn WebSocket) {
        self.events.lock().unwrap().push("disconnect".to_string());
    }
}

pub fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

pub fn new_connection(server: Arc<dyn Server>) -> Connection<MemoryTransport> {
    Connection::new(server, MemoryTransport::new(), peer())
}

/// Pushes bytes at the connection and pumps `on_readable` until the engine
/// has taken everything it is going to take.
pub fn feed(conn: &mut Connection<MemoryTransport>, data: &[u8]) {
    conn.transport_mut().push_input(data);
    loop {
        let before = conn.transport().incoming.len();
        if before == 0 {
            break;
        }
        conn.on_readable();
        if conn.transport().incoming.len() == before {
            break;
        }
    }
}

pub fn output(conn: &Connection<MemoryTransport>) -> Vec<u8> {
    conn.transport().outgoing.clone()
}

pub fn output_text(conn: &Connection<MemoryTransport>) -> String {
    String::from_utf8_lossy(&conn.transport().outgoing).into_owned()
}

/// Creates a scratch directory under the system temp dir, empty.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("breakwater-test-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}
