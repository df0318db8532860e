use std::collections::HashMap;

/// HTTP status codes emitted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    /// 101 Switching Protocols (WebSocket handshake)
    SwitchingProtocols,
    /// 200 OK
    Ok,
    /// 201 Created
    Created,
    /// 204 No Content
    NoContent,
    /// 206 Partial Content
    PartialContent,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 500 Internal Server Error
    InternalServerError,
    /// 501 Not Implemented
    NotImplemented,
}

impl ResponseCode {
    /// Returns the numeric HTTP status code.
    pub fn as_u16(&self) -> u16 {
        match self {
            ResponseCode::SwitchingProtocols => 101,
            ResponseCode::Ok => 200,
            ResponseCode::Created => 201,
            ResponseCode::NoContent => 204,
            ResponseCode::PartialContent => 206,
            ResponseCode::BadRequest => 400,
            ResponseCode::NotFound => 404,
            ResponseCode::MethodNotAllowed => 405,
            ResponseCode::InternalServerError => 500,
            ResponseCode::NotImplemented => 501,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            ResponseCode::SwitchingProtocols => "Switching Protocols",
            ResponseCode::Ok => "OK",
            ResponseCode::Created => "Created",
            ResponseCode::NoContent => "No Content",
            ResponseCode::PartialContent => "Partial Content",
            ResponseCode::BadRequest => "Bad Request",
            ResponseCode::NotFound => "Not Found",
            ResponseCode::MethodNotAllowed => "Method Not Allowed",
            ResponseCode::InternalServerError => "Internal Server Error",
            ResponseCode::NotImplemented => "Not Implemented",
        }
    }

    /// True for non-error codes (informational and success classes).
    pub fn is_ok(&self) -> bool {
        self.as_u16() < 400
    }
}

/// A response produced by a page handler.
#[derive(Debug, Clone)]
pub struct Response {
    pub code: ResponseCode,
    pub content_type: String,
    pub body: Vec<u8>,
    /// Additional headers appended after the engine's common set.
    pub headers: HashMap<String, String>,
    pub keep_alive: bool,
}

impl Response {
    /// Creates a 200 OK response with the given content type and body.
    pub fn ok(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(ResponseCode::Ok)
            .content_type(content_type)
            .body(body.into())
            .build()
    }

    /// Creates an error response; the body is substituted into the error
    /// document template by the connection.
    pub fn error(code: ResponseCode, body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(code).body(body.into()).build()
    }
}

/// What a page handler did with a request.
///
/// Distinguishing `Unhandled` from `NoResponse` matters for WebSocket
/// dispatch: `NoResponse` on a websocket verb continues the upgrade
/// handshake, while both fall through to static serving for plain verbs.
#[derive(Debug, Clone)]
pub enum HandlerOutcome {
    /// The handler produced a response to serialise.
    Handled(Response),
    /// The handler explicitly declined; fall through to static files.
    Unhandled,
    /// No handler had anything to say.
    NoResponse,
}

/// Builder for constructing responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(ResponseCode::Ok)
///     .content_type("application/json")
///     .body(b"{}".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    code: ResponseCode,
    content_type: String,
    body: Vec<u8>,
    headers: HashMap<String, String>,
    keep_alive: bool,
}

impl ResponseBuilder {
    pub fn new(code: ResponseCode) -> Self {
        Self {
            code,
            content_type: "text/html".to_string(),
            body: Vec::new(),
            headers: HashMap::new(),
            keep_alive: true,
        }
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn build(self) -> Response {
        Response {
            code: self.code,
            content_type: self.content_type,
            body: self.body,
            headers: self.headers,
            keep_alive: self.keep_alive,
        }
    }
}
