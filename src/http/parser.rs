use crate::http::request::{Headers, Verb};

/// Errors that can occur while parsing a request head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The request line does not have exactly verb, URI and version
    MalformedRequestLine,
    /// A header line has no `:` separator (or the head is not text)
    MalformedHeader,
    /// The version token is not `HTTP/1.1`
    UnsupportedVersion,
}

/// The result of parsing one request head, up to but excluding the blank
/// line. Upgrade-related facts are extracted during the header walk so the
/// connection does not have to re-scan the map.
#[derive(Debug, Clone)]
pub struct ParsedHead {
    pub verb: Verb,
    pub uri: String,
    pub version: String,
    pub headers: Headers,
    /// Declared `Content-Length`; zero when absent or non-numeric.
    pub content_length: usize,
    /// Hixie draft-76 key accumulators from `Sec-WebSocket-Key1/2`.
    pub websocket_keys: [u32; 2],
    /// `Connection: upgrade` seen (case-insensitive).
    pub connection_upgrade: bool,
    /// `Upgrade: websocket` seen (case-insensitive).
    pub websocket_upgrade: bool,
    /// Pre-built `Sec-WebSocket-Origin` / `Sec-WebSocket-Location` lines for
    /// a Hixie 101 response, CRLF included.
    pub hixie_extra_headers: String,
    pub host: Option<String>,
}

/// Locates the CRLFCRLF head terminator, returning the offset of its first
/// byte.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Parses a request head (everything before the blank line).
///
/// `allow_cross_origin` is consulted once with the request URI to decide how
/// the Hixie origin headers are built.
///
/// # Errors
///
/// - [`ParseError::MalformedRequestLine`] for a missing token, trailing
///   content after the version, or an unknown verb
/// - [`ParseError::UnsupportedVersion`] when the version is not `HTTP/1.1`
/// - [`ParseError::MalformedHeader`] for a header line without a colon
pub fn parse_head(
    head: &[u8],
    allow_cross_origin: &dyn Fn(&str) -> bool,
) -> Result<ParsedHead, ParseError> {
    let text = std::str::from_utf8(head).map_err(|_| ParseError::MalformedHeader)?;
    let mut lines = text.split("\r\n");

    let request_line = lines.next().ok_or(ParseError::MalformedRequestLine)?;
    let mut tokens = request_line.split_whitespace();
    let verb_text = tokens.next().ok_or(ParseError::MalformedRequestLine)?;
    let verb = Verb::parse(verb_text);
    if verb == Verb::Invalid {
        return Err(ParseError::MalformedRequestLine);
    }
    let uri = tokens.next().ok_or(ParseError::MalformedRequestLine)?;
    let version = tokens.next().ok_or(ParseError::MalformedRequestLine)?;
    if version != "HTTP/1.1" {
        return Err(ParseError::UnsupportedVersion);
    }
    if tokens.next().is_some() {
        return Err(ParseError::MalformedRequestLine);
    }

    let cross_origin = allow_cross_origin(uri);

    let mut parsed = ParsedHead {
        verb,
        uri: uri.to_string(),
        version: version.to_string(),
        headers: Headers::new(),
        content_length: 0,
        websocket_keys: [0, 0],
        connection_upgrade: false,
        websocket_upgrade: false,
        hixie_extra_headers: String::new(),
        host: None,
    };

    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (name, rest) = line.split_once(':').ok_or(ParseError::MalformedHeader)?;
        let value = rest.trim_start();

        if name.eq_ignore_ascii_case("Connection") {
            if value.eq_ignore_ascii_case("upgrade") {
                parsed.connection_upgrade = true;
            }
        } else if name.eq_ignore_ascii_case("Upgrade") && value.eq_ignore_ascii_case("websocket") {
            parsed.websocket_upgrade = true;
        } else if name.eq_ignore_ascii_case("Sec-WebSocket-Key1") {
            parsed.websocket_keys[0] = parse_websocket_key(value);
        } else if name.eq_ignore_ascii_case("Sec-WebSocket-Key2") {
            parsed.websocket_keys[1] = parse_websocket_key(value);
        } else if name.eq_ignore_ascii_case("Origin") && cross_origin {
            parsed.hixie_extra_headers += &format!("Sec-WebSocket-Origin: {}\r\n", value);
        } else if name.eq_ignore_ascii_case("Host") {
            if !cross_origin {
                parsed.hixie_extra_headers += &format!("Sec-WebSocket-Origin: http://{}\r\n", value);
            }
            parsed.hixie_extra_headers += &format!("Sec-WebSocket-Location: ws://{}{}\r\n", value, uri);
            parsed.host = Some(value.to_string());
        } else if name.eq_ignore_ascii_case("Content-Length") {
            parsed.content_length = value.trim().parse().unwrap_or(0);
        }
        parsed.headers.insert(name, value);
    }

    Ok(parsed)
}

/// Extracts a Hixie draft-76 key: the decimal digits of the value form a
/// 32-bit accumulator which is divided by the number of space characters.
/// Values without spaces yield 0.
pub fn parse_websocket_key(value: &str) -> u32 {
    let mut number: u32 = 0;
    let mut spaces: u32 = 0;
    for c in value.chars() {
        match c {
            '0'..='9' => {
                number = number
                    .wrapping_mul(10)
                    .wrapping_add(c as u32 - '0' as u32);
            }
            ' ' => spaces += 1,
            _ => {}
        }
    }
    if spaces > 0 {
        number / spaces
    } else {
        0
    }
}
