use crate::http::response::ResponseCode;

/// One byte interval of a resource, ends inclusive. A negative `start` with
/// `end` at `i64::MAX` is a still-unresolved suffix request (`bytes=-n`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: i64,
    pub end: i64,
}

impl Range {
    pub fn length(&self) -> i64 {
        self.end - self.start + 1
    }
}

/// Errors from `Range` header parsing; both answer `400 Bad Request`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    /// The header does not start with `bytes=`
    UnsupportedUnit,
    /// An element is not of the form `a-b`, `a-` or `-n`, or the list is
    /// empty
    MalformedRange,
}

fn atoi(s: &str) -> i64 {
    s.parse().unwrap_or(0)
}

fn parse_one(element: &str) -> Result<Range, RangeError> {
    let minus = element.find('-').ok_or(RangeError::MalformedRange)?;
    if minus == 0 {
        // "-n" is n bytes off the end of the file, carried as a negative
        // start until the file size is known.
        return Ok(Range {
            start: atoi(element),
            end: i64::MAX,
        });
    }
    let start = atoi(&element[..minus]);
    let end = if minus == element.len() - 1 {
        i64::MAX
    } else {
        atoi(&element[minus + 1..])
    };
    Ok(Range { start, end })
}

/// Parses a `Range` header value into its raw intervals.
///
/// Only the `bytes=` unit is accepted; the list is comma-separated and must
/// be non-empty.
pub fn parse_ranges(header: &str) -> Result<Vec<Range>, RangeError> {
    let list = header.strip_prefix("bytes=").ok_or(RangeError::UnsupportedUnit)?;
    let mut ranges = Vec::new();
    for element in list.split(',') {
        ranges.push(parse_one(element.trim())?);
    }
    if ranges.is_empty() {
        return Err(RangeError::MalformedRange);
    }
    Ok(ranges)
}

/// The response plan for a (possibly range-limited) static transfer.
#[derive(Debug, Clone)]
pub struct RangePlan {
    pub code: ResponseCode,
    pub content_length: i64,
    /// `Content-Range` value for 206 responses.
    pub content_range: Option<String>,
    /// Normalised intervals to transmit, in request order.
    pub send: Vec<Range>,
}

/// Normalises the requested intervals against the file size and decides the
/// response shape: `200` with the whole file for a non-range request, `206`
/// otherwise.
///
/// Multi-range responses concatenate the intervals into a single
/// `Content-Range` value with no separator between them. That matches the
/// historical wire format of this engine rather than the multipart format
/// the standard calls for.
pub fn plan_ranges(requested: &[Range], file_size: i64) -> RangePlan {
    if requested.is_empty() {
        return RangePlan {
            code: ResponseCode::Ok,
            content_length: file_size,
            content_range: None,
            send: vec![Range {
                start: 0,
                end: file_size - 1,
            }],
        };
    }

    let mut content_length = 0;
    let mut line = String::from("bytes ");
    let mut send = Vec::with_capacity(requested.len());
    for range in requested {
        let mut actual = *range;
        if actual.start < 0 {
            actual.start += file_size;
        }
        if actual.start >= file_size {
            actual.start = file_size - 1;
        }
        if actual.end >= file_size {
            actual.end = file_size - 1;
        }
        content_length += actual.length();
        line += &format!("{}-{}", actual.start, actual.end);
        send.push(actual);
    }
    line += &format!("/{}", file_size);

    RangePlan {
        code: ResponseCode::PartialContent,
        content_length,
        content_range: Some(line),
        send,
    }
}
