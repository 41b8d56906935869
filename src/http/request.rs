use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::headers::{HeaderError, Headers};

const CRLF: &[u8] = b"\r\n";
const INITIAL_BUF_CAPACITY: usize = 1024;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid number of parts in request line")]
    InvalidNumParts,
    #[error("method is not composed of uppercase alphabetic characters")]
    InvalidMethodName,
    #[error("found no '/' in the HTTP version")]
    NoSlash,
    #[error("content-length is not a valid number")]
    InvalidContentLength,
    #[error("body is longer than the declared content-length")]
    BodyLengthGreater,
    #[error("connection closed before the declared content-length was read")]
    BodyLengthLesser,
    #[error("trying to parse data that is already fully parsed")]
    DoneState,
    #[error("connection closed before the request was complete")]
    UnexpectedEof,
    #[error(transparent)]
    Header(#[from] HeaderError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    Initialized,
    ParsingHeaders,
    ParsingBody,
    Done,
}

/// The first line of an HTTP request: method, target, and version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    /// Uppercase ASCII letters only (e.g. "GET")
    pub method: String,
    /// The raw request-target, unvalidated beyond being non-empty
    pub request_target: String,
    /// Whatever follows the last '/' in the third token (e.g. "1.1")
    pub http_version: String,
}

/// A parsed HTTP request.
///
/// Built exclusively by [`Request::from_reader`]; handlers receive it by
/// reference once parsing has fully completed.
#[derive(Debug)]
pub struct Request {
    pub request_line: RequestLine,
    pub headers: Headers,
    pub body: Vec<u8>,
    state: ParserState,
}

impl Request {
    fn new() -> Self {
        Self {
            request_line: RequestLine::default(),
            headers: Headers::new(),
            body: Vec::new(),
            state: ParserState::Initialized,
        }
    }

    /// Reads and parses exactly one request from `reader`.
    ///
    /// The transport may deliver bytes in arbitrarily small increments;
    /// unparsed bytes are buffered and re-fed to the parser after every
    /// read until the request is complete.
    pub async fn from_reader<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Request, ParseError> {
        let mut buf = BytesMut::with_capacity(INITIAL_BUF_CAPACITY);
        let mut req = Request::new();

        while req.state != ParserState::Done {
            let n = reader.read_buf(&mut buf).await?;
            if n == 0 {
                // the buffered prefix was already fed to the parser after
                // the previous read, so this end-of-stream is premature
                return Err(match req.state {
                    ParserState::ParsingBody => ParseError::BodyLengthLesser,
                    _ => ParseError::UnexpectedEof,
                });
            }

            let consumed = req.parse(&buf)?;
            buf.advance(consumed);
        }

        Ok(req)
    }

    /// Feeds the unparsed prefix to the state machine, looping through as
    /// many sub-states as the buffered bytes allow.
    ///
    /// Returns the number of bytes consumed; zero means more data is
    /// needed before any further progress.
    fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        if self.state == ParserState::Done {
            return Err(ParseError::DoneState);
        }

        let mut total = 0;
        while self.state != ParserState::Done {
            let before = self.state;
            let n = self.parse_single(&data[total..])?;
            total += n;
            if n == 0 && self.state == before {
                // no bytes consumed and no transition: stuck until more data
                break;
            }
        }
        Ok(total)
    }

    fn parse_single(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        match self.state {
            ParserState::Initialized => {
                let Some((request_line, n)) = parse_request_line(data)? else {
                    return Ok(0);
                };
                self.request_line = request_line;
                self.state = ParserState::ParsingHeaders;
                Ok(n)
            }
            ParserState::ParsingHeaders => {
                let (n, done) = self.headers.parse(data)?;
                if done {
                    self.state = ParserState::ParsingBody;
                }
                Ok(n)
            }
            ParserState::ParsingBody => self.parse_body(data),
            ParserState::Done => Err(ParseError::DoneState),
        }
    }

    fn parse_body(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        // content-length is the sole body-length signal; a body sent
        // without it is silently left unread
        let declared = match self.headers.get("content-length")? {
            None | Some("") => {
                self.state = ParserState::Done;
                return Ok(0);
            }
            Some(value) => value
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength)?,
        };

        if data.len() < declared {
            return Ok(0);
        }
        if data.len() > declared {
            // more than one message's worth in a single framing unit
            return Err(ParseError::BodyLengthGreater);
        }

        self.body = data[..declared].to_vec();
        self.state = ParserState::Done;
        Ok(declared)
    }
}

/// Extracts the request line from the front of `data`.
///
/// `Ok(None)` means no CRLF has arrived yet.
fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(end_idx) = data.windows(CRLF.len()).position(|w| w == CRLF) else {
        return Ok(None);
    };
    let line = &data[..end_idx];

    let parts: Vec<&[u8]> = line.split(|&b| b == b' ').collect();
    if parts.len() != 3 {
        return Err(ParseError::InvalidNumParts);
    }
    let (method, target, version_token) = (parts[0], parts[1], parts[2]);

    if method.is_empty() || !method.iter().all(|b| b.is_ascii_uppercase()) {
        return Err(ParseError::InvalidMethodName);
    }
    if target.is_empty() {
        return Err(ParseError::InvalidNumParts);
    }

    let slash_idx = version_token
        .iter()
        .rposition(|&b| b == b'/')
        .ok_or(ParseError::NoSlash)?;
    let version = &version_token[slash_idx + 1..];

    let request_line = RequestLine {
        method: String::from_utf8_lossy(method).to_string(),
        request_target: String::from_utf8_lossy(target).to_string(),
        http_version: String::from_utf8_lossy(version).to_string(),
    };
    Ok(Some((request_line, end_idx + CRLF.len())))
}
