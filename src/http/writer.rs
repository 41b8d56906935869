use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::response::{InvalidStatus, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";
const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("response writes called out of order (currently {0})")]
    InvalidWriteSequence(WriterState),
    #[error("a response must carry at least one header")]
    NoHeaders,
    #[error(transparent)]
    Status(#[from] InvalidStatus),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Where the writer is within the legal write sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Nothing written yet
    Empty,
    /// Status line written
    StatusLine,
    /// Headers written
    Headers,
    /// Plain body written
    Body,
    /// At least one chunk written
    ChunkedBody,
    /// Terminating chunk written, trailers still owed
    Trailers,
    /// Message complete
    Done,
}

impl std::fmt::Display for WriterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WriterState::Empty => "before the status line",
            WriterState::StatusLine => "after the status line",
            WriterState::Headers => "after the headers",
            WriterState::Body => "after the body",
            WriterState::ChunkedBody => "inside a chunked body",
            WriterState::Trailers => "awaiting trailers",
            WriterState::Done => "done",
        };
        f.write_str(s)
    }
}

/// Sequenced writer for one HTTP/1.1 response.
///
/// Legal call order: `write_status_line` → `write_headers` → either one
/// `write_body` or any number of `write_chunked_body` calls closed by
/// `write_chunked_body_done` (or `write_chunked_body_done_with_trailers`
/// followed by `write_trailers`). Every method checks the current state
/// first; an out-of-order call is a caller bug, not a transport error.
pub struct ResponseWriter<W> {
    conn: W,
    state: WriterState,
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    pub fn new(conn: W) -> Self {
        Self {
            conn,
            state: WriterState::Empty,
        }
    }

    /// Consumes the writer, returning the underlying sink.
    pub fn into_inner(self) -> W {
        self.conn
    }

    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        if self.state != WriterState::Empty {
            return Err(WriteError::InvalidWriteSequence(self.state));
        }

        let line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            status.as_u16(),
            status.reason_phrase()
        );
        self.conn.write_all(line.as_bytes()).await?;
        self.state = WriterState::StatusLine;
        Ok(())
    }

    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), WriteError> {
        if self.state != WriterState::StatusLine {
            return Err(WriteError::InvalidWriteSequence(self.state));
        }
        if headers.is_empty() {
            return Err(WriteError::NoHeaders);
        }

        for (name, value) in headers.iter() {
            let line = format!("{name}: {value}\r\n");
            self.conn.write_all(line.as_bytes()).await?;
        }
        // extra CRLF separates headers from body
        self.conn.write_all(CRLF).await?;
        self.state = WriterState::Headers;
        Ok(())
    }

    /// Writes the whole body in one shot.
    ///
    /// A zero-length body is a no-op that still satisfies the sequence.
    /// Mutually exclusive with the chunked path.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, WriteError> {
        if self.state != WriterState::Headers {
            return Err(WriteError::InvalidWriteSequence(self.state));
        }
        self.state = WriterState::Body;

        if body.is_empty() {
            return Ok(0);
        }
        self.conn.write_all(body).await?;
        Ok(body.len())
    }

    /// Writes one chunk: the size in uppercase hex, CRLF, the raw bytes,
    /// CRLF. A zero-length call is a no-op that does not advance state.
    pub async fn write_chunked_body(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        if self.state != WriterState::Headers && self.state != WriterState::ChunkedBody {
            return Err(WriteError::InvalidWriteSequence(self.state));
        }
        if data.is_empty() {
            return Ok(0);
        }

        let size_line = format!("{:X}\r\n", data.len());
        self.conn.write_all(size_line.as_bytes()).await?;
        self.conn.write_all(data).await?;
        self.conn.write_all(CRLF).await?;

        self.state = WriterState::ChunkedBody;
        Ok(size_line.len() + data.len() + CRLF.len())
    }

    /// Terminates a chunked body with no trailers: `0\r\n\r\n`.
    pub async fn write_chunked_body_done(&mut self) -> Result<usize, WriteError> {
        if self.state != WriterState::ChunkedBody {
            return Err(WriteError::InvalidWriteSequence(self.state));
        }

        self.conn.write_all(b"0\r\n\r\n").await?;
        self.state = WriterState::Done;
        Ok(5)
    }

    /// Terminates the chunk stream with `0\r\n` but leaves the message
    /// open: a `write_trailers` call must follow to complete the framing.
    pub async fn write_chunked_body_done_with_trailers(&mut self) -> Result<usize, WriteError> {
        if self.state != WriterState::ChunkedBody {
            return Err(WriteError::InvalidWriteSequence(self.state));
        }

        self.conn.write_all(b"0\r\n").await?;
        self.state = WriterState::Trailers;
        Ok(3)
    }

    /// Writes each trailer as a header-formatted line followed by the
    /// final blank line, completing the message.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriteError> {
        if self.state != WriterState::Trailers {
            return Err(WriteError::InvalidWriteSequence(self.state));
        }

        for (name, value) in trailers.iter() {
            let line = format!("{name}: {value}\r\n");
            self.conn.write_all(line.as_bytes()).await?;
        }
        self.conn.write_all(CRLF).await?;
        self.state = WriterState::Done;
        Ok(())
    }
}
