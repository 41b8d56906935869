//! HTTP protocol implementation.
//!
//! This module implements HTTP/1.1 directly over byte streams, without an
//! HTTP library underneath.
//!
//! # Architecture
//!
//! - **`headers`**: Case-insensitive header collection with incremental
//!   line-by-line parsing and duplicate merging
//! - **`request`**: The stateful request parser and its async driving loop
//! - **`response`**: Status codes, canned HTML bodies, and default headers
//! - **`writer`**: The sequenced response writer (status line → headers →
//!   body or chunks → optional trailers)
//!
//! # Request parser state machine
//!
//! Each request moves through a fixed sequence of states; no transition
//! skips a state, and `ParsingBody` is entered even when there turns out
//! to be no body:
//!
//! ```text
//!        ┌─────────────┐
//!        │ Initialized │ ← Waiting for the request line
//!        └──────┬──────┘
//!               │ Request line parsed
//!               ▼
//!        ┌────────────────┐
//!        │ ParsingHeaders │ ← One header line at a time
//!        └──────┬─────────┘
//!               │ Blank line reached
//!               ▼
//!        ┌────────────────┐
//!        │  ParsingBody   │ ← content-length bytes, or nothing
//!        └──────┬─────────┘
//!               │ Body complete
//!               ▼
//!        ┌────────────────┐
//!        │     Done       │
//!        └────────────────┘
//! ```
//!
//! The parser consumes a growing buffer fed by reads of arbitrary size:
//! one-byte reads must parse identically to whole-buffer reads.

pub mod headers;
pub mod request;
pub mod response;
pub mod writer;
