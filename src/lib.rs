//! Hearth - HTTP/1.1 straight off the socket
//!
//! A from-scratch HTTP/1.1 server stack: an incremental request parser
//! that tolerates arbitrary read-chunk boundaries, case-insensitive
//! duplicate-merging headers, a response writer that enforces correct
//! wire ordering (including chunked transfer encoding with trailers),
//! and a concurrent accept loop with graceful shutdown.

pub mod config;
pub mod handlers;
pub mod http;
pub mod server;
