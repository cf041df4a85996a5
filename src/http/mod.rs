//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted TCP connection
//!     → server.rs (accept loop, connection routine)
//!     → request.rs (parse request line, headers, body)
//!     → routing layer picks a handler (404 when none)
//!     → response.rs (default headers, Content-Length, serialize)
//!     → Write to client, close
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{Headers, Method, ParseError, Request};
pub use response::{Reply, Response, StatusCode};
pub use server::{dispatch, ConnectionError, HttpServer, NOT_FOUND_BODY};
