//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind, fixed backlog, accept)
//!     → connection.rs (connection id, bounded read)
//!     → Hand off to HTTP layer
//!
//! Connection States:
//!     Reading → Handling → Writing → Closed
//! ```
//!
//! # Design Decisions
//! - One connection at a time; the backlog queues the rest
//! - Bind failure is fatal, accept failure is not

pub mod connection;
pub mod listener;

pub use connection::{ConnectionId, ConnectionState};
pub use listener::{Listener, ListenerError, LISTEN_BACKLOG};
