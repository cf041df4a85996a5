//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed Request (method, path)
//!     → router.rs (ordered scan of the route table)
//!     → matcher.rs (segment-wise pattern match, wildcard capture)
//!     → Return: RouteMatch (route + params) or None
//!
//! Route Registration (at startup):
//!     Router::register(pattern, methods, handler)
//!     → Compile pattern into segments
//!     → Append to table (never re-sorted)
//!     → Move Router into the server, immutable from then on
//! ```
//!
//! # Design Decisions
//! - Registration order is the only priority
//! - Deterministic: same input always matches same route
//! - Method mismatch surfaces as 404, not 405

pub mod matcher;
pub mod router;

pub use matcher::{Params, PathPattern, PatternError};
pub use router::{Handler, HandlerError, Route, RouteMatch, Router};
