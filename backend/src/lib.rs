//! PayPoint backend library modules.
//!
//! The crate follows a hexagonal layout: `domain` holds transport-agnostic
//! types, services, and ports; `outbound` holds the PostgreSQL, token,
//! hashing, and media adapters; `inbound` holds the HTTP surface; `server`
//! wires everything together.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use middleware::trace::Trace;
