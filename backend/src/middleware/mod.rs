//! Actix middleware used across the HTTP surface.

pub mod trace;

pub use trace::{Trace, TraceId};
