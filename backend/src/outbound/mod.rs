//! Outbound adapters implementing the domain's driven ports.

pub mod auth;
pub mod media;
pub mod persistence;
