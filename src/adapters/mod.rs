//! Adapters layer - concrete implementations of ports.
//!
//! Each submodule adapts an external technology (PostgreSQL, the identity
//! admin API, HTTP) to the port traits the application layer depends on.

pub mod http;
pub mod identity;
pub mod postgres;
