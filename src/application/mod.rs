//! Application layer - command handlers orchestrating domain operations.

pub mod handlers;
