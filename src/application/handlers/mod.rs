//! Application handlers.

pub mod membership;
