//! Tutoria Webhooks - payment webhook intake and membership reconciliation.
//!
//! Receives payment-completion notifications from the payment provider,
//! verifies their signatures, and idempotently grants memberships in the
//! backing data store.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
