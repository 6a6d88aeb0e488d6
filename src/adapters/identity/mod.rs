//! Identity provider adapter implementations.

mod admin_api;

pub use admin_api::AdminApiIdentityProvider;
