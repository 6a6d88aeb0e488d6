//! Membership domain module.
//!
//! The data model for plans, users, and grants, plus the typed view a
//! checkout-completion event is extracted into.

mod checkout;
mod email;
mod records;

pub use checkout::CheckoutDetails;
pub use email::EmailAddress;
pub use records::{MembershipGrant, MembershipPlan, Role, User};
