//! Membership handlers.
//!
//! The reconciliation command handler for completed purchases and the
//! webhook event handler that feeds it.

mod reconcile_purchase;

pub use reconcile_purchase::{
    CheckoutCompletedHandler, GrantOutcome, ReconcilePurchaseCommand, ReconcilePurchaseHandler,
};
