//! Message sending and invalid-target reconciliation

pub mod dispatcher;
pub mod reconcile;

pub use dispatcher::{build_envelope, MessageDispatcher};
pub use reconcile::reconcile_invalid_targets;
