//! Reconciliation of IdP accounts into the profile store, one account at a
//! time or as a full batch run.

pub mod engine;
pub mod reconcile;

#[cfg(test)]
mod test_support;

pub use engine::SyncEngine;
pub use reconcile::Reconciler;
