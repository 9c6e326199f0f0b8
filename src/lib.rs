pub mod config;
pub mod error;
pub mod handler;
pub mod reconcile;
pub mod repo;

pub use config::{BranchConfig, Upgrade};
pub use error::{ReconcileError, Result};
pub use handler::HandlerRegistry;
pub use reconcile::{BranchReuse, ReconciliationOutcome, Reconciler};
pub use repo::{FileLoader, LocalRepo};
