pub mod campaign;
pub mod context;
pub mod discovery;
pub mod executor;
pub mod reconcile;
