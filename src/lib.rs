pub mod config;
pub mod engine;
pub mod platform;
pub mod store;
