pub mod audio;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod session;
pub mod store;
