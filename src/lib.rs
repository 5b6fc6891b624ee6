pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub mod pipeline;
pub mod sink;
pub mod storage;

// Application layer: use cases and the ports they depend on
pub mod app;
