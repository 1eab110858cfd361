pub mod constants;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod pipeline;
pub mod report;

// Application layer: use cases and output ports
pub mod app;
