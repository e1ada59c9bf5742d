#![deny(missing_docs)]

//! Core library for the Rusty Ingest PDF chunking pipeline.

/// Environment-driven configuration management.
pub mod config;
/// Best-effort PDF text extraction.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion metrics helpers.
pub mod metrics;
/// Document processing pipeline utilities.
pub mod processing;
/// Document and chunk persistence.
pub mod store;
