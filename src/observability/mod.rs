//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and middleware produce:
//!     → tracing events (request spans from TraceLayer, relay errors, panics)
//!
//! Consumers:
//!     → fmt layer on stdout, filtered by RUST_LOG or the configured filter
//! ```

pub mod logging;

pub use logging::init_logging;
