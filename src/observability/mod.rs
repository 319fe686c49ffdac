//! Observability subsystem.
//!
//! All subsystems emit `tracing` events; `logging.rs` decides where they go.
//! Errors returned to callers are never logged by the library itself.

pub mod logging;

pub use logging::init_logging;
