//! Application initialization.
//!
//! Sets up process-wide resources before a conversion runs. The converter
//! only needs a logger; everything else is scoped to a single run.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
