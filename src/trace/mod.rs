//! Trace data types handed to the plugin by the host.
//!
//! # Module Organization
//!
//! - [`models`]: Entries, entry handles, raw records and visibility flags
//! - [`constants`]: Event names, sentinel values and geometry constants

pub mod constants;
pub mod models;

// Re-export commonly used types
pub use models::*;
