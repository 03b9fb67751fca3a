//! Process-wide tracing setup shared by binaries and tools that embed the client.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{LogFormat, init, init_with};
