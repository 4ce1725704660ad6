pub mod counting;
pub mod feedback;
pub mod geometry;
pub mod landmarks;
pub mod pipeline;
pub mod profile;
pub mod source;
pub mod speech;

// Re-export the top-level error type so callers only need `repcount_core::Error`
pub use anyhow::Error;
pub use anyhow::Result;
