pub mod core;

// Re-export the main types for convenience
pub use core::Language;

/// Name of the corpus used when nothing else is configured
pub const DEFAULT_LANGUAGE: &str = "english";
