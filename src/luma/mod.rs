pub mod client;
pub mod types;

// Re-export commonly used types
pub use client::{DEFAULT_API_URL, LumaClient, LumaConfig, LumaError};
