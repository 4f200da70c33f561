/// Core Module for Tabula
///
/// Shared infrastructure for the table layer: the connection, statement
/// building and execution, failure recovery and error handling.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{Result, StoreError};
