//! Delver Core - Foundation types shared across the Delver system
//!
//! Defines error handling, logging, configuration, and retry utilities

pub mod config;
pub mod error;
pub mod logging;
pub mod retry;
pub mod types;

pub use error::*;
pub use logging::*;
pub use retry::*;
pub use types::*;
