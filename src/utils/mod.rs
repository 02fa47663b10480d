//! Service utilities: error types and logging setup

pub mod error;
pub mod logging;
