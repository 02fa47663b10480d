//! Error handling for the router service
//!
//! Provider and router failures keep their own types; this module wraps
//! them together with configuration and I/O failures for the service layer.

mod types;

pub use types::{Result, ServiceError};
