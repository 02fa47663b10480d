//! Core functionality for the router
//!
//! - `types` - Generation request and response types
//! - `providers` - Backend adapters, their shared runtime and the registry
//! - `router` - Scoring, selection and failover

pub mod providers;
pub mod router;
pub mod types;
