//! Configuration validation
//!
//! - `trait_def`: Core Validate trait definition
//! - `config_validators`: Validators for the router, provider and logging sections
//! - `endpoint`: Base URL checks
//! - `tests`: Test suite for all validators

mod config_validators;
mod endpoint;
mod trait_def;

pub use endpoint::validate_base_url;
pub use trait_def::Validate;
