//! Identity provider configuration.
//!
//! `config` exposes the validated [`ProviderConfig`] (base URL, static request parameters,
//! optional request timeout) and `builder` the [`ProviderConfigBuilder`] used to assemble it.

/// Validating builder and its configuration errors.
pub mod builder;
/// Validated provider configuration.
pub mod config;

pub use builder::*;
pub use config::*;
