// self
use crate::{_prelude::*, provider::ProviderConfigBuilder};

/// Path appended to the provider base URL for credential checks.
pub const AUTHENTICATE_PATH: &str = "/authenticate";

/// Immutable identity provider configuration consumed by the delegator.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderConfig {
	/// Base URL as configured by the operator.
	pub base_url: Url,
	/// Fully resolved `<base>/authenticate` endpoint.
	pub authenticate_endpoint: Url,
	/// Static parameters merged into every authentication request body.
	pub parameters: JsonMap,
	/// Upper bound for one provider round-trip; `None` keeps the HTTP client's default.
	pub timeout: Option<StdDuration>,
}
impl ProviderConfig {
	/// Creates a new builder.
	pub fn builder() -> ProviderConfigBuilder {
		ProviderConfigBuilder::default()
	}
}
