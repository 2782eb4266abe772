//! Serde-friendly configuration for assembling an [`AuthenticationHandler`].
//!
//! [`AuthenticationHandler`]: crate::handler::AuthenticationHandler

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	provider::{ProviderConfig, ProviderConfigError},
	token::{CacheConfig, VerifierConfig},
};

/// Top-level authentication configuration.
///
/// Every section is optional in the source document; missing sections fall back to their
/// defaults. Pre-auth hooks are Rust code and are attached programmatically.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GatewayAuthConfig {
	/// Identity provider settings.
	pub provider: ProviderSettings,
	/// Token cache tuning.
	pub cache: CacheConfig,
	/// Token verifier key material and claim checks.
	pub verifier: VerifierConfig,
}
impl GatewayAuthConfig {
	/// Parses a JSON document, reporting the path of the first offending field.
	pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
		let deserializer = &mut serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(deserializer).map_err(|source| ConfigError::Parse { source })
	}
}

/// Raw identity provider settings as they appear in configuration documents.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
	/// Provider base URL; `/authenticate` is appended to it.
	pub url: Option<String>,
	/// Static parameters merged into every authentication request body.
	pub parameters: JsonMap,
	/// Request timeout in seconds; unset keeps the HTTP client's default.
	pub timeout_secs: Option<u64>,
}
impl ProviderSettings {
	/// Validates the settings into a [`ProviderConfig`].
	pub fn to_provider_config(&self) -> Result<ProviderConfig, ProviderConfigError> {
		let mut builder = ProviderConfig::builder().parameters(self.parameters.clone());

		if let Some(url) = self.url.as_deref() {
			builder = builder.url(url);
		}
		if let Some(secs) = self.timeout_secs {
			builder = builder.timeout(StdDuration::from_secs(secs));
		}

		builder.build()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parses_full_document() {
		let config = GatewayAuthConfig::from_json_str(
			r#"{
				"provider": {
					"url": "https://idp.example.com/api",
					"parameters": { "client": "gateway" },
					"timeout_secs": 5
				},
				"cache": { "max_capacity": 10000 },
				"verifier": { "algorithm": "HS256", "secret": "s3cret", "leeway_secs": 2 }
			}"#,
		)
		.expect("Configuration fixture should parse.");
		let provider = config.provider.to_provider_config().expect("Provider section should validate.");

		assert_eq!(provider.authenticate_endpoint.as_str(), "https://idp.example.com/api/authenticate");
		assert_eq!(provider.timeout, Some(StdDuration::from_secs(5)));
		assert_eq!(provider.parameters.get("client"), Some(&JsonValue::from("gateway")));
		assert_eq!(config.cache.max_capacity, Some(10_000));
		assert_eq!(config.verifier.leeway_secs, 2);
	}

	#[test]
	fn missing_sections_use_defaults() {
		let config = GatewayAuthConfig::from_json_str("{}").expect("Empty document should parse.");

		assert_eq!(config.cache, CacheConfig::default());
		assert_eq!(
			config.provider.to_provider_config().expect_err("Provider URL is mandatory."),
			ProviderConfigError::MissingUrl
		);
	}

	#[test]
	fn parse_errors_report_the_path() {
		let err = GatewayAuthConfig::from_json_str(r#"{ "provider": { "timeout_secs": "soon" } }"#)
			.expect_err("Wrongly typed fields should fail.");
		let ConfigError::Parse { source } = err else {
			panic!("Expected a parse error, got {err:?}.");
		};

		assert_eq!(source.path().to_string(), "provider.timeout_secs");
	}
}
