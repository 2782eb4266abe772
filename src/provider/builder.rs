// self
use crate::{
	_prelude::*,
	provider::{AUTHENTICATE_PATH, ProviderConfig},
};

/// Errors raised while constructing or validating provider configuration.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderConfigError {
	/// Base URL is mandatory.
	#[error("Missing identity provider URL.")]
	MissingUrl,
	/// Base URL cannot be parsed.
	#[error("Identity provider URL is invalid: {url}.")]
	InvalidUrl {
		/// URL that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Only HTTP(S) providers are supported.
	#[error("Identity provider URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// URL that failed validation.
		url: String,
	},
	/// A zero timeout would fail every request.
	#[error("Identity provider timeout must be positive.")]
	ZeroTimeout,
}

/// Builder for [`ProviderConfig`] values.
#[derive(Debug, Default)]
pub struct ProviderConfigBuilder {
	/// Base URL of the identity provider.
	pub url: Option<String>,
	/// Static request parameters.
	pub parameters: JsonMap,
	/// Optional request timeout.
	pub timeout: Option<StdDuration>,
}
impl ProviderConfigBuilder {
	/// Sets the provider base URL; `/authenticate` is appended to it.
	pub fn url(mut self, url: impl Into<String>) -> Self {
		self.url = Some(url.into());

		self
	}

	/// Replaces the static request parameters.
	pub fn parameters(mut self, parameters: JsonMap) -> Self {
		self.parameters = parameters;

		self
	}

	/// Adds a single static request parameter.
	pub fn parameter(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
		self.parameters.insert(key.into(), value.into());

		self
	}

	/// Bounds each provider round-trip.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ProviderConfig, ProviderConfigError> {
		let raw = self.url.ok_or(ProviderConfigError::MissingUrl)?;
		let base_url = parse_http_url(&raw)?;
		let authenticate_endpoint =
			parse_http_url(&format!("{}{AUTHENTICATE_PATH}", raw.trim_end_matches('/')))?;

		if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
			return Err(ProviderConfigError::ZeroTimeout);
		}

		Ok(ProviderConfig {
			base_url,
			authenticate_endpoint,
			parameters: self.parameters,
			timeout: self.timeout,
		})
	}
}

/// Parses `raw` and checks that it targets an HTTP(S) endpoint.
pub(crate) fn parse_http_url(raw: &str) -> Result<Url, ProviderConfigError> {
	let url = Url::parse(raw)
		.map_err(|source| ProviderConfigError::InvalidUrl { url: raw.to_owned(), source })?;

	match url.scheme() {
		"http" | "https" => Ok(url),
		_ => Err(ProviderConfigError::UnsupportedScheme { url: raw.to_owned() }),
	}
}
