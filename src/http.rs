//! Transport primitives for identity provider calls.
//!
//! The module exposes [`ProviderHttpClient`] alongside the plain-data [`ProviderRequest`] and
//! [`ProviderResponse`] types so downstream crates can plug in custom HTTP stacks. The
//! delegator never touches transport-specific types; it only interprets the status code,
//! content type, and body captured in [`ProviderResponse`].

// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::{error::ConfigError, provider::ProviderConfig};

/// `Accept` value sent with every authentication request.
pub const ACCEPT_JWT: &str = "application/jwt";
/// `Content-Type` value sent with every authentication request.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Boxed future returned by [`ProviderHttpClient::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ProviderResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of posting credential checks.
///
/// Implementations must be `Send + Sync + 'static` so one client can be shared by every
/// in-flight authentication. A single call maps to exactly one HTTP exchange; retries are
/// never performed at this layer.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and captures the provider's response.
	fn send(&self, request: ProviderRequest) -> TransportFuture<'_>;
}

/// Outbound authentication request.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderRequest {
	/// Target endpoint.
	pub url: Url,
	/// Value for the `Accept` header.
	pub accept: &'static str,
	/// Value for the `Content-Type` header.
	pub content_type: &'static str,
	/// Serialized JSON payload (contains the password).
	pub body: Vec<u8>,
}
impl ProviderRequest {
	/// Builds a JSON `POST` asking for an `application/jwt` response.
	pub fn json_post(url: Url, body: Vec<u8>) -> Self {
		Self { url, accept: ACCEPT_JWT, content_type: CONTENT_TYPE_JSON, body }
	}
}
impl Debug for ProviderRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderRequest")
			.field("url", &self.url.as_str())
			.field("accept", &self.accept)
			.field("content_type", &self.content_type)
			.field("body_len", &self.body.len())
			.finish()
	}
}

/// Response captured from the identity provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderResponse {
	/// HTTP status code.
	pub status: u16,
	/// `Content-Type` header value, if present and printable.
	pub content_type: Option<String>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ProviderResponse {
	/// Lossy UTF-8 rendering of the body for diagnostics.
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the provider's configured timeout.
	pub fn for_provider(config: &ProviderConfig) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder();

		if let Some(timeout) = config.timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestHttpClient {
	fn send(&self, request: ProviderRequest) -> TransportFuture<'_> {
		use reqwest::header::{ACCEPT, CONTENT_TYPE};

		Box::pin(async move {
			let response = self
				.0
				.post(request.url)
				.header(ACCEPT, request.accept)
				.header(CONTENT_TYPE, request.content_type)
				.body(request.body)
				.send()
				.await?;
			let status = response.status().as_u16();
			let content_type = response
				.headers()
				.get(CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.map(ToOwned::to_owned);
			let body = response.bytes().await?.to_vec();

			Ok(ProviderResponse { status, content_type, body })
		})
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
