//! Crate-level error types shared by the delegator, hooks, and the token cache.

// self
use crate::{
	_prelude::*,
	hook::HookError,
	provider::ProviderConfigError,
	token::{TokenReadError, VerificationError},
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Pre-auth hook failed or broke its output contract.
	#[error(transparent)]
	Hook(#[from] HookError),
	/// Token reader failed for a reason other than a missing token.
	#[error(transparent)]
	TokenRead(#[from] TokenReadError),
	/// Token verifier failed with a classification that is not a plain negative.
	#[error(transparent)]
	Verification(#[from] VerificationError),

	/// Identity provider (or hook) rejected the credentials.
	#[error("Invalid credentials.")]
	InvalidCredentials,
	/// Credentials are correct but an additional authentication factor is required.
	#[error("Additional authentication factor required.")]
	AuthenticationIncomplete {
		/// Provider-supplied description of the outstanding factor.
		additional_properties: JsonMap,
	},
	/// Provider answered `202 Accepted` with a non-JSON body.
	#[error("Unexpected response body content type: {content_type}.")]
	InvalidResponseBodyContentType {
		/// Content type reported by the provider (empty when absent).
		content_type: String,
	},
	/// Provider answered with an unexpected error status.
	#[error("Unexpected status code {status} for user {username}: {body}.")]
	Delegation {
		/// HTTP status code returned by the provider.
		status: u16,
		/// User the delegation was attempted for.
		username: String,
		/// Response body returned by the provider.
		body: String,
	},
	/// Provider response could not be interpreted.
	#[error("Identity provider returned a malformed response: {reason}.")]
	MalformedResponse {
		/// Human-readable parsing failure.
		reason: String,
	},
}
impl Error {
	/// Returns true when the attempt failed because the credentials were rejected.
	pub fn is_invalid_credentials(&self) -> bool {
		matches!(self, Self::InvalidCredentials)
	}

	/// Returns true when the caller must complete an additional authentication factor.
	pub fn is_incomplete(&self) -> bool {
		matches!(self, Self::AuthenticationIncomplete { .. })
	}

	/// Returns the additional-factor description for incomplete authentications.
	pub fn additional_properties(&self) -> Option<&JsonMap> {
		match self {
			Self::AuthenticationIncomplete { additional_properties } => Some(additional_properties),
			_ => None,
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Provider configuration is invalid.
	#[error(transparent)]
	Provider(#[from] ProviderConfigError),
	/// Verifier key material or algorithm is invalid.
	#[error("Token verifier configuration is invalid: {reason}.")]
	Verifier {
		/// Human-readable validation failure.
		reason: String,
	},
	/// Configuration document could not be parsed.
	#[error("Configuration document is malformed.")]
	Parse {
		/// Structured parsing failure including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Request body could not be serialized.
	#[error("Authentication request body could not be serialized.")]
	RequestBody(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the identity provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the identity provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
