//! Token extraction from inbound requests.

// crates.io
use http::{header::AUTHORIZATION, request::Parts};
// self
use crate::{_prelude::*, auth::BearerToken};

type BoxError = Box<dyn StdError + Send + Sync>;

/// Extracts the bearer token presented with a request.
///
/// Implementations must report a missing token with [`TokenReadError::NoToken`]; every other
/// variant is treated as a failure by the cache.
pub trait TokenReader: Send + Sync {
	/// Reads the token attached to `request`.
	fn token_from_request(&self, request: &Parts) -> Result<BearerToken, TokenReadError>;
}

/// Errors produced by [`TokenReader`] implementations.
#[derive(Debug, ThisError)]
pub enum TokenReadError {
	/// The request carries no token; not a failure.
	#[error("Request carries no bearer token.")]
	NoToken,
	/// A token is present but cannot be extracted.
	#[error("Authorization header is malformed: {reason}.")]
	Malformed {
		/// Human-readable reason.
		reason: &'static str,
	},
	/// Reader-specific backend failure (for example a token lookup store).
	#[error("Token reader backend failed.")]
	Backend {
		/// Underlying failure.
		#[source]
		source: BoxError,
	},
}
impl TokenReadError {
	/// Wraps a backend failure.
	pub fn backend(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Backend { source: Box::new(src) }
	}
}

/// Reads `Authorization: Bearer <token>` headers.
///
/// Requests without an `Authorization` header, or with a different scheme, carry no token.
#[derive(Clone, Copy, Debug, Default)]
pub struct BearerTokenReader;
impl BearerTokenReader {
	const SCHEME: &'static str = "bearer";
}
impl TokenReader for BearerTokenReader {
	fn token_from_request(&self, request: &Parts) -> Result<BearerToken, TokenReadError> {
		let Some(header) = request.headers.get(AUTHORIZATION) else {
			return Err(TokenReadError::NoToken);
		};
		let value = header
			.to_str()
			.map_err(|_| TokenReadError::Malformed { reason: "header is not visible ASCII" })?;
		let Some((scheme, token)) = value.trim().split_once(' ') else {
			return if value.trim().eq_ignore_ascii_case(Self::SCHEME) {
				Err(TokenReadError::Malformed { reason: "bearer token is empty" })
			} else {
				Err(TokenReadError::NoToken)
			};
		};

		if !scheme.eq_ignore_ascii_case(Self::SCHEME) {
			return Err(TokenReadError::NoToken);
		}

		let token = token.trim();

		if token.is_empty() {
			return Err(TokenReadError::Malformed { reason: "bearer token is empty" });
		}

		Ok(BearerToken::new(token))
	}
}
