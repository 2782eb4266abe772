//! Token verification contract and its classified failures.

// self
use crate::_prelude::*;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Failure classes treated as a plain "not authenticated" answer rather than an error.
pub const ACCEPTABLE_KINDS: [VerificationErrorKind; 2] =
	[VerificationErrorKind::Expired, VerificationErrorKind::SignatureInvalid];

/// Verifies a token's signature and standard claims.
pub trait TokenVerifier: Send + Sync {
	/// Returns the token's standard claims when it is valid.
	fn verify_token(&self, jwt: &str) -> Result<StandardClaims, VerificationError>;
}

/// Registered JWT claims consulted by the gateway.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardClaims {
	/// Expiration time in epoch seconds; absent or `0` means the token never expires.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exp: Option<i64>,
	/// Issued-at time in epoch seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iat: Option<i64>,
	/// Not-before time in epoch seconds.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nbf: Option<i64>,
	/// Issuer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iss: Option<String>,
	/// Subject.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub: Option<String>,
	/// Token identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub jti: Option<String>,
}
impl StandardClaims {
	/// Expiry in epoch seconds, or `None` for tokens that never expire.
	pub fn expires_at(&self) -> Option<i64> {
		self.exp.filter(|exp| *exp != 0)
	}
}

/// Classification of a verification failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VerificationErrorKind {
	/// The token's expiry window has passed.
	Expired,
	/// The signature does not match.
	SignatureInvalid,
	/// The token cannot be decoded.
	Malformed,
	/// A claim or header check (issuer, audience, not-before, algorithm) failed.
	Rejected,
	/// Verifier-side failure unrelated to the token itself.
	Internal,
}
impl VerificationErrorKind {
	/// Returns a stable label suitable for logs.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Expired => "expired",
			Self::SignatureInvalid => "signature_invalid",
			Self::Malformed => "malformed",
			Self::Rejected => "rejected",
			Self::Internal => "internal",
		}
	}

	/// Returns true for classes that downgrade to a plain negative answer.
	pub fn is_acceptable(self) -> bool {
		ACCEPTABLE_KINDS.contains(&self)
	}
}
impl Display for VerificationErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Classified verification failure.
#[derive(Debug, ThisError)]
#[error("Token verification failed ({kind}): {message}.")]
pub struct VerificationError {
	/// Failure class.
	pub kind: VerificationErrorKind,
	/// Human-readable detail.
	pub message: String,
	/// Underlying verifier error, when available.
	#[source]
	pub source: Option<BoxError>,
}
impl VerificationError {
	/// Creates an error without an underlying source.
	pub fn new(kind: VerificationErrorKind, message: impl Into<String>) -> Self {
		Self { kind, message: message.into(), source: None }
	}

	/// Attaches the underlying verifier error.
	pub fn with_source(mut self, src: impl 'static + Send + Sync + StdError) -> Self {
		self.source = Some(Box::new(src));

		self
	}

	/// Returns true when the failure should be reported as "not authenticated" only.
	pub fn is_acceptable(&self) -> bool {
		self.kind.is_acceptable()
	}
}
