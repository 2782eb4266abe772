//! Default [`TokenVerifier`] backed by `jsonwebtoken`.

// crates.io
use jsonwebtoken::{
	Algorithm, DecodingKey, Validation,
	errors::{Error as JwtError, ErrorKind as JwtErrorKind},
};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	token::{StandardClaims, TokenVerifier, VerificationError, VerificationErrorKind},
};

/// Key material and claim checks for [`JwtVerifier`].
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
	/// JWS algorithm name (`HS256`, `RS256`, `ES256`, ...).
	pub algorithm: Option<String>,
	/// Shared secret for HMAC algorithms.
	pub secret: Option<String>,
	/// PEM-encoded public key for RSA/EC/EdDSA algorithms.
	pub public_key_pem: Option<String>,
	/// Required `iss` value.
	pub issuer: Option<String>,
	/// Accepted `aud` values.
	pub audience: Option<Vec<String>>,
	/// Clock skew tolerance in seconds for `exp`/`nbf`.
	pub leeway_secs: u64,
}
impl Debug for VerifierConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("VerifierConfig")
			.field("algorithm", &self.algorithm)
			.field("secret_set", &self.secret.is_some())
			.field("public_key_set", &self.public_key_pem.is_some())
			.field("issuer", &self.issuer)
			.field("audience", &self.audience)
			.field("leeway_secs", &self.leeway_secs)
			.finish()
	}
}

/// Verifies JWT signatures and standard claims.
///
/// Tokens without `exp` are accepted; the cache stores them as never expiring.
#[derive(Clone)]
pub struct JwtVerifier {
	key: DecodingKey,
	validation: Validation,
}
impl JwtVerifier {
	const DEFAULT_ALGORITHM: Algorithm = Algorithm::HS256;

	/// Creates a verifier for `algorithm` using `key`.
	pub fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
		let mut validation = Validation::new(algorithm);

		validation.required_spec_claims.clear();
		// `exp: 0` means "never expires", which `jsonwebtoken` would reject as expired.
		validation.validate_exp = false;
		validation.validate_aud = false;
		validation.leeway = 0;

		Self { key, validation }
	}

	/// Creates an HMAC verifier from a shared secret.
	pub fn hmac(secret: &[u8], algorithm: Algorithm) -> Self {
		Self::new(DecodingKey::from_secret(secret), algorithm)
	}

	/// Builds a verifier from configuration.
	pub fn from_config(config: &VerifierConfig) -> Result<Self, ConfigError> {
		let algorithm = match config.algorithm.as_deref() {
			Some(name) => Algorithm::from_str(name).map_err(|e| ConfigError::Verifier {
				reason: format!("unknown algorithm `{name}`: {e}"),
			})?,
			None => Self::DEFAULT_ALGORITHM,
		};
		let key = decoding_key(algorithm, config)?;
		let mut verifier = Self::new(key, algorithm).with_leeway(config.leeway_secs);

		if let Some(issuer) = config.issuer.as_deref() {
			verifier = verifier.with_issuer(issuer);
		}
		if let Some(audience) = config.audience.as_deref() {
			verifier = verifier.with_audience(audience);
		}

		Ok(verifier)
	}

	/// Requires the `iss` claim to equal `issuer`.
	pub fn with_issuer(mut self, issuer: &str) -> Self {
		self.validation.set_issuer(&[issuer]);

		self
	}

	/// Requires the `aud` claim to contain one of `audience`.
	pub fn with_audience<T>(mut self, audience: &[T]) -> Self
	where
		T: ToString,
	{
		self.validation.set_audience(audience);
		self.validation.validate_aud = true;

		self
	}

	/// Tolerates `leeway_secs` of clock skew.
	pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
		self.validation.leeway = leeway_secs;

		self
	}

	fn check_expiry(&self, claims: &StandardClaims, now: i64) -> Result<(), VerificationError> {
		let Some(expires_at) = claims.expires_at() else {
			return Ok(());
		};
		let leeway = i64::try_from(self.validation.leeway).unwrap_or(i64::MAX);

		if expires_at < now.saturating_sub(leeway) {
			return Err(VerificationError::new(
				VerificationErrorKind::Expired,
				format!("token expired at {expires_at}"),
			));
		}

		Ok(())
	}
}
impl Debug for JwtVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("JwtVerifier").field("validation", &self.validation).finish()
	}
}
impl TokenVerifier for JwtVerifier {
	fn verify_token(&self, jwt: &str) -> Result<StandardClaims, VerificationError> {
		let claims = jsonwebtoken::decode::<StandardClaims>(jwt, &self.key, &self.validation)
			.map(|data| data.claims)
			.map_err(classify)?;

		self.check_expiry(&claims, OffsetDateTime::now_utc().unix_timestamp())?;

		Ok(claims)
	}
}

fn decoding_key(algorithm: Algorithm, config: &VerifierConfig) -> Result<DecodingKey, ConfigError> {
	let missing = |what: &str| ConfigError::Verifier { reason: format!("{algorithm:?} requires {what}") };
	let invalid = |e: JwtError| ConfigError::Verifier { reason: format!("invalid public key: {e}") };

	match algorithm {
		Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => config
			.secret
			.as_deref()
			.map(|secret| DecodingKey::from_secret(secret.as_bytes()))
			.ok_or_else(|| missing("a shared secret")),
		Algorithm::ES256 | Algorithm::ES384 => {
			let pem = config.public_key_pem.as_deref().ok_or_else(|| missing("a public key"))?;

			DecodingKey::from_ec_pem(pem.as_bytes()).map_err(invalid)
		},
		Algorithm::EdDSA => {
			let pem = config.public_key_pem.as_deref().ok_or_else(|| missing("a public key"))?;

			DecodingKey::from_ed_pem(pem.as_bytes()).map_err(invalid)
		},
		_ => {
			let pem = config.public_key_pem.as_deref().ok_or_else(|| missing("a public key"))?;

			DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(invalid)
		},
	}
}

fn classify(err: JwtError) -> VerificationError {
	let kind = match err.kind() {
		JwtErrorKind::ExpiredSignature => VerificationErrorKind::Expired,
		JwtErrorKind::InvalidSignature => VerificationErrorKind::SignatureInvalid,
		JwtErrorKind::InvalidToken
		| JwtErrorKind::Base64(_)
		| JwtErrorKind::Json(_)
		| JwtErrorKind::Utf8(_) => VerificationErrorKind::Malformed,
		JwtErrorKind::ImmatureSignature
		| JwtErrorKind::InvalidIssuer
		| JwtErrorKind::InvalidAudience
		| JwtErrorKind::InvalidSubject
		| JwtErrorKind::MissingRequiredClaim(_)
		| JwtErrorKind::InvalidAlgorithm
		| JwtErrorKind::MissingAlgorithm => VerificationErrorKind::Rejected,
		_ => VerificationErrorKind::Internal,
	};

	VerificationError::new(kind, err.to_string()).with_source(err)
}
