//! Gateway-facing facade combining credential delegation and the token validity cache.

// crates.io
use http::request::Parts;
// self
use crate::{
	_prelude::*,
	auth::{AuthOutcome, BearerToken, LoginAttempt},
	delegate::Authenticator,
	hook::PreAuthHook,
	http::ProviderHttpClient,
	token::TokenValidityCache,
};
#[cfg(feature = "reqwest")]
use crate::{
	config::GatewayAuthConfig,
	error::ConfigError,
	http::ReqwestHttpClient,
	token::{BearerTokenReader, JwtVerifier},
};

#[cfg(feature = "reqwest")]
/// Handler specialized for the crate's default reqwest transport.
pub type ReqwestAuthenticationHandler = AuthenticationHandler<ReqwestHttpClient>;

/// Answers both authentication questions a gateway asks: "are these credentials valid?"
/// (login) and "does this request carry a valid token?" (every other request).
///
/// Cloning is cheap; clones share the transport, hook, and token cache.
#[derive(Clone)]
pub struct AuthenticationHandler<C>
where
	C: ?Sized + ProviderHttpClient,
{
	authenticator: Authenticator<C>,
	tokens: Arc<TokenValidityCache>,
}
impl<C> AuthenticationHandler<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Assembles a handler from prepared components.
	pub fn from_parts(authenticator: Authenticator<C>, tokens: Arc<TokenValidityCache>) -> Self {
		Self { authenticator, tokens }
	}

	/// Installs a pre-auth hook on the delegator.
	pub fn with_pre_auth_hook(mut self, hook: Arc<dyn PreAuthHook>) -> Self {
		self.authenticator = self.authenticator.with_pre_auth_hook(hook);

		self
	}

	/// Delegates a login to the identity provider.
	pub async fn authenticate(
		&self,
		username: &str,
		password: &str,
		additional_properties: JsonMap,
	) -> Result<AuthOutcome> {
		self.authenticator.authenticate(username, password, additional_properties).await
	}

	/// Delegates a prepared login attempt to the identity provider.
	pub async fn authenticate_attempt(&self, attempt: &LoginAttempt) -> Result<AuthOutcome> {
		self.authenticator.authenticate_attempt(attempt).await
	}

	/// Checks the bearer token attached to `request`.
	pub fn is_authenticated(&self, request: &Parts) -> Result<Option<BearerToken>> {
		self.tokens.is_authenticated(request)
	}

	/// Credential delegator used for logins.
	pub fn authenticator(&self) -> &Authenticator<C> {
		&self.authenticator
	}

	/// Shared token validity cache.
	pub fn token_cache(&self) -> &Arc<TokenValidityCache> {
		&self.tokens
	}
}
#[cfg(feature = "reqwest")]
impl AuthenticationHandler<ReqwestHttpClient> {
	/// Builds a handler with the default reqwest transport, `Authorization: Bearer` reader, and
	/// JWT verifier described by `config`.
	pub fn from_config(config: &GatewayAuthConfig) -> Result<Self> {
		let provider = config.provider.to_provider_config().map_err(ConfigError::from)?;
		let authenticator = Authenticator::new(provider)?;
		let verifier = JwtVerifier::from_config(&config.verifier)?;
		let tokens = TokenValidityCache::with_config(
			Arc::new(BearerTokenReader),
			Arc::new(verifier),
			config.cache,
		);

		Ok(Self::from_parts(authenticator, Arc::new(tokens)))
	}
}
impl<C> Debug for AuthenticationHandler<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticationHandler")
			.field("authenticator", &self.authenticator)
			.field("tokens", &self.tokens)
			.finish()
	}
}
