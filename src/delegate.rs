//! Credential delegation to the upstream identity provider.
//!
//! [`Authenticator::authenticate`] builds the request body from the configured static
//! parameters plus the submitted credentials, lets an optional [`PreAuthHook`] veto or
//! reshape it, posts it once to `<provider>/authenticate`, and classifies the answer:
//!
//! - `< 400` (except `202`): the body is the issued JWT;
//! - `202`: another authentication factor is required ([`Error::AuthenticationIncomplete`]);
//! - `403`: [`Error::InvalidCredentials`];
//! - any other `>= 400`: [`Error::Delegation`].
//!
//! No retries are attempted and the password never reaches a log line.

// self
use crate::{
	_prelude::*,
	auth::{AuthOutcome, AuthRequestBody, BearerToken, LoginAttempt},
	error::ConfigError,
	hook::{HookContext, HookDecision, PreAuthHook},
	http::{ProviderHttpClient, ProviderRequest, ProviderResponse},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	provider::ProviderConfig,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const STATUS_ACCEPTED: u16 = 202;
const STATUS_FORBIDDEN: u16 = 403;
const STATUS_CLIENT_ERROR: u16 = 400;

#[cfg(feature = "reqwest")]
/// Authenticator specialized for the crate's default reqwest transport.
pub type ReqwestAuthenticator = Authenticator<ReqwestHttpClient>;

/// Delegates username/password checks to the configured identity provider.
#[derive(Clone)]
pub struct Authenticator<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// HTTP client used for every provider call.
	pub http_client: Arc<C>,
	/// Provider endpoint and static parameters.
	pub config: ProviderConfig,
	/// Optional pre-auth hook; `None` delegates every attempt unchanged.
	pub hook: Option<Arc<dyn PreAuthHook>>,
}
impl<C> Authenticator<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates an authenticator that reuses the caller-provided transport.
	pub fn with_http_client(config: ProviderConfig, http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into(), config, hook: None }
	}

	/// Installs a pre-auth hook.
	pub fn with_pre_auth_hook(mut self, hook: Arc<dyn PreAuthHook>) -> Self {
		self.hook = Some(hook);

		self
	}

	/// Checks the credentials against the identity provider and returns the issued token.
	pub async fn authenticate(
		&self,
		username: &str,
		password: &str,
		additional_properties: JsonMap,
	) -> Result<AuthOutcome> {
		let attempt = LoginAttempt::new(username, password)
			.with_additional_properties(additional_properties);

		self.authenticate_attempt(&attempt).await
	}

	/// [`authenticate`](Self::authenticate) for a prepared [`LoginAttempt`].
	pub async fn authenticate_attempt(&self, attempt: &LoginAttempt) -> Result<AuthOutcome> {
		const KIND: FlowKind = FlowKind::Authenticate;

		let span = FlowSpan::new(KIND, "authenticate");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.delegate(attempt)).await;
		let outcome = match &result {
			Ok(_) => FlowOutcome::Success,
			Err(Error::InvalidCredentials | Error::AuthenticationIncomplete { .. }) =>
				FlowOutcome::Denied,
			Err(_) => FlowOutcome::Failure,
		};

		obs::record_flow_outcome(KIND, outcome);

		result
	}

	async fn delegate(&self, attempt: &LoginAttempt) -> Result<AuthOutcome> {
		let mut body = AuthRequestBody::from_parameters(&self.config.parameters, attempt);
		let mut url = self.config.authenticate_endpoint.clone();
		let mut allowed_applications = None;

		if let Some(hook) = self.hook.as_deref() {
			let Some(decision) = run_hook(hook, attempt)? else {
				tracing::info!(username = %attempt.username, "pre-auth hook rejected attempt");

				return Err(Error::InvalidCredentials);
			};

			if let Some(replacement) = decision.body {
				body = replacement;

				tracing::debug!(
					"hook mapped authentication request to: {}",
					body.redacted(&attempt.password)
				);
			}
			if let Some(replacement) = decision.url {
				url = replacement;

				tracing::debug!("hook set request URL to: {url}");
			}
			if let Some(apps) = decision.allowed_applications {
				tracing::debug!("token will be restricted to apps: {apps:?}");

				allowed_applications = Some(apps);
			}
		}

		let payload = body.to_payload().map_err(ConfigError::RequestBody)?;

		tracing::info!("authenticating user {}", attempt.username);
		tracing::debug!("authentication request: {}", body.redacted(&attempt.password));

		let response = self.http_client.send(ProviderRequest::json_post(url, payload)).await?;

		interpret(&attempt.username, response).map(|jwt| AuthOutcome { jwt, allowed_applications })
	}
}
#[cfg(feature = "reqwest")]
impl Authenticator<ReqwestHttpClient> {
	/// Creates an authenticator with its own reqwest transport honoring the configured timeout.
	pub fn new(config: ProviderConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::for_provider(&config)?;

		Ok(Self::with_http_client(config, http_client))
	}
}
impl<C> Debug for Authenticator<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("endpoint", &self.config.authenticate_endpoint.as_str())
			.field("hook_set", &self.hook.is_some())
			.finish()
	}
}

fn run_hook(hook: &dyn PreAuthHook, attempt: &LoginAttempt) -> Result<Option<HookDecision>> {
	let output = hook.call(&HookContext::default(), attempt)?;

	Ok(HookDecision::from_output(output)?)
}

fn interpret(username: &str, response: ProviderResponse) -> Result<BearerToken> {
	match response.status {
		STATUS_FORBIDDEN => {
			tracing::warn!("invalid credentials for user {username}: {}", response.body_text());

			Err(Error::InvalidCredentials)
		},
		status if status >= STATUS_CLIENT_ERROR => {
			let err = Error::Delegation {
				status,
				username: username.to_owned(),
				body: response.body_text(),
			};

			tracing::error!("{err}");

			Err(err)
		},
		STATUS_ACCEPTED => {
			tracing::info!(
				"user {username} has given correct credentials, but additional authentication factor is required"
			);

			Err(incomplete(response))
		},
		_ => String::from_utf8(response.body)
			.map(BearerToken::new)
			.map_err(|e| Error::MalformedResponse { reason: e.to_string() }),
	}
}

fn incomplete(response: ProviderResponse) -> Error {
	let content_type = response.content_type.unwrap_or_default();

	if !content_type.starts_with(crate::http::CONTENT_TYPE_JSON) {
		return Error::InvalidResponseBodyContentType { content_type };
	}

	let deserializer = &mut serde_json::Deserializer::from_slice(&response.body);

	match serde_path_to_error::deserialize::<_, JsonMap>(deserializer) {
		Ok(additional_properties) => Error::AuthenticationIncomplete { additional_properties },
		Err(e) => Error::MalformedResponse { reason: e.to_string() },
	}
}
