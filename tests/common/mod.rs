//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::{
	io::{self, Write},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use gateway_auth::{
	delegate::Authenticator,
	hook::PreAuthHook,
	http::ReqwestHttpClient,
	provider::ProviderConfig,
	reqwest::Client,
	token::{StandardClaims, TokenVerifier, VerificationError},
};
use http::{Request, header::AUTHORIZATION, request::Parts};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing_subscriber::fmt::MakeWriter;

/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
/// `httpmock` during tests.
pub fn test_reqwest_http_client() -> ReqwestHttpClient {
	let client = Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.");

	ReqwestHttpClient::with_client(client)
}

/// Builds a provider configuration rooted at `base_url` with the given static parameters.
pub fn provider_config(base_url: &str, parameters: Value) -> ProviderConfig {
	let Value::Object(parameters) = parameters else {
		panic!("Static parameters fixture must be a JSON object.");
	};

	ProviderConfig::builder()
		.url(base_url)
		.parameters(parameters)
		.build()
		.expect("Failed to build provider configuration for tests.")
}

/// Constructs an [`Authenticator`] backed by the test reqwest transport.
pub fn build_authenticator(
	config: ProviderConfig,
	hook: Option<Arc<dyn PreAuthHook>>,
) -> Authenticator<ReqwestHttpClient> {
	let authenticator = Authenticator::with_http_client(config, test_reqwest_http_client());

	match hook {
		Some(hook) => authenticator.with_pre_auth_hook(hook),
		None => authenticator,
	}
}

/// Converts a JSON literal into an object map.
pub fn object(value: Value) -> Map<String, Value> {
	match value {
		Value::Object(map) => map,
		other => panic!("Expected a JSON object fixture, got {other}."),
	}
}

/// Request head carrying `Authorization: Bearer <token>` when `token` is set.
pub fn request_with_token(token: Option<&str>) -> Parts {
	let mut builder = Request::builder().uri("/api/orders");

	if let Some(token) = token {
		builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
	}

	builder.body(()).expect("Request fixture should build.").into_parts().0
}

/// Current Unix time in seconds.
pub fn now() -> i64 {
	OffsetDateTime::now_utc().unix_timestamp()
}

/// Scripted verifier outcome returned by [`CountingVerifier`].
pub type ScriptedVerification = fn(&str) -> Result<StandardClaims, VerificationError>;

/// Token verifier double that counts invocations and delegates to a scripted outcome.
pub struct CountingVerifier {
	calls: AtomicUsize,
	outcome: ScriptedVerification,
}
impl CountingVerifier {
	/// Creates a verifier that answers every call with `outcome`.
	pub fn new(outcome: ScriptedVerification) -> Arc<Self> {
		Arc::new(Self { calls: AtomicUsize::new(0), outcome })
	}

	/// Number of times [`TokenVerifier::verify_token`] ran.
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl TokenVerifier for CountingVerifier {
	fn verify_token(&self, jwt: &str) -> Result<StandardClaims, VerificationError> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		(self.outcome)(jwt)
	}
}

/// In-memory log sink for asserting on emitted log lines.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);
impl LogCapture {
	/// Everything written so far.
	pub fn contents(&self) -> String {
		String::from_utf8_lossy(&self.0.lock()).into_owned()
	}

	/// Installs a debug-level subscriber writing into this capture for the current thread.
	pub fn install(&self) -> tracing::subscriber::DefaultGuard {
		let subscriber = tracing_subscriber::fmt()
			.with_max_level(tracing::Level::DEBUG)
			.with_ansi(false)
			.with_writer(self.clone())
			.finish();

		tracing::subscriber::set_default(subscriber)
	}
}
impl Write for LogCapture {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.lock().extend_from_slice(buf);

		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}
impl<'a> MakeWriter<'a> for LogCapture {
	type Writer = LogCapture;

	fn make_writer(&'a self) -> Self::Writer {
		self.clone()
	}
}
