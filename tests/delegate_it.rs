mod common;

// std
use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use gateway_auth::{
	error::Error,
	hook::{FnHook, HookError, PreAuthHook},
};
use httpmock::prelude::*;
use serde_json::{Map, Value, json};
// self
use common::{LogCapture, build_authenticator, object, provider_config};

const JWT: &str = "abc.def.ghi";

#[tokio::test]
async fn delegates_configured_parameters_with_credentials() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/idp/authenticate")
				.header("accept", "application/jwt")
				.header("content-type", "application/json")
				.json_body(json!({
					"client": "gateway",
					"realm": 3,
					"username": "alice",
					"password": "s3cret",
				}));
			then.status(200).header("content-type", "application/jwt").body(JWT);
		})
		.await;
	let config = provider_config(
		&server.url("/idp"),
		json!({ "client": "gateway", "realm": 3, "username": "ignored" }),
	);
	let authenticator = build_authenticator(config, None);
	let outcome = authenticator
		.authenticate("alice", "s3cret", Map::new())
		.await
		.expect("A 200 response should authenticate the user.");

	assert_eq!(outcome.jwt.expose(), JWT);
	assert_eq!(outcome.allowed_applications, None);

	mock.assert_async().await;
}

#[tokio::test]
async fn password_never_reaches_the_logs() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/authenticate");
			then.status(500).body("upstream exploded");
		})
		.await;
	let logs = LogCapture::default();
	let _guard = logs.install();
	let authenticator = build_authenticator(provider_config(&server.base_url(), json!({})), None);
	let err = authenticator
		.authenticate("alice", "pa55-w0rd-xyz", Map::new())
		.await
		.expect_err("A 500 response should fail the attempt.");

	assert!(matches!(err, Error::Delegation { status: 500, .. }));

	let output = logs.contents();

	assert!(output.contains("authenticating user alice"));
	assert!(output.contains("*REDACTED*"));
	assert!(!output.contains("pa55-w0rd-xyz"));

	mock.assert_async().await;
}

#[tokio::test]
async fn forbidden_maps_to_invalid_credentials() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/authenticate");
			then.status(403).body("bad password");
		})
		.await;
	let authenticator = build_authenticator(provider_config(&server.base_url(), json!({})), None);
	let err = authenticator
		.authenticate("alice", "wrong", Map::new())
		.await
		.expect_err("A 403 response should reject the credentials.");

	assert!(err.is_invalid_credentials());

	mock.assert_async().await;
}

#[tokio::test]
async fn accepted_requires_additional_factor() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/authenticate");
			then.status(202).header("content-type", "application/json").body(r#"{"factor":"sms"}"#);
		})
		.await;
	let authenticator = build_authenticator(provider_config(&server.base_url(), json!({})), None);
	let err = authenticator
		.authenticate("alice", "s3cret", Map::new())
		.await
		.expect_err("A 202 response should not issue a token.");

	assert!(err.is_incomplete());
	assert_eq!(err.additional_properties(), Some(&object(json!({ "factor": "sms" }))));

	mock.assert_async().await;
}

#[tokio::test]
async fn accepted_with_plain_text_is_rejected() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/authenticate");
			then.status(202).header("content-type", "text/plain").body("sms");
		})
		.await;
	let authenticator = build_authenticator(provider_config(&server.base_url(), json!({})), None);
	let err = authenticator
		.authenticate("alice", "s3cret", Map::new())
		.await
		.expect_err("A non-JSON 202 response should fail.");

	assert!(matches!(
		err,
		Error::InvalidResponseBodyContentType { ref content_type } if content_type == "text/plain"
	));

	mock.assert_async().await;
}

#[tokio::test]
async fn rejecting_hook_skips_the_provider() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/authenticate");
			then.status(200).body(JWT);
		})
		.await;
	let hook: Arc<dyn PreAuthHook> = Arc::new(FnHook::new(|_ctx, _attempt| Ok(Value::Bool(false))));
	let authenticator =
		build_authenticator(provider_config(&server.base_url(), json!({})), Some(hook));
	let err = authenticator
		.authenticate("alice", "s3cret", Map::new())
		.await
		.expect_err("A falsy hook result should reject the attempt.");

	assert!(err.is_invalid_credentials());

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn hook_overrides_body_url_and_applications() {
	let server = MockServer::start_async().await;
	let default_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/authenticate");
			then.status(200).body("wrong-target");
		})
		.await;
	let tenant_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/tenant-a/authenticate")
				.json_body(json!({ "login": "alice@tenant-a", "secret": "s3cret" }));
			then.status(200).body(JWT);
		})
		.await;
	let tenant_url = server.url("/tenant-a/authenticate");
	let seen = Arc::new(AtomicUsize::new(0));
	let seen_by_hook = seen.clone();
	let hook: Arc<dyn PreAuthHook> = Arc::new(FnHook::new(move |ctx, attempt| {
		seen_by_hook.fetch_add(1, Ordering::SeqCst);
		ctx.log(format_args!("routing {} to tenant-a", attempt.username));

		let tenant = attempt
			.additional_properties
			.get("tenant")
			.and_then(Value::as_str)
			.ok_or_else(|| HookError::failed("tenant property missing"))?;

		Ok(json!({
			"body": {
				"login": format!("{}@{tenant}", attempt.username),
				"secret": attempt.password.expose(),
			},
			"url": tenant_url,
			"allowedApplications": ["billing", "crm"],
		}))
	}));
	let authenticator =
		build_authenticator(provider_config(&server.base_url(), json!({ "client": "gw" })), Some(hook));
	let outcome = authenticator
		.authenticate("alice", "s3cret", object(json!({ "tenant": "tenant-a" })))
		.await
		.expect("The hook-routed request should authenticate.");

	assert_eq!(outcome.jwt.expose(), JWT);
	assert_eq!(outcome.allowed_applications, Some(vec!["billing".to_owned(), "crm".to_owned()]));
	assert!(outcome.allows("crm"));
	assert!(!outcome.allows("admin"));
	assert_eq!(seen.load(Ordering::SeqCst), 1);

	tenant_mock.assert_async().await;
	default_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn hook_failures_propagate_without_network_calls() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/authenticate");
			then.status(200).body(JWT);
		})
		.await;
	let failing: Arc<dyn PreAuthHook> =
		Arc::new(FnHook::new(|_ctx, _attempt| Err(HookError::failed("script crashed"))));
	let err = build_authenticator(provider_config(&server.base_url(), json!({})), Some(failing))
		.authenticate("alice", "s3cret", Map::new())
		.await
		.expect_err("Hook failures should surface.");

	assert!(matches!(err, Error::Hook(HookError::Failed { .. })));

	let truthy: Arc<dyn PreAuthHook> =
		Arc::new(FnHook::new(|_ctx, _attempt| Ok(Value::String("yes".into()))));
	let err = build_authenticator(provider_config(&server.base_url(), json!({})), Some(truthy))
		.authenticate("alice", "s3cret", Map::new())
		.await
		.expect_err("Truthy non-object hook output should fail loudly.");

	assert!(matches!(err, Error::Hook(HookError::NotAnObject { kind: "string" })));

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn hook_without_overrides_keeps_default_request() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/authenticate")
				.json_body(json!({ "client": "gw", "username": "bob", "password": "pw" }));
			then.status(201).body(JWT);
		})
		.await;
	let hook: Arc<dyn PreAuthHook> = Arc::new(gateway_auth::hook::PassThroughHook);
	let outcome =
		build_authenticator(provider_config(&server.base_url(), json!({ "client": "gw" })), Some(hook))
			.authenticate("bob", "pw", Map::new())
			.await
			.expect("A pass-through hook should not change the request.");

	assert_eq!(outcome.jwt.expose(), JWT);
	assert_eq!(outcome.allowed_applications, None);

	mock.assert_async().await;
}

#[tokio::test]
async fn renamed_password_field_is_masked_in_logs() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/authenticate")
				.json_body(json!({ "login": "alice", "secret": "pa55-w0rd-xyz" }));
			then.status(200).body(JWT);
		})
		.await;
	let hook: Arc<dyn PreAuthHook> = Arc::new(FnHook::new(|_ctx, attempt| {
		Ok(json!({
			"body": { "login": attempt.username, "secret": attempt.password.expose() },
		}))
	}));
	let logs = LogCapture::default();
	let _guard = logs.install();
	let outcome = build_authenticator(provider_config(&server.base_url(), json!({})), Some(hook))
		.authenticate("alice", "pa55-w0rd-xyz", Map::new())
		.await
		.expect("The renamed body should still authenticate.");

	assert_eq!(outcome.jwt.expose(), JWT);

	let output = logs.contents();

	assert!(output.contains("hook mapped authentication request to"));
	assert!(output.contains(r#""secret":"*REDACTED*""#));
	assert!(!output.contains("pa55-w0rd-xyz"));

	mock.assert_async().await;
}
