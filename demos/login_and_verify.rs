//! Demonstrates a full gateway round trip against a mocked identity provider:
//! a hook-shaped login, then repeated token checks served by the validity cache.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Map, json};
use time::OffsetDateTime;
// self
use gateway_auth::{
	config::GatewayAuthConfig,
	handler::AuthenticationHandler,
	hook::{FnHook, PreAuthHook},
	token::StandardClaims,
};

const SECRET: &str = "demo-shared-secret";

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

	let claims = StandardClaims {
		exp: Some(OffsetDateTime::now_utc().unix_timestamp() + 900),
		sub: Some("alice".into()),
		..Default::default()
	};
	let jwt = jsonwebtoken::encode(
		&Header::new(Algorithm::HS256),
		&claims,
		&EncodingKey::from_secret(SECRET.as_bytes()),
	)?;
	let server = MockServer::start_async().await;
	let idp_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/idp/authenticate")
				.json_body(json!({ "client": "demo-gateway", "login": "alice", "password": "s3cret" }));
			then.status(200).header("content-type", "application/jwt").body(&jwt);
		})
		.await;
	let config = GatewayAuthConfig::from_json_str(&format!(
		r#"{{
			"provider": {{
				"url": "{}",
				"parameters": {{ "client": "demo-gateway" }},
				"timeout_secs": 5
			}},
			"cache": {{ "max_capacity": 1024 }},
			"verifier": {{ "algorithm": "HS256", "secret": "{SECRET}" }}
		}}"#,
		server.url("/idp"),
	))?;
	let hook: Arc<dyn PreAuthHook> = Arc::new(FnHook::new(|ctx, attempt| {
		ctx.log(format_args!("renaming username field for {}", attempt.username));

		let mut body = Map::new();

		body.insert("client".into(), json!("demo-gateway"));
		body.insert("login".into(), json!(attempt.username));
		body.insert("password".into(), json!(attempt.password.expose()));

		Ok(json!({ "body": body, "allowedApplications": ["orders"] }))
	}));
	let handler = AuthenticationHandler::from_config(&config)?.with_pre_auth_hook(hook);
	let outcome = handler.authenticate("alice", "s3cret", Map::new()).await?;

	println!("Issued token fingerprint: {}.", outcome.jwt.fingerprint());
	println!("Token may be used with `orders`: {}.", outcome.allows("orders"));

	let request = http::Request::builder()
		.uri("/orders")
		.header(http::header::AUTHORIZATION, format!("Bearer {}", outcome.jwt.expose()))
		.body(())?
		.into_parts()
		.0;

	for round in 1..=3 {
		let authenticated = handler.is_authenticated(&request)?.is_some();

		println!("Check {round}: authenticated = {authenticated}.");
	}

	println!("Cached tokens: {}.", handler.token_cache().entry_count());

	idp_mock.assert_async().await;

	Ok(())
}
