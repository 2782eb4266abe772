//! Pre-authentication hooks that veto, reshape, or redirect login attempts.
//!
//! A hook receives the [`LoginAttempt`] and answers with a dynamic JSON value, the same
//! shape an embedded script would return:
//!
//! - a falsy scalar (`null`, `false`, `0`, `""`) rejects the attempt;
//! - an object accepts it and may carry `body` (replacement request body), `url` (replacement
//!   endpoint), and `allowedApplications` (scope restriction for the issued token);
//! - any other truthy value breaks the contract and fails the call.
//!
//! The only host capability exposed to hooks is [`HookContext::log`].

// self
use crate::{
	_prelude::*,
	auth::{AuthRequestBody, LoginAttempt},
	provider::{ProviderConfigError, builder::parse_http_url},
};

/// Field carrying the replacement request body.
pub const FIELD_BODY: &str = "body";
/// Field carrying the replacement endpoint.
pub const FIELD_URL: &str = "url";
/// Field carrying the application restriction.
pub const FIELD_ALLOWED_APPLICATIONS: &str = "allowedApplications";

/// Operator-supplied transform invoked before a login is delegated.
///
/// Implementors are required to be `Send + Sync`; one hook instance serves every concurrent
/// login. The hook may only shape the current request; it has no access to the verifier or
/// the token cache.
pub trait PreAuthHook: Send + Sync {
	/// Evaluates the attempt and returns the dynamic hook output.
	fn call(&self, ctx: &HookContext, attempt: &LoginAttempt) -> Result<JsonValue, HookError>;
}

/// Host capabilities available to a running hook.
#[derive(Clone, Copy, Debug, Default)]
pub struct HookContext {
	_private: (),
}
impl HookContext {
	/// Forwards a formatted message to the debug log.
	///
	/// ```
	/// # use gateway_auth::hook::HookContext;
	/// HookContext::default().log(format_args!("mapping user {}", "alice"));
	/// ```
	pub fn log(&self, args: std::fmt::Arguments<'_>) {
		tracing::debug!(target: "gateway_auth::hook", "{args}");
	}
}

/// Adapter turning a closure into a [`PreAuthHook`].
pub struct FnHook<F>(F);
impl<F> FnHook<F>
where
	F: Fn(&HookContext, &LoginAttempt) -> Result<JsonValue, HookError> + Send + Sync,
{
	/// Wraps `f`.
	pub fn new(f: F) -> Self {
		Self(f)
	}
}
impl<F> PreAuthHook for FnHook<F>
where
	F: Fn(&HookContext, &LoginAttempt) -> Result<JsonValue, HookError> + Send + Sync,
{
	fn call(&self, ctx: &HookContext, attempt: &LoginAttempt) -> Result<JsonValue, HookError> {
		(self.0)(ctx, attempt)
	}
}
impl<F> Debug for FnHook<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("FnHook(..)")
	}
}

/// Hook that accepts every attempt without changing it.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThroughHook;
impl PreAuthHook for PassThroughHook {
	fn call(&self, _ctx: &HookContext, _attempt: &LoginAttempt) -> Result<JsonValue, HookError> {
		Ok(JsonValue::Object(JsonMap::new()))
	}
}

/// Failures raised by hooks or while interpreting their output.
#[derive(Debug, ThisError)]
pub enum HookError {
	/// The hook itself failed.
	#[error("Pre-auth hook failed: {message}.")]
	Failed {
		/// Hook-supplied failure description.
		message: String,
	},
	/// The hook returned a truthy value that is not an object.
	#[error("Pre-auth hook must return an object, got {kind}.")]
	NotAnObject {
		/// JSON type of the offending value.
		kind: &'static str,
	},
	/// A recognized output field has the wrong type.
	#[error("Pre-auth hook field `{field}` must be {expected}.")]
	InvalidField {
		/// Offending field name.
		field: &'static str,
		/// Expected JSON shape.
		expected: &'static str,
	},
	/// The replacement URL is not a usable HTTP(S) endpoint.
	#[error("Pre-auth hook returned an unusable URL.")]
	InvalidUrl(#[source] ProviderConfigError),
}
impl HookError {
	/// Convenience constructor for hook implementations.
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed { message: message.into() }
	}
}

/// Accepted hook output, interpreted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HookDecision {
	/// Replacement request body.
	pub body: Option<AuthRequestBody>,
	/// Replacement endpoint.
	pub url: Option<Url>,
	/// Applications the issued token is restricted to.
	pub allowed_applications: Option<Vec<String>>,
}
impl HookDecision {
	/// Interprets raw hook output; `Ok(None)` means the hook rejected the attempt.
	pub fn from_output(output: JsonValue) -> Result<Option<Self>, HookError> {
		if !is_truthy(&output) {
			return Ok(None);
		}

		let JsonValue::Object(mut object) = output else {
			return Err(HookError::NotAnObject { kind: json_kind(&output) });
		};
		let body = match object.remove(FIELD_BODY) {
			None | Some(JsonValue::Null) => None,
			Some(JsonValue::Object(map)) => Some(AuthRequestBody::from(map)),
			Some(_) => return Err(HookError::InvalidField { field: FIELD_BODY, expected: "an object" }),
		};
		let url = match object.remove(FIELD_URL) {
			None | Some(JsonValue::Null) => None,
			Some(JsonValue::String(raw)) => Some(parse_http_url(&raw).map_err(HookError::InvalidUrl)?),
			Some(_) => return Err(HookError::InvalidField { field: FIELD_URL, expected: "a string" }),
		};
		let allowed_applications = match object.remove(FIELD_ALLOWED_APPLICATIONS) {
			None | Some(JsonValue::Null) => None,
			Some(JsonValue::Array(items)) => Some(string_items(items)?),
			Some(_) => return Err(invalid_applications()),
		};

		Ok(Some(Self { body, url, allowed_applications }))
	}
}

fn string_items(items: Vec<JsonValue>) -> Result<Vec<String>, HookError> {
	items
		.into_iter()
		.map(|item| match item {
			JsonValue::String(value) => Ok(value),
			_ => Err(invalid_applications()),
		})
		.collect()
}

fn invalid_applications() -> HookError {
	HookError::InvalidField { field: FIELD_ALLOWED_APPLICATIONS, expected: "an array of strings" }
}

fn is_truthy(value: &JsonValue) -> bool {
	match value {
		JsonValue::Null => false,
		JsonValue::Bool(flag) => *flag,
		JsonValue::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
		JsonValue::String(text) => !text.is_empty(),
		JsonValue::Array(_) | JsonValue::Object(_) => true,
	}
}

fn json_kind(value: &JsonValue) -> &'static str {
	match value {
		JsonValue::Null => "null",
		JsonValue::Bool(_) => "boolean",
		JsonValue::Number(_) => "number",
		JsonValue::String(_) => "string",
		JsonValue::Array(_) => "array",
		JsonValue::Object(_) => "object",
	}
}
