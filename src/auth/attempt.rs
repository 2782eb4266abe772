//! Per-call login attempt and the request body sent to the identity provider.

// self
use crate::{_prelude::*, auth::Password};

/// Placeholder written over the password before a request body is logged.
pub const REDACTED: &str = "*REDACTED*";

/// Username/password pair plus caller-supplied context for one login.
#[derive(Clone, Debug)]
pub struct LoginAttempt {
	/// Login name as submitted by the caller.
	pub username: String,
	/// Submitted password; redacted in every formatter.
	pub password: Password,
	/// Arbitrary caller context forwarded to the pre-auth hook.
	pub additional_properties: JsonMap,
}
impl LoginAttempt {
	/// Creates an attempt without additional properties.
	pub fn new(username: impl Into<String>, password: impl Into<Password>) -> Self {
		Self {
			username: username.into(),
			password: password.into(),
			additional_properties: JsonMap::new(),
		}
	}

	/// Attaches caller-supplied context.
	pub fn with_additional_properties(mut self, properties: JsonMap) -> Self {
		self.additional_properties = properties;

		self
	}
}

/// JSON object posted to the identity provider's authenticate endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthRequestBody(JsonMap);
impl AuthRequestBody {
	/// Starts from the configured static parameters and injects the credentials.
	///
	/// `username` and `password` always override same-named configured parameters.
	pub fn from_parameters(parameters: &JsonMap, attempt: &LoginAttempt) -> Self {
		let mut body = parameters.clone();

		body.insert("username".into(), JsonValue::String(attempt.username.clone()));
		body.insert("password".into(), JsonValue::String(attempt.password.expose().to_owned()));

		Self(body)
	}

	/// Borrows the underlying JSON object.
	pub fn as_map(&self) -> &JsonMap {
		&self.0
	}

	/// Serializes the body into the wire payload.
	pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
		serde_json::to_vec(&self.0)
	}

	/// Renders the body for logs with the password masked by [`REDACTED`].
	///
	/// The top-level `password` field is replaced, and so is every occurrence of the password value
	/// inside any string value, at any depth, so hook-renamed fields stay masked too.
	pub fn redacted(&self, password: &Password) -> String {
		let mut map = self.0.clone();

		if let Some(field) = map.get_mut("password") {
			*field = JsonValue::String(REDACTED.into());
		}

		let mut copy = JsonValue::Object(map);

		mask(&mut copy, password.expose());

		copy.to_string()
	}
}
impl From<JsonMap> for AuthRequestBody {
	fn from(value: JsonMap) -> Self {
		Self(value)
	}
}

fn mask(value: &mut JsonValue, secret: &str) {
	if secret.is_empty() {
		return;
	}

	match value {
		JsonValue::String(text) if text.contains(secret) => *text = text.replace(secret, REDACTED),
		JsonValue::Array(items) => items.iter_mut().for_each(|item| mask(item, secret)),
		JsonValue::Object(map) => map.values_mut().for_each(|item| mask(item, secret)),
		_ => (),
	}
}
