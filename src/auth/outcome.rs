//! Successful delegation result.

// self
use crate::auth::BearerToken;

/// Token issued by the identity provider plus the applications it may be used for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthOutcome {
	/// Raw JWT returned by the provider.
	pub jwt: BearerToken,
	/// Applications the token is restricted to, when a pre-auth hook narrowed it.
	pub allowed_applications: Option<Vec<String>>,
}
impl AuthOutcome {
	/// Returns true when the token may be used for `application`.
	///
	/// Tokens without a restriction are valid for every application.
	pub fn allows(&self, application: &str) -> bool {
		self.allowed_applications
			.as_ref()
			.is_none_or(|apps| apps.iter().any(|app| app == application))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn unrestricted_outcome_allows_everything() {
		let outcome = AuthOutcome { jwt: BearerToken::new("t"), allowed_applications: None };

		assert!(outcome.allows("billing"));
	}

	#[test]
	fn restricted_outcome_checks_membership() {
		let outcome = AuthOutcome {
			jwt: BearerToken::new("t"),
			allowed_applications: Some(vec!["billing".into(), "crm".into()]),
		};

		assert!(outcome.allows("crm"));
		assert!(!outcome.allows("admin"));
	}
}
