//! Process-wide cache of positive token verification results.
//!
//! The cache is keyed by the raw token string and only ever stores tokens that verified
//! successfully. Each entry carries the token's expiry (or [`NEVER_EXPIRES`]) plus the
//! eviction TTL derived from it; eviction itself is handled by the concurrent cache
//! (`moka`), so this module never runs background work and never takes a global lock.

// std
use std::time::Instant;
// crates.io
use http::request::Parts;
use moka::{Expiry, sync::Cache};
// self
use crate::{
	_prelude::*,
	auth::BearerToken,
	obs::{self, CacheLookup, FlowKind, FlowOutcome, FlowSpan},
	token::{TokenReadError, TokenReader, TokenVerifier},
};

/// Expiry sentinel for tokens without an `exp` claim.
pub const NEVER_EXPIRES: i64 = 0;

/// Tuning knobs for [`TokenValidityCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
	/// Upper bound on cached tokens; unbounded when `None`.
	pub max_capacity: Option<u64>,
}

/// Cached verification result for one token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheEntry {
	/// Expiry in epoch seconds, or [`NEVER_EXPIRES`].
	pub expires_at: i64,
	/// Eviction TTL; `None` keeps the entry until capacity pressure evicts it.
	pub ttl: Option<StdDuration>,
}
impl CacheEntry {
	/// Entry for a token without an expiry claim.
	pub const fn never_expiring() -> Self {
		Self { expires_at: NEVER_EXPIRES, ttl: None }
	}

	/// Entry for a token expiring at `expires_at`, or `None` when that is not after `now`.
	pub fn expiring_at(expires_at: i64, now: i64) -> Option<Self> {
		let remaining = u64::try_from(expires_at.checked_sub(now)?).ok().filter(|secs| *secs > 0)?;

		Some(Self { expires_at, ttl: Some(StdDuration::from_secs(remaining)) })
	}

	/// Returns true while the entry may still vouch for its token.
	pub fn is_valid_at(&self, now: i64) -> bool {
		self.expires_at == NEVER_EXPIRES || self.expires_at > now
	}
}

struct EntryExpiry;
impl Expiry<String, CacheEntry> for EntryExpiry {
	fn expire_after_create(
		&self,
		_key: &String,
		value: &CacheEntry,
		_created_at: Instant,
	) -> Option<StdDuration> {
		value.ttl
	}

	fn expire_after_update(
		&self,
		_key: &String,
		value: &CacheEntry,
		_updated_at: Instant,
		_duration_until_expiry: Option<StdDuration>,
	) -> Option<StdDuration> {
		value.ttl
	}
}

/// Memoizes token verification so valid tokens skip cryptographic checks on later requests.
///
/// The cache is safe to share across any number of request workers. Reads and writes are
/// independent per token; re-inserting a token overwrites its entry.
#[derive(Clone)]
pub struct TokenValidityCache {
	reader: Arc<dyn TokenReader>,
	verifier: Arc<dyn TokenVerifier>,
	entries: Cache<String, CacheEntry>,
}
impl TokenValidityCache {
	/// Creates an unbounded cache around the provided reader and verifier.
	pub fn new(reader: Arc<dyn TokenReader>, verifier: Arc<dyn TokenVerifier>) -> Self {
		Self::with_config(reader, verifier, CacheConfig::default())
	}

	/// Creates a cache tuned by `config`.
	pub fn with_config(
		reader: Arc<dyn TokenReader>,
		verifier: Arc<dyn TokenVerifier>,
		config: CacheConfig,
	) -> Self {
		let mut builder = Cache::builder().expire_after(EntryExpiry);

		if let Some(capacity) = config.max_capacity {
			builder = builder.max_capacity(capacity);
		}

		Self { reader, verifier, entries: builder.build() }
	}

	/// Decides whether the request carries a valid bearer token.
	///
	/// Returns `Ok(Some(token))` when authenticated and `Ok(None)` when the request has no
	/// token or its token is expired or wrongly signed. Every other reader or verifier failure
	/// is returned as an error.
	pub fn is_authenticated(&self, request: &Parts) -> Result<Option<BearerToken>> {
		const KIND: FlowKind = FlowKind::TokenCheck;

		let _span = FlowSpan::new(KIND, "is_authenticated").entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = self.check(request);
		let outcome = match &result {
			Ok(Some(_)) => FlowOutcome::Success,
			Ok(None) => FlowOutcome::Denied,
			Err(_) => FlowOutcome::Failure,
		};

		obs::record_flow_outcome(KIND, outcome);

		result
	}

	/// Returns the cached entry for `token`, if any.
	pub fn entry(&self, token: &BearerToken) -> Option<CacheEntry> {
		self.entries.get(token.expose())
	}

	/// Approximate number of cached tokens.
	pub fn entry_count(&self) -> u64 {
		self.entries.entry_count()
	}

	/// Runs pending housekeeping (expired-entry removal, capacity eviction) immediately.
	pub fn sweep(&self) {
		self.entries.run_pending_tasks();
	}

	fn check(&self, request: &Parts) -> Result<Option<BearerToken>> {
		let token = match self.reader.token_from_request(request) {
			Ok(token) => token,
			Err(TokenReadError::NoToken) => return Ok(None),
			Err(e) => {
				tracing::warn!("error while reading token from request: {e}");

				return Err(e.into());
			},
		};
		let now = OffsetDateTime::now_utc().unix_timestamp();

		match self.entries.get(token.expose()) {
			Some(entry) if entry.is_valid_at(now) => {
				obs::record_cache_lookup(CacheLookup::Hit);

				return Ok(Some(token));
			},
			Some(_) => {
				obs::record_cache_lookup(CacheLookup::Stale);
				tracing::debug!(token = %token.fingerprint(), "evicting stale token cache entry");

				self.entries.invalidate(token.expose());
			},
			None => obs::record_cache_lookup(CacheLookup::Miss),
		}

		self.verify(token, now)
	}

	fn verify(&self, token: BearerToken, now: i64) -> Result<Option<BearerToken>> {
		let claims = match self.verifier.verify_token(token.expose()) {
			Ok(claims) => claims,
			Err(e) if e.is_acceptable() => {
				tracing::debug!(token = %token.fingerprint(), kind = %e.kind, "token rejected");

				return Ok(None);
			},
			Err(e) => return Err(e.into()),
		};
		let entry = match claims.expires_at() {
			None => CacheEntry::never_expiring(),
			Some(expires_at) => match CacheEntry::expiring_at(expires_at, now) {
				Some(entry) => entry,
				None => return Ok(None),
			},
		};

		tracing::debug!(
			token = %token.fingerprint(),
			expires_at = entry.expires_at,
			"caching verified token"
		);

		self.entries.insert(token.expose().to_owned(), entry);

		Ok(Some(token))
	}
}
impl Debug for TokenValidityCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenValidityCache").field("entry_count", &self.entries.entry_count()).finish()
	}
}
