//! Authentication core for API gateways: delegate username/password logins to an upstream
//! identity provider, shape them with pre-auth hooks, and cache verified bearer tokens.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod delegate;
pub mod error;
pub mod handler;
pub mod hook;
pub mod http;
pub mod obs;
pub mod provider;
pub mod token;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};

	/// Free-form JSON object used for request bodies and provider payloads.
	pub type JsonMap = serde_json::Map<String, JsonValue>;
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, parking_lot as _, tracing_subscriber as _};
