//! Bearer-token handling: extraction from requests, verification, and the validity cache.

pub mod cache;
pub mod jwt;
pub mod reader;
pub mod verifier;

pub use cache::*;
pub use jwt::*;
pub use reader::*;
pub use verifier::*;
