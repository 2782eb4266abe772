//! Auth-domain values: redacted secrets, login attempts, and delegation outcomes.

pub mod attempt;
pub mod outcome;
pub mod secret;

pub use attempt::*;
pub use outcome::*;
pub use secret::*;
