use crate::error::Error;

/// Canonical result type used across the framestore crates.
pub type Result<T, E = Error> = std::result::Result<T, E>;
