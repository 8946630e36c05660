//! Sorting provider outcomes into success, soft miss, and hard failure.

use crate::envelope::ResultEnvelope;
use crate::error::{ErrorKind, ResolutionError};

/// Message used when every provider reported `FlagNotFound`.
pub const NOT_FOUND_IN_ANY_PROVIDER: &str = "not found in any provider";

/// How a strategy should treat one provider's envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// No error; the value is usable
    Success,
    /// The flag is absent at this provider; try elsewhere
    NotFound,
    /// Any other error
    Failed(ResolutionError),
}

impl Classification {
    pub fn of<T>(envelope: &ResultEnvelope<T>) -> Self {
        match &envelope.error {
            None => Classification::Success,
            Some(error) if error.is_soft() => Classification::NotFound,
            Some(error) => Classification::Failed(error.clone()),
        }
    }
}

/// The error returned when no provider knows the flag.
pub fn not_found_error() -> ResolutionError {
    ResolutionError::new(ErrorKind::FlagNotFound, NOT_FOUND_IN_ANY_PROVIDER)
}
