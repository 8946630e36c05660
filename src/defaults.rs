//! Canonical "nothing worked" results.

use crate::classify::not_found_error;
use crate::envelope::{Reason, ResultEnvelope, FALLBACK_USED, NO_PROVIDER};
use crate::error::ResolutionError;

/// Build a result carrying the caller's default.
///
/// The result is tagged with the strategy name and
/// `successful-provider-name = "none"`. A present error sets the reason to
/// `Error`; otherwise the reason is `Default`.
pub fn default_result<T>(
    strategy: &str,
    default_value: T,
    error: Option<ResolutionError>,
) -> ResultEnvelope<T> {
    let mut envelope = match error {
        Some(error) => ResultEnvelope::failed(default_value, error),
        None => ResultEnvelope::resolved(default_value, Reason::Default),
    };
    envelope.tag_winner(strategy, NO_PROVIDER);
    envelope
}

/// The exhausted result: every provider reported `FlagNotFound`.
pub fn not_found_result<T>(strategy: &str, default_value: T) -> ResultEnvelope<T> {
    default_result(strategy, default_value, Some(not_found_error()))
}

/// A default result that also records `fallback-used = false`.
pub(crate) fn no_fallback_result<T>(
    strategy: &str,
    default_value: T,
    error: ResolutionError,
) -> ResultEnvelope<T> {
    default_result(strategy, default_value, Some(error)).with_metadata(FALLBACK_USED, false)
}
