use almanac_core::{AlmanacError, Capability};

/// Collapse a set of provider errors into a uniform `AlmanacError` outcome.
///
/// Rules:
/// - If `attempted_any` is false → `Unsupported(capability)`.
/// - If `not_found_what` is `Some` and all errors are `NotFound` → `NotFound(what)`.
/// - If exactly one provider failed → that provider's error, unchanged.
/// - Else → `AllProvidersFailed(errors)`.
///
/// A throttling outcome stays recognisable through
/// [`AlmanacError::is_rate_limited`] in every case.
pub fn collapse_errors(
    capability: Capability,
    attempted_any: bool,
    mut errors: Vec<AlmanacError>,
    not_found_what: Option<String>,
) -> AlmanacError {
    if !attempted_any {
        return AlmanacError::unsupported(capability.to_string());
    }
    if let Some(what) = not_found_what
        && !errors.is_empty()
        && errors
            .iter()
            .all(|e| matches!(e, AlmanacError::NotFound { .. }))
    {
        return AlmanacError::not_found(what);
    }
    if errors.len() == 1
        && let Some(only) = errors.pop()
    {
        return only;
    }
    AlmanacError::AllProvidersFailed(errors)
}
