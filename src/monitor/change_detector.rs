use crate::types::RateSnapshot;

/// Whether `current` warrants a notification relative to `previous`.
///
/// An empty `previous` means there is no baseline, so the answer is always yes.
/// Otherwise only currencies present in both snapshots are compared; a code
/// that appears or disappears on its own is not a change.
pub fn has_changes(previous: &RateSnapshot, current: &RateSnapshot) -> bool {
    if previous.is_empty() {
        return true;
    }

    current.rates().iter().any(|(code, entry)| {
        previous
            .get(code)
            .is_some_and(|prev| (prev.rate_per_unit() - entry.rate_per_unit()).abs() > 0.0)
    })
}
