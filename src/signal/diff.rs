use super::KnownIds;
use super::Signal;
use super::SignalSet;

/// Returns true when the client's known ids differ from the current signal
/// ids as sets.
///
/// Both directions count: a current signal the client has never seen is an
/// addition, a known id no longer present is a deletion (a revoked session
/// the client must stop capturing).
///
/// An empty validator means the client has nothing cached; callers answer
/// such requests directly instead of asking this function.
pub fn is_stale(
    current: &SignalSet,
    known: &KnownIds,
) -> bool {
    if current.signals.iter().any(|s| !known.contains(&s.id)) {
        return true;
    }

    let current_ids = current.ids();
    known.iter().any(|id| !current_ids.contains(id))
}

/// Signals present in `current` that the client does not know yet.
/// Order follows `current`.
pub fn added_signals<'a>(
    current: &'a SignalSet,
    known: &KnownIds,
) -> Vec<&'a Signal> {
    current
        .signals
        .iter()
        .filter(|s| !known.contains(&s.id))
        .collect()
}
