//! Record filters shared by the feed and the advice listing.

use crate::domain::TelecomAdvice;
use crate::pipeline::processing::normalize::normalize_state;

/// Case-insensitive state match. The filter is canonicalized first, so
/// "lagos state" matches "Lagos". No filter matches everything.
pub fn matches_state(state: &str, filter: Option<&str>) -> bool {
    match filter.map(normalize_state) {
        Some(wanted) if !wanted.is_empty() => state.to_lowercase() == wanted.to_lowercase(),
        _ => true,
    }
}

/// Case-insensitive partial match against the facility key or display name.
pub fn matches_name(name: &str, display_name: &str, filter: Option<&str>) -> bool {
    match filter.map(|f| f.trim().to_lowercase()) {
        Some(wanted) if !wanted.is_empty() => {
            name.to_lowercase().contains(&wanted) || display_name.to_lowercase().contains(&wanted)
        }
        _ => true,
    }
}

pub fn filter_telecom_advice(records: &[TelecomAdvice], name: Option<&str>, state: Option<&str>) -> Vec<TelecomAdvice> {
    records
        .iter()
        .filter(|r| matches_name(&r.name, &r.display_name, name) && matches_state(&r.state, state))
        .cloned()
        .collect()
}
