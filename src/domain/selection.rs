//! Non-interactive stand-in for choosing from a list
//!
//! An explicit value always wins. Otherwise a single candidate is taken as
//! the default and anything else is an error naming the flag to pass.

use crate::error::SelectionError;

/// Resolve a value the user may have left out
pub fn select_one(
    explicit: Option<&str>,
    candidates: &[String],
    kind: &'static str,
    flag: &'static str,
) -> Result<String, SelectionError> {
    if let Some(value) = explicit.filter(|v| !v.is_empty()) {
        return Ok(value.to_string());
    }
    match candidates {
        [] => Err(SelectionError::NoCandidates { kind, flag }),
        [only] => Ok(only.clone()),
        many => Err(SelectionError::Ambiguous {
            kind,
            flag,
            candidates: many.to_vec(),
        }),
    }
}
