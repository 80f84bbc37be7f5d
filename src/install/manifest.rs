//! Package hook manifests: `"20.pre-commit" -> "Action::method"`.

use crate::error::{ComposterError, Result};
use crate::hook::HookName;
use crate::registry::{Priority, DEFAULT_PRIORITY};

/// Split a prioritized hook key into hook and priority.
///
/// `"20.pre-commit"` is priority 20, a bare `"pre-commit"` gets
/// [`DEFAULT_PRIORITY`]. The prefix may be negative.
pub fn parse_hook_key(key: &str) -> Result<(HookName, Priority)> {
    let key = key.trim();
    let (priority, name) = match key.split_once('.') {
        Some((prefix, name)) => {
            let priority = prefix.trim().parse::<Priority>().map_err(|_| {
                ComposterError::Configuration(format!(
                    "invalid priority '{prefix}' in hook key '{key}'"
                ))
            })?;
            (priority, name.trim())
        }
        None => (DEFAULT_PRIORITY, key),
    };

    let hook = name.parse::<HookName>()?;
    Ok((hook, priority))
}
