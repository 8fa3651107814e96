//! Cross-survey lookup links.

use crate::config::CrossReferenceSettings;

/// Lookup URL for the first alias carrying the configured survey prefix.
///
/// Aliases are comma separated. Returns an empty string when no alias
/// matches; a missing link never fails a run.
pub fn cross_reference_url(internal_names: &str, settings: &CrossReferenceSettings) -> String {
    let prefix = settings.alias_prefix.as_str();
    internal_names
        .split(',')
        .map(str::trim)
        .find(|alias| alias.len() > prefix.len() && alias.starts_with(prefix))
        .map(|alias| format!("{}{}", settings.base_url, alias))
        .unwrap_or_default()
}
