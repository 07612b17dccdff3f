//! Utility functions for value normalization and validation

use std::sync::LazyLock;

use regex::Regex;

use crate::models::ConnectivityEndpoint;

/// Tier values in the casing the declarative side expects
pub const TIERS: &[&str] = &["Standard", "Premium"];

pub const TLS_VERSIONS: &[&str] = &["1.0", "1.1", "1.2"];

static CLUSTER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9-]{1,57}[a-zA-Z0-9]$").expect("valid cluster name pattern")
});

/// Normalize location value (e.g., "West Europe" -> "westeurope")
pub fn normalize_location(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Rewrite a tier into its canonical casing (e.g., "premium" -> "Premium").
/// Unknown values are returned unchanged.
pub fn normalize_tier(s: &str) -> String {
    TIERS
        .iter()
        .find(|t| t.eq_ignore_ascii_case(s))
        .map(|t| t.to_string())
        .unwrap_or_else(|| s.to_string())
}

/// The remote side reports the full build (e.g., "4.0.3000.1") for a
/// declared "4.0". Keep the declared value when it is a dotted prefix.
pub fn reconcile_cluster_version(declared: Option<&str>, remote: &str) -> String {
    match declared {
        Some(declared)
            if remote == declared || remote.starts_with(&format!("{}.", declared)) =>
        {
            declared.to_string()
        }
        _ => remote.to_string(),
    }
}

/// Location of the named connectivity endpoint (e.g., "HTTPS", "SSH")
pub fn find_connectivity_endpoint(
    name: &str,
    endpoints: Option<&[ConnectivityEndpoint]>,
) -> Option<String> {
    endpoints?
        .iter()
        .find(|e| e.name.as_deref() == Some(name))
        .and_then(|e| e.location.clone())
}

/// Validate an HDInsight cluster name: 3 to 59 letters, digits or hyphens,
/// starting and ending with a letter or digit
pub fn validate_cluster_name(name: &str) -> Result<(), String> {
    if CLUSTER_NAME.is_match(name) {
        Ok(())
    } else {
        Err(format!(
            "Invalid cluster name '{}': must be 3-59 characters of letters, digits or hyphens, starting and ending with a letter or digit",
            name
        ))
    }
}
