//! Reading configuration values from the environment

/// Marker left in values copied from an `.env` template
const PLACEHOLDER_MARKER: &str = "your_";

/// True when a value is empty or still the template placeholder
pub fn is_placeholder(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || trimmed.to_ascii_lowercase().contains(PLACEHOLDER_MARKER)
}

/// Read a variable, treating empty and placeholder values as unset
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !is_placeholder(v))
        .map(|v| v.trim().to_string())
}
