//! Masking secrets before text reaches a log line

use regex::Regex;
use std::sync::LazyLock;

static KEY_ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b((?:[A-Z0-9]+_)*(?:API[_-]?KEY|SECRET(?:_KEY)?|(?:ACCESS|AUTH|REFRESH)_TOKEN))(\s*[=:]\s*)\S+",
    )
    .expect("static regex")
});

static PROVIDER_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(sk-|gsk_|tvly-)[A-Za-z0-9_-]{16,}")
        .expect("static regex")
});

static LONG_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z0-9_-]{40,}\b").expect("static regex")
});

/// Replace key-shaped substrings with placeholders
///
/// Handles assignments to key-named fields (`GROQ_API_KEY=value`,
/// `client_secret: value`, `access_token=value`), provider-prefixed keys
/// (`sk-`, `gsk_`, `tvly-`) and any token of 40 or more characters.
pub fn redact(text: &str) -> String {
    let text = KEY_ASSIGNMENT.replace_all(text, "$1$2***");
    let text = PROVIDER_KEY.replace_all(&text, "$1***");
    LONG_TOKEN.replace_all(&text, "[REDACTED]").into_owned()
}

/// Redacted and shortened copy of `text` for log fields
pub fn preview(text: &str, max_chars: usize) -> String {
    let redacted = redact(text);
    if redacted.chars().count() <= max_chars {
        redacted
    } else {
        let mut short: String = redacted.chars().take(max_chars).collect();
        short.push('…');
        short
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_is_masked() {
        assert_eq!(
            redact("GROQ_API_KEY=gsk_live_0123456789abcdef"),
            "GROQ_API_KEY=***"
        );
        assert_eq!(redact("finnhub_api_key: abc123"), "finnhub_api_key: ***");
    }

    #[test]
    fn test_whole_key_names_only() {
        assert_eq!(redact("access_token=abc123"), "access_token=***");
        assert_eq!(redact("CLIENT_SECRET: hunter2"), "CLIENT_SECRET: ***");
        assert_eq!(redact("x-api-key: abc123"), "x-api-key: ***");

        let backend = "Please reduce the length of the messages or max_tokens: 512 requested";
        assert_eq!(redact(backend), backend);
        assert_eq!(redact("tokens: 1200, secrets: none"), "tokens: 1200, secrets: none");
    }

    #[test]
    fn test_provider_prefixed_keys() {
        assert_eq!(
            redact("using sk-abcdefghijklmnopqrstuvwx now"),
            "using sk-*** now"
        );
        assert_eq!(redact("key gsk_ABCDEFGHIJKLMNOPQRST"), "key gsk_***");
    }

    #[test]
    fn test_long_tokens() {
        let token = "a".repeat(45);
        assert_eq!(redact(&format!("bearer {token} end")), "bearer [REDACTED] end");
    }

    #[test]
    fn test_plain_query_untouched() {
        let query = "Summarize analyst recommendations and latest news for NVIDIA";
        assert_eq!(redact(query), query);
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("What is the current price of AAPL?", 7), "What is…");
        assert_eq!(preview("short", 10), "short");
    }
}
