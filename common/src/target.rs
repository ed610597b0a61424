//! # Candidate Target Normalization
//!
//! Turns raw candidate strings into well-formed base URLs.
//!
//! Candidates arrive from three producers and in three shapes:
//! * A bare hostname (e.g., `a.test`).
//! * A `host:port` pair (e.g., `c.test:11434`).
//! * A full URL (e.g., `http://b.test/`).
//!
//! All of them leave [`normalize`] with an explicit scheme and exactly one
//! trailing slash, ready for path concatenation by the probe.

use std::str::FromStr;

/// Canonicalizes one raw candidate into a probe-ready base URL.
///
/// Pure and infallible: surrounding whitespace is trimmed, `http://` is
/// assumed when no scheme separator is present, and a single trailing `/`
/// is guaranteed. Whether the result actually points at anything is the
/// probe's concern, not ours.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();

    let mut url = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    if !url.ends_with('/') {
        url.push('/');
    }

    url
}

/// Asset-search providers able to supply candidate lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    Fofa,
    Hunter,
    ZoomEye,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::Fofa => "fofa",
            Provider::Hunter => "hunter",
            Provider::ZoomEye => "zoomeye",
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fofa" => Ok(Provider::Fofa),
            "hunter" => Ok(Provider::Hunter),
            "zoomeye" | "zoom" => Ok(Provider::ZoomEye),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_prepended_when_absent() {
        assert_eq!(normalize("a.test"), "http://a.test/");
        assert_eq!(normalize("c.test:11434"), "http://c.test:11434/");
    }

    #[test]
    fn test_existing_scheme_preserved() {
        assert_eq!(normalize("https://a.test"), "https://a.test/");
        assert_eq!(normalize("http://b.test/"), "http://b.test/");
    }

    #[test]
    fn test_single_trailing_slash() {
        // Already-terminated inputs gain no second slash
        assert_eq!(normalize("http://b.test/"), "http://b.test/");
        assert!(!normalize("http://b.test").ends_with("//"));
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(normalize("  a.test \n"), "http://a.test/");
        assert_eq!(normalize("\thttp://b.test/"), "http://b.test/");
    }

    #[test]
    fn test_idempotent() {
        for raw in ["a.test", "http://b.test/", "c.test:11434", " https://d.test "] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "normalize not idempotent for '{raw}'");
        }
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!(Provider::from_str("fofa"), Ok(Provider::Fofa));
        assert_eq!(Provider::from_str("HUNTER"), Ok(Provider::Hunter));
        assert_eq!(Provider::from_str("zoom"), Ok(Provider::ZoomEye));
        assert!(Provider::from_str("shodan").is_err());
    }
}
