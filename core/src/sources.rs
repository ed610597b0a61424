//! Candidate producers.
//!
//! The scanner does not care where candidates come from: a plain-text file
//! and the asset-search collaborators all yield the same raw strings.
//! Provider implementations hold their own API key and know their own
//! query dialect; the scanner never sees keys, rate limits, or pagination.

use std::fs;
use std::io;
use std::path::Path;

use async_trait::async_trait;

use probr_common::target::Provider;

mod fofa;
mod hunter;
mod zoomeye;

pub use fofa::Fofa;
pub use hunter::Hunter;
pub use zoomeye::ZoomEye;

/// A producer of raw candidate targets.
#[async_trait]
pub trait CandidateSource {
    fn name(&self) -> &'static str;

    /// Resolves one page of candidates from the provider.
    async fn fetch(&self, client: &reqwest::Client) -> anyhow::Result<Vec<String>>;
}

/// Builds the source for a chosen provider.
pub fn for_provider(provider: Provider, key: String) -> Box<dyn CandidateSource> {
    match provider {
        Provider::Fofa => Box::new(Fofa::new(key)),
        Provider::Hunter => Box::new(Hunter::new(key)),
        Provider::ZoomEye => Box::new(ZoomEye::new(key)),
    }
}

/// Reads a candidate file: one raw target per line, blank lines skipped.
/// Trimming and normalization happen later, per candidate.
pub fn from_file(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let body = fs::read_to_string(path)?;
    Ok(body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_file_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a.test\n\n  \nhttp://b.test/\nc.test:11434\n").unwrap();

        let candidates = from_file(file.path()).unwrap();
        assert_eq!(candidates, vec!["a.test", "http://b.test/", "c.test:11434"]);
    }

    #[test]
    fn test_from_file_missing_file_errors() {
        assert!(from_file("/nonexistent/targets.txt").is_err());
    }
}
