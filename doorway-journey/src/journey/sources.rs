//! Audio source fallback chain
//!
//! Candidates are tried strictly in order. The chain only moves forward on
//! load errors; the last candidate is the last resort and is never left.
//! An explicit reload is the only way back to the first candidate, and it
//! appends a fresh cache-busting token so the host re-fetches.

use crate::{Error, Result};
use uuid::Uuid;

/// Query parameter carrying the cache-busting token
const CACHE_BUST_PARAM: &str = "v";

/// Built-in candidates: remote primary, local relative copy, public fallback
pub fn default_sources() -> Vec<String> {
    vec![
        "https://asarchitect.com/audio/doorway.mp3".to_string(),
        "/doorway.mp3".to_string(),
        "https://asarchitect.com/public/doorway.wav".to_string(),
    ]
}

/// Ordered, forward-only list of audio URLs
#[derive(Debug, Clone)]
pub struct SourceFallbackChain {
    candidates: Vec<String>,
    index: usize,
    cache_token: Option<String>,
}

impl SourceFallbackChain {
    pub fn new(candidates: Vec<String>) -> Result<Self> {
        let candidates: Vec<String> = candidates
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();

        if candidates.is_empty() {
            return Err(Error::InvalidSources(
                "at least one audio source is required".to_string(),
            ));
        }

        Ok(Self {
            candidates,
            index: 0,
            cache_token: None,
        })
    }

    /// Index of the selected candidate
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.candidates.len()
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// URL to hand to the media element
    ///
    /// The cache token only decorates the primary candidate.
    pub fn current_url(&self) -> String {
        let base = &self.candidates[self.index];
        match (&self.cache_token, self.index) {
            (Some(token), 0) => with_query_param(base, CACHE_BUST_PARAM, token),
            _ => base.clone(),
        }
    }

    /// Move to the next candidate
    ///
    /// Returns false (and stays put) when already on the last candidate.
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Back to the first candidate with a fresh cache-busting token
    pub fn reset_with_fresh_token(&mut self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.reset_with_token(token)
    }

    /// Back to the first candidate with the given token (returns the new URL)
    pub fn reset_with_token(&mut self, token: String) -> String {
        self.index = 0;
        self.cache_token = Some(token);
        self.current_url()
    }

    /// Inline error text naming every resource that was expected
    pub fn failure_message(&self) -> String {
        format!(
            "Audio failed to load. Check {}.",
            self.candidates.join(" or ")
        )
    }
}

fn with_query_param(url: &str, key: &str, value: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, separator, key, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> SourceFallbackChain {
        SourceFallbackChain::new(vec![
            "https://cdn.example.com/a.mp3".to_string(),
            "/a.mp3".to_string(),
            "https://public.example.com/a.wav".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn test_advance_is_forward_only_and_sticks_on_last() {
        let mut chain = chain();
        let mut seen = vec![chain.index()];

        while chain.advance() {
            seen.push(chain.index());
        }
        assert_eq!(seen, vec![0, 1, 2]);

        // Further errors leave the last-resort candidate selected
        assert!(!chain.advance());
        assert!(!chain.advance());
        assert_eq!(chain.index(), 2);
        assert_eq!(chain.current_url(), "https://public.example.com/a.wav");
    }

    #[test]
    fn test_reset_appends_cache_token_to_primary_only() {
        let mut chain = chain();
        chain.advance();

        let url = chain.reset_with_token("abc".to_string());
        assert_eq!(url, "https://cdn.example.com/a.mp3?v=abc");
        assert_eq!(chain.index(), 0);

        chain.advance();
        assert_eq!(chain.current_url(), "/a.mp3");
    }

    #[test]
    fn test_fresh_tokens_differ() {
        let mut chain = chain();
        let first = chain.reset_with_fresh_token();
        let second = chain.reset_with_fresh_token();
        assert_ne!(first, second);
    }

    #[test]
    fn test_query_separator() {
        assert_eq!(with_query_param("/a.mp3?x=1", "v", "t"), "/a.mp3?x=1&v=t");
    }

    #[test]
    fn test_empty_chain_rejected() {
        assert!(SourceFallbackChain::new(vec![]).is_err());
        assert!(SourceFallbackChain::new(vec!["  ".to_string()]).is_err());
    }

    #[test]
    fn test_failure_message_names_paths() {
        let message = chain().failure_message();
        assert!(message.contains("/a.mp3"));
        assert!(message.contains("a.wav"));
    }
}
