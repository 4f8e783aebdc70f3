// Filter core: canonical mapping, term indexes, capability checks, scan loop
// The Filter facade owns the frozen config and the built indexes; scans take &self

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

pub mod checks;
pub mod condition;
pub mod engine;
pub mod normalize;
pub mod replace;
pub mod trie;

use crate::context::{ConfigError, FilterConfig};
use self::checks::CheckSet;
use self::trie::TermTrie;

/// What kind of content a match flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Term,
    Numeric,
    Email,
    Url,
    Ipv4,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchType::Term => "term",
            MatchType::Numeric => "numeric",
            MatchType::Email => "email",
            MatchType::Url => "url",
            MatchType::Ipv4 => "ipv4",
        };
        f.write_str(name)
    }
}

/// Termination mode for one scan call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Stop at the first accepted match.
    FailFast,
    /// Run to the end of input.
    CollectAll,
}

/// One accepted match. `start`/`end` are character positions (end exclusive);
/// `text` is the original, pre-normalization substring, so
/// `end - start == text.chars().count()` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordMatch {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub match_type: MatchType,
    pub text: String,
}

/// Output formatting for a single match.
pub trait MatchFormat: Send + Sync {
    fn format(&self, m: &WordMatch) -> String;
}

/// Default format: `start<TAB>end<TAB>type<TAB>text`.
pub struct TabbedFormat;

impl MatchFormat for TabbedFormat {
    fn format(&self, m: &WordMatch) -> String {
        format!("{}\t{}\t{}\t{}", m.start, m.end, m.match_type, m.text)
    }
}

/// The filter engine. Construction builds both term indexes from the
/// configured sources and assembles the enabled capabilities; afterwards the
/// engine is read-only and scans may run concurrently over `&self`.
pub struct Filter {
    pub(crate) config: FilterConfig,
    pub(crate) checks: CheckSet,
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Filter {
    /// Build an engine from a frozen config. Fails before any text is
    /// processed if a required collaborator is missing: the word check
    /// requires a deny source unless a custom term check override is set.
    pub fn new(mut config: FilterConfig) -> Result<Self> {
        if config.enable_word_check && config.deny_source.is_none() && config.word_check.is_none() {
            return Err(ConfigError::MissingStrategy("deny term source").into());
        }

        let deny_terms = config
            .deny_source
            .take()
            .map(|source| source.terms())
            .unwrap_or_default();
        let allow_terms = config
            .allow_source
            .take()
            .map(|source| source.terms())
            .unwrap_or_default();

        let deny = Arc::new(TermTrie::from_terms(&deny_terms, &config));
        let allow = Arc::new(TermTrie::from_terms(&allow_terms, &config));
        info!(
            "Built term indexes: {} deny terms, {} allow terms",
            deny.len(),
            allow.len()
        );

        let checks = CheckSet::build(&mut config, deny, allow)?;
        Ok(Self { config, checks })
    }

    /// Find every accepted match, in ascending start order. The `fail_fast`
    /// toggle turns this into a stop-at-first scan.
    pub fn find_all(&self, text: &str) -> Vec<WordMatch> {
        let mode = if self.config.fail_fast {
            ScanMode::FailFast
        } else {
            ScanMode::CollectAll
        };
        engine::scan(self, text, mode)
    }

    /// Find the first accepted match, if any.
    pub fn find_first(&self, text: &str) -> Option<WordMatch> {
        engine::scan(self, text, ScanMode::FailFast).into_iter().next()
    }

    /// Whether the text contains any accepted match.
    pub fn contains(&self, text: &str) -> bool {
        self.find_first(text).is_some()
    }

    /// Rebuild the text with every accepted match replaced via the
    /// configured replace strategy. Always collects all matches, regardless
    /// of the `fail_fast` toggle.
    pub fn replace(&self, text: &str) -> String {
        let matches = engine::scan(self, text, ScanMode::CollectAll);
        let chars: Vec<char> = text.chars().collect();
        replace::apply(&chars, &matches, self.config.replace.as_ref())
    }

    /// Render one match via the configured output format.
    pub fn format_match(&self, m: &WordMatch) -> String {
        self.config.format.format(m)
    }

    /// Tags attached to a dictionary term by the configured tag provider.
    pub fn word_tags(&self, word: &str) -> Vec<String> {
        self.config.tags.tags(word)
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FilterConfig;
    use crate::dictionary::{InMemorySource, TagTable};

    fn filter_with(deny: &[&str], allow: &[&str]) -> Filter {
        let config = FilterConfig::builder()
            .deny_source(Box::new(InMemorySource::new(deny.iter().copied())))
            .allow_source(Box::new(InMemorySource::new(allow.iter().copied())))
            .build()
            .unwrap();
        Filter::new(config).unwrap()
    }

    #[test]
    fn test_missing_deny_source_is_a_configuration_error() {
        let config = FilterConfig::builder().build().unwrap();
        let err = Filter::new(config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingStrategy(_))
        ));
    }

    #[test]
    fn test_word_check_disabled_needs_no_deny_source() {
        let config = FilterConfig::builder()
            .enable_word_check(false)
            .build()
            .unwrap();
        let filter = Filter::new(config).unwrap();
        assert!(filter.find_all("anything at all").is_empty());
    }

    #[test]
    fn test_find_first_is_first_element_of_find_all() {
        let filter = filter_with(&["bomb", "gun"], &[]);
        let text = "a gun and a bomb";
        let all = filter.find_all(text);
        assert_eq!(filter.find_first(text), all.into_iter().next());

        let clean = "nothing here";
        assert!(filter.find_all(clean).is_empty());
        assert_eq!(filter.find_first(clean), None);
    }

    #[test]
    fn test_fail_fast_toggle_truncates_find_all() {
        let config = FilterConfig::builder()
            .deny_source(Box::new(InMemorySource::new(["bomb"])))
            .fail_fast(true)
            .build()
            .unwrap();
        let filter = Filter::new(config).unwrap();
        assert_eq!(filter.find_all("bomb bomb").len(), 1);
    }

    #[test]
    fn test_contains_and_replace() {
        let filter = filter_with(&["bomb"], &[]);
        assert!(filter.contains("a bomb"));
        assert!(!filter.contains("a rose"));
        assert_eq!(filter.replace("a bomb!"), "a ****!");
        assert_eq!(filter.replace("clean"), "clean");
    }

    #[test]
    fn test_match_text_is_original_substring() {
        let filter = filter_with(&["bomb"], &[]);
        let results = filter.find_all("a BoＭb!");
        assert_eq!(results.len(), 1);
        let m = &results[0];
        assert_eq!(m.text, "BoＭb");
        assert_eq!(m.end - m.start, m.text.chars().count());
    }

    #[test]
    fn test_format_match_default_is_tab_separated() {
        let filter = filter_with(&["bomb"], &[]);
        let m = filter.find_first("a bomb").unwrap();
        assert_eq!(filter.format_match(&m), "2\t6\tterm\tbomb");
    }

    #[test]
    fn test_word_tags_via_provider() {
        let config = FilterConfig::builder()
            .deny_source(Box::new(InMemorySource::new(["bomb"])))
            .word_tags(Box::new(TagTable::new([(
                "bomb".to_string(),
                vec!["weapon".to_string()],
            )])))
            .build()
            .unwrap();
        let filter = Filter::new(config).unwrap();
        assert_eq!(filter.word_tags("bomb"), vec!["weapon".to_string()]);
        assert!(filter.word_tags("rose").is_empty());
    }

    #[test]
    fn test_match_type_serializes_lowercase() {
        let m = WordMatch {
            start: 0,
            end: 4,
            match_type: MatchType::Term,
            text: "bomb".to_string(),
        };
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(
            json,
            r#"{"start":0,"end":4,"type":"term","text":"bomb"}"#
        );
    }
}
