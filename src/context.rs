// Frozen configuration for the filter engine
// Built once via the builder, then read-only for the lifetime of the Filter

use thiserror::Error;

use crate::dictionary::{EmptyTags, TermSource, WordTag};
use crate::filter::checks::PatternCheck;
use crate::filter::condition::{AcceptAll, ResultCondition};
use crate::filter::normalize::CharMapper;
use crate::filter::replace::{MaskChar, ReplaceStrategy};
use crate::filter::trie::{CharIgnore, NoIgnoredChars};
use crate::filter::{MatchFormat, TabbedFormat};

/// Configuration problems reported before any text is scanned.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required collaborator is absent at engine construction.
    #[error("missing required strategy: {0}")]
    MissingStrategy(&'static str),
    /// The numeric-run threshold makes no sense (a zero threshold would flag
    /// every position).
    #[error("invalid numeric threshold: {0} (must be at least 1)")]
    InvalidThreshold(usize),
}

/// Immutable-once-built configuration value. All toggles, the numeric
/// threshold, and the pluggable strategies live here; `Filter::new` consumes
/// it, so an in-flight scan can never observe a configuration change.
pub struct FilterConfig {
    pub(crate) fail_fast: bool,
    pub(crate) ignore_case: bool,
    pub(crate) ignore_width: bool,
    pub(crate) ignore_num_style: bool,
    pub(crate) ignore_script_variant: bool,
    pub(crate) ignore_english_style: bool,
    pub(crate) ignore_repeat: bool,
    pub(crate) enable_word_check: bool,
    pub(crate) enable_num_check: bool,
    pub(crate) enable_email_check: bool,
    pub(crate) enable_url_check: bool,
    pub(crate) enable_ipv4_check: bool,
    pub(crate) num_threshold: usize,
    pub(crate) deny_source: Option<Box<dyn TermSource>>,
    pub(crate) allow_source: Option<Box<dyn TermSource>>,
    pub(crate) condition: Box<dyn ResultCondition>,
    pub(crate) replace: Box<dyn ReplaceStrategy>,
    pub(crate) format: Box<dyn MatchFormat>,
    pub(crate) tags: Box<dyn WordTag>,
    char_ignore: Box<dyn CharIgnore>,
    mappers: Vec<Box<dyn CharMapper>>,
    pub(crate) word_check: Option<Box<dyn PatternCheck>>,
    pub(crate) num_check: Option<Box<dyn PatternCheck>>,
    pub(crate) email_check: Option<Box<dyn PatternCheck>>,
    pub(crate) url_check: Option<Box<dyn PatternCheck>>,
    pub(crate) ipv4_check: Option<Box<dyn PatternCheck>>,
}

impl std::fmt::Debug for FilterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterConfig")
            .field("fail_fast", &self.fail_fast)
            .field("ignore_case", &self.ignore_case)
            .field("ignore_width", &self.ignore_width)
            .field("ignore_num_style", &self.ignore_num_style)
            .field("ignore_script_variant", &self.ignore_script_variant)
            .field("ignore_english_style", &self.ignore_english_style)
            .field("ignore_repeat", &self.ignore_repeat)
            .field("enable_word_check", &self.enable_word_check)
            .field("enable_num_check", &self.enable_num_check)
            .field("enable_email_check", &self.enable_email_check)
            .field("enable_url_check", &self.enable_url_check)
            .field("enable_ipv4_check", &self.enable_ipv4_check)
            .field("num_threshold", &self.num_threshold)
            .finish_non_exhaustive()
    }
}

impl FilterConfig {
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::default()
    }

    pub(crate) fn mappers(&self) -> &[Box<dyn CharMapper>] {
        &self.mappers
    }

    pub(crate) fn char_ignore(&self) -> &dyn CharIgnore {
        self.char_ignore.as_ref()
    }

    pub fn num_threshold(&self) -> usize {
        self.num_threshold
    }

    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }
}

/// Builder with defaults matching common moderation use: all character folds
/// on, repeated-character skipping off, word check on, structural checks
/// off, numeric threshold 8.
pub struct FilterConfigBuilder {
    fail_fast: bool,
    ignore_case: bool,
    ignore_width: bool,
    ignore_num_style: bool,
    ignore_script_variant: bool,
    ignore_english_style: bool,
    ignore_repeat: bool,
    enable_word_check: bool,
    enable_num_check: bool,
    enable_email_check: bool,
    enable_url_check: bool,
    enable_ipv4_check: bool,
    num_threshold: usize,
    deny_source: Option<Box<dyn TermSource>>,
    allow_source: Option<Box<dyn TermSource>>,
    condition: Box<dyn ResultCondition>,
    replace: Box<dyn ReplaceStrategy>,
    format: Box<dyn MatchFormat>,
    tags: Box<dyn WordTag>,
    char_ignore: Box<dyn CharIgnore>,
    mappers: Vec<Box<dyn CharMapper>>,
    word_check: Option<Box<dyn PatternCheck>>,
    num_check: Option<Box<dyn PatternCheck>>,
    email_check: Option<Box<dyn PatternCheck>>,
    url_check: Option<Box<dyn PatternCheck>>,
    ipv4_check: Option<Box<dyn PatternCheck>>,
}

impl Default for FilterConfigBuilder {
    fn default() -> Self {
        Self {
            fail_fast: false,
            ignore_case: true,
            ignore_width: true,
            ignore_num_style: true,
            ignore_script_variant: true,
            ignore_english_style: true,
            ignore_repeat: false,
            enable_word_check: true,
            enable_num_check: false,
            enable_email_check: false,
            enable_url_check: false,
            enable_ipv4_check: false,
            num_threshold: 8,
            deny_source: None,
            allow_source: None,
            condition: Box::new(AcceptAll),
            replace: Box::new(MaskChar::default()),
            format: Box::new(TabbedFormat),
            tags: Box::new(EmptyTags),
            char_ignore: Box::new(NoIgnoredChars),
            mappers: Vec::new(),
            word_check: None,
            num_check: None,
            email_check: None,
            url_check: None,
            ipv4_check: None,
        }
    }
}

impl FilterConfigBuilder {
    pub fn fail_fast(mut self, on: bool) -> Self {
        self.fail_fast = on;
        self
    }

    pub fn ignore_case(mut self, on: bool) -> Self {
        self.ignore_case = on;
        self
    }

    pub fn ignore_width(mut self, on: bool) -> Self {
        self.ignore_width = on;
        self
    }

    pub fn ignore_num_style(mut self, on: bool) -> Self {
        self.ignore_num_style = on;
        self
    }

    pub fn ignore_script_variant(mut self, on: bool) -> Self {
        self.ignore_script_variant = on;
        self
    }

    pub fn ignore_english_style(mut self, on: bool) -> Self {
        self.ignore_english_style = on;
        self
    }

    pub fn ignore_repeat(mut self, on: bool) -> Self {
        self.ignore_repeat = on;
        self
    }

    pub fn enable_word_check(mut self, on: bool) -> Self {
        self.enable_word_check = on;
        self
    }

    pub fn enable_num_check(mut self, on: bool) -> Self {
        self.enable_num_check = on;
        self
    }

    pub fn enable_email_check(mut self, on: bool) -> Self {
        self.enable_email_check = on;
        self
    }

    pub fn enable_url_check(mut self, on: bool) -> Self {
        self.enable_url_check = on;
        self
    }

    pub fn enable_ipv4_check(mut self, on: bool) -> Self {
        self.enable_ipv4_check = on;
        self
    }

    /// Minimum digit-run length flagged by the numeric check.
    pub fn num_threshold(mut self, threshold: usize) -> Self {
        self.num_threshold = threshold;
        self
    }

    pub fn deny_source(mut self, source: Box<dyn TermSource>) -> Self {
        self.deny_source = Some(source);
        self
    }

    pub fn allow_source(mut self, source: Box<dyn TermSource>) -> Self {
        self.allow_source = Some(source);
        self
    }

    pub fn condition(mut self, condition: Box<dyn ResultCondition>) -> Self {
        self.condition = condition;
        self
    }

    pub fn replace_strategy(mut self, strategy: Box<dyn ReplaceStrategy>) -> Self {
        self.replace = strategy;
        self
    }

    pub fn match_format(mut self, format: Box<dyn MatchFormat>) -> Self {
        self.format = format;
        self
    }

    pub fn word_tags(mut self, tags: Box<dyn WordTag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn char_ignore(mut self, ignore: Box<dyn CharIgnore>) -> Self {
        self.char_ignore = ignore;
        self
    }

    /// Append a custom character mapper, applied after the built-in folds in
    /// insertion order. Mappers are char-to-char, so the canonical mapping
    /// stays position-aligned.
    pub fn add_mapper(mut self, mapper: Box<dyn CharMapper>) -> Self {
        self.mappers.push(mapper);
        self
    }

    /// Replace the deny-side term lookup. The allow trie is still consulted
    /// for the allow side.
    pub fn word_check(mut self, check: Box<dyn PatternCheck>) -> Self {
        self.word_check = Some(check);
        self
    }

    pub fn num_check(mut self, check: Box<dyn PatternCheck>) -> Self {
        self.num_check = Some(check);
        self
    }

    pub fn email_check(mut self, check: Box<dyn PatternCheck>) -> Self {
        self.email_check = Some(check);
        self
    }

    pub fn url_check(mut self, check: Box<dyn PatternCheck>) -> Self {
        self.url_check = Some(check);
        self
    }

    pub fn ipv4_check(mut self, check: Box<dyn PatternCheck>) -> Self {
        self.ipv4_check = Some(check);
        self
    }

    /// Freeze the configuration. Threshold validation happens here, at
    /// configuration time, not at scan time.
    pub fn build(self) -> Result<FilterConfig, ConfigError> {
        if self.num_threshold == 0 {
            return Err(ConfigError::InvalidThreshold(self.num_threshold));
        }
        Ok(FilterConfig {
            fail_fast: self.fail_fast,
            ignore_case: self.ignore_case,
            ignore_width: self.ignore_width,
            ignore_num_style: self.ignore_num_style,
            ignore_script_variant: self.ignore_script_variant,
            ignore_english_style: self.ignore_english_style,
            ignore_repeat: self.ignore_repeat,
            enable_word_check: self.enable_word_check,
            enable_num_check: self.enable_num_check,
            enable_email_check: self.enable_email_check,
            enable_url_check: self.enable_url_check,
            enable_ipv4_check: self.enable_ipv4_check,
            num_threshold: self.num_threshold,
            deny_source: self.deny_source,
            allow_source: self.allow_source,
            condition: self.condition,
            replace: self.replace,
            format: self.format,
            tags: self.tags,
            char_ignore: self.char_ignore,
            mappers: self.mappers,
            word_check: self.word_check,
            num_check: self.num_check,
            email_check: self.email_check,
            url_check: self.url_check,
            ipv4_check: self.ipv4_check,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = FilterConfig::builder().build().unwrap();
        assert!(!config.fail_fast);
        assert!(config.ignore_case);
        assert!(config.ignore_width);
        assert!(config.ignore_num_style);
        assert!(config.ignore_script_variant);
        assert!(config.ignore_english_style);
        assert!(!config.ignore_repeat);
        assert!(config.enable_word_check);
        assert!(!config.enable_num_check);
        assert!(!config.enable_email_check);
        assert!(!config.enable_url_check);
        assert!(!config.enable_ipv4_check);
        assert_eq!(config.num_threshold, 8);
    }

    #[test]
    fn test_zero_threshold_rejected_at_build_time() {
        let err = FilterConfig::builder().num_threshold(0).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold(0)));
        assert_eq!(
            err.to_string(),
            "invalid numeric threshold: 0 (must be at least 1)"
        );
    }

    #[test]
    fn test_toggle_setters() {
        let config = FilterConfig::builder()
            .fail_fast(true)
            .ignore_case(false)
            .ignore_repeat(true)
            .enable_num_check(true)
            .num_threshold(6)
            .build()
            .unwrap();
        assert!(config.fail_fast);
        assert!(!config.ignore_case);
        assert!(config.ignore_repeat);
        assert!(config.enable_num_check);
        assert_eq!(config.num_threshold, 6);
    }
}
