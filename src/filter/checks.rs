// Per-position capability dispatch: term, numeric run, email, URL, IPv4
// Structural rules are anchored regex-automata searches over the canonical string

use std::sync::Arc;

use anyhow::Result;
use regex_automata::{meta::Regex, Anchored, Input};

use crate::context::FilterConfig;
use crate::filter::normalize::ScanText;
use crate::filter::trie::TermTrie;
use crate::filter::MatchType;

/// One capability: given a cursor position, the scan text, and the config,
/// report the matched deny length or 0.
pub trait PatternCheck: Send + Sync {
    fn check_at(&self, position: usize, text: &ScanText, config: &FilterConfig) -> usize;
}

/// Bundled result of querying every enabled capability at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    pub allow_len: usize,
    pub deny_len: usize,
    pub match_type: MatchType,
}

/// Deny-side term lookup backed by the deny trie.
pub struct TermDenyCheck {
    trie: Arc<TermTrie>,
}

impl TermDenyCheck {
    pub fn new(trie: Arc<TermTrie>) -> Self {
        Self { trie }
    }
}

impl PatternCheck for TermDenyCheck {
    fn check_at(&self, position: usize, text: &ScanText, config: &FilterConfig) -> usize {
        self.trie.longest_match_at(text, position, config)
    }
}

/// Maximal digit run starting at the position, flagged only when the run
/// reaches the configured threshold. Runs over canonical characters, so
/// numeral-style folding widens what counts as a digit.
pub struct NumericRunCheck;

impl PatternCheck for NumericRunCheck {
    fn check_at(&self, position: usize, text: &ScanText, config: &FilterConfig) -> usize {
        let canon = text.canon();
        let mut end = position;
        while end < canon.len() && canon[end].is_ascii_digit() {
            end += 1;
        }
        let run = end - position;
        if run >= config.num_threshold {
            run
        } else {
            0
        }
    }
}

const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+";

const URL_PATTERN: &str =
    r"(https?://|ftp://)?([A-Za-z0-9-]+\.)+[A-Za-z]{2,6}(:[0-9]{1,5})?(/[!-~]*)?";

const IPV4_PATTERN: &str = r"[0-9]{1,3}(\.[0-9]{1,3}){3}";

/// Anchored search at the character position; returns the match length in
/// characters (patterns run over canonical bytes, spans are reported in
/// character positions).
fn anchored_char_len(re: &Regex, position: usize, text: &ScanText) -> usize {
    let input = Input::new(text.canon_str())
        .range(text.byte_of(position)..)
        .anchored(Anchored::Yes);
    match re.find(input) {
        Some(m) => text.char_len_of_bytes(position, m.end() - m.start()),
        None => 0,
    }
}

pub struct EmailCheck {
    re: Regex,
}

impl EmailCheck {
    pub fn new() -> Result<Self> {
        Ok(Self {
            re: Regex::new(EMAIL_PATTERN)?,
        })
    }
}

impl PatternCheck for EmailCheck {
    fn check_at(&self, position: usize, text: &ScanText, _config: &FilterConfig) -> usize {
        anchored_char_len(&self.re, position, text)
    }
}

pub struct UrlCheck {
    re: Regex,
}

impl UrlCheck {
    pub fn new() -> Result<Self> {
        Ok(Self {
            re: Regex::new(URL_PATTERN)?,
        })
    }
}

impl PatternCheck for UrlCheck {
    fn check_at(&self, position: usize, text: &ScanText, _config: &FilterConfig) -> usize {
        anchored_char_len(&self.re, position, text)
    }
}

pub struct Ipv4Check {
    re: Regex,
}

impl Ipv4Check {
    pub fn new() -> Result<Self> {
        Ok(Self {
            re: Regex::new(IPV4_PATTERN)?,
        })
    }
}

impl PatternCheck for Ipv4Check {
    fn check_at(&self, position: usize, text: &ScanText, _config: &FilterConfig) -> usize {
        let start_byte = text.byte_of(position);
        let input = Input::new(text.canon_str())
            .range(start_byte..)
            .anchored(Anchored::Yes);
        let m = match self.re.find(input) {
            Some(m) => m,
            None => return 0,
        };
        let matched = &text.canon_str()[m.start()..m.end()];
        // dotted-quad shape alone is not enough: octets must fit in 0..=255
        // and the run must not continue with more digits
        let octets_valid = matched
            .split('.')
            .all(|octet| octet.parse::<u32>().map(|v| v <= 255).unwrap_or(false));
        if !octets_valid {
            return 0;
        }
        if text.canon_str()[m.end()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit())
        {
            return 0;
        }
        text.char_len_of_bytes(position, m.end() - m.start())
    }
}

/// Composite queried once per cursor position.
///
/// The allow length comes from the allow trie alone and is computed once;
/// it suppresses whichever deny capability wins, so the whitelist can
/// override structural hits as well as term hits.
///
/// Deny arbitration is a strict priority order: term > numeric > email >
/// URL > IPv4. The highest-priority enabled capability reporting a non-zero
/// length wins outright; match length would only break a tie between
/// candidates of equal priority, which cannot occur for the built-in set.
pub struct CheckSet {
    allow: Option<Arc<TermTrie>>,
    deny_checks: Vec<(MatchType, Box<dyn PatternCheck>)>,
}

impl CheckSet {
    /// Assemble the enabled capabilities, honoring per-capability overrides
    /// from the config. Overrides are moved out of the config here.
    pub fn build(
        config: &mut FilterConfig,
        deny: Arc<TermTrie>,
        allow: Arc<TermTrie>,
    ) -> Result<Self> {
        let mut deny_checks: Vec<(MatchType, Box<dyn PatternCheck>)> = Vec::new();

        if config.enable_word_check {
            let check: Box<dyn PatternCheck> = match config.word_check.take() {
                Some(custom) => custom,
                None => Box::new(TermDenyCheck::new(deny)),
            };
            deny_checks.push((MatchType::Term, check));
        }
        if config.enable_num_check {
            let check = match config.num_check.take() {
                Some(custom) => custom,
                None => Box::new(NumericRunCheck) as Box<dyn PatternCheck>,
            };
            deny_checks.push((MatchType::Numeric, check));
        }
        if config.enable_email_check {
            let check = match config.email_check.take() {
                Some(custom) => custom,
                None => Box::new(EmailCheck::new()?) as Box<dyn PatternCheck>,
            };
            deny_checks.push((MatchType::Email, check));
        }
        if config.enable_url_check {
            let check = match config.url_check.take() {
                Some(custom) => custom,
                None => Box::new(UrlCheck::new()?) as Box<dyn PatternCheck>,
            };
            deny_checks.push((MatchType::Url, check));
        }
        if config.enable_ipv4_check {
            let check = match config.ipv4_check.take() {
                Some(custom) => custom,
                None => Box::new(Ipv4Check::new()?) as Box<dyn PatternCheck>,
            };
            deny_checks.push((MatchType::Ipv4, check));
        }

        let allow = if config.enable_word_check {
            Some(allow)
        } else {
            None
        };

        Ok(Self { allow, deny_checks })
    }

    pub fn check_at(&self, position: usize, text: &ScanText, config: &FilterConfig) -> CheckOutcome {
        let allow_len = self
            .allow
            .as_ref()
            .map(|trie| trie.longest_match_at(text, position, config))
            .unwrap_or(0);

        for (match_type, check) in &self.deny_checks {
            let deny_len = check.check_at(position, text, config);
            if deny_len > 0 {
                return CheckOutcome {
                    allow_len,
                    deny_len,
                    match_type: *match_type,
                };
            }
        }

        CheckOutcome {
            allow_len,
            deny_len: 0,
            match_type: MatchType::Term,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FilterConfig;

    fn scan(text: &str, config: &FilterConfig) -> ScanText {
        ScanText::new(text, config)
    }

    fn build_checks(
        config: &mut FilterConfig,
        deny: &[&str],
        allow: &[&str],
    ) -> CheckSet {
        let deny = Arc::new(TermTrie::from_terms(deny.iter().copied(), config));
        let allow = Arc::new(TermTrie::from_terms(allow.iter().copied(), config));
        CheckSet::build(config, deny, allow).unwrap()
    }

    #[test]
    fn test_numeric_run_threshold_boundary() {
        let config = FilterConfig::builder()
            .enable_num_check(true)
            .num_threshold(6)
            .build()
            .unwrap();
        let check = NumericRunCheck;

        let hit = scan("call 123456 now", &config);
        assert_eq!(check.check_at(5, &hit, &config), 6);

        let miss = scan("call 12345 now", &config);
        assert_eq!(check.check_at(5, &miss, &config), 0);
    }

    #[test]
    fn test_numeric_run_counts_folded_digits() {
        let config = FilterConfig::builder()
            .enable_num_check(true)
            .num_threshold(6)
            .build()
            .unwrap();
        let check = NumericRunCheck;
        // fullwidth and circled digits fold to ASCII before the run scan
        let text = scan("１２３45⑥", &config);
        assert_eq!(check.check_at(0, &text, &config), 6);
    }

    #[test]
    fn test_email_check_at_position() {
        let config = FilterConfig::builder().build().unwrap();
        let check = EmailCheck::new().unwrap();
        let text = scan("mail me: user@example.com please", &config);
        assert_eq!(check.check_at(9, &text, &config), 16);
        assert_eq!(check.check_at(0, &text, &config), 0);
    }

    #[test]
    fn test_url_check_matches_bare_domain_and_scheme() {
        let config = FilterConfig::builder().build().unwrap();
        let check = UrlCheck::new().unwrap();

        let bare = scan("see example.com for more", &config);
        assert_eq!(check.check_at(4, &bare, &config), 11);

        let schemed = scan("https://example.com/a/b", &config);
        assert_eq!(check.check_at(0, &schemed, &config), 23);
    }

    #[test]
    fn test_ipv4_check_validates_octets() {
        let config = FilterConfig::builder().build().unwrap();
        let check = Ipv4Check::new().unwrap();

        let valid = scan("host 192.168.0.1 up", &config);
        assert_eq!(check.check_at(5, &valid, &config), 11);

        let invalid = scan("host 999.168.0.1 up", &config);
        assert_eq!(check.check_at(5, &invalid, &config), 0);

        // run continuing with more digits is not an address
        let overrun = scan("1.2.3.45678", &config);
        assert_eq!(check.check_at(0, &overrun, &config), 0);
    }

    #[test]
    fn test_priority_term_beats_numeric() {
        let mut config = FilterConfig::builder()
            .enable_num_check(true)
            .num_threshold(6)
            .build()
            .unwrap();
        let checks = build_checks(&mut config, &["123"], &[]);
        let text = scan("123456789", &config);

        // the term capability outranks the longer numeric run
        let outcome = checks.check_at(0, &text, &config);
        assert_eq!(outcome.match_type, MatchType::Term);
        assert_eq!(outcome.deny_len, 3);
    }

    #[test]
    fn test_priority_numeric_beats_email() {
        let mut config = FilterConfig::builder()
            .enable_word_check(false)
            .enable_num_check(true)
            .enable_email_check(true)
            .num_threshold(6)
            .build()
            .unwrap();
        let checks = build_checks(&mut config, &[], &[]);
        let text = scan("123456789@qq.com", &config);

        let outcome = checks.check_at(0, &text, &config);
        assert_eq!(outcome.match_type, MatchType::Numeric);
        assert_eq!(outcome.deny_len, 9);
    }

    #[test]
    fn test_priority_email_beats_url() {
        let mut config = FilterConfig::builder()
            .enable_word_check(false)
            .enable_email_check(true)
            .enable_url_check(true)
            .build()
            .unwrap();
        let checks = build_checks(&mut config, &[], &[]);
        let text = scan("user@example.com", &config);

        let outcome = checks.check_at(0, &text, &config);
        assert_eq!(outcome.match_type, MatchType::Email);
    }

    #[test]
    fn test_allow_len_reported_alongside_structural_deny() {
        let mut config = FilterConfig::builder()
            .enable_num_check(true)
            .num_threshold(6)
            .build()
            .unwrap();
        let checks = build_checks(&mut config, &[], &["123456"]);
        let text = scan("123456", &config);

        let outcome = checks.check_at(0, &text, &config);
        assert_eq!(outcome.deny_len, 6);
        assert_eq!(outcome.match_type, MatchType::Numeric);
        assert_eq!(outcome.allow_len, 6);
    }

    #[test]
    fn test_disabled_capabilities_report_nothing() {
        let mut config = FilterConfig::builder()
            .enable_word_check(false)
            .build()
            .unwrap();
        let checks = build_checks(&mut config, &["bomb"], &[]);
        let text = scan("bomb 123456789 a@b.cn 1.2.3.4", &config);

        for i in 0..text.len() {
            let outcome = checks.check_at(i, &text, &config);
            assert_eq!(outcome.deny_len, 0, "position {i} should report nothing");
        }
    }
}
