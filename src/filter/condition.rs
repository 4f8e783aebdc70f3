// Accept/reject predicate applied to every candidate before it is recorded
// The condition filters results; it never alters cursor traversal

use crate::context::FilterConfig;
use crate::filter::normalize::ScanText;
use crate::filter::{MatchType, ScanMode, WordMatch};

/// Pure predicate over a candidate match. Receives the caller's actual
/// termination mode so mode-sensitive policies observe what the caller
/// requested.
pub trait ResultCondition: Send + Sync {
    fn accept(
        &self,
        candidate: &WordMatch,
        text: &ScanText,
        mode: ScanMode,
        config: &FilterConfig,
    ) -> bool;
}

/// Default policy: every candidate is accepted.
pub struct AcceptAll;

impl ResultCondition for AcceptAll {
    fn accept(
        &self,
        _candidate: &WordMatch,
        _text: &ScanText,
        _mode: ScanMode,
        _config: &FilterConfig,
    ) -> bool {
        true
    }
}

/// Rejects a pure-ASCII-letter term match embedded inside a larger ASCII
/// word, so deny `av` does not fire inside `have`. Non-term candidates and
/// terms containing any non-ASCII-letter character pass through untouched.
pub struct EnglishWordBoundary;

impl ResultCondition for EnglishWordBoundary {
    fn accept(
        &self,
        candidate: &WordMatch,
        text: &ScanText,
        _mode: ScanMode,
        _config: &FilterConfig,
    ) -> bool {
        if candidate.match_type != MatchType::Term {
            return true;
        }
        let canon = text.canon();
        let span = &canon[candidate.start..candidate.end];
        if !span.iter().all(|c| c.is_ascii_alphabetic()) {
            return true;
        }
        let boundary_before =
            candidate.start == 0 || !canon[candidate.start - 1].is_ascii_alphabetic();
        let boundary_after =
            candidate.end >= canon.len() || !canon[candidate.end].is_ascii_alphabetic();
        boundary_before && boundary_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FilterConfig;

    fn candidate(start: usize, end: usize, text: &ScanText) -> WordMatch {
        WordMatch {
            start,
            end,
            match_type: MatchType::Term,
            text: text.original_slice(start, end),
        }
    }

    #[test]
    fn test_accept_all_accepts_everything() {
        let config = FilterConfig::builder().build().unwrap();
        let text = ScanText::new("anything", &config);
        let m = candidate(0, 3, &text);
        assert!(AcceptAll.accept(&m, &text, ScanMode::CollectAll, &config));
        assert!(AcceptAll.accept(&m, &text, ScanMode::FailFast, &config));
    }

    #[test]
    fn test_english_word_boundary_rejects_embedded_term() {
        let config = FilterConfig::builder().build().unwrap();
        let text = ScanText::new("have", &config);
        // "av" inside "have"
        let m = candidate(1, 3, &text);
        assert!(!EnglishWordBoundary.accept(&m, &text, ScanMode::CollectAll, &config));
    }

    #[test]
    fn test_english_word_boundary_accepts_standalone_term() {
        let config = FilterConfig::builder().build().unwrap();
        let text = ScanText::new("an av file", &config);
        let m = candidate(3, 5, &text);
        assert!(EnglishWordBoundary.accept(&m, &text, ScanMode::CollectAll, &config));
    }

    #[test]
    fn test_english_word_boundary_ignores_non_ascii_terms() {
        let config = FilterConfig::builder().build().unwrap();
        let text = ScanText::new("abc敏感词xyz", &config);
        let m = candidate(3, 6, &text);
        assert!(EnglishWordBoundary.accept(&m, &text, ScanMode::CollectAll, &config));
    }

    #[test]
    fn test_english_word_boundary_ignores_structural_matches() {
        let config = FilterConfig::builder().build().unwrap();
        let text = ScanText::new("x123456x", &config);
        let m = WordMatch {
            start: 1,
            end: 7,
            match_type: MatchType::Numeric,
            text: text.original_slice(1, 7),
        };
        assert!(EnglishWordBoundary.accept(&m, &text, ScanMode::CollectAll, &config));
    }
}
