// Single-pass cursor loop shared by both termination modes
// Arbitration per position: allow length vs deny length, ties favor allow

use tracing::debug;

use crate::filter::normalize::ScanText;
use crate::filter::{Filter, ScanMode, WordMatch};

/// Run the scan loop over `text`. One loop body serves both modes; only the
/// early break differs. Accepted matches accumulate in ascending start
/// order.
///
/// Cursor rules, per iteration at position `i`:
/// - deny wins (`allow_len < deny_len`): the candidate `[i, i + deny_len)`
///   goes to the result condition, and the cursor advances by `deny_len`
///   whether or not the condition accepted it;
/// - otherwise: advance by `max(allow_len, 1)`; an allow hit skips the
///   whole allowed span, no hit advances one character.
///
/// Every iteration advances at least one position, so the loop performs at
/// most `text.len()` iterations.
pub(crate) fn scan(filter: &Filter, text: &str, mode: ScanMode) -> Vec<WordMatch> {
    let mut results = Vec::new();
    if text.is_empty() {
        return results;
    }

    let scan_text = ScanText::new(text, &filter.config);
    let len = scan_text.len();
    debug!("Scanning {} characters", len);

    let mut i = 0usize;
    while i < len {
        let outcome = filter.checks.check_at(i, &scan_text, &filter.config);

        if outcome.allow_len < outcome.deny_len {
            let candidate = WordMatch {
                start: i,
                end: i + outcome.deny_len,
                match_type: outcome.match_type,
                text: scan_text.original_slice(i, i + outcome.deny_len),
            };
            if filter
                .config
                .condition
                .accept(&candidate, &scan_text, mode, &filter.config)
            {
                results.push(candidate);
                if mode == ScanMode::FailFast {
                    break;
                }
            }
            // rejected candidates advance the cursor too: the condition
            // filters results, it does not re-open the span for rescanning
            i += outcome.deny_len;
        } else {
            i += outcome.allow_len.max(1);
        }
    }

    debug!("Scan complete: {} matches", results.len());
    results
}
