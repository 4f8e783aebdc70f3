// Masking of accepted match spans in the original text
// Spans arrive in ascending order and never overlap (cursor advance guarantees it)

use crate::filter::WordMatch;

/// Produces the replacement text for one matched span.
pub trait ReplaceStrategy: Send + Sync {
    fn replacement(&self, m: &WordMatch) -> String;
}

/// Default strategy: one mask character per original character in the span.
pub struct MaskChar(pub char);

impl Default for MaskChar {
    fn default() -> Self {
        MaskChar('*')
    }
}

impl ReplaceStrategy for MaskChar {
    fn replacement(&self, m: &WordMatch) -> String {
        std::iter::repeat(self.0).take(m.end - m.start).collect()
    }
}

/// Rebuild the text with every matched span replaced. `matches` must be in
/// ascending start order with non-overlapping spans, which is what the scan
/// engine produces.
pub(crate) fn apply(chars: &[char], matches: &[WordMatch], strategy: &dyn ReplaceStrategy) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut pos = 0usize;
    for m in matches {
        out.extend(&chars[pos..m.start]);
        out.push_str(&strategy.replacement(m));
        pos = m.end;
    }
    out.extend(&chars[pos..]);
    out
}
