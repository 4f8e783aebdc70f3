// Prefix tree over canonical characters with greedy longest-match lookup
// Built once per dictionary at Filter construction, read-only afterwards

use std::collections::{HashMap, HashSet};

use crate::context::FilterConfig;
use crate::filter::normalize::{canonical_char, ScanText};

/// Characters the trie walk may step over without consuming an edge.
/// Skipped characters still count toward the reported original-text span.
pub trait CharIgnore: Send + Sync {
    fn is_ignored(&self, c: char) -> bool;
}

/// Default ignorable set: nothing is ignored.
pub struct NoIgnoredChars;

impl CharIgnore for NoIgnoredChars {
    fn is_ignored(&self, _c: char) -> bool {
        false
    }
}

/// Explicit ignorable character set (e.g. separators like `*` or `|`
/// wedged between dictionary-term characters).
pub struct IgnoreChars {
    set: HashSet<char>,
}

impl IgnoreChars {
    pub fn new(chars: impl IntoIterator<Item = char>) -> Self {
        Self {
            set: chars.into_iter().collect(),
        }
    }
}

impl CharIgnore for IgnoreChars {
    fn is_ignored(&self, c: char) -> bool {
        self.set.contains(&c)
    }
}

#[derive(Default)]
struct TrieNode {
    children: HashMap<char, TrieNode>,
    // terminal marker carrying the original dictionary term
    term: Option<String>,
}

/// Prefix tree over canonical characters. Terms are canonicalized through the
/// same fold pipeline the scan text goes through, so lookup compares like
/// with like. Strictly acyclic by construction: nodes are only ever created
/// as children of existing nodes.
#[derive(Default)]
pub struct TermTrie {
    root: TrieNode,
    term_count: usize,
}

impl TermTrie {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a trie from an iterator of distinct terms.
    pub fn from_terms<I, S>(terms: I, config: &FilterConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = Self::new();
        for term in terms {
            trie.insert(term.as_ref(), config);
        }
        trie
    }

    /// Insert one term. Empty terms are ignored; duplicate insertion is
    /// idempotent. When two distinct originals share a canonical path the
    /// first insertion's original is kept as the terminal marker.
    pub fn insert(&mut self, term: &str, config: &FilterConfig) {
        if term.is_empty() {
            return;
        }
        let mut node = &mut self.root;
        for c in term.chars() {
            let folded = canonical_char(c, config);
            node = node.children.entry(folded).or_default();
        }
        if node.term.is_none() {
            node.term = Some(term.to_string());
            self.term_count += 1;
        }
    }

    /// Number of terminal nodes.
    pub fn len(&self) -> usize {
        self.term_count
    }

    pub fn is_empty(&self) -> bool {
        self.term_count == 0
    }

    /// Greedy longest match starting at `position` over the canonical
    /// mapping: walks the trie and returns the span (in original character
    /// positions) of the last terminal reached, or 0 if none was reached.
    ///
    /// Two skip rules extend a span without consuming trie edges, never on
    /// the first character of a walk:
    /// - ignorable characters (`CharIgnore`) are stepped over silently;
    ///   trailing ignorables after a terminal are not absorbed;
    /// - with `ignore_repeat`, a character repeating the previously consumed
    ///   canonical character is stepped over, and trailing repeats after a
    ///   terminal extend the reported span.
    pub fn longest_match_at(
        &self,
        text: &ScanText,
        position: usize,
        config: &FilterConfig,
    ) -> usize {
        let canon = text.canon();
        let mut node = &self.root;
        let mut best = 0usize;
        let mut prev: Option<char> = None;
        let mut i = position;

        while i < canon.len() {
            let c = canon[i];
            if i > position {
                if config.char_ignore().is_ignored(c) {
                    i += 1;
                    continue;
                }
                if config.ignore_repeat && prev == Some(c) {
                    i += 1;
                    if node.term.is_some() {
                        best = i - position;
                    }
                    continue;
                }
            }
            match node.children.get(&c) {
                Some(next) => {
                    node = next;
                    prev = Some(c);
                    i += 1;
                    if node.term.is_some() {
                        best = i - position;
                    }
                }
                None => break,
            }
        }

        best
    }
}
