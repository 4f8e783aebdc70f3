// Dictionary collaborators: the engine only requires "iterate distinct terms"
// Storage format stays outside the core; a line-oriented file loader covers the CLI

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::Result;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// A dictionary of terms. Implementations own sourcing (memory, files,
/// remote stores); the engine drains them once at construction.
pub trait TermSource: Send + Sync {
    /// The distinct terms of this dictionary.
    fn terms(&self) -> Vec<String>;
}

/// In-memory term collection, deduplicated preserving first-seen order.
pub struct InMemorySource {
    terms: Vec<String>,
}

impl InMemorySource {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut distinct = Vec::new();
        for term in terms {
            let term = term.into();
            if seen.insert(term.clone()) {
                distinct.push(term);
            }
        }
        Self { terms: distinct }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl TermSource for InMemorySource {
    fn terms(&self) -> Vec<String> {
        self.terms.clone()
    }
}

/// Load a dictionary from a line-oriented file: one term per line, trimmed;
/// blank lines and `#` comment lines are skipped; duplicates removed.
pub async fn load_terms_from_file(path: impl AsRef<Path>) -> Result<InMemorySource> {
    let path = path.as_ref();
    let file = File::open(path).await?;
    let mut lines = BufReader::new(file).lines();

    let mut terms = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let term = line.trim();
        if term.is_empty() || term.starts_with('#') {
            continue;
        }
        terms.push(term.to_string());
    }

    let source = InMemorySource::new(terms);
    debug!("Read dictionary file: {}", path.display());
    info!(
        "Loaded {} distinct terms from {}",
        source.len(),
        path.display()
    );
    Ok(source)
}

/// Tags attached to dictionary terms (e.g. category labels).
pub trait WordTag: Send + Sync {
    fn tags(&self, word: &str) -> Vec<String>;
}

/// Default provider: no term carries tags.
pub struct EmptyTags;

impl WordTag for EmptyTags {
    fn tags(&self, _word: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Table-backed tag provider.
pub struct TagTable {
    map: HashMap<String, Vec<String>>,
}

impl TagTable {
    pub fn new(pairs: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            map: pairs.into_iter().collect(),
        }
    }
}

impl WordTag for TagTable {
    fn tags(&self, word: &str) -> Vec<String> {
        self.map.get(word).cloned().unwrap_or_default()
    }
}
