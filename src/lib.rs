pub mod context;
pub mod dictionary;
pub mod filter;

// Re-export main types for convenient access
pub use context::{ConfigError, FilterConfig, FilterConfigBuilder};
pub use filter::{Filter, MatchType, ScanMode, WordMatch};

// Re-export dictionary collaborators
pub use dictionary::{load_terms_from_file, InMemorySource, TermSource};

// Re-export the pluggable strategy surface
pub use filter::checks::PatternCheck;
pub use filter::condition::{AcceptAll, EnglishWordBoundary, ResultCondition};
pub use filter::normalize::{CharMapper, ScanText, TableMapper};
pub use filter::replace::{MaskChar, ReplaceStrategy};
pub use filter::trie::{CharIgnore, IgnoreChars};
