// Character-level normalization producing a position-aligned canonical mapping
// Fold order is fixed: case -> width -> numeral style -> script variant -> english style -> custom

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::context::FilterConfig;

/// Pluggable character mapper applied after the built-in folds.
/// Mappers are char-to-char so the canonical mapping stays position-aligned.
pub trait CharMapper: Send + Sync {
    fn map(&self, c: char) -> char;
}

/// Table-driven mapper for callers with richer fold tables than the built-ins.
pub struct TableMapper {
    table: HashMap<char, char>,
}

impl TableMapper {
    pub fn new(pairs: impl IntoIterator<Item = (char, char)>) -> Self {
        Self {
            table: pairs.into_iter().collect(),
        }
    }
}

impl CharMapper for TableMapper {
    fn map(&self, c: char) -> char {
        self.table.get(&c).copied().unwrap_or(c)
    }
}

/// Compact traditional -> simplified fold table.
/// Callers needing full coverage supply a `TableMapper` via the config.
const TRAD_TO_SIMP: &[(char, char)] = &[
    ('萬', '万'),
    ('與', '与'),
    ('專', '专'),
    ('業', '业'),
    ('東', '东'),
    ('兩', '两'),
    ('嚴', '严'),
    ('個', '个'),
    ('豐', '丰'),
    ('臨', '临'),
    ('為', '为'),
    ('麗', '丽'),
    ('舉', '举'),
    ('愛', '爱'),
    ('國', '国'),
    ('圖', '图'),
    ('語', '语'),
    ('說', '说'),
    ('讀', '读'),
    ('學', '学'),
    ('錢', '钱'),
    ('車', '车'),
    ('馬', '马'),
    ('門', '门'),
    ('龍', '龙'),
    ('賭', '赌'),
    ('殺', '杀'),
    ('臺', '台'),
    ('灣', '湾'),
    ('體', '体'),
];

fn trad_to_simp_table() -> &'static HashMap<char, char> {
    static TABLE: OnceLock<HashMap<char, char>> = OnceLock::new();
    TABLE.get_or_init(|| TRAD_TO_SIMP.iter().copied().collect())
}

/// Lowercase fold keeping the mapping position-aligned.
/// Multi-char expansions (e.g. ß -> ss) would break alignment, so only the
/// first scalar of the lowercase mapping is used.
fn fold_case(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Fullwidth ASCII forms to their halfwidth counterparts, ideographic space to space.
fn fold_width(c: char) -> char {
    match c {
        '\u{FF01}'..='\u{FF5E}' => {
            char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
        }
        '\u{3000}' => ' ',
        _ => c,
    }
}

/// Numeral-style fold: common digit forms to ASCII.
fn fold_num_style(c: char) -> char {
    let digit = match c {
        '0'..='9' => return c,
        '０'..='９' => c as u32 - '０' as u32,
        '٠'..='٩' => c as u32 - '٠' as u32,
        '۰'..='۹' => c as u32 - '۰' as u32,
        '①'..='⑨' => c as u32 - '①' as u32 + 1,
        '⑴'..='⑼' => c as u32 - '⑴' as u32 + 1,
        '❶'..='❾' => c as u32 - '❶' as u32 + 1,
        _ => return c,
    };
    char::from_u32('0' as u32 + digit).unwrap_or(c)
}

fn fold_script_variant(c: char) -> char {
    trad_to_simp_table().get(&c).copied().unwrap_or(c)
}

/// English-style fold: circled Latin letters to plain Latin.
/// Fullwidth Latin is already handled by the width fold.
fn fold_english_style(c: char) -> char {
    match c {
        '\u{24B6}'..='\u{24CF}' => char::from_u32('A' as u32 + (c as u32 - 0x24B6)).unwrap_or(c),
        '\u{24D0}'..='\u{24E9}' => char::from_u32('a' as u32 + (c as u32 - 0x24D0)).unwrap_or(c),
        _ => c,
    }
}

/// Canonical form of a single character under the configured folds.
/// Pure function of (char, config): same input always yields the same output.
pub fn canonical_char(c: char, config: &FilterConfig) -> char {
    let mut out = c;
    if config.ignore_case {
        out = fold_case(out);
    }
    if config.ignore_width {
        out = fold_width(out);
    }
    if config.ignore_num_style {
        out = fold_num_style(out);
    }
    if config.ignore_script_variant {
        out = fold_script_variant(out);
    }
    if config.ignore_english_style {
        out = fold_english_style(out);
    }
    for mapper in config.mappers() {
        out = mapper.map(out);
    }
    out
}

/// Per-scan view of the input: original characters plus the position-aligned
/// canonical mapping, and a canonical string with per-character byte offsets
/// for byte-oriented pattern rules.
///
/// Invariant: `canon.len() == chars.len()` for every input.
pub struct ScanText {
    chars: Vec<char>,
    canon: Vec<char>,
    canon_str: String,
    // byte offset of each canonical char within canon_str, plus one final
    // entry holding canon_str.len()
    canon_byte: Vec<usize>,
}

impl ScanText {
    pub fn new(text: &str, config: &FilterConfig) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut canon = Vec::with_capacity(chars.len());
        let mut canon_str = String::with_capacity(text.len());
        let mut canon_byte = Vec::with_capacity(chars.len() + 1);

        for &c in &chars {
            let folded = canonical_char(c, config);
            canon_byte.push(canon_str.len());
            canon.push(folded);
            canon_str.push(folded);
        }
        canon_byte.push(canon_str.len());

        Self {
            chars,
            canon,
            canon_str,
            canon_byte,
        }
    }

    /// Number of characters (equals the canonical mapping length).
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn canon(&self) -> &[char] {
        &self.canon
    }

    pub fn canon_str(&self) -> &str {
        &self.canon_str
    }

    /// Byte offset of the canonical character at `pos` within `canon_str`.
    pub fn byte_of(&self, pos: usize) -> usize {
        self.canon_byte[pos]
    }

    /// Convert a byte-length match starting at character `start` back into a
    /// character count. Pattern rules match over `canon_str` bytes; spans are
    /// reported in character positions.
    pub fn char_len_of_bytes(&self, start: usize, byte_len: usize) -> usize {
        let end_byte = self.canon_byte[start] + byte_len;
        let mut pos = start;
        while pos < self.len() && self.canon_byte[pos] < end_byte {
            pos += 1;
        }
        pos - start
    }

    /// Original (pre-normalization) substring for the span `[start, end)`.
    pub fn original_slice(&self, start: usize, end: usize) -> String {
        self.chars[start..end].iter().collect()
    }
}
