//! Fixed Amharic lexical tables consumed by the normalizer.
//!
//! The tables are plain data; [`crate::normalize::Normalizer`] compiles them once
//! into lookup structures. [`Lexicon::empty`] gives a normalizer that only does the
//! script-level steps (markup, script filter, punctuation, numerals, whitespace).

/// Multi-word expressions joined into single tokens before punctuation is stripped.
const PHRASES: &[(&str, &str)] = &[
    ("አዲስ አበባ", "አዲስ_አበባ"),
    ("መጽሐፍ ቤት", "መጽሐፍ_ቤት"),
    ("ኮቪድ 19", "ኮቪድ19"),
    ("510 B.C.", "510_B_C"),
    ("ዩ.ኤስ.ኤ", "ዩኤስኤ"),
];

const PUNCTUATION: &[char] = &[
    '፠', '፡', '።', '፣', '፤', '፥', '፦', '፧', ',', '.', ':', ';', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\'',
];

/// Terms whose dots carry meaning; their `.` becomes `_` instead of a space.
const PUNCTUATION_EXCEPTIONS: &[&str] = &["ዶትኮም"];

/// Hyphenated terms kept whole; their `-` becomes `_`.
const HYPHEN_EXCEPTIONS: &[&str] = &["ኮቪድ19", "ኤምኤስ_ዶስ"];

/// Preferred term followed by its used-for variants.
const THESAURUS: &[(&str, &[&str])] = &[
    ("ተሽከርካሪ", &["አውቶሞቢል", "መኪና", "ተሽከርካሪ ሞተር", "ተሽከርካሪ መንገድ"]),
    ("መኪና", &["አውቶሞቢል", "መኪና ተሳፋሪ", "ሴዳን"]),
    ("መኪና ጭነት", &["ትራክ", "መኪና ሸክም"]),
    ("መጓጓዣ", &["ትራንስፖርት"]),
    ("መንገድ ትራንስፖርት", &["የመንገድ መጓጓዣ"]),
];

/// Historically distinct letters folded onto one canonical form.
const CHAR_PAIRS: &[(char, char)] = &[
    ('ዐ', 'አ'), ('ዑ', 'ኡ'), ('ዒ', 'ኢ'), ('ዓ', 'ኣ'), ('ዔ', 'ኤ'), ('ዕ', 'እ'), ('ዖ', 'ኦ'),
    ('ሀ', 'ሐ'), ('ሁ', 'ሑ'), ('ሂ', 'ሒ'), ('ሃ', 'ሓ'), ('ሄ', 'ሔ'), ('ህ', 'ሕ'), ('ሆ', 'ሖ'),
    ('ሰ', 'ሠ'), ('ሱ', 'ሡ'), ('ሲ', 'ሢ'), ('ሳ', 'ሣ'), ('ሴ', 'ሤ'), ('ስ', 'ሥ'), ('ሶ', 'ሦ'),
    ('ጸ', 'ፀ'), ('ጹ', 'ፁ'), ('ጺ', 'ፂ'), ('ጻ', 'ፃ'), ('ጼ', 'ፄ'), ('ጽ', 'ፅ'), ('ጾ', 'ፆ'),
];

/// Irregular spellings and their canonical form.
const VARIANTS: &[(&str, &str)] = &[
    ("ቤዯት", "ቤት"),
    ("ላንተ", "ለአንተ"),
    ("ላንቺ", "ለአኩቺ"),
    ("ለን", "ለኔ"),
    ("እንዴ", "እኩዴ"),
    ("ወዯዘሪት", "ወዯሮ"),
    ("መጽሀፍ", "መጽሐፍ"),
    ("አንቺ", "አኩች"),
    ("ለካ", "ለአኩተ"),
    ("ቤትን", "ቤት"),
    ("ያለ", "እለ"),
    ("እኔን", "እኔ"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThesaurusEntry {
    pub preferred: String,
    pub used_for: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    pub phrases: Vec<(String, String)>,
    pub punctuation: Vec<char>,
    pub punctuation_exceptions: Vec<String>,
    pub hyphen_exceptions: Vec<String>,
    pub thesaurus: Vec<ThesaurusEntry>,
    pub char_pairs: Vec<(char, char)>,
    pub variants: Vec<(String, String)>,
}

impl Lexicon {
    pub fn amharic() -> Self {
        let owned = |pairs: &[(&str, &str)]| -> Vec<(String, String)> {
            pairs.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
        };
        Self {
            phrases: owned(PHRASES),
            punctuation: PUNCTUATION.to_vec(),
            punctuation_exceptions: PUNCTUATION_EXCEPTIONS.iter().map(|s| s.to_string()).collect(),
            hyphen_exceptions: HYPHEN_EXCEPTIONS.iter().map(|s| s.to_string()).collect(),
            thesaurus: THESAURUS
                .iter()
                .map(|(preferred, used_for)| ThesaurusEntry {
                    preferred: preferred.to_string(),
                    used_for: used_for.iter().map(|s| s.to_string()).collect(),
                })
                .collect(),
            char_pairs: CHAR_PAIRS.to_vec(),
            variants: owned(VARIANTS),
        }
    }

    /// No phrase, thesaurus, folding or variant tables; punctuation is still split.
    pub fn empty() -> Self {
        Self { punctuation: PUNCTUATION.to_vec(), ..Self::default() }
    }
}
