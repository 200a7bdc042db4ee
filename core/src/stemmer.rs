//! Rule-based Amharic affix stripping.

use crate::config::StemmerKind;
use crate::tokenizer::is_index_char;

const PREFIXES: &[&str] = &[
    "በ", "ከ", "ለ", "ወደ", "እኩዴ", "አ", "ተ", "ይ", "እ", "አል", "ም", "የ", "ል", "እን", "ት", "ነ", "ንድ", "አት", "ይህ", "እህ",
    "ተን", "አም", "አን", "በል", "ከም", "አላ", "ዕ", "ምን", "ተአ",
];

const SUFFIXES: &[&str] = &[
    "ች", "ው", "ሮች", "ዎች", "ኔ", "ከ", "እ", "ችው", "ን", "ም", "ት", "ሁ", "ኩ", "ውች", "ያት", "ማ", "ቶች", "ነት", "ዬ", "ኤ", "ቸው",
    "ሆች", "ያ", "ህ", "ሃ", "ንዎች", "ቸ", "ሳ", "ብዎ", "ል", "ኞች", "ሽ", "ዋ", "ሶ", "በት", "ችም", "እት", "ዋት", "ኦች", "ኖች", "እያ",
    "ኧት", "እል", "ልም", "ችዋት", "ቸዋል", "ቸኝ", "ችሁ", "ቸሁ", "ንህ", "ችኋ", "ለት", "ንት", "ንኝ", "ኸ", "ዋቸው", "ያቸው", "ምም",
    "ሳት", "ንኝህ", "ትዎ", "ንኝው", "ቸኝ", "ላት", "ትን", "ንዎ", "ኸኝ", "ዋቸ", "ያትኝ", "ምት", "ሳው", "ትዋ", "ነትም", "ችኝ", "ልኝ",
    "ትኝ",
];

const MAX_PASSES: usize = 2;
const MIN_STEM_CHARS: usize = 2;

pub trait Stem: Send + Sync {
    /// Map a filtered token to its index-term candidate. Never fails.
    fn stem(&self, token: &str) -> String;
}

/// Identity stemming: tokens are indexed as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStemmer;

impl Stem for IdentityStemmer {
    fn stem(&self, token: &str) -> String { token.to_string() }
}

#[derive(Debug, Clone)]
pub struct AffixStemmer {
    prefixes: Vec<&'static str>,
    suffixes: Vec<&'static str>,
}

impl Default for AffixStemmer {
    fn default() -> Self {
        Self { prefixes: PREFIXES.to_vec(), suffixes: SUFFIXES.to_vec() }
    }
}

impl AffixStemmer {
    pub fn new() -> Self { Self::default() }
}

impl Stem for AffixStemmer {
    fn stem(&self, token: &str) -> String {
        let mut stem = token;
        // First listed affix wins, not the longest; a pass with no match ends that side.
        for _ in 0..MAX_PASSES {
            match self.prefixes.iter().find_map(|p| stem.strip_prefix(p)) {
                Some(rest) => stem = rest,
                None => break,
            }
        }
        for _ in 0..MAX_PASSES {
            match self.suffixes.iter().find_map(|s| stem.strip_suffix(s)) {
                Some(rest) => stem = rest,
                None => break,
            }
        }
        if stem.chars().count() < MIN_STEM_CHARS || !stem.chars().all(is_index_char) {
            return token.to_string();
        }
        stem.to_string()
    }
}

pub fn stemmer_for(kind: StemmerKind) -> Box<dyn Stem> {
    match kind {
        StemmerKind::Affix => Box::new(AffixStemmer::new()),
        StemmerKind::Identity => Box::new(IdentityStemmer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_first_listed_prefix_then_suffix() {
        let s = AffixStemmer::new();
        // ው is listed before ችው, so the suffix side takes two single-letter passes.
        assert_eq!(s.stem("በቤታችው"), "ቤታ");
        assert_eq!(s.stem("ተማሪዎች"), "ማሪዎ");
    }

    #[test]
    fn short_results_fall_back_to_the_token() {
        let s = AffixStemmer::new();
        // ለ + ን leaves a single character.
        assert_eq!(s.stem("ለገን"), "ለገን");
        assert_eq!(s.stem("ቤት"), "ቤት");
        assert_eq!(s.stem("ወደቤት"), "ወደቤት");
    }

    #[test]
    fn output_alphabet_is_always_ethiopic() {
        let s = AffixStemmer::new();
        for token in ["የኢትዮጵያውያን", "በአዲስ_አበባ", "ተማሪዎች", "አ", "ለ"] {
            let out = s.stem(token);
            assert!(out.chars().all(is_index_char), "{token} -> {out}");
            assert!(out.chars().count() >= 2 || out == token);
        }
    }

    #[test]
    fn identity_stemmer_returns_input() {
        assert_eq!(stemmer_for(StemmerKind::Identity).stem("በቤት"), "በቤት");
    }
}
