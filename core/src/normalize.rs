//! Script-aware text normalization applied identically to documents and queries.

use crate::lexicon::Lexicon;
use crate::tokenizer::is_index_char;
use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;
use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref LATIN_DIGITS: Regex = Regex::new(r"\b[0-9]+\b").expect("valid regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// Upper bound on full passes while waiting for the output to stop changing.
const MAX_PASSES: usize = 4;

const ETHIOPIC_NUMERALS: std::ops::RangeInclusive<char> = '\u{1369}'..='\u{137C}';

/// Compiled form of a [`Lexicon`].
pub struct Normalizer {
    /// One pattern per phrase spelling, longest first.
    phrases: Vec<(Regex, String)>,
    punctuation: HashSet<char>,
    punctuation_exceptions: Vec<(String, String)>,
    hyphen_exceptions: Vec<(String, String)>,
    thesaurus: Option<Replacer>,
    folding: HashMap<char, char>,
    variants: Option<Replacer>,
}

/// Substring replacement over a fixed table. At each position the longest key wins.
struct Replacer {
    pattern: Regex,
    table: HashMap<String, String>,
}

impl Replacer {
    fn new(table: HashMap<String, String>) -> Option<Self> {
        let mut keys: Vec<&str> = table.keys().map(String::as_str).filter(|k| !k.is_empty()).collect();
        if keys.is_empty() {
            return None;
        }
        keys.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));
        let alternation = keys.iter().map(|k| regex::escape(k)).collect::<Vec<_>>().join("|");
        let pattern = Regex::new(&alternation).ok()?;
        Some(Self { pattern, table })
    }

    fn replace(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &regex::Captures| {
                self.table.get(&caps[0]).cloned().unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

impl Normalizer {
    pub fn new(lexicon: &Lexicon) -> Self {
        let folding: HashMap<char, char> = lexicon.char_pairs.iter().copied().collect();
        let fold = |s: &str| -> String { s.chars().map(|c| *folding.get(&c).unwrap_or(&c)).collect() };

        // Letter-folded spellings are registered too, so a phrase exposed by folding still joins.
        let mut phrase_keys: Vec<(String, String)> = Vec::new();
        for (phrase, joined) in &lexicon.phrases {
            let spaced = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
            if spaced.is_empty() {
                continue;
            }
            let folded = fold(&spaced);
            if folded != spaced {
                phrase_keys.push((folded, joined.clone()));
            }
            phrase_keys.push((spaced, joined.clone()));
        }
        phrase_keys.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()).then_with(|| a.0.cmp(&b.0)));
        phrase_keys.dedup_by(|a, b| a.0 == b.0);
        let phrases = phrase_keys
            .into_iter()
            .filter_map(|(phrase, joined)| {
                let pattern = phrase.split(' ').map(regex::escape).collect::<Vec<_>>().join(r"\s+");
                Regex::new(&pattern).ok().map(|re| (re, joined))
            })
            .collect();

        let thesaurus = Replacer::new(compile_thesaurus(lexicon, &fold));

        let variants = Replacer::new(
            lexicon
                .variants
                .iter()
                .map(|(variant, canonical)| (fold(variant), fold(canonical)))
                .filter(|(variant, canonical)| variant != canonical)
                .collect(),
        );

        let protect = |terms: &[String], mark: char| -> Vec<(String, String)> {
            terms.iter().map(|t| (t.clone(), t.replace(mark, "_"))).filter(|(a, b)| a != b).collect()
        };

        Self {
            phrases,
            punctuation: lexicon.punctuation.iter().copied().collect(),
            punctuation_exceptions: protect(&lexicon.punctuation_exceptions, '.'),
            hyphen_exceptions: protect(&lexicon.hyphen_exceptions, '-'),
            thesaurus,
            folding,
            variants,
        }
    }

    /// Normalize raw document or query text. Re-normalizing the output is a no-op.
    pub fn normalize(&self, text: &str) -> String {
        let mut current = self.pass(text);
        for _ in 1..MAX_PASSES {
            let next = self.pass(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn pass(&self, text: &str) -> String {
        let text: String = text.nfc().collect();
        let text = strip_markup(&text);
        let text = self.join_phrases(&text);
        let text: String = text.chars().filter(|&c| is_index_char(c) || c.is_whitespace()).collect();
        let text = self.strip_punctuation(text);
        let text = strip_numerals(&text);
        let text = WHITESPACE.replace_all(&text, " ").trim().to_string();
        let text = self.split_hyphens(text);
        let text = self.fold_thesaurus(&text);
        let text = self.fold_characters(&text);
        self.correct_variants(&text)
    }

    /// Longer phrases claim their span first; a shorter phrase overlapping it is left
    /// alone. A match touching `_` is part of an earlier join and is not extended.
    fn join_phrases(&self, text: &str) -> String {
        let mut spans: Vec<(usize, usize, &str)> = Vec::new();
        for (re, joined) in &self.phrases {
            for m in re.find_iter(text) {
                let glued = text[..m.start()].ends_with('_') || text[m.end()..].starts_with('_');
                let overlaps = spans.iter().any(|&(s, e, _)| m.start() < e && s < m.end());
                if !glued && !overlaps {
                    spans.push((m.start(), m.end(), joined.as_str()));
                }
            }
        }
        if spans.is_empty() {
            return text.to_string();
        }
        spans.sort_by_key(|&(start, _, _)| start);
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for (start, end, joined) in spans {
            out.push_str(&text[last..start]);
            out.push_str(joined);
            last = end;
        }
        out.push_str(&text[last..]);
        out
    }

    fn strip_punctuation(&self, mut text: String) -> String {
        for (term, protected) in &self.punctuation_exceptions {
            text = text.replace(term.as_str(), protected);
        }
        text.chars().map(|c| if self.punctuation.contains(&c) { ' ' } else { c }).collect()
    }

    fn split_hyphens(&self, mut text: String) -> String {
        for (term, protected) in &self.hyphen_exceptions {
            text = text.replace(term.as_str(), protected);
        }
        text.replace('-', " ")
    }

    /// Replaces used-for terms wherever they occur, affixed forms included. Keys are
    /// letter-folded, so the text is folded before matching.
    fn fold_thesaurus(&self, text: &str) -> String {
        let folded = self.fold_characters(text);
        match &self.thesaurus {
            Some(thesaurus) => thesaurus.replace(&folded),
            None => folded,
        }
    }

    fn fold_characters(&self, text: &str) -> String {
        text.chars().map(|c| *self.folding.get(&c).unwrap_or(&c)).collect()
    }

    fn correct_variants(&self, text: &str) -> String {
        match &self.variants {
            Some(variants) => variants.replace(text),
            None => text.to_string(),
        }
    }
}

/// Builds the folded variant -> preferred table. When two entries list the same
/// variant the first one wins, and chains resolve to the final preferred term.
/// Preferred terms map onto themselves, so a preferred term containing a variant
/// (e.g. a multi-word term starting with one) is matched whole and never rewritten.
fn compile_thesaurus(lexicon: &Lexicon, fold: &dyn Fn(&str) -> String) -> HashMap<String, String> {
    let key = |term: &str| -> String { term.split_whitespace().map(|t| fold(t)).collect::<Vec<_>>().join(" ") };

    let mut direct: HashMap<String, String> = HashMap::new();
    for entry in &lexicon.thesaurus {
        let preferred = key(&entry.preferred);
        for variant in &entry.used_for {
            let k = key(variant);
            if k.is_empty() || k == preferred {
                continue;
            }
            direct.entry(k).or_insert_with(|| preferred.clone());
        }
    }

    let resolve = |preferred: &str| -> String {
        let mut current = preferred.to_string();
        let mut seen: HashSet<String> = HashSet::new();
        while let Some(next) = direct.get(&current) {
            if !seen.insert(current.clone()) {
                break;
            }
            current = next.clone();
        }
        current
    };

    let mut table: HashMap<String, String> = direct.iter().map(|(variant, preferred)| (variant.clone(), resolve(preferred))).collect();
    for entry in &lexicon.thesaurus {
        let k = key(&entry.preferred);
        if !k.is_empty() {
            table.entry(k.clone()).or_insert(k);
        }
    }
    table
}

/// Text content of an HTML/XML fragment. Text nodes are concatenated as-is, so
/// inline tags inside a word do not split it.
pub fn strip_markup(text: &str) -> String {
    if !text.contains(['<', '&']) {
        return text.to_string();
    }
    let fragment = Html::parse_fragment(text);
    fragment.root_element().text().collect()
}

fn strip_numerals(text: &str) -> String {
    let text: String = text
        .chars()
        .map(|c| if ETHIOPIC_NUMERALS.contains(&c) { ' ' } else { c })
        .collect();
    LATIN_DIGITS.replace_all(&text, " ").into_owned()
}
