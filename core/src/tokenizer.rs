use std::collections::{BTreeSet, HashSet};
use std::path::Path;

const ETHIOPIC: std::ops::RangeInclusive<char> = '\u{1200}'..='\u{137F}';

/// True for code points in the Ethiopic block (U+1200–U+137F).
pub fn is_ethiopic(c: char) -> bool {
    ETHIOPIC.contains(&c)
}

/// Characters allowed inside a token: Ethiopic letters plus the `_` join marker.
pub fn is_index_char(c: char) -> bool {
    is_ethiopic(c) || c == '_'
}

/// A token survives filtering when it is made of index characters and is not just join markers.
pub fn is_amharic_token(token: &str) -> bool {
    token.chars().all(is_index_char) && token.chars().any(is_ethiopic)
}

#[derive(Debug, Clone, Default)]
pub struct Stopwords {
    words: HashSet<String>,
}

impl Stopwords {
    pub fn empty() -> Self { Self::default() }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { words: words.into_iter().map(Into::into).collect() }
    }

    /// One term per line; surrounding whitespace and blank lines are ignored.
    pub fn parse(text: &str) -> Self {
        Self::from_words(text.lines().map(str::trim).filter(|l| !l.is_empty()))
    }

    /// A missing or unreadable stopword file degrades to an empty set.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let set = Self::parse(&text);
                tracing::info!(path = %path.display(), count = set.len(), "loaded stopwords");
                set
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "stopword list unavailable, continuing without stopwords");
                Self::empty()
            }
        }
    }

    pub fn contains(&self, term: &str) -> bool { self.words.contains(term) }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }

    /// Sorted one-per-line rendering, the same format [`Stopwords::parse`] reads.
    pub fn to_lines(&self) -> String {
        let sorted: BTreeSet<&str> = self.words.iter().map(String::as_str).collect();
        let mut out = String::new();
        for word in sorted {
            out.push_str(word);
            out.push('\n');
        }
        out
    }
}

/// Split normalized text into the initial token sequence.
pub fn split_tokens(normalized: &str) -> Vec<String> {
    normalized.split_whitespace().map(str::to_string).collect()
}

/// Drop non-Amharic noise and stopwords, keeping order.
pub fn filter_tokens<'a>(tokens: &'a [String], stopwords: &Stopwords) -> Vec<&'a str> {
    tokens
        .iter()
        .map(String::as_str)
        .filter(|t| is_amharic_token(t))
        .filter(|t| !stopwords.contains(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_noise_and_stopwords() {
        let tokens = split_tokens("ቤት  ና abc መኪና __ አዲስ_አበባ");
        assert_eq!(tokens.len(), 6);
        let stop = Stopwords::from_words(["ና"]);
        let kept = filter_tokens(&tokens, &stop);
        assert_eq!(kept, vec!["ቤት", "መኪና", "አዲስ_አበባ"]);
    }

    #[test]
    fn stopword_file_parsing_ignores_blank_lines() {
        let stop = Stopwords::parse("  ና \n\nእና\n");
        assert_eq!(stop.len(), 2);
        assert!(stop.contains("ና"));
        assert!(stop.contains("እና"));
        assert_eq!(Stopwords::parse(&stop.to_lines()).len(), 2);
    }

    #[test]
    fn missing_stopword_file_is_empty_set() {
        let stop = Stopwords::load(Path::new("/definitely/not/here/stopwords.txt"));
        assert!(stop.is_empty());
    }
}
