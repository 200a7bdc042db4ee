//! Luhn's method: keep terms that are neither too rare nor too common to discriminate.

use crate::config::LuhnParams;
use crate::tokenizer::Stopwords;
use std::collections::{BTreeSet, HashMap};

const MIN_TERM_CHARS: usize = 2;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// All terms by descending frequency, ties in lexicographic order.
    pub ranking: Vec<(String, u32)>,
    pub terms: BTreeSet<String>,
}

/// Sort a frequency table by descending count, ties broken lexicographically.
pub fn rank_terms(freq: &HashMap<String, u32>) -> Vec<(String, u32)> {
    let mut ranking: Vec<(String, u32)> = freq.iter().map(|(t, &f)| (t.clone(), f)).collect();
    ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranking
}

/// Select index terms from the corpus frequency table.
///
/// The top `floor(n * upper_fraction)` ranks are dropped as too common, terms below
/// `lower_bound` as too rare. Ranks are 0-based and the band starts at the cutoff
/// inclusively (`rank >= cutoff`), unlike the classic `rank > cutoff`, so with a
/// cutoff of 0 the most frequent term is still eligible. The final check that the term, or a stemmed token
/// containing it, occurs among `stemmed_terms` is kept even though the table is
/// normally built from those same terms.
pub fn select_terms(
    freq: &HashMap<String, u32>,
    stemmed_terms: &[&str],
    stopwords: &Stopwords,
    params: &LuhnParams,
) -> Selection {
    let ranking = rank_terms(freq);
    let upper_cutoff = (ranking.len() as f64 * params.upper_fraction.max(0.0)).floor() as usize;

    let mut stemmed_freq: HashMap<&str, u32> = HashMap::new();
    for term in stemmed_terms {
        *stemmed_freq.entry(term).or_insert(0) += 1;
    }
    let occurs = |word: &str| -> bool {
        stemmed_freq.contains_key(word) || stemmed_freq.iter().any(|(stem, &count)| count > 0 && stem.contains(word))
    };

    let terms: BTreeSet<String> = ranking
        .iter()
        .enumerate()
        .filter(|(rank, (word, count))| {
            *count >= params.lower_bound
                && *rank >= upper_cutoff
                && word.chars().count() >= MIN_TERM_CHARS
                && !stopwords.contains(word)
                && occurs(word)
        })
        .map(|(_, (word, _))| word.clone())
        .collect();

    tracing::info!(candidates = ranking.len(), upper_cutoff, selected = terms.len(), "luhn selection");
    Selection { ranking, terms }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, u32)]) -> (HashMap<String, u32>, Vec<String>) {
        let mut freq = HashMap::new();
        let mut all = Vec::new();
        for (t, n) in pairs {
            freq.insert(t.to_string(), *n);
            all.extend(std::iter::repeat(t.to_string()).take(*n as usize));
        }
        (freq, all)
    }

    #[test]
    fn drops_the_most_common_and_the_rare() {
        // 10 distinct terms at 0.2 -> the top 2 ranks are cut.
        let (freq, all) = table(&[
            ("ሀሀ", 50), ("ለለ", 40), ("መመ", 9), ("ረረ", 8), ("ሰሰ", 7),
            ("ቀቀ", 6), ("በበ", 5), ("ተተ", 4), ("ነነ", 3), ("ከከ", 1),
        ]);
        let all: Vec<&str> = all.iter().map(String::as_str).collect();
        let params = LuhnParams { lower_bound: 2, upper_fraction: 0.2 };
        let sel = select_terms(&freq, &all, &Stopwords::empty(), &params);
        assert!(!sel.terms.contains("ሀሀ"));
        assert!(!sel.terms.contains("ለለ"));
        assert!(!sel.terms.contains("ከከ"));
        assert_eq!(sel.terms.len(), 7);
    }

    #[test]
    fn ties_rank_lexicographically_and_selection_is_repeatable() {
        let (freq, all) = table(&[("ገገ", 3), ("በበ", 3), ("ሀሀ", 3), ("ለ", 3), ("ና", 2)]);
        let order: Vec<String> = rank_terms(&freq).into_iter().map(|(t, _)| t).collect();
        assert_eq!(order, vec!["ሀሀ", "ለ", "በበ", "ገገ", "ና"]);

        let all: Vec<&str> = all.iter().map(String::as_str).collect();
        let stop = Stopwords::from_words(["በበ"]);
        let params = LuhnParams { lower_bound: 2, upper_fraction: 0.0 };
        let first = select_terms(&freq, &all, &stop, &params);
        let second = select_terms(&freq, &all, &stop, &params);
        assert_eq!(first, second);
        // single-character and stopword terms never make it.
        let expected: BTreeSet<String> = ["ሀሀ", "ገገ"].iter().map(|s| s.to_string()).collect();
        assert_eq!(first.terms, expected);
    }
}
