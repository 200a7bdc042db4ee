use crate::config::StemmerKind;
use crate::lexicon::Lexicon;
use crate::normalize::Normalizer;
use crate::stemmer::{stemmer_for, Stem};
use crate::tokenizer::{filter_tokens, split_tokens, Stopwords};

/// Output of running one text through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Processed {
    pub initial_tokens: Vec<String>,
    pub indexed_terms: Vec<String>,
}

/// Normalizer, stopwords and stemmer, built once and shared by indexing and querying.
pub struct Pipeline {
    normalizer: Normalizer,
    stopwords: Stopwords,
    stemmer: Box<dyn Stem>,
}

impl Pipeline {
    pub fn new(lexicon: &Lexicon, stopwords: Stopwords, stemmer: StemmerKind) -> Self {
        Self { normalizer: Normalizer::new(lexicon), stopwords, stemmer: stemmer_for(stemmer) }
    }

    pub fn amharic(stopwords: Stopwords, stemmer: StemmerKind) -> Self {
        Self::new(&Lexicon::amharic(), stopwords, stemmer)
    }

    pub fn process(&self, text: &str) -> Processed {
        let normalized = self.normalizer.normalize(text);
        let initial_tokens = split_tokens(&normalized);
        let indexed_terms = filter_tokens(&initial_tokens, &self.stopwords)
            .into_iter()
            .map(|t| self.stemmer.stem(t))
            .collect();
        Processed { initial_tokens, indexed_terms }
    }

    /// Indexed terms of a query; identical processing to documents.
    pub fn query_terms(&self, query: &str) -> Vec<String> {
        self.process(query).indexed_terms
    }

    pub fn normalizer(&self) -> &Normalizer { &self.normalizer }

    pub fn stopwords(&self) -> &Stopwords { &self.stopwords }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexed_terms_never_outnumber_tokens() {
        let p = Pipeline::amharic(Stopwords::from_words(["እና"]), StemmerKind::Affix);
        let out = p.process("<p>ተማሪዎች እና መምህራን በትምህርት ቤት ነበሩ። hello 42</p>");
        assert!(out.indexed_terms.len() <= out.initial_tokens.len());
        assert!(!out.indexed_terms.iter().any(|t| t == "እና"));
    }

    #[test]
    fn stopword_only_query_is_empty() {
        let p = Pipeline::amharic(Stopwords::from_words(["እና", "ነው"]), StemmerKind::Affix);
        assert!(p.query_terms("እና ነው።").is_empty());
        assert!(p.query_terms("123 abc").is_empty());
    }
}
