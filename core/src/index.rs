use crate::config::LuhnParams;
use crate::error::PipelineError;
use crate::luhn::{select_terms, Selection};
use crate::pipeline::Processed;
use crate::tokenizer::Stopwords;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMeta {
    pub id: String,
    pub source_path: Option<String>,
    /// Relative path of the stored decoded text used for snippets, e.g. texts/{id}.txt
    pub text_path: Option<String>,
    pub initial_tokens: usize,
    pub indexed_terms: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub initial_tokens: Vec<String>,
    pub indexed_terms: Vec<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, processed: Processed) -> Self {
        Self { id: id.into(), initial_tokens: processed.initial_tokens, indexed_terms: processed.indexed_terms }
    }

    /// Per-term counts in first-occurrence order.
    pub fn term_counts(&self) -> Vec<(&str, u32)> {
        let mut order: Vec<(&str, u32)> = Vec::new();
        let mut slot: HashMap<&str, usize> = HashMap::new();
        for term in &self.indexed_terms {
            match slot.get(term.as_str()) {
                Some(&i) => order[i].1 += 1,
                None => {
                    slot.insert(term.as_str(), order.len());
                    order.push((term.as_str(), 1));
                }
            }
        }
        order
    }
}

/// Documents in processing order, addressable by id.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    docs: Vec<Document>,
    by_id: HashMap<String, usize>,
}

impl Corpus {
    pub fn new() -> Self { Self::default() }

    /// Returns false, leaving the corpus unchanged, when the id is already taken.
    pub fn insert(&mut self, doc: Document) -> bool {
        if self.by_id.contains_key(&doc.id) {
            return false;
        }
        self.by_id.insert(doc.id.clone(), self.docs.len());
        self.docs.push(doc);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.by_id.get(id).map(|&i| &self.docs[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> { self.docs.iter() }

    pub fn len(&self) -> usize { self.docs.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }

    /// Every indexed term of every document, in processing order.
    pub fn all_terms(&self) -> Vec<&str> {
        self.docs.iter().flat_map(|d| d.indexed_terms.iter().map(String::as_str)).collect()
    }

    /// Corpus-wide occurrence count per indexed term.
    pub fn term_frequencies(&self) -> HashMap<String, u32> {
        let mut freq: HashMap<String, u32> = HashMap::new();
        for term in self.docs.iter().flat_map(|d| d.indexed_terms.iter()) {
            *freq.entry(term.clone()).or_insert(0) += 1;
        }
        freq
    }
}

impl FromIterator<Document> for Corpus {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        let mut corpus = Corpus::new();
        for doc in iter {
            corpus.insert(doc);
        }
        corpus
    }
}

/// One `(doc_id, tf)` pair; persisted as a two-element JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, u32)", into = "(String, u32)")]
pub struct Posting {
    pub doc_id: String,
    pub tf: u32,
}

impl From<(String, u32)> for Posting {
    fn from((doc_id, tf): (String, u32)) -> Self { Self { doc_id, tf } }
}

impl From<Posting> for (String, u32) {
    fn from(p: Posting) -> Self { (p.doc_id, p.tf) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabEntry {
    #[serde(rename = "DFj")]
    pub df: u32,
    #[serde(rename = "CFj")]
    pub cf: u32,
    pub pointer: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    pub vocabulary: BTreeMap<String, VocabEntry>,
    pub postings: Vec<Vec<Posting>>,
    pub num_docs: u32,
}

impl InvertedIndex {
    /// Build postings for the selected terms. Pointers follow first-seen order across
    /// documents; each list keeps document-processing order.
    pub fn build(corpus: &Corpus, selected: &BTreeSet<String>) -> Result<Self, PipelineError> {
        if corpus.is_empty() {
            return Err(PipelineError::EmptyCorpus);
        }
        let mut postings: Vec<Vec<Posting>> = Vec::new();
        let mut pointers: HashMap<&str, usize> = HashMap::new();
        for doc in corpus.iter() {
            for (term, tf) in doc.term_counts() {
                if !selected.contains(term) {
                    continue;
                }
                let pointer = *pointers.entry(term).or_insert_with(|| {
                    postings.push(Vec::new());
                    postings.len() - 1
                });
                postings[pointer].push(Posting { doc_id: doc.id.clone(), tf });
            }
        }

        let mut vocabulary = BTreeMap::new();
        for term in selected {
            let Some(&pointer) = pointers.get(term.as_str()) else {
                tracing::warn!(term = %term, "selected term never observed while building postings, skipping");
                continue;
            };
            let (df, cf) = list_stats(&postings[pointer]);
            vocabulary.insert(term.clone(), VocabEntry { df, cf, pointer });
        }

        tracing::info!(terms = vocabulary.len(), lists = postings.len(), docs = corpus.len(), "built inverted index");
        Ok(Self { vocabulary, postings, num_docs: corpus.len() as u32 })
    }

    /// Run Luhn selection over the corpus and build the index from the selected terms.
    pub fn from_corpus(corpus: &Corpus, stopwords: &Stopwords, params: &LuhnParams) -> Result<(Self, Selection), PipelineError> {
        if corpus.is_empty() {
            return Err(PipelineError::EmptyCorpus);
        }
        let selection = select_terms(&corpus.term_frequencies(), &corpus.all_terms(), stopwords, params);
        let index = Self::build(corpus, &selection.terms)?;
        Ok((index, selection))
    }

    pub fn entry(&self, term: &str) -> Option<&VocabEntry> { self.vocabulary.get(term) }

    pub fn postings_for(&self, term: &str) -> Option<&[Posting]> {
        let entry = self.vocabulary.get(term)?;
        self.postings.get(entry.pointer).map(Vec::as_slice)
    }

    /// Check that every pointer is valid and unique and that DFj/CFj match the postings.
    pub fn verify(&self) -> Result<(), PipelineError> {
        let mut used: HashSet<usize> = HashSet::new();
        for (term, entry) in &self.vocabulary {
            let violation = |reason: String| PipelineError::Invariant { term: term.clone(), reason };
            let Some(list) = self.postings.get(entry.pointer) else {
                return Err(violation(format!("pointer {} out of range ({} lists)", entry.pointer, self.postings.len())));
            };
            if !used.insert(entry.pointer) {
                return Err(violation(format!("pointer {} shared with another term", entry.pointer)));
            }
            let (df, cf) = list_stats(list);
            if (df, cf) != (entry.df, entry.cf) {
                return Err(violation(format!(
                    "stored DFj={} CFj={} but postings give DFj={df} CFj={cf}",
                    entry.df, entry.cf
                )));
            }
        }
        Ok(())
    }
}

fn list_stats(list: &[Posting]) -> (u32, u32) {
    let distinct: HashSet<&str> = list.iter().map(|p| p.doc_id.as_str()).collect();
    (distinct.len() as u32, list.iter().map(|p| p.tf).sum())
}
