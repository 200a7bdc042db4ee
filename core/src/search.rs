//! TF-IDF cosine ranking restricted to the query's own terms.
//!
//! Full document vectors are not kept, so both the query and each candidate are
//! represented only over the distinct query terms. Document and query norms are
//! taken over that restricted set, which makes this an approximation of
//! full-vector cosine similarity; ranking depends on it.

use crate::config::{IdfScheme, PipelineConfig, MAX_RESULTS};
use crate::index::InvertedIndex;
use crate::pipeline::Pipeline;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f64,
}

/// IDF for a term; 0 when the term is not in the vocabulary.
pub fn idf(index: &InvertedIndex, scheme: IdfScheme, term: &str) -> f64 {
    index.entry(term).map(|e| scheme.idf(index.num_docs, e.df)).unwrap_or(0.0)
}

/// Query weights: count / max count, times IDF. Out-of-vocabulary terms weigh 0.
pub fn query_weights(index: &InvertedIndex, scheme: IdfScheme, terms: &[String]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for term in terms {
        *counts.entry(term.as_str()).or_insert(0) += 1;
    }
    let max = counts.values().copied().max().unwrap_or(1).max(1) as f64;
    counts
        .into_iter()
        .map(|(term, count)| (term.to_string(), (count as f64 / max) * idf(index, scheme, term)))
        .collect()
}

/// Score and rank documents for already-processed query terms.
pub fn rank(
    index: &InvertedIndex,
    scheme: IdfScheme,
    terms: &[String],
    require_all: bool,
    limit: usize,
) -> Vec<SearchHit> {
    if terms.is_empty() {
        return Vec::new();
    }
    let weights = query_weights(index, scheme, terms);

    // doc -> (query term -> tf), only over query terms with postings.
    let mut doc_tf: BTreeMap<&str, BTreeMap<&str, u32>> = BTreeMap::new();
    for term in weights.keys() {
        for posting in index.postings_for(term).unwrap_or(&[]) {
            doc_tf.entry(posting.doc_id.as_str()).or_default().insert(term.as_str(), posting.tf);
        }
    }
    if require_all {
        doc_tf.retain(|_, tfs| tfs.len() == weights.len());
    }

    let query_norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
    let mut hits: Vec<SearchHit> = doc_tf
        .into_iter()
        .filter_map(|(doc_id, tfs)| {
            let max_tf = tfs.values().copied().max().unwrap_or(1).max(1) as f64;
            let mut dot = 0.0;
            let mut doc_norm = 0.0;
            for (term, tf) in tfs {
                let w = (tf as f64 / max_tf) * idf(index, scheme, term);
                dot += weights.get(term).copied().unwrap_or(0.0) * w;
                doc_norm += w * w;
            }
            let doc_norm = doc_norm.sqrt();
            let score = if query_norm > 0.0 && doc_norm > 0.0 { (dot / (query_norm * doc_norm)).min(1.0) } else { 0.0 };
            (score > 0.0).then(|| SearchHit { doc_id: doc_id.to_string(), score })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal).then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    hits.truncate(limit.min(MAX_RESULTS));
    hits
}

/// An immutable index plus the pipeline that produced it; safe to share across threads.
pub struct SearchEngine {
    index: InvertedIndex,
    pipeline: Pipeline,
    config: PipelineConfig,
}

impl SearchEngine {
    pub fn new(index: InvertedIndex, pipeline: Pipeline, config: PipelineConfig) -> Self {
        Self { index, pipeline, config }
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        self.search_with(query, self.config.require_all)
    }

    pub fn search_with(&self, query: &str, require_all: bool) -> Vec<SearchHit> {
        let terms = self.pipeline.query_terms(query);
        let hits = rank(&self.index, self.config.idf, &terms, require_all, self.config.result_limit());
        tracing::debug!(query, terms = ?terms, hits = hits.len(), "search");
        hits
    }

    pub fn query_terms(&self, query: &str) -> Vec<String> { self.pipeline.query_terms(query) }

    pub fn index(&self) -> &InvertedIndex { &self.index }

    pub fn config(&self) -> &PipelineConfig { &self.config }
}
