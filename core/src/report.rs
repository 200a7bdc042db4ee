//! Human-readable diagnostic artifacts. Failures here never affect the index.

use crate::index::{Corpus, InvertedIndex};
use crate::search::SearchHit;
use anyhow::Result;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const SNIPPET_BEFORE: usize = 20;
const SNIPPET_AFTER: usize = 80;
const SNIPPET_HEAD: usize = 100;
const TOP_N: usize = 5;

/// Context around the first occurrence of any term, or the opening of the text.
pub fn snippet(content: &str, terms: &[String]) -> String {
    let hit = terms
        .iter()
        .filter(|t| !t.is_empty())
        .find_map(|t| content.find(t.as_str()));
    let chars: Vec<char> = content.chars().collect();
    let (start, end) = match hit {
        Some(byte_idx) => {
            let at = content[..byte_idx].chars().count();
            (at.saturating_sub(SNIPPET_BEFORE), (at + SNIPPET_AFTER).min(chars.len()))
        }
        None => (0, SNIPPET_HEAD.min(chars.len())),
    };
    let mut out: String = chars[start..end].iter().collect();
    out.push_str("...");
    out
}

fn top_counts<'a>(items: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    let mut sorted: Vec<(&str, usize)> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    sorted.truncate(TOP_N);
    sorted
}

/// Token and indexed-term counts, corpus-wide and per document. Only selected index
/// terms are counted as indexed terms.
pub fn render_token_term_summary(corpus: &Corpus, selected: &BTreeSet<String>) -> String {
    let rule = "=".repeat(80);
    let tokens: Vec<&str> = corpus.iter().flat_map(|d| d.initial_tokens.iter().map(String::as_str)).collect();
    let terms: Vec<&str> = corpus.all_terms().into_iter().filter(|t| selected.contains(*t)).collect();

    let mut out = String::new();
    let _ = writeln!(out, "System-Wide Summary\n{}", "=".repeat(20));
    let _ = writeln!(out, "Total Tokens (post-tokenization): {}", tokens.len());
    let _ = writeln!(out, "Unique Tokens: {}", tokens.iter().collect::<HashSet<_>>().len());
    let _ = writeln!(out, "Total Indexed Terms (after Luhn selection): {}", terms.len());
    let _ = writeln!(out, "Unique Indexed Terms: {}", terms.iter().collect::<HashSet<_>>().len());
    let _ = writeln!(out, "\nTop {TOP_N} Tokens:");
    for (token, count) in top_counts(tokens.iter().copied()) {
        let _ = writeln!(out, "  {token}: {count}");
    }
    let _ = writeln!(out, "\nTop {TOP_N} Indexed Terms:");
    for (term, count) in top_counts(terms.iter().copied()) {
        let _ = writeln!(out, "  {term}: {count}");
    }
    let _ = writeln!(out, "\n{rule}\n");

    let mut docs: Vec<_> = corpus.iter().collect();
    docs.sort_by(|a, b| a.id.cmp(&b.id));
    for doc in docs {
        let doc_terms: Vec<&str> = doc.indexed_terms.iter().map(String::as_str).filter(|t| selected.contains(*t)).collect();
        let _ = writeln!(out, "Document: {}\n{}", doc.id, "-".repeat(20));
        let _ = writeln!(out, "Total Tokens: {}", doc.initial_tokens.len());
        let _ = writeln!(out, "Unique Tokens: {}", doc.initial_tokens.iter().collect::<HashSet<_>>().len());
        let _ = writeln!(out, "Total Indexed Terms: {}", doc_terms.len());
        let _ = writeln!(out, "Unique Indexed Terms: {}", doc_terms.iter().collect::<HashSet<_>>().len());
        let _ = writeln!(out, "\n{rule}\n");
    }
    out
}

pub fn write_token_term_summary(path: &Path, corpus: &Corpus, selected: &BTreeSet<String>) -> Result<()> {
    fs::write(path, render_token_term_summary(corpus, selected))?;
    tracing::info!(path = %path.display(), "saved token/term summary");
    Ok(())
}

/// Postings of every query term followed by ranked documents with snippets.
/// `text_of` supplies the stored text of a document, if any.
pub fn render_search_report<F>(index: &InvertedIndex, terms: &[String], hits: &[SearchHit], text_of: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let distinct: BTreeSet<&str> = terms.iter().map(String::as_str).collect();
    let mut out = String::new();
    for term in &distinct {
        if let Some(postings) = index.postings_for(term) {
            let pairs: Vec<String> = postings.iter().map(|p| format!("[{}, {}]", p.doc_id, p.tf)).collect();
            let _ = writeln!(out, "{term} -> [{}]", pairs.join(", "));
        }
    }
    let ordered: Vec<String> = distinct.iter().map(|s| s.to_string()).collect();
    for hit in hits {
        let snip = text_of(&hit.doc_id).map(|text| snippet(&text, &ordered)).unwrap_or_default();
        let _ = writeln!(out, "Document: {}, Score: {:.4}, Snippet: {}", hit.doc_id, hit.score, snip);
    }
    out
}

pub fn write_search_report<F>(path: &Path, index: &InvertedIndex, terms: &[String], hits: &[SearchHit], text_of: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    fs::write(path, render_search_report(index, terms, hits, text_of))?;
    tracing::info!(path = %path.display(), "saved search results");
    Ok(())
}

/// Tab-separated frequency table in rank order: word, frequency, 1-based rank and
/// frequency relative to the most frequent term.
pub fn render_frequency_table(ranking: &[(String, u32)]) -> String {
    let max = ranking.first().map(|(_, f)| *f).unwrap_or(1).max(1) as f64;
    let mut out = String::from("Word\tFrequency\tRank\tNormalized_Frequency\n");
    for (rank, (word, freq)) in ranking.iter().enumerate() {
        let _ = writeln!(out, "{word}\t{freq}\t{}\t{:.4}", rank + 1, *freq as f64 / max);
    }
    out
}

pub fn write_frequency_table(path: &Path, ranking: &[(String, u32)]) -> Result<()> {
    if ranking.is_empty() {
        tracing::warn!(path = %path.display(), "frequency table is empty, not written");
        return Ok(());
    }
    fs::write(path, render_frequency_table(ranking))?;
    tracing::info!(path = %path.display(), rows = ranking.len(), "saved frequency table");
    Ok(())
}
