use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::index::{DocMeta, InvertedIndex, Posting, VocabEntry};
use crate::lexicon::Lexicon;
use crate::pipeline::Pipeline;
use crate::search::SearchEngine;
use crate::tokenizer::Stopwords;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
    #[serde(default)]
    pub config: PipelineConfig,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn vocabulary(&self) -> PathBuf { self.root.join("vocabulary.json") }
    pub fn postings(&self) -> PathBuf { self.root.join("postings.json") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
    pub fn docs(&self) -> PathBuf { self.root.join("docs.bin") }
    pub fn stopwords(&self) -> PathBuf { self.root.join("stopwords.txt") }
    pub fn index_terms(&self) -> PathBuf { self.root.join("index_terms.txt") }
    pub fn texts_dir(&self) -> PathBuf { self.root.join("texts") }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), PipelineError> {
    let write_err = |source| PipelineError::Write { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
        create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, bytes).map_err(write_err)
}

fn read_file(path: &Path) -> Result<Vec<u8>, PipelineError> {
    fs::read(path).map_err(|source| PipelineError::Read { path: path.to_path_buf(), source })
}

fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T, pretty: bool) -> Result<(), PipelineError> {
    let bytes = if pretty { serde_json::to_vec_pretty(value) } else { serde_json::to_vec(value) }
        .map_err(|source| PipelineError::Json { path: path.to_path_buf(), source })?;
    write_file(path, &bytes)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let bytes = read_file(path)?;
    serde_json::from_slice(&bytes).map_err(|source| PipelineError::Json { path: path.to_path_buf(), source })
}

/// Terms are written in sorted order (the map is a BTreeMap).
pub fn save_vocabulary(paths: &IndexPaths, vocabulary: &BTreeMap<String, VocabEntry>) -> Result<(), PipelineError> {
    save_json(&paths.vocabulary(), vocabulary, false)
}

pub fn load_vocabulary(paths: &IndexPaths) -> Result<BTreeMap<String, VocabEntry>, PipelineError> {
    load_json(&paths.vocabulary())
}

pub fn save_postings(paths: &IndexPaths, postings: &[Vec<Posting>]) -> Result<(), PipelineError> {
    save_json(&paths.postings(), postings, false)
}

pub fn load_postings(paths: &IndexPaths) -> Result<Vec<Vec<Posting>>, PipelineError> {
    load_json(&paths.postings())
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<(), PipelineError> {
    save_json(&paths.meta(), meta, true)
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile, PipelineError> {
    load_json(&paths.meta())
}

pub fn save_docs(paths: &IndexPaths, docs: &[DocMeta]) -> Result<(), PipelineError> {
    let path = paths.docs();
    let bytes = bincode::serialize(docs).map_err(|source| PipelineError::Binary { path: path.clone(), source })?;
    write_file(&path, &bytes)
}

pub fn load_docs(paths: &IndexPaths) -> Result<Vec<DocMeta>, PipelineError> {
    let path = paths.docs();
    let bytes = read_file(&path)?;
    bincode::deserialize(&bytes).map_err(|source| PipelineError::Binary { path, source })
}

pub fn save_stopwords(paths: &IndexPaths, stopwords: &Stopwords) -> Result<(), PipelineError> {
    write_file(&paths.stopwords(), stopwords.to_lines().as_bytes())
}

pub fn save_index_terms(paths: &IndexPaths, terms: &BTreeSet<String>) -> Result<(), PipelineError> {
    let mut out = String::new();
    for term in terms {
        out.push_str(term);
        out.push('\n');
    }
    write_file(&paths.index_terms(), out.as_bytes())
}

/// Store decoded document text for snippet extraction; returns the path relative to the index root.
pub fn save_text(paths: &IndexPaths, doc_id: &str, text: &str) -> Result<String, PipelineError> {
    let file_name = format!("{doc_id}.txt");
    write_file(&paths.texts_dir().join(&file_name), text.as_bytes())?;
    Ok(format!("texts/{file_name}"))
}

/// Write vocabulary and postings. Failures are returned for the caller to log.
pub fn save_index(paths: &IndexPaths, index: &InvertedIndex) -> Vec<PipelineError> {
    [save_vocabulary(paths, &index.vocabulary), save_postings(paths, &index.postings)]
        .into_iter()
        .filter_map(Result::err)
        .collect()
}

/// Load vocabulary, postings and corpus size, then re-check the index invariants.
pub fn load_index(paths: &IndexPaths) -> Result<(InvertedIndex, MetaFile), PipelineError> {
    let meta = load_meta(paths)?;
    let index = InvertedIndex {
        vocabulary: load_vocabulary(paths)?,
        postings: load_postings(paths)?,
        num_docs: meta.num_docs,
    };
    index.verify()?;
    Ok((index, meta))
}

/// Open a persisted index together with the query pipeline it was built with.
pub fn open_engine(paths: &IndexPaths) -> Result<SearchEngine, PipelineError> {
    let (index, meta) = load_index(paths)?;
    let stopwords = Stopwords::load(&paths.stopwords());
    let pipeline = Pipeline::new(&Lexicon::amharic(), stopwords, meta.config.stemmer);
    tracing::info!(root = %paths.root.display(), terms = index.vocabulary.len(), docs = index.num_docs, "opened index");
    Ok(SearchEngine::new(index, pipeline, meta.config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_file_has_sorted_keys_and_pair_postings() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let mut vocab = BTreeMap::new();
        vocab.insert("ገበያ".to_string(), VocabEntry { df: 1, cf: 1, pointer: 1 });
        vocab.insert("ቤት".to_string(), VocabEntry { df: 1, cf: 2, pointer: 0 });
        let postings = vec![
            vec![Posting { doc_id: "a".into(), tf: 2 }],
            vec![Posting { doc_id: "a".into(), tf: 1 }],
        ];
        let index = InvertedIndex { vocabulary: vocab, postings, num_docs: 1 };
        assert!(save_index(&paths, &index).is_empty());
        save_meta(&paths, &MetaFile { num_docs: 1, created_at: String::new(), version: FORMAT_VERSION, config: PipelineConfig::default() }).unwrap();

        let raw = fs::read_to_string(paths.vocabulary()).unwrap();
        assert!(raw.find("ቤት").unwrap() < raw.find("ገበያ").unwrap());
        assert!(raw.contains(r#""DFj":1"#));
        assert_eq!(fs::read_to_string(paths.postings()).unwrap(), r#"[[["a",2]],[["a",1]]]"#);

        let (loaded, meta) = load_index(&paths).unwrap();
        assert_eq!(loaded.vocabulary, index.vocabulary);
        assert_eq!(loaded.postings, index.postings);
        assert_eq!(meta.num_docs, 1);
    }

    #[test]
    fn docs_round_trip_through_bincode() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let docs = vec![DocMeta {
            id: "AmharicBook1".into(),
            source_path: Some("input/AmharicBook1.txt".into()),
            text_path: Some("texts/AmharicBook1.txt".into()),
            initial_tokens: 12,
            indexed_terms: 9,
        }];
        save_docs(&paths, &docs).unwrap();
        let loaded = load_docs(&paths).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "AmharicBook1");
        assert_eq!(loaded[0].indexed_terms, 9);
    }

    #[test]
    fn missing_index_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_index(&IndexPaths::new(dir.path().join("nope"))).unwrap_err();
        assert!(matches!(err, PipelineError::Read { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn write_failures_are_reported_as_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("index");
        fs::write(&blocker, "not a directory").unwrap();
        let paths = IndexPaths::new(&blocker);

        let index = InvertedIndex { vocabulary: BTreeMap::new(), postings: Vec::new(), num_docs: 0 };
        let errors = save_index(&paths, &index);
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, PipelineError::Write { .. }) && e.is_recoverable()));

        let err = save_text(&paths, "d1", "ቤት").unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn texts_are_stored_under_the_texts_dir() {
        let dir = tempfile::tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let rel = save_text(&paths, "d1", "ቤት").unwrap();
        assert_eq!(rel, "texts/d1.txt");
        assert_eq!(fs::read_to_string(paths.texts_dir().join("d1.txt")).unwrap(), "ቤት");
    }
}
