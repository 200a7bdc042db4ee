//! Document discovery, decoding and preprocessing into a [`Corpus`].

use crate::index::{Corpus, DocMeta, Document};
use crate::normalize::strip_markup;
use crate::pipeline::Pipeline;
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static str,
    /// False when the text was recovered with replacement characters.
    pub confident: bool,
}

/// Decode raw bytes: BOM, then strict UTF-8, then a detector guess. A guess that
/// does not decode cleanly falls back to lossy UTF-8.
pub fn decode_bytes(bytes: &[u8]) -> Decoded {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return Decoded { text: text.into_owned(), encoding: encoding.name(), confident: !had_errors };
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Decoded { text: text.to_string(), encoding: UTF_8.name(), confident: true };
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let guess = detector.guess(None, true);
    let (text, had_errors) = guess.decode_without_bom_handling(bytes);
    if !had_errors {
        return Decoded { text: text.into_owned(), encoding: guess.name(), confident: true };
    }
    let (text, _) = UTF_8.decode_without_bom_handling(bytes);
    Decoded { text: text.into_owned(), encoding: UTF_8.name(), confident: false }
}

/// Read and decode one document; unreadable files are skipped with a warning.
pub fn read_document(path: &Path) -> Option<String> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "skipping unreadable document");
            return None;
        }
    };
    let decoded = decode_bytes(&bytes);
    if decoded.confident {
        tracing::debug!(path = %path.display(), encoding = decoded.encoding, "decoded document");
    } else {
        tracing::warn!(path = %path.display(), "low-confidence encoding, decoded with replacement characters");
    }
    Some(decoded.text)
}

/// `.txt` files under `input` (or `input` itself when it is a file), sorted by path.
pub fn discover_documents(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            // Symlinks are listed as-is; a dangling one fails at read time like any unreadable file.
            let kind = entry.file_type();
            let p = entry.path();
            if (kind.is_file() || kind.is_symlink()) && p.extension().and_then(|s| s.to_str()) == Some("txt") {
                files.push(p.to_path_buf());
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        tracing::warn!(input = %input.display(), "input path does not exist");
    }
    files.sort();
    files
}

/// Document id: the file name without its extension.
pub fn document_id(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
}

/// Source document kept alongside the corpus for snippet storage.
#[derive(Debug, Clone)]
pub struct SourceDoc {
    pub id: String,
    pub path: PathBuf,
    /// Decoded text with markup removed.
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Ingested {
    pub corpus: Corpus,
    pub sources: Vec<SourceDoc>,
    pub skipped: usize,
}

impl Ingested {
    pub fn doc_metas(&self) -> Vec<DocMeta> {
        self.sources
            .iter()
            .filter_map(|src| {
                let doc = self.corpus.get(&src.id)?;
                Some(DocMeta {
                    id: src.id.clone(),
                    source_path: Some(src.path.display().to_string()),
                    text_path: None,
                    initial_tokens: doc.initial_tokens.len(),
                    indexed_terms: doc.indexed_terms.len(),
                })
            })
            .collect()
    }
}

/// Read, decode and preprocess every document under `input`. Documents that cannot
/// be read, are empty, or yield no indexed terms are skipped.
pub fn ingest(input: &Path, pipeline: &Pipeline) -> Ingested {
    let mut out = Ingested::default();
    for path in discover_documents(input) {
        let Some(id) = document_id(&path) else {
            tracing::warn!(path = %path.display(), "document name is not valid unicode, skipping");
            out.skipped += 1;
            continue;
        };
        let Some(text) = read_document(&path) else {
            out.skipped += 1;
            continue;
        };
        let processed = pipeline.process(&text);
        if processed.indexed_terms.is_empty() {
            tracing::warn!(doc_id = %id, "no indexed terms after preprocessing, skipping");
            out.skipped += 1;
            continue;
        }
        tracing::debug!(doc_id = %id, tokens = processed.initial_tokens.len(), terms = processed.indexed_terms.len(), "processed document");
        if !out.corpus.insert(Document::new(id.clone(), processed)) {
            tracing::warn!(doc_id = %id, path = %path.display(), "duplicate document id, skipping");
            out.skipped += 1;
            continue;
        }
        out.sources.push(SourceDoc { id, path, text: strip_markup(&text) });
    }
    tracing::info!(docs = out.corpus.len(), skipped = out.skipped, "ingested documents");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StemmerKind;
    use crate::tokenizer::Stopwords;

    #[test]
    fn decodes_utf8_and_utf16_with_bom() {
        let d = decode_bytes("ሰላም".as_bytes());
        assert_eq!(d.text, "ሰላም");
        assert!(d.confident);

        let mut utf16 = vec![0xFF, 0xFE];
        for unit in "ቤት".encode_utf16() {
            utf16.extend_from_slice(&unit.to_le_bytes());
        }
        let d = decode_bytes(&utf16);
        assert_eq!(d.text, "ቤት");
        assert_eq!(d.encoding, "UTF-16LE");
    }

    #[test]
    fn skips_empty_and_non_amharic_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "ተማሪዎች ትምህርት ቤት ሄዱ።").unwrap();
        std::fs::write(dir.path().join("a.txt"), "ገበያ ሄደች።").unwrap();
        std::fs::write(dir.path().join("latin.txt"), "only english words").unwrap();
        std::fs::write(dir.path().join("notes.md"), "ቤት").unwrap();
        let pipeline = Pipeline::amharic(Stopwords::empty(), StemmerKind::Affix);
        let ingested = ingest(dir.path(), &pipeline);
        let ids: Vec<&str> = ingested.corpus.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(ingested.skipped, 1);
        assert_eq!(ingested.doc_metas().len(), 2);
        for doc in ingested.corpus.iter() {
            assert!(doc.indexed_terms.len() <= doc.initial_tokens.len());
        }
    }

    #[test]
    fn stored_source_text_has_no_markup() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.txt"), "<html><body><script>alert(1)</script><p>ገበያ ሄደች።</p></body></html>").unwrap();
        let pipeline = Pipeline::amharic(Stopwords::empty(), StemmerKind::Affix);
        let ingested = ingest(dir.path(), &pipeline);
        assert_eq!(ingested.sources.len(), 1);
        let text = &ingested.sources[0].text;
        assert!(!text.contains('<'));
        assert!(text.contains("ገበያ ሄደች።"));
    }

    #[test]
    fn missing_file_is_not_read() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_document(&dir.path().join("gone.txt")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_document_is_counted_as_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "ገበያ ሄደች።").unwrap();
        std::os::unix::fs::symlink(dir.path().join("nowhere.txt"), dir.path().join("broken.txt")).unwrap();
        let pipeline = Pipeline::amharic(Stopwords::empty(), StemmerKind::Affix);
        let ingested = ingest(dir.path(), &pipeline);
        assert_eq!(discover_documents(dir.path()).len(), 2);
        assert_eq!(ingested.corpus.len(), 1);
        assert_eq!(ingested.skipped, 1);
    }
}
