use amharic_ir_core::index::{Corpus, Document};
use amharic_ir_core::lexicon::Lexicon;
use amharic_ir_core::persist::{open_engine, save_index, save_meta, save_stopwords, IndexPaths, MetaFile, FORMAT_VERSION};
use amharic_ir_core::tokenizer::Stopwords;
use amharic_ir_core::{IdfScheme, InvertedIndex, LuhnParams, Pipeline, PipelineConfig, SearchEngine, StemmerKind};

fn scenario_corpus(pipeline: &Pipeline) -> Corpus {
    [("A", "ቤት ቤት መኪና"), ("B", "መኪና መኪና ቤት")]
        .into_iter()
        .map(|(id, text)| Document::new(id, pipeline.process(text)))
        .collect()
}

fn plain_pipeline() -> Pipeline {
    Pipeline::new(&Lexicon::empty(), Stopwords::empty(), StemmerKind::Identity)
}

fn scenario_config(idf: IdfScheme) -> PipelineConfig {
    PipelineConfig { luhn: LuhnParams { lower_bound: 1, upper_fraction: 0.0 }, idf, ..PipelineConfig::default() }
}

#[test]
fn two_document_vocabulary_and_ranking() {
    let pipeline = plain_pipeline();
    let corpus = scenario_corpus(&pipeline);
    let config = scenario_config(IdfScheme::Smoothed);
    let (index, selection) = InvertedIndex::from_corpus(&corpus, pipeline.stopwords(), &config.luhn).unwrap();
    assert_eq!(selection.terms.len(), 2);
    for term in ["ቤት", "መኪና"] {
        let entry = index.entry(term).unwrap();
        assert_eq!((entry.df, entry.cf), (2, 3));
    }
    index.verify().unwrap();

    let engine = SearchEngine::new(index, pipeline, config);
    let hits = engine.search("ቤት");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].doc_id, "A");
    assert!(hits[0].score >= hits[1].score);
}

#[test]
fn ubiquitous_terms_score_zero_under_plain_idf() {
    // ln(N / DFj) is 0 when a term is in every document, so nothing can be ranked.
    let pipeline = plain_pipeline();
    let corpus = scenario_corpus(&pipeline);
    let config = scenario_config(IdfScheme::Standard);
    let (index, _) = InvertedIndex::from_corpus(&corpus, pipeline.stopwords(), &config.luhn).unwrap();
    let engine = SearchEngine::new(index, pipeline, config);
    assert!(engine.search("ቤት").is_empty());
}

fn small_engine(require_all: bool, stopwords: &[&str]) -> SearchEngine {
    let pipeline = Pipeline::new(&Lexicon::empty(), Stopwords::from_words(stopwords.iter().copied()), StemmerKind::Identity);
    let corpus: Corpus = [("d1", "ቤት ገበያ ውሃ"), ("d2", "ቤት ውሃ"), ("d3", "ሰማይ ውሃ"), ("d4", "ሰማይ")]
        .into_iter()
        .map(|(id, text)| Document::new(id, pipeline.process(text)))
        .collect();
    let config = PipelineConfig { luhn: LuhnParams { lower_bound: 1, upper_fraction: 0.0 }, require_all, ..PipelineConfig::default() };
    let (index, _) = InvertedIndex::from_corpus(&corpus, pipeline.stopwords(), &config.luhn).unwrap();
    SearchEngine::new(index, pipeline, config)
}

#[test]
fn strict_mode_with_unknown_term_returns_nothing() {
    let engine = small_engine(true, &[]);
    assert!(engine.search("ቤት ጨረቃ").is_empty());
    assert_eq!(engine.search("ቤት ገበያ").len(), 1);
    assert_eq!(engine.search_with("ቤት ጨረቃ", false).len(), 2);
}

#[test]
fn stopword_only_query_returns_nothing() {
    let engine = small_engine(false, &["እና", "ነው"]);
    assert!(engine.search("እና ነው").is_empty());
    assert!(engine.search("...").is_empty());
    assert!(engine.search("").is_empty());
}

#[test]
fn persisted_index_answers_like_the_live_one() {
    let dir = tempfile::tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    let pipeline = Pipeline::amharic(Stopwords::from_words(["እና"]), StemmerKind::Affix);
    let texts = [
        ("d1", "ተማሪዎች እና መምህራን ወደ ትምህርት ቤት ሄዱ። ትምህርት ቤት ውስጥ ተማሪዎች ተማሩ።"),
        ("d2", "ገበያ ውስጥ ብዙ ሰዎች ነበሩ። ገበያ ትልቅ ነው።"),
        ("d3", "ትምህርት ለሁሉም ነው። ገበያ እና ትምህርት።"),
    ];
    let corpus: Corpus = texts.iter().map(|(id, t)| Document::new(*id, pipeline.process(t))).collect();
    let config = PipelineConfig { luhn: LuhnParams { lower_bound: 1, upper_fraction: 0.0 }, ..PipelineConfig::default() };
    let (index, _) = InvertedIndex::from_corpus(&corpus, pipeline.stopwords(), &config.luhn).unwrap();

    assert!(save_index(&paths, &index).is_empty());
    save_stopwords(&paths, pipeline.stopwords()).unwrap();
    save_meta(
        &paths,
        &MetaFile { num_docs: index.num_docs, created_at: String::new(), version: FORMAT_VERSION, config: config.clone() },
    )
    .unwrap();

    let live = SearchEngine::new(index, pipeline, config);
    let reopened = open_engine(&paths).unwrap();
    for query in ["ገበያ", "ትምህርት ቤት", "ተማሪዎች እና ገበያ"] {
        assert_eq!(live.search(query), reopened.search(query), "query {query}");
    }
    assert!(!reopened.search("ገበያ").is_empty());
}

#[test]
fn affixed_thesaurus_variant_is_found_by_bare_query() {
    let pipeline = Pipeline::amharic(Stopwords::empty(), StemmerKind::Affix);
    let corpus: Corpus = [("d1", "በመኪና ሄደ"), ("d2", "ገበያ ሄደ")]
        .into_iter()
        .map(|(id, text)| Document::new(id, pipeline.process(text)))
        .collect();
    let config = scenario_config(IdfScheme::Standard);
    let (index, _) = InvertedIndex::from_corpus(&corpus, pipeline.stopwords(), &config.luhn).unwrap();
    let engine = SearchEngine::new(index, pipeline, config);

    assert_eq!(engine.query_terms("መኪና"), vec!["ሽከርካሪ".to_string()]);
    let hits = engine.search("መኪና");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doc_id, "d1");
}
