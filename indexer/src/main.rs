use amharic_ir_core::index::InvertedIndex;
use amharic_ir_core::ingest::ingest;
use amharic_ir_core::persist::{
    load_docs, open_engine, save_docs, save_index, save_index_terms, save_meta, save_stopwords, save_text, IndexPaths, MetaFile,
    FORMAT_VERSION,
};
use amharic_ir_core::report::{write_frequency_table, write_search_report, write_token_term_summary};
use amharic_ir_core::tokenizer::Stopwords;
use amharic_ir_core::{IdfScheme, LuhnParams, Pipeline, PipelineConfig, PipelineError, StemmerKind};
use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a Luhn-selected TF-IDF index over Amharic documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StemmerArg {
    Affix,
    Identity,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a directory of plain-text documents (or a single file)
    Build {
        /// Input path (file or directory of .txt files)
        #[arg(long)]
        input: PathBuf,
        /// Output index directory
        #[arg(long)]
        output: PathBuf,
        /// Newline-delimited stopword list; missing file means no stopwords
        #[arg(long, default_value = "stopwords.txt")]
        stopwords: PathBuf,
        /// Minimum corpus frequency for an index term
        #[arg(long, default_value_t = 2)]
        lower_bound: u32,
        /// Fraction of the most frequent terms excluded from the index
        #[arg(long, default_value_t = 0.03)]
        upper_fraction: f64,
        /// Use smoothed IDF = ln(1 + N/df) instead of ln(N/df)
        #[arg(long, default_value_t = false)]
        smoothed_idf: bool,
        #[arg(long, value_enum, default_value_t = StemmerArg::Affix)]
        stemmer: StemmerArg,
        /// Directory for the token/term summary report
        #[arg(long)]
        reports: Option<PathBuf>,
    },
    /// Run a query against a built index
    Search {
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        /// Only return documents containing every query term
        #[arg(long, default_value_t = false)]
        require_all: bool,
        /// Write search_results.txt with postings and snippets into this directory
        #[arg(long)]
        reports: Option<PathBuf>,
        /// Print hits as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Query text
        query: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, stopwords, lower_bound, upper_fraction, smoothed_idf, stemmer, reports } => {
            let config = PipelineConfig {
                luhn: LuhnParams { lower_bound, upper_fraction },
                idf: if smoothed_idf { IdfScheme::Smoothed } else { IdfScheme::Standard },
                stemmer: match stemmer {
                    StemmerArg::Affix => StemmerKind::Affix,
                    StemmerArg::Identity => StemmerKind::Identity,
                },
                ..PipelineConfig::default()
            };
            build_index(&input, &output, &stopwords, config, reports.as_deref())
        }
        Commands::Search { index, require_all, reports, json, query } => {
            search_index(&index, &query, require_all, reports.as_deref(), json)
        }
    }
}

/// Log an auxiliary write failure and carry on; anything else aborts the build.
fn tolerate(result: Result<(), PipelineError>) -> Result<()> {
    match result {
        Err(err) if err.is_recoverable() => {
            tracing::error!(error = %err, "failed to write index artifact, continuing");
            Ok(())
        }
        other => other.map_err(Into::into),
    }
}

fn build_index(input: &Path, output: &Path, stopwords: &Path, config: PipelineConfig, reports: Option<&Path>) -> Result<()> {
    let out_paths = IndexPaths::new(output);
    let stopwords = Stopwords::load(stopwords);
    let pipeline = Pipeline::amharic(stopwords, config.stemmer);

    let ingested = ingest(input, &pipeline);
    let (index, selection) = match InvertedIndex::from_corpus(&ingested.corpus, pipeline.stopwords(), &config.luhn) {
        Ok(built) => built,
        Err(PipelineError::EmptyCorpus) => {
            tracing::error!(input = %input.display(), "no documents processed, no index produced");
            return Err(PipelineError::EmptyCorpus.into());
        }
        Err(err) => return Err(err.into()),
    };
    tracing::info!(num_docs = index.num_docs, num_terms = index.vocabulary.len(), "index built");

    for err in save_index(&out_paths, &index) {
        tolerate(Err(err))?;
    }
    tolerate(save_index_terms(&out_paths, &selection.terms))?;
    tolerate(save_stopwords(&out_paths, pipeline.stopwords()))?;

    // Write text for snippet extraction
    let mut docs = ingested.doc_metas();
    for (meta, src) in docs.iter_mut().zip(&ingested.sources) {
        match save_text(&out_paths, &src.id, &src.text) {
            Ok(rel) => meta.text_path = Some(rel),
            Err(err) => tolerate(Err(err))?,
        }
    }
    tolerate(save_docs(&out_paths, &docs))?;

    let meta = MetaFile {
        num_docs: index.num_docs,
        created_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        version: FORMAT_VERSION,
        config,
    };
    tolerate(save_meta(&out_paths, &meta))?;

    if let Some(dir) = reports {
        let written = std::fs::create_dir_all(dir)
            .map_err(anyhow::Error::from)
            .and_then(|_| write_token_term_summary(&dir.join("token_term_summary.txt"), &ingested.corpus, &selection.terms))
            .and_then(|_| write_frequency_table(&dir.join("frequency.tsv"), &selection.ranking));
        if let Err(err) = written {
            tracing::error!(error = %err, "failed to write build reports");
        }
    }

    tracing::info!(output = %output.display(), "index build complete");
    Ok(())
}

fn search_index(index_dir: &Path, query: &str, require_all: bool, reports: Option<&Path>, json: bool) -> Result<()> {
    let paths = IndexPaths::new(index_dir);
    let engine = open_engine(&paths)?;
    let hits = engine.search_with(query, require_all || engine.config().require_all);

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else if hits.is_empty() {
        println!("no matching documents");
    } else {
        for (rank, hit) in hits.iter().enumerate() {
            println!("{:>2}. {}  {:.4}", rank + 1, hit.doc_id, hit.score);
        }
    }

    if let Some(dir) = reports {
        let docs = load_docs(&paths).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "document metadata unavailable, snippets omitted");
            Vec::new()
        });
        let text_of = |doc_id: &str| -> Option<String> {
            let rel = docs.iter().find(|d| d.id == doc_id)?.text_path.as_ref()?;
            std::fs::read_to_string(paths.root.join(rel)).ok()
        };
        let terms = engine.query_terms(query);
        let written = std::fs::create_dir_all(dir)
            .map_err(anyhow::Error::from)
            .and_then(|_| write_search_report(&dir.join("search_results.txt"), engine.index(), &terms, &hits, text_of));
        if let Err(err) = written {
            tracing::error!(error = %err, "failed to write search report");
        }
    }
    Ok(())
}
