pub mod config;
pub mod error;
pub mod index;
pub mod ingest;
pub mod lexicon;
pub mod luhn;
pub mod normalize;
pub mod persist;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod stemmer;
pub mod tokenizer;

pub use config::{IdfScheme, LuhnParams, PipelineConfig, StemmerKind};
pub use error::PipelineError;
pub use index::{Corpus, DocMeta, Document, InvertedIndex, Posting, VocabEntry};
pub use pipeline::{Pipeline, Processed};
pub use search::{SearchEngine, SearchHit};
