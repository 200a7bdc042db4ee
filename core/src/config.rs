use serde::{Deserialize, Serialize};

/// Hard ceiling on the number of ranked results returned for one query.
pub const MAX_RESULTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LuhnParams {
    /// Minimum corpus frequency for a term to be selected.
    pub lower_bound: u32,
    /// Share of the frequency ranking, from the top, treated as too common.
    pub upper_fraction: f64,
}

impl Default for LuhnParams {
    fn default() -> Self {
        Self { lower_bound: 2, upper_fraction: 0.03 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdfScheme {
    /// ln(N / df)
    #[default]
    Standard,
    /// ln(1 + N / df)
    Smoothed,
}

impl IdfScheme {
    pub fn idf(self, num_docs: u32, df: u32) -> f64 {
        if df == 0 || num_docs == 0 {
            return 0.0;
        }
        let ratio = num_docs as f64 / df as f64;
        match self {
            IdfScheme::Standard => ratio.ln(),
            IdfScheme::Smoothed => (1.0 + ratio).ln(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StemmerKind {
    #[default]
    Affix,
    Identity,
}

/// Settings shared by the build and the query side. Persisted with the index so
/// queries are processed exactly like the documents were.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub luhn: LuhnParams,
    pub idf: IdfScheme,
    pub stemmer: StemmerKind,
    pub max_results: usize,
    pub require_all: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            luhn: LuhnParams::default(),
            idf: IdfScheme::default(),
            stemmer: StemmerKind::default(),
            max_results: MAX_RESULTS,
            require_all: false,
        }
    }
}

impl PipelineConfig {
    pub fn result_limit(&self) -> usize {
        self.max_results.clamp(1, MAX_RESULTS)
    }
}
