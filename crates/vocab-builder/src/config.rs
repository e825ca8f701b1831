use std::path::PathBuf;

use crate::aggregator::DEFAULT_SIGNIFICANCE;
use crate::corpus::LoadMode;
use crate::filter::FilterRules;
use crate::scanner::ScanOptions;

pub const DEFAULT_MIN_OCCURRENCE: u64 = 2;
pub const DEFAULT_REFERENCE_COLUMN: &str = "item";
pub const DEFAULT_OUTPUT: &str = "vocab.jsonl";

pub const TAGGING_STATS_FILE: &str = "tagging_stats.jsonl";
pub const POS_NGRAMS_FILE: &str = "pos_n_grams.jsonl";
pub const NEW_WORDS_FILE: &str = "new_words.jsonl";

/// Everything one vocabulary build needs, apart from the tagger.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub reference_path: PathBuf,
    /// Column holding the words when the reference is a CSV/TSV table.
    pub reference_column: String,
    pub blacklist_path: Option<PathBuf>,
    pub corpus_paths: Vec<PathBuf>,
    pub load_mode: LoadMode,
    pub output_path: PathBuf,
    /// Where diagnostics files go; `None` disables them.
    pub diagnostics_dir: Option<PathBuf>,
    pub scan: ScanOptions,
    /// New words seen this many times or fewer are pruned.
    pub min_occurrence: u64,
    pub significance: u64,
    pub filter: FilterRules,
    /// Tag never-encountered reference words in isolation before filtering.
    pub resolve_unseen: bool,
}

impl PipelineConfig {
    pub fn new(reference_path: impl Into<PathBuf>, corpus_paths: Vec<PathBuf>) -> Self {
        Self {
            reference_path: reference_path.into(),
            reference_column: DEFAULT_REFERENCE_COLUMN.to_string(),
            blacklist_path: None,
            corpus_paths,
            load_mode: LoadMode::Mmap,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            diagnostics_dir: None,
            scan: ScanOptions::default(),
            min_occurrence: DEFAULT_MIN_OCCURRENCE,
            significance: DEFAULT_SIGNIFICANCE,
            filter: FilterRules::default(),
            resolve_unseen: false,
        }
    }
}
