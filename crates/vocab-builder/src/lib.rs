pub mod aggregator;
pub mod cleanup;
pub mod config;
pub mod corpus;
pub mod diagnostics;
pub mod filter;
pub mod pipeline;
pub mod reference;
pub mod resolve;
pub mod scanner;
pub mod writer;

pub use aggregator::{Observation, PruneOutcome, VocabularyAggregator};
pub use cleanup::clean_line;
pub use config::PipelineConfig;
pub use corpus::{CorpusSource, LoadMode};
pub use diagnostics::Diagnostics;
pub use filter::{FilterRules, compare_words, filter_and_sort};
pub use pipeline::{RunSummary, run};
pub use reference::{ReferenceError, ReferenceSet};
pub use resolve::resolve_unseen;
pub use scanner::{Admission, CorpusScanner, ScanError, ScanOptions, ScanSummary};
pub use writer::{WriteError, write_jsonl};
