use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use vocab_tagger::{CommandTagger, LexiconTagger, Tagger};

use vocab_builder::config::{
    DEFAULT_MIN_OCCURRENCE, DEFAULT_OUTPUT, DEFAULT_REFERENCE_COLUMN, PipelineConfig,
};
use vocab_builder::filter::{DEFAULT_ALPHABET, DEFAULT_MAX_CHAR_RUN, DEFAULT_MIN_CHARS};
use vocab_builder::scanner::DEFAULT_BATCH_SIZE;
use vocab_builder::{Admission, LoadMode, aggregator::DEFAULT_SIGNIFICANCE};

#[derive(Debug, Parser)]
#[command(name = "vocab-builder", version, about)]
struct Args {
    /// Reference word list (.csv/.tsv table or one word per line).
    #[arg(long, env = "VOCAB_REFERENCE")]
    reference: PathBuf,

    /// Column holding the words in a CSV/TSV reference.
    #[arg(long, env = "VOCAB_REFERENCE_COLUMN", default_value = DEFAULT_REFERENCE_COLUMN)]
    reference_column: String,

    /// Words removed from the reference before scanning.
    #[arg(long, env = "VOCAB_BLACKLIST")]
    blacklist: Option<PathBuf>,

    /// Corpus files, scanned in order.
    #[arg(long = "corpus", env = "VOCAB_CORPUS", value_delimiter = ',', required = true)]
    corpora: Vec<PathBuf>,

    #[arg(long, env = "VOCAB_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Write tagging_stats, pos_n_grams and new_words files here.
    #[arg(long, env = "VOCAB_DIAGNOSTICS_DIR")]
    diagnostics_dir: Option<PathBuf>,

    /// External tagger reading lines on stdin and printing one CoNLL-U
    /// sentence per line (presegmented input).
    #[arg(long, env = "VOCAB_TAGGER_CMD", conflicts_with = "tagger_lexicon")]
    tagger_cmd: Option<String>,

    /// Argument passed to the tagger command (repeatable).
    #[arg(long = "tagger-arg", allow_hyphen_values = true)]
    tagger_args: Vec<String>,

    /// Tab-separated lexicon for the built-in tagger.
    #[arg(long, env = "VOCAB_TAGGER_LEXICON")]
    tagger_lexicon: Option<PathBuf>,

    #[arg(long, env = "VOCAB_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    #[arg(long, env = "VOCAB_ADMISSION", value_enum, default_value_t = AdmissionArg::Reference)]
    admission: AdmissionArg,

    /// Aggregate surface forms, merging case variants only in the output.
    #[arg(long, env = "VOCAB_KEEP_CASE")]
    keep_case: bool,

    /// New words seen this many times or fewer are dropped.
    #[arg(long, env = "VOCAB_MIN_OCCURRENCE", default_value_t = DEFAULT_MIN_OCCURRENCE)]
    min_occurrence: u64,

    #[arg(long, env = "VOCAB_SIGNIFICANCE", default_value_t = DEFAULT_SIGNIFICANCE)]
    significance: u64,

    #[arg(long, env = "VOCAB_MIN_CHARS", default_value_t = DEFAULT_MIN_CHARS)]
    min_chars: usize,

    #[arg(long, env = "VOCAB_ALPHABET", default_value = DEFAULT_ALPHABET)]
    alphabet: String,

    /// Longest allowed run of one repeated character; 0 disables the check.
    #[arg(long, env = "VOCAB_MAX_CHAR_RUN", default_value_t = DEFAULT_MAX_CHAR_RUN)]
    max_char_run: usize,

    /// Tag reference words never seen in the corpus on their own.
    #[arg(long, env = "VOCAB_RESOLVE_UNSEEN")]
    resolve_unseen: bool,

    #[arg(long, env = "VOCAB_LOAD_MODE", value_enum, default_value_t = LoadModeArg::Mmap)]
    load_mode: LoadModeArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AdmissionArg {
    Reference,
    Open,
}

impl From<AdmissionArg> for Admission {
    fn from(arg: AdmissionArg) -> Self {
        match arg {
            AdmissionArg::Reference => Admission::Reference,
            AdmissionArg::Open => Admission::Open,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LoadModeArg {
    Mmap,
    Owned,
}

impl From<LoadModeArg> for LoadMode {
    fn from(arg: LoadModeArg) -> Self {
        match arg {
            LoadModeArg::Mmap => LoadMode::Mmap,
            LoadModeArg::Owned => LoadMode::Owned,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut tagger = build_tagger(&args)?;
    let config = build_config(args);
    info!("using reference at {}", config.reference_path.display());
    info!(
        "scanning {} corpus files (mode: {:?}, batch {})",
        config.corpus_paths.len(),
        config.load_mode,
        config.scan.batch_size
    );

    let start = Instant::now();
    let summary = vocab_builder::run(&config, tagger.as_mut())?;
    info!(
        "done in {} ms: {} lines read ({} skipped), {} tokens, {} observations",
        start.elapsed().as_millis(),
        summary.lines_read,
        summary.lines_skipped,
        summary.tokens,
        summary.observations
    );
    info!(
        "{} new words pruned, {} kept; {} records finalized, {} written",
        summary.new_words_pruned,
        summary.new_words_kept,
        summary.records_finalized,
        summary.records_written
    );
    Ok(())
}

fn build_tagger(args: &Args) -> anyhow::Result<Box<dyn Tagger>> {
    match (&args.tagger_cmd, &args.tagger_lexicon) {
        (Some(program), None) => {
            info!("tagging with `{program}`");
            Ok(Box::new(
                CommandTagger::new(program.as_str()).args(args.tagger_args.iter().cloned()),
            ))
        }
        (None, Some(path)) => {
            let lexicon = LexiconTagger::load(path)
                .with_context(|| format!("load lexicon {}", path.display()))?;
            Ok(Box::new(lexicon))
        }
        _ => bail!("exactly one of --tagger-cmd or --tagger-lexicon is required"),
    }
}

fn build_config(args: Args) -> PipelineConfig {
    let mut config = PipelineConfig::new(args.reference, args.corpora);
    config.reference_column = args.reference_column;
    config.blacklist_path = args.blacklist;
    config.load_mode = args.load_mode.into();
    config.output_path = args.output;
    config.diagnostics_dir = args.diagnostics_dir;
    config.scan.batch_size = args.batch_size;
    config.scan.admission = args.admission.into();
    config.scan.fold_case = !args.keep_case;
    config.min_occurrence = args.min_occurrence;
    config.significance = args.significance;
    config.filter.min_chars = args.min_chars;
    config.filter = config.filter.with_alphabet(&args.alphabet);
    config.filter.max_char_run = (args.max_char_run > 0).then_some(args.max_char_run);
    config.resolve_unseen = args.resolve_unseen;
    config
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
