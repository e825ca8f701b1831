//! End-to-end vocabulary build: reference, scan, prune, finalize, filter, write.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use vocab_tagger::Tagger;

use crate::aggregator::VocabularyAggregator;
use crate::config::{NEW_WORDS_FILE, POS_NGRAMS_FILE, PipelineConfig, TAGGING_STATS_FILE};
use crate::corpus::CorpusSource;
use crate::diagnostics::{Diagnostics, new_word_stats};
use crate::filter::filter_and_sort;
use crate::reference::ReferenceSet;
use crate::resolve::resolve_unseen;
use crate::scanner::CorpusScanner;
use crate::writer::write_jsonl;

/// Counts reported at the end of a run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    pub reference_words: usize,
    pub blacklisted: usize,
    pub lines_read: usize,
    pub lines_skipped: usize,
    pub tokens: usize,
    pub observations: usize,
    pub new_words_pruned: usize,
    pub new_words_kept: usize,
    pub records_finalized: usize,
    pub unseen_resolved: usize,
    pub records_written: usize,
}

pub fn run<T: Tagger + ?Sized>(config: &PipelineConfig, tagger: &mut T) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    let start = Instant::now();
    tagger.warm_up().context("tagger warm-up failed")?;
    info!("tagger ready in {} ms", start.elapsed().as_millis());

    let start = Instant::now();
    let mut reference = ReferenceSet::load(&config.reference_path, &config.reference_column)
        .with_context(|| format!("load reference {}", config.reference_path.display()))?;
    if let Some(path) = &config.blacklist_path {
        let blacklist = ReferenceSet::load(path, &config.reference_column)
            .with_context(|| format!("load blacklist {}", path.display()))?;
        summary.blacklisted = reference.subtract(&blacklist);
        info!("removed {} blacklisted words", summary.blacklisted);
    }
    summary.reference_words = reference.len();
    info!("reference ready in {} ms", start.elapsed().as_millis());

    let sources = config
        .corpus_paths
        .iter()
        .map(|path| {
            CorpusSource::open(path, config.load_mode)
                .with_context(|| format!("open corpus {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut aggregator = VocabularyAggregator::new(reference.iter().map(str::to_string))
        .with_significance(config.significance)
        .merge_case_variants(!config.scan.fold_case);
    let mut diagnostics = config.diagnostics_dir.as_ref().map(|_| Diagnostics::new());

    let start = Instant::now();
    let scan = CorpusScanner::new(&reference, config.scan.clone())
        .scan(tagger, &sources, &mut aggregator, diagnostics.as_mut())
        .context("corpus scan failed")?;
    summary.lines_read = scan.lines_read;
    summary.lines_skipped = scan.lines_skipped;
    summary.tokens = scan.tokens;
    summary.observations = scan.observations;
    info!(
        "scanned {} lines in {} batches in {} ms",
        scan.lines_read,
        scan.batches,
        start.elapsed().as_millis()
    );

    let pruned = aggregator.prune(config.min_occurrence);
    summary.new_words_pruned = pruned.removed;
    summary.new_words_kept = pruned.kept.len();

    let start = Instant::now();
    let mut records = aggregator.finalize();
    summary.records_finalized = records.len();
    if config.resolve_unseen {
        summary.unseen_resolved = resolve_unseen(&mut records, tagger, config.scan.batch_size)
            .context("tagging unseen reference words failed")?;
        info!("resolved {} unseen words", summary.unseen_resolved);
    }
    let records = filter_and_sort(records, &config.filter);
    info!(
        "{} of {} records kept in {} ms",
        records.len(),
        summary.records_finalized,
        start.elapsed().as_millis()
    );

    summary.records_written = write_jsonl(&config.output_path, &records)
        .with_context(|| format!("write vocabulary {}", config.output_path.display()))?;
    info!(
        "wrote {} records to {}",
        summary.records_written,
        config.output_path.display()
    );

    if let (Some(dir), Some(diag)) = (&config.diagnostics_dir, &diagnostics) {
        write_diagnostic(&dir.join(TAGGING_STATS_FILE), &diag.tagging_stats())?;
        write_diagnostic(&dir.join(POS_NGRAMS_FILE), &diag.pos_ngrams())?;
        write_diagnostic(&dir.join(NEW_WORDS_FILE), &new_word_stats(&pruned.kept))?;
    }

    Ok(summary)
}

fn write_diagnostic<T: serde::Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let written =
        write_jsonl(path, items).with_context(|| format!("write diagnostics {}", path.display()))?;
    info!("wrote {written} lines to {}", path.display());
    Ok(())
}
