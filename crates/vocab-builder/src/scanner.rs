use std::time::Instant;

use thiserror::Error;
use tracing::{debug, info};
use vocab_tagger::{TaggedLine, Tagger, TaggerError};
use vocab_types::Pos;

use crate::aggregator::VocabularyAggregator;
use crate::cleanup::clean_line;
use crate::corpus::CorpusSource;
use crate::diagnostics::Diagnostics;
use crate::reference::ReferenceSet;

pub const DEFAULT_BATCH_SIZE: usize = 64;
const PROGRESS_EVERY_BATCHES: usize = 100;

/// Which tokens may enter the vocabulary.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Admission {
    /// Only tokens whose lowercase form is a reference word.
    #[default]
    Reference,
    /// Reference words plus any token not tagged as a noun.
    Open,
}

impl Admission {
    pub fn admits(self, lowercase: &str, pos: Pos, reference: &ReferenceSet) -> bool {
        match self {
            Admission::Reference => reference.contains(lowercase),
            Admission::Open => reference.contains(lowercase) || pos != Pos::Noun,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ScanOptions {
    pub batch_size: usize,
    pub admission: Admission,
    /// Aggregate under the lowercase form rather than the surface form.
    pub fold_case: bool,
    /// Tags never forwarded to the aggregator.
    pub skip_pos: Vec<Pos>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            admission: Admission::default(),
            fold_case: true,
            skip_pos: vec![Pos::Punct, Pos::Propn],
        }
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("tagging batch {batch} failed: {source}")]
    Tagger {
        batch: usize,
        #[source]
        source: TaggerError,
    },
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanSummary {
    pub lines_read: usize,
    pub lines_skipped: usize,
    pub batches: usize,
    pub tokens: usize,
    pub observations: usize,
}

/// Streams corpus lines through a tagger and feeds qualifying tokens to the
/// aggregator.
pub struct CorpusScanner<'a> {
    reference: &'a ReferenceSet,
    options: ScanOptions,
}

impl<'a> CorpusScanner<'a> {
    pub fn new(reference: &'a ReferenceSet, options: ScanOptions) -> Self {
        Self { reference, options }
    }

    /// Scan `sources` in order, in batches of `batch_size` cleaned lines.
    ///
    /// Lines that are not UTF-8 or are empty after cleanup are skipped. A
    /// tagger failure aborts the scan.
    pub fn scan<T: Tagger + ?Sized>(
        &self,
        tagger: &mut T,
        sources: &[CorpusSource],
        aggregator: &mut VocabularyAggregator,
        mut diagnostics: Option<&mut Diagnostics>,
    ) -> Result<ScanSummary, ScanError> {
        let batch_size = self.options.batch_size.max(1);
        let mut summary = ScanSummary::default();
        let mut batch: Vec<String> = Vec::with_capacity(batch_size);
        let start = Instant::now();

        for source in sources {
            info!(
                "scanning {} ({} bytes)",
                source.path().display(),
                source.len_bytes()
            );
            for line in source.lines() {
                summary.lines_read += 1;
                let cleaned = line.map(clean_line).unwrap_or_default();
                if cleaned.is_empty() {
                    summary.lines_skipped += 1;
                    continue;
                }
                batch.push(cleaned);
                if batch.len() == batch_size {
                    self.flush(
                        tagger,
                        &mut batch,
                        aggregator,
                        diagnostics.as_deref_mut(),
                        &mut summary,
                    )?;
                    if summary.batches % PROGRESS_EVERY_BATCHES == 0 {
                        info!(
                            "{} lines tagged, {} observations in {} ms",
                            summary.lines_read - summary.lines_skipped,
                            summary.observations,
                            start.elapsed().as_millis()
                        );
                    }
                }
            }
        }
        if !batch.is_empty() {
            self.flush(
                tagger,
                &mut batch,
                aggregator,
                diagnostics.as_deref_mut(),
                &mut summary,
            )?;
        }

        debug!("skipped {} corpus lines", summary.lines_skipped);
        Ok(summary)
    }

    fn flush<T: Tagger + ?Sized>(
        &self,
        tagger: &mut T,
        batch: &mut Vec<String>,
        aggregator: &mut VocabularyAggregator,
        mut diagnostics: Option<&mut Diagnostics>,
        summary: &mut ScanSummary,
    ) -> Result<(), ScanError> {
        let tagged = tagger.tag(batch).map_err(|source| ScanError::Tagger {
            batch: summary.batches + 1,
            source,
        })?;
        summary.batches += 1;
        batch.clear();

        for tokens in &tagged {
            summary.tokens += tokens.len();
            if let Some(diag) = diagnostics.as_deref_mut() {
                diag.observe_line(tokens);
            }
            summary.observations += self.ingest_line(tokens, aggregator);
        }
        Ok(())
    }

    /// Forward the first token of every punctuation-free adjacent pair.
    fn ingest_line(&self, tokens: &TaggedLine, aggregator: &mut VocabularyAggregator) -> usize {
        let mut ingested = 0;
        for pair in tokens.windows(2) {
            let (token, next) = (&pair[0], &pair[1]);
            if token.pos == Pos::Punct || next.pos == Pos::Punct {
                continue;
            }
            if self.options.skip_pos.contains(&token.pos) {
                continue;
            }
            let lowercase = token.text.to_lowercase();
            if !self
                .options
                .admission
                .admits(&lowercase, token.pos, self.reference)
            {
                continue;
            }
            let word = if self.options.fold_case {
                lowercase.as_str()
            } else {
                token.text.as_str()
            };
            aggregator.ingest(word, token.pos, &token.morph);
            ingested += 1;
        }
        ingested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_tagger::LexiconTagger;
    use vocab_types::RawMorph;

    fn tagger() -> LexiconTagger {
        LexiconTagger::from_entries([
            ("le", Pos::Det, RawMorph::parse_feats("Gender=Masc|Number=Sing")),
            ("chat", Pos::Noun, RawMorph::parse_feats("Gender=Masc|Number=Sing")),
            ("chien", Pos::Noun, RawMorph::parse_feats("Gender=Masc|Number=Sing")),
            ("dort", Pos::Verb, RawMorph::parse_feats("Number=Sing|Person=3")),
            ("paul", Pos::Propn, RawMorph::default()),
            ("vite", Pos::Adv, RawMorph::default()),
        ])
    }

    #[test]
    fn ingests_only_reference_words_outside_punctuation() {
        let reference = ReferenceSet::from_words(["le", "chat", "dort", "paul"]);
        let mut agg = VocabularyAggregator::new(reference.iter().map(str::to_string));
        let source = CorpusSource::from_bytes("mem", "1\tLe chat dort.\n2\tPaul dort vite\n");
        let scanner = CorpusScanner::new(&reference, ScanOptions::default());

        let summary = scanner
            .scan(&mut tagger(), &[source], &mut agg, None)
            .unwrap();
        assert_eq!(summary.lines_read, 2);
        assert_eq!(summary.batches, 1);
        // "le", "chat" from line one ("dort" is followed by "."); line two
        // offers "paul" (PROPN, skipped) and "dort" (ingested).
        assert_eq!(summary.observations, 3);
        assert_eq!(agg.observations("le").unwrap()[0].count, 1);
        assert_eq!(agg.observations("dort").unwrap()[0].count, 1);
        assert!(agg.observations("paul").unwrap().is_empty());
        assert!(!agg.contains("vite"));
    }

    #[test]
    fn open_admission_takes_non_nouns() {
        let reference = ReferenceSet::from_words(["le"]);
        let mut agg = VocabularyAggregator::new(reference.iter().map(str::to_string));
        let source = CorpusSource::from_bytes("mem", "le chien dort vite\n");
        let options = ScanOptions {
            admission: Admission::Open,
            ..ScanOptions::default()
        };
        CorpusScanner::new(&reference, options)
            .scan(&mut tagger(), &[source], &mut agg, None)
            .unwrap();
        assert!(!agg.contains("chien"));
        assert_eq!(agg.new_word_count("dort"), Some(1));
    }

    #[test]
    fn case_folding_is_configurable() {
        let reference = ReferenceSet::from_words(["le", "chat"]);
        let source = || CorpusSource::from_bytes("mem", "Le chat dort\n");

        let mut folded = VocabularyAggregator::new(reference.iter().map(str::to_string));
        CorpusScanner::new(&reference, ScanOptions::default())
            .scan(&mut tagger(), &[source()], &mut folded, None)
            .unwrap();
        assert!(folded.is_encountered("le"));

        let mut surface = VocabularyAggregator::new(reference.iter().map(str::to_string));
        let options = ScanOptions {
            fold_case: false,
            ..ScanOptions::default()
        };
        CorpusScanner::new(&reference, options)
            .scan(&mut tagger(), &[source()], &mut surface, None)
            .unwrap();
        assert!(surface.is_encountered("Le"));
        assert!(!surface.is_encountered("le"));
    }

    #[test]
    fn surface_forms_of_reference_words_survive_pruning() {
        let reference = ReferenceSet::from_words(["chat"]);
        let mut agg = VocabularyAggregator::new(reference.iter().map(str::to_string));
        let source = CorpusSource::from_bytes("mem", "Chat dort\nChat dort\n");
        let options = ScanOptions {
            fold_case: false,
            ..ScanOptions::default()
        };
        CorpusScanner::new(&reference, options)
            .scan(&mut tagger(), &[source], &mut agg, None)
            .unwrap();
        assert_eq!(agg.new_word_count("Chat"), None);

        let outcome = agg.prune(2);
        assert_eq!(outcome.removed, 0);
        assert_eq!(agg.observations("Chat").unwrap()[0].count, 2);
    }

    #[test]
    fn batches_respect_size_and_skip_blank_lines() {
        let reference = ReferenceSet::from_words(["chat"]);
        let mut agg = VocabularyAggregator::new(reference.iter().map(str::to_string));
        let source = CorpusSource::from_bytes("mem", "chat dort\n\n12\t\nchat dort\nchat dort\n");
        let options = ScanOptions {
            batch_size: 2,
            ..ScanOptions::default()
        };
        let mut diag = Diagnostics::new();
        let summary = CorpusScanner::new(&reference, options)
            .scan(&mut tagger(), &[source], &mut agg, Some(&mut diag))
            .unwrap();
        assert_eq!(summary.lines_read, 5);
        assert_eq!(summary.lines_skipped, 2);
        assert_eq!(summary.batches, 2);
        assert_eq!(agg.observations("chat").unwrap()[0].count, 3);
        assert_eq!(diag.tagging_stats()[0].nb, 3);
    }

    struct FailingTagger;

    impl Tagger for FailingTagger {
        fn tag(&mut self, _lines: &[String]) -> Result<Vec<TaggedLine>, TaggerError> {
            Err(TaggerError::Misaligned {
                expected: 1,
                got: 0,
            })
        }
    }

    #[test]
    fn tagger_failure_aborts_the_scan() {
        let reference = ReferenceSet::from_words(["chat"]);
        let mut agg = VocabularyAggregator::new(reference.iter().map(str::to_string));
        let source = CorpusSource::from_bytes("mem", "chat dort\n");
        let err = CorpusScanner::new(&reference, ScanOptions::default())
            .scan(&mut FailingTagger, &[source], &mut agg, None)
            .unwrap_err();
        assert!(matches!(err, ScanError::Tagger { batch: 1, .. }));
    }
}
