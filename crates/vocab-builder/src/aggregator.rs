//! Per-word occurrence statistics and their consolidation into [`WordRecord`]s.
//!
//! The aggregator is fed one `(word, POS, morphology)` observation per
//! qualifying token. Words from the reference list are present from the
//! start; any other word is tracked as a *new* word until [`prune`] decides
//! whether it occurred often enough to be kept. [`finalize`] then reduces each
//! word to its dominant POS and the distinct morphologies seen with it:
//!
//! 1. observations are ranked by count, ties broken by first observation;
//! 2. the top observation fixes the POS and seeds the morphology list;
//! 3. every other observation with the same POS and a count above the
//!    significance threshold is merged in: identical profiles are skipped,
//!    compatible ones are unioned with the first compatible entry, the rest
//!    are appended;
//! 4. verbs lose their `Gender` attribute, and the list is compacted again.
//!
//! New words are counted by lowercase form, and a surface form whose lowercase
//! form is a reference word is never new. When the scanner keeps surface
//! forms, [`merge_case_variants`] folds them together at finalize time.
//!
//! [`merge_case_variants`]: VocabularyAggregator::merge_case_variants
//! [`prune`]: VocabularyAggregator::prune
//! [`finalize`]: VocabularyAggregator::finalize

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, info};
use vocab_types::{MorphAttr, MorphProfile, Pos, Projection, RawMorph, WordRecord, subsume};

/// Non-dominant morphologies must be seen strictly more often than this.
pub const DEFAULT_SIGNIFICANCE: u64 = 10;

/// Occurrence count of one `(POS, morphology)` pairing for a word.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Observation {
    pub pos: Pos,
    pub morph: MorphProfile,
    pub count: u64,
}

#[derive(Clone, Debug, Default)]
struct WordStats {
    // First-observed order; `index` points into it.
    observations: Vec<Observation>,
    index: HashMap<(Pos, MorphProfile), usize>,
}

impl WordStats {
    fn record(&mut self, pos: Pos, morph: MorphProfile, count: u64) {
        match self.index.entry((pos, morph)) {
            Entry::Occupied(slot) => self.observations[*slot.get()].count += count,
            Entry::Vacant(slot) => {
                let (pos, morph) = slot.key().clone();
                slot.insert(self.observations.len());
                self.observations.push(Observation { pos, morph, count });
            }
        }
    }
}

/// Result of [`VocabularyAggregator::prune`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PruneOutcome {
    pub removed: usize,
    /// Surviving new words with their occurrence counts, most frequent first.
    pub kept: Vec<(String, u64)>,
}

#[derive(Clone, Debug)]
pub struct VocabularyAggregator {
    table: BTreeMap<String, WordStats>,
    new_words: HashMap<String, u64>,
    reference: HashSet<String>,
    encountered: HashSet<String>,
    significance: u64,
    merge_case_variants: bool,
}

impl VocabularyAggregator {
    /// Start a run seeded with the reference words.
    pub fn new<I, S>(reference: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let reference: HashSet<String> = reference.into_iter().map(Into::into).collect();
        let table = reference
            .iter()
            .map(|word| (word.clone(), WordStats::default()))
            .collect();
        Self {
            table,
            new_words: HashMap::new(),
            reference,
            encountered: HashSet::new(),
            significance: DEFAULT_SIGNIFICANCE,
            merge_case_variants: false,
        }
    }

    pub fn with_significance(mut self, threshold: u64) -> Self {
        self.significance = threshold;
        self
    }

    /// Report words that differ only in case as one lowercase record.
    pub fn merge_case_variants(mut self, merge: bool) -> Self {
        self.merge_case_variants = merge;
        self
    }

    /// Record one occurrence of `word` tagged `pos` with morphology `raw`.
    ///
    /// Callers are responsible for rejecting punctuation and proper nouns.
    pub fn ingest(&mut self, word: &str, pos: Pos, raw: &RawMorph) {
        self.ingest_profile(word, pos, MorphProfile::normalize(raw, Projection::AllValues));
    }

    fn ingest_profile(&mut self, word: &str, pos: Pos, morph: MorphProfile) {
        let first_seen = !self.table.contains_key(word);
        if first_seen {
            self.table.insert(word.to_string(), WordStats::default());
        }
        let folded = word.to_lowercase();
        if let Some(count) = self.new_words.get_mut(&folded) {
            *count += 1;
        } else if first_seen && !self.reference.contains(&folded) {
            self.new_words.insert(folded, 1);
        }
        if let Some(stats) = self.table.get_mut(word) {
            stats.record(pos, morph, 1);
        }
        if !self.encountered.contains(word) {
            self.encountered.insert(word.to_string());
        }
    }

    /// Drop new words seen `min_occurrence` times or fewer, all case
    /// variants included.
    ///
    /// Reference words are never removed. The new-word counter is consumed:
    /// survivors are returned for reporting and the counter starts empty.
    pub fn prune(&mut self, min_occurrence: u64) -> PruneOutcome {
        let mut outcome = PruneOutcome::default();
        let mut rejected = HashSet::new();
        for (word, count) in std::mem::take(&mut self.new_words) {
            if count <= min_occurrence {
                rejected.insert(word);
            } else {
                outcome.kept.push((word, count));
            }
        }
        if !rejected.is_empty() {
            self.table
                .retain(|word, _| !rejected.contains(&word.to_lowercase()));
            self.encountered
                .retain(|word| !rejected.contains(&word.to_lowercase()));
        }
        outcome.removed = rejected.len();
        outcome
            .kept
            .sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        info!(
            "pruned {} new words at or below {} occurrences, kept {}",
            outcome.removed,
            min_occurrence,
            outcome.kept.len()
        );
        outcome
    }

    /// Consolidate every word into a record, ordered by word.
    ///
    /// Does not mutate the statistics; calling it twice yields the same output.
    pub fn finalize(&self) -> Vec<WordRecord> {
        let records: Vec<WordRecord> = if self.merge_case_variants {
            self.case_groups()
                .iter()
                .map(|(word, stats)| consolidate(word, &stats.observations, self.significance))
                .collect()
        } else {
            self.table
                .iter()
                .map(|(word, stats)| consolidate(word, &stats.observations, self.significance))
                .collect()
        };
        debug!(
            "finalized {} records ({} never observed)",
            records.len(),
            records.iter().filter(|r| r.pos.is_none()).count()
        );
        records
    }

    /// Observations for `word` in first-observed order.
    pub fn observations(&self, word: &str) -> Option<&[Observation]> {
        self.table.get(word).map(|s| s.observations.as_slice())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.table.contains_key(word)
    }

    pub fn is_encountered(&self, word: &str) -> bool {
        self.encountered.contains(word)
    }

    /// Occurrences counted for a word first seen during the scan, across
    /// its case variants.
    pub fn new_word_count(&self, word: &str) -> Option<u64> {
        self.new_words.get(&word.to_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    // Variants are visited in code-point order, so "Chat" observations rank
    // ahead of "chat" ones on equal counts.
    fn case_groups(&self) -> BTreeMap<String, WordStats> {
        let mut groups: BTreeMap<String, WordStats> = BTreeMap::new();
        for (word, stats) in &self.table {
            let group = groups.entry(word.to_lowercase()).or_default();
            for obs in &stats.observations {
                group.record(obs.pos, obs.morph.clone(), obs.count);
            }
        }
        groups
    }
}

fn consolidate(word: &str, observations: &[Observation], significance: u64) -> WordRecord {
    let mut ranked: Vec<&Observation> = observations.iter().collect();
    // Stable: equal counts keep first-observed order.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    let Some((top, rest)) = ranked.split_first() else {
        return WordRecord::unknown(word);
    };

    let morph = rest
        .iter()
        .filter(|obs| obs.pos == top.pos && obs.count > significance)
        .fold(vec![top.morph.clone()], |profiles, obs| {
            merge_profile(profiles, &obs.morph)
        });

    WordRecord {
        word: word.to_string(),
        pos: Some(top.pos),
        morph: finish_profiles(top.pos, morph),
    }
}

/// Fold `candidate` into `profiles`, returning the new list.
pub(crate) fn merge_profile(
    profiles: Vec<MorphProfile>,
    candidate: &MorphProfile,
) -> Vec<MorphProfile> {
    if profiles.contains(candidate) {
        return profiles;
    }
    let mut absorbed = false;
    let mut merged: Vec<MorphProfile> = profiles
        .into_iter()
        .map(|existing| {
            if absorbed {
                return existing;
            }
            match subsume(&existing, candidate) {
                Some(union) => {
                    absorbed = true;
                    union
                }
                None => existing,
            }
        })
        .collect();
    if !absorbed {
        merged.push(candidate.clone());
    }
    merged
}

/// POS-specific cleanup applied to a consolidated morphology list.
pub(crate) fn finish_profiles(pos: Pos, profiles: Vec<MorphProfile>) -> Vec<MorphProfile> {
    if pos != Pos::Verb {
        return profiles;
    }
    // Conjugated forms carry no gender; dropping it can make entries collide.
    profiles
        .into_iter()
        .map(|mut profile| {
            profile.remove(MorphAttr::Gender);
            profile
        })
        .fold(Vec::new(), |profiles, profile| merge_profile(profiles, &profile))
}
