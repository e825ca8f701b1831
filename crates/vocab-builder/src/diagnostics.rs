//! Optional corpus telemetry: POS/morphology pair counts and POS n-grams.
//!
//! None of this feeds the vocabulary itself; it is written next to it for
//! downstream scoring of word sequences.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;
use vocab_types::{MorphProfile, Pos, Projection, Token};

pub const MIN_NGRAM: usize = 2;
pub const MAX_NGRAM: usize = 4;

type PairKey = (Pos, MorphProfile, Pos, MorphProfile);

/// `{"tagging": [pos, morph, next_pos, next_morph], "nb": n}`
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TaggingStat {
    pub tagging: PairKey,
    pub nb: u64,
}

/// `{"pos": [...], "occ": n}`
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PosNGram {
    pub pos: Vec<Pos>,
    pub occ: u64,
}

/// `{"word": w, "occ": n}`
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NewWordStat {
    pub word: String,
    pub occ: u64,
}

#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    pairs: HashMap<PairKey, u64>,
    ngrams: HashMap<Vec<Pos>, u64>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count adjacent pairs and n-grams of one tagged line, skipping any
    /// window that touches punctuation.
    pub fn observe_line(&mut self, tokens: &[Token]) {
        for pair in tokens.windows(2) {
            let (token, next) = (&pair[0], &pair[1]);
            if token.pos == Pos::Punct || next.pos == Pos::Punct {
                continue;
            }
            let key = (
                token.pos,
                MorphProfile::normalize(&token.morph, Projection::FirstValue),
                next.pos,
                MorphProfile::normalize(&next.morph, Projection::FirstValue),
            );
            *self.pairs.entry(key).or_insert(0) += 1;
        }

        for n in MIN_NGRAM..=MAX_NGRAM {
            for window in tokens.windows(n) {
                if window.iter().any(|t| t.pos == Pos::Punct) {
                    continue;
                }
                let key: Vec<Pos> = window.iter().map(|t| t.pos).collect();
                *self.ngrams.entry(key).or_insert(0) += 1;
            }
        }
    }

    /// Pair counts, most frequent first.
    pub fn tagging_stats(&self) -> Vec<TaggingStat> {
        ranked(&self.pairs)
            .into_iter()
            .map(|(tagging, nb)| TaggingStat { tagging, nb })
            .collect()
    }

    /// N-gram counts, most frequent first.
    pub fn pos_ngrams(&self) -> Vec<PosNGram> {
        ranked(&self.ngrams)
            .into_iter()
            .map(|(pos, occ)| PosNGram { pos, occ })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.ngrams.is_empty()
    }
}

pub fn new_word_stats(kept: &[(String, u64)]) -> Vec<NewWordStat> {
    kept.iter()
        .map(|(word, occ)| NewWordStat {
            word: word.clone(),
            occ: *occ,
        })
        .collect()
}

fn ranked<K: Clone + Ord + Hash>(counts: &HashMap<K, u64>) -> Vec<(K, u64)> {
    let mut entries: Vec<(K, u64)> = counts.iter().map(|(k, n)| (k.clone(), *n)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}
