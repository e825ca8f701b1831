//! Tag reference words that never occurred in the corpus.

use tracing::debug;
use vocab_tagger::{Tagger, TaggerError};
use vocab_types::{MorphProfile, Projection, WordRecord};

use crate::aggregator::finish_profiles;

/// Fill in records without a POS by tagging each word on its own line.
///
/// The first token decides POS and morphology. Records the tagger returns
/// nothing for keep the empty sentinel. Returns how many were resolved.
pub fn resolve_unseen<T: Tagger + ?Sized>(
    records: &mut [WordRecord],
    tagger: &mut T,
    batch_size: usize,
) -> Result<usize, TaggerError> {
    let pending: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.pos.is_none())
        .map(|(i, _)| i)
        .collect();

    let mut resolved = 0;
    for chunk in pending.chunks(batch_size.max(1)) {
        let lines: Vec<String> = chunk.iter().map(|&i| records[i].word.clone()).collect();
        let tagged = tagger.tag(&lines)?;
        for (&i, tokens) in chunk.iter().zip(&tagged) {
            let Some(first) = tokens.first() else {
                continue;
            };
            let profile = MorphProfile::normalize(&first.morph, Projection::AllValues);
            let record = &mut records[i];
            record.pos = Some(first.pos);
            record.morph = finish_profiles(first.pos, vec![profile]);
            resolved += 1;
        }
    }
    debug!("resolved {resolved} of {} unseen words", pending.len());
    Ok(resolved)
}
