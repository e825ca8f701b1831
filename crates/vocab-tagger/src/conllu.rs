use vocab_types::{Pos, RawMorph, Token};

use crate::{TaggedLine, TaggerError};

const MIN_COLUMNS: usize = 6;
const FORM: usize = 1;
const UPOS: usize = 3;
const FEATS: usize = 5;

/// Parse CoNLL-U text into sentence blocks.
///
/// Blocks are separated by blank lines. A block made only of comments still
/// counts as a (token-less) sentence so output stays aligned with input lines.
/// Multiword ranges (`1-2`) and empty nodes (`3.1`) are skipped; unknown UPOS
/// values map to [`Pos::X`].
pub fn parse_conllu(text: &str) -> Result<Vec<TaggedLine>, TaggerError> {
    let mut sentences = Vec::new();
    let mut current: TaggedLine = Vec::new();
    let mut in_block = false;

    for (lineno, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if in_block {
                sentences.push(std::mem::take(&mut current));
                in_block = false;
            }
            continue;
        }
        in_block = true;
        if line.starts_with('#') {
            continue;
        }

        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() < MIN_COLUMNS {
            return Err(TaggerError::Conllu {
                line: lineno + 1,
                reason: format!("expected at least {MIN_COLUMNS} columns, got {}", columns.len()),
            });
        }
        let id = columns[0];
        if id.contains('-') || id.contains('.') {
            continue;
        }
        if id.parse::<u32>().is_err() {
            return Err(TaggerError::Conllu {
                line: lineno + 1,
                reason: format!("invalid token id {id:?}"),
            });
        }

        let pos = Pos::from_tag(columns[UPOS]).unwrap_or(Pos::X);
        current.push(Token::new(
            columns[FORM],
            pos,
            RawMorph::parse_feats(columns[FEATS]),
        ));
    }

    if in_block {
        sentences.push(current);
    }
    Ok(sentences)
}
