//! Tagger adapters: turn batches of raw text lines into UD tokens.
//!
//! The vocabulary builder treats tagging as an opaque oracle. Anything that
//! can return, for each input line, the ordered tokens with their surface
//! text, UPOS tag and raw morphology implements [`Tagger`]. Two backends ship
//! with the crate:
//!
//! - [`CommandTagger`] pipes each batch through an external program (UDPipe,
//!   a spaCy wrapper, ...) that prints CoNLL-U, one sentence block per input
//!   line.
//! - [`LexiconTagger`] looks tokens up in a tab-separated lexicon. It is
//!   deterministic and dependency-free, which makes it handy for dry runs.
//!
//! # Example
//! ```rust
//! use vocab_tagger::{LexiconTagger, Tagger};
//! use vocab_types::{Pos, RawMorph};
//!
//! # fn main() -> Result<(), vocab_tagger::TaggerError> {
//! let mut tagger = LexiconTagger::from_entries([
//!     ("le", Pos::Det, RawMorph::parse_feats("Gender=Masc|Number=Sing")),
//!     ("chat", Pos::Noun, RawMorph::parse_feats("Gender=Masc|Number=Sing")),
//!     ("dort", Pos::Verb, RawMorph::parse_feats("Number=Sing|Person=3")),
//! ]);
//! let tagged = tagger.tag(&["Le chat dort.".to_string()])?;
//! assert_eq!(tagged[0].len(), 4);
//! assert_eq!(tagged[0][3].pos, Pos::Punct);
//! # Ok(()) }
//! ```

use std::io;
use std::process::ExitStatus;

use thiserror::Error;
use vocab_types::Token;

pub mod command;
pub mod conllu;
pub mod lexicon;

pub use command::CommandTagger;
pub use conllu::parse_conllu;
pub use lexicon::LexiconTagger;

/// Tokens of one input line, in order.
pub type TaggedLine = Vec<Token>;

/// Batch tagging capability.
///
/// Implementations must return exactly one [`TaggedLine`] per input line, in
/// submission order. Any failure is fatal for the caller: partially tagged
/// batches are never returned.
pub trait Tagger {
    fn tag(&mut self, lines: &[String]) -> Result<Vec<TaggedLine>, TaggerError>;

    /// Startup probe. Backends that depend on an external model should fail
    /// here rather than on the first real batch.
    fn warm_up(&mut self) -> Result<(), TaggerError> {
        Ok(())
    }
}

impl<T: Tagger + ?Sized> Tagger for Box<T> {
    fn tag(&mut self, lines: &[String]) -> Result<Vec<TaggedLine>, TaggerError> {
        (**self).tag(lines)
    }

    fn warm_up(&mut self) -> Result<(), TaggerError> {
        (**self).warm_up()
    }
}

#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("failed to start tagger `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("tagger i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("tagger `{program}` exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("tagger output is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("malformed CoNLL-U at line {line}: {reason}")]
    Conllu { line: usize, reason: String },
    #[error("tagger returned {got} sentences for {expected} input lines")]
    Misaligned { expected: usize, got: usize },
    #[error("malformed lexicon entry at line {line}: {reason}")]
    Lexicon { line: usize, reason: String },
}
