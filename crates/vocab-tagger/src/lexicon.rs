use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;
use vocab_types::{Pos, RawMorph, Token};

use crate::{TaggedLine, Tagger, TaggerError};

// Elided article or pronoun ("l'", "qu'"), then words (hyphens allowed), then
// any single non-space symbol.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+['’]|[\w-]+|[^\w\s]").expect("token pattern compiles")
});

/// Dictionary-backed tagger.
///
/// Each token is looked up by its lowercase form. Tokens missing from the
/// lexicon are tagged `PUNCT` when they contain no alphanumeric character,
/// `NUM` when they are all digits, and `X` otherwise.
#[derive(Clone, Debug, Default)]
pub struct LexiconTagger {
    entries: HashMap<String, (Pos, RawMorph)>,
}

impl LexiconTagger {
    /// Load a lexicon of `form<TAB>UPOS[<TAB>FEATS]` rows.
    ///
    /// Blank lines and `#` comments are ignored; an unknown UPOS is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TaggerError> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut tagger = Self::default();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut columns = line.split('\t');
            let form = columns.next().unwrap_or_default().trim();
            let tag = columns.next().map(str::trim).unwrap_or_default();
            if form.is_empty() || tag.is_empty() {
                return Err(TaggerError::Lexicon {
                    line: lineno + 1,
                    reason: "expected form and UPOS columns".into(),
                });
            }
            let pos = Pos::from_tag(tag).ok_or_else(|| TaggerError::Lexicon {
                line: lineno + 1,
                reason: format!("unknown UPOS {tag:?}"),
            })?;
            let morph = RawMorph::parse_feats(columns.next().unwrap_or("_"));
            tagger.insert(form, pos, morph);
        }
        info!(
            "loaded {} lexicon entries from {}",
            tagger.len(),
            path.display()
        );
        Ok(tagger)
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Pos, RawMorph)>,
        S: AsRef<str>,
    {
        let mut tagger = Self::default();
        for (form, pos, morph) in entries {
            tagger.insert(form.as_ref(), pos, morph);
        }
        tagger
    }

    /// Add or replace an entry. Later entries for the same form win.
    pub fn insert(&mut self, form: &str, pos: Pos, morph: RawMorph) {
        self.entries.insert(form.to_lowercase(), (pos, morph));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn tag_line(&self, line: &str) -> TaggedLine {
        TOKEN_PATTERN
            .find_iter(line)
            .map(|m| {
                let text = m.as_str();
                match self.entries.get(&text.to_lowercase()) {
                    Some((pos, morph)) => Token::new(text, *pos, morph.clone()),
                    None => Token::new(text, fallback_pos(text), RawMorph::default()),
                }
            })
            .collect()
    }
}

fn fallback_pos(text: &str) -> Pos {
    if !text.chars().any(char::is_alphanumeric) {
        Pos::Punct
    } else if text.chars().all(|c| c.is_ascii_digit()) {
        Pos::Num
    } else {
        Pos::X
    }
}

impl Tagger for LexiconTagger {
    fn tag(&mut self, lines: &[String]) -> Result<Vec<TaggedLine>, TaggerError> {
        Ok(lines.iter().map(|line| self.tag_line(line)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagger() -> LexiconTagger {
        LexiconTagger::from_entries([
            ("l'", Pos::Det, RawMorph::parse_feats("Number=Sing")),
            ("homme", Pos::Noun, RawMorph::parse_feats("Gender=Masc|Number=Sing")),
            ("rit", Pos::Verb, RawMorph::parse_feats("Number=Sing|Person=3")),
        ])
    }

    #[test]
    fn splits_elisions_words_and_punctuation() {
        let tokens = tagger().tag_line("L'homme rit, 42 fois!");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["L'", "homme", "rit", ",", "42", "fois", "!"]);
        let tags: Vec<Pos> = tokens.iter().map(|t| t.pos).collect();
        assert_eq!(
            tags,
            [Pos::Det, Pos::Noun, Pos::Verb, Pos::Punct, Pos::Num, Pos::X, Pos::Punct]
        );
    }

    #[test]
    fn keeps_hyphenated_words_whole() {
        let tokens = tagger().tag_line("peut-être");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "peut-être");
    }

    #[test]
    fn returns_one_line_per_input() {
        let mut tagger = tagger();
        let out = tagger
            .tag(&["homme".to_string(), String::new(), "rit".to_string()])
            .unwrap();
        assert_eq!(out.len(), 3);
        assert!(out[1].is_empty());
    }
}
