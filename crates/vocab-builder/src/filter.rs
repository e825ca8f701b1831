use std::cmp::Ordering;
use std::collections::HashSet;

use vocab_types::{Pos, WordRecord};

/// Lowercase letters with French diacritics, apostrophe, hyphen and underscore.
pub const DEFAULT_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzàâäçéèêëîïôöùûüÿæœ'-_";
pub const DEFAULT_MIN_CHARS: usize = 2;
pub const DEFAULT_MAX_CHAR_RUN: usize = 3;

/// Inclusion rules for finalized records.
#[derive(Clone, Debug)]
pub struct FilterRules {
    /// Records with one of these tags are dropped. Records without a tag always are.
    pub rejected_pos: Vec<Pos>,
    pub min_chars: usize,
    /// Permitted characters, checked against the lowercase word.
    pub alphabet: HashSet<char>,
    /// Longest allowed run of one repeated character, if limited.
    pub max_char_run: Option<usize>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            rejected_pos: vec![Pos::Propn, Pos::X],
            min_chars: DEFAULT_MIN_CHARS,
            alphabet: DEFAULT_ALPHABET.chars().collect(),
            max_char_run: Some(DEFAULT_MAX_CHAR_RUN),
        }
    }
}

impl FilterRules {
    pub fn with_alphabet(mut self, alphabet: &str) -> Self {
        self.alphabet = alphabet.chars().collect();
        self
    }

    pub fn accepts(&self, record: &WordRecord) -> bool {
        match record.pos {
            None => false,
            Some(pos) if self.rejected_pos.contains(&pos) => false,
            Some(_) => self.word_allowed(&record.word),
        }
    }

    fn word_allowed(&self, word: &str) -> bool {
        if word.chars().count() < self.min_chars {
            return false;
        }
        let lower = word.to_lowercase();
        if !lower.chars().all(|c| self.alphabet.contains(&c)) {
            return false;
        }
        match self.max_char_run {
            Some(max) => longest_run(&lower) <= max,
            None => true,
        }
    }
}

fn longest_run(word: &str) -> usize {
    let mut longest = 0;
    let mut run = 0;
    let mut prev = None;
    for c in word.chars() {
        run = if prev == Some(c) { run + 1 } else { 1 };
        longest = longest.max(run);
        prev = Some(c);
    }
    longest
}

/// Output order: shorter words first, then code-point order.
pub fn compare_words(a: &str, b: &str) -> Ordering {
    a.chars()
        .count()
        .cmp(&b.chars().count())
        .then_with(|| a.cmp(b))
}

/// Keep the records `rules` accept, sorted by [`compare_words`].
pub fn filter_and_sort(records: Vec<WordRecord>, rules: &FilterRules) -> Vec<WordRecord> {
    let mut kept: Vec<WordRecord> = records.into_iter().filter(|r| rules.accepts(r)).collect();
    kept.sort_by(|a, b| compare_words(&a.word, &b.word));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocab_types::MorphProfile;

    fn rec(word: &str, pos: Option<Pos>) -> WordRecord {
        WordRecord {
            word: word.into(),
            pos,
            morph: vec![MorphProfile::default()],
        }
    }

    #[test]
    fn rejects_by_pos() {
        let rules = FilterRules::default();
        assert!(!rules.accepts(&rec("paris", Some(Pos::Propn))));
        assert!(!rules.accepts(&rec("blah", Some(Pos::X))));
        assert!(!rules.accepts(&rec("zinc", None)));
        assert!(rules.accepts(&rec("zinc", Some(Pos::Noun))));
    }

    #[test]
    fn rejects_short_words_and_foreign_characters() {
        let rules = FilterRules::default();
        assert!(!rules.accepts(&rec("a", Some(Pos::Adp))));
        assert!(!rules.accepts(&rec("straße", Some(Pos::Noun))));
        assert!(!rules.accepts(&rec("l2", Some(Pos::Noun))));
        assert!(!rules.accepts(&rec("deux mots", Some(Pos::Noun))));
        assert!(rules.accepts(&rec("Été", Some(Pos::Noun))));
        assert!(rules.accepts(&rec("aujourd'hui", Some(Pos::Adv))));
        assert!(rules.accepts(&rec("peut-être", Some(Pos::Adv))));
    }

    #[test]
    fn rejects_long_character_runs() {
        let rules = FilterRules::default();
        assert!(rules.accepts(&rec("brrr", Some(Pos::Intj))));
        assert!(!rules.accepts(&rec("brrrr", Some(Pos::Intj))));
        let unlimited = FilterRules {
            max_char_run: None,
            ..FilterRules::default()
        };
        assert!(unlimited.accepts(&rec("brrrr", Some(Pos::Intj))));
    }

    #[test]
    fn sorts_by_length_then_code_point() {
        let words = ["été", "chat", "du", "de", "zèbre", "abri", "ça", "eau"];
        let records = words.iter().map(|w| rec(w, Some(Pos::Noun))).collect();
        let sorted: Vec<String> = filter_and_sort(records, &FilterRules::default())
            .into_iter()
            .map(|r| r.word)
            .collect();
        assert_eq!(
            sorted,
            ["de", "du", "ça", "eau", "été", "abri", "chat", "zèbre"]
        );
    }
}
