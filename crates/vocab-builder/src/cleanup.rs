use std::sync::LazyLock;

use regex::Regex;

// Sentence ids and other numbers followed by a separator ("12\t", "2009, ").
static NUMBER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+\W+").expect("number pattern compiles"));
// An elided article or pronoun split from its word ("l homme", "d ailleurs").
static SPLIT_ELISION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\W[ldnmst])\W+(\w)").expect("elision pattern compiles")
});

/// Prepare a raw corpus line for the tagger.
///
/// Removes numeric runs with their trailing separators, then rejoins split
/// elisions with an apostrophe. The result is trimmed; an empty string means
/// the line carries nothing to tag.
pub fn clean_line(line: &str) -> String {
    let without_numbers = NUMBER_RUN.replace_all(line, "");
    SPLIT_ELISION
        .replace_all(&without_numbers, "${1}'${2}")
        .trim()
        .to_string()
}
