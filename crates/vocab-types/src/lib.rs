//! Shared types for building a tagged vocabulary from a POS-tagged corpus.
//!
//! The tagset follows Universal Dependencies (`NOUN`, `VERB`, `PROPN`, ...) and
//! morphology is restricted to the three attributes the vocabulary keeps:
//! `Gender`, `Number` and `Person`. Taggers hand back a [`RawMorph`] (every
//! attribute with all of its values, in the order the tagger emitted them);
//! [`MorphProfile::normalize`] projects that onto the kept attributes, and
//! [`subsume`] decides whether two partial profiles describe the same form.
//!
//! ```rust
//! use vocab_types::{MorphAttr, MorphProfile, Projection, RawMorph, subsume};
//!
//! let raw = RawMorph::parse_feats("Gender=Masc|Number=Sing|Tense=Pres");
//! let full = MorphProfile::normalize(&raw, Projection::AllValues);
//! let masc = MorphProfile::default().with(MorphAttr::Gender, "Masc");
//! assert_eq!(subsume(&masc, &full), Some(full.clone()));
//! assert!(subsume(&masc, &MorphProfile::default().with(MorphAttr::Gender, "Fem")).is_none());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Universal POS tag as emitted by the tagger.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
    Space,
}

impl Pos {
    pub const ALL: [Pos; 18] = [
        Pos::Adj,
        Pos::Adp,
        Pos::Adv,
        Pos::Aux,
        Pos::Cconj,
        Pos::Det,
        Pos::Intj,
        Pos::Noun,
        Pos::Num,
        Pos::Part,
        Pos::Pron,
        Pos::Propn,
        Pos::Punct,
        Pos::Sconj,
        Pos::Sym,
        Pos::Verb,
        Pos::X,
        Pos::Space,
    ];

    /// Parse an upper-case UPOS tag (`"NOUN"`, `"PROPN"`, ...).
    pub fn from_tag(tag: &str) -> Option<Self> {
        Pos::ALL.into_iter().find(|pos| pos.as_str() == tag)
    }

    /// Emit the UPOS tag string.
    pub fn as_str(self) -> &'static str {
        match self {
            Pos::Adj => "ADJ",
            Pos::Adp => "ADP",
            Pos::Adv => "ADV",
            Pos::Aux => "AUX",
            Pos::Cconj => "CCONJ",
            Pos::Det => "DET",
            Pos::Intj => "INTJ",
            Pos::Noun => "NOUN",
            Pos::Num => "NUM",
            Pos::Part => "PART",
            Pos::Pron => "PRON",
            Pos::Propn => "PROPN",
            Pos::Punct => "PUNCT",
            Pos::Sconj => "SCONJ",
            Pos::Sym => "SYM",
            Pos::Verb => "VERB",
            Pos::X => "X",
            Pos::Space => "SPACE",
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Morphological attributes retained in a [`MorphProfile`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MorphAttr {
    /// `Masc`, `Fem`, ...
    Gender,
    /// `Sing`, `Plur`
    Number,
    /// `1`, `2`, `3`
    Person,
}

impl MorphAttr {
    pub const ALL: [MorphAttr; 3] = [MorphAttr::Gender, MorphAttr::Number, MorphAttr::Person];

    /// Feature name as written by UD taggers and in the output records.
    pub fn name(self) -> &'static str {
        match self {
            MorphAttr::Gender => "Gender",
            MorphAttr::Number => "Number",
            MorphAttr::Person => "Person",
        }
    }
}

/// Every morphological feature a tagger reported for one token, in emission order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RawMorph {
    features: Vec<(String, Vec<String>)>,
}

impl RawMorph {
    /// Parse the CoNLL-U `FEATS` syntax: `Attr=Val1,Val2|Attr2=Val`.
    ///
    /// `_` and the empty string yield an empty morphology; pairs without `=`
    /// are ignored.
    pub fn parse_feats(feats: &str) -> Self {
        let feats = feats.trim();
        if feats.is_empty() || feats == "_" {
            return Self::default();
        }
        feats
            .split('|')
            .filter_map(|pair| pair.split_once('='))
            .map(|(name, values)| {
                let values = values
                    .split(',')
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect();
                (name.to_string(), values)
            })
            .collect()
    }

    pub fn push(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.features.push((name.into(), values));
    }

    /// Values recorded for `name`, if the attribute is present.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.features
            .iter()
            .find(|(feature, _)| feature == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.features
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

impl FromIterator<(String, Vec<String>)> for RawMorph {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

/// How multi-valued raw attributes collapse into a single profile value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Projection {
    /// Keep only the first value the tagger emitted.
    FirstValue,
    /// Keep every value, comma-joined in emission order (`"Masc,Fem"`).
    AllValues,
}

/// Partial assignment of `Gender`/`Number`/`Person`.
///
/// Serializes as a JSON object containing only the present attributes, keyed
/// `Gender`, `Number`, `Person` in that order.
#[derive(
    Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct MorphProfile {
    #[serde(rename = "Gender", default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(rename = "Number", default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(rename = "Person", default, skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
}

impl MorphProfile {
    /// Keep the recognized attributes of `raw`, dropping empty value lists.
    pub fn normalize(raw: &RawMorph, projection: Projection) -> Self {
        let mut profile = Self::default();
        for attr in MorphAttr::ALL {
            let Some(values) = raw.get(attr.name()) else {
                continue;
            };
            let Some(first) = values.first() else {
                continue;
            };
            match projection {
                Projection::FirstValue => profile.set(attr, first.clone()),
                Projection::AllValues => profile.set(attr, values.join(",")),
            }
        }
        profile
    }

    pub fn get(&self, attr: MorphAttr) -> Option<&str> {
        self.slot(attr).as_deref()
    }

    pub fn set(&mut self, attr: MorphAttr, value: impl Into<String>) {
        *self.slot_mut(attr) = Some(value.into());
    }

    pub fn remove(&mut self, attr: MorphAttr) -> Option<String> {
        self.slot_mut(attr).take()
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, attr: MorphAttr, value: impl Into<String>) -> Self {
        self.set(attr, value);
        self
    }

    /// Number of attributes present.
    pub fn len(&self) -> usize {
        MorphAttr::ALL
            .iter()
            .filter(|attr| self.get(**attr).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// See [`subsume`].
    pub fn subsume(&self, other: &MorphProfile) -> Option<MorphProfile> {
        subsume(self, other)
    }

    fn slot(&self, attr: MorphAttr) -> &Option<String> {
        match attr {
            MorphAttr::Gender => &self.gender,
            MorphAttr::Number => &self.number,
            MorphAttr::Person => &self.person,
        }
    }

    fn slot_mut(&mut self, attr: MorphAttr) -> &mut Option<String> {
        match attr {
            MorphAttr::Gender => &mut self.gender,
            MorphAttr::Number => &mut self.number,
            MorphAttr::Person => &mut self.person,
        }
    }
}

impl fmt::Display for MorphProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("_");
        }
        let mut first = true;
        for attr in MorphAttr::ALL {
            if let Some(value) = self.get(attr) {
                if !first {
                    f.write_str("|")?;
                }
                write!(f, "{}={}", attr.name(), value)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Merge two profiles if they are compatible.
///
/// The smaller profile (by attribute count, `a` on ties) is checked against
/// the larger one: any shared attribute with a different value makes the pair
/// incompatible and yields `None`. Otherwise the result is the larger profile
/// extended with whatever the smaller one adds, i.e. the attribute-wise union.
pub fn subsume(a: &MorphProfile, b: &MorphProfile) -> Option<MorphProfile> {
    let (small, big) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut merged = big.clone();
    for attr in MorphAttr::ALL {
        let Some(value) = small.get(attr) else {
            continue;
        };
        match big.get(attr) {
            Some(existing) if existing != value => return None,
            Some(_) => {}
            None => merged.set(attr, value),
        }
    }
    Some(merged)
}

/// One token of tagger output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    pub text: String,
    pub pos: Pos,
    pub morph: RawMorph,
}

impl Token {
    pub fn new(text: impl Into<String>, pos: Pos, morph: RawMorph) -> Self {
        Self {
            text: text.into(),
            pos,
            morph,
        }
    }
}

/// Final vocabulary entry: a word, its dominant POS and its distinct morphologies.
///
/// `pos` is `None` for reference words that were never observed; it is written
/// as an empty string so the line shape stays fixed.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct WordRecord {
    pub word: String,
    #[serde(with = "pos_or_empty")]
    pub pos: Option<Pos>,
    pub morph: Vec<MorphProfile>,
}

impl WordRecord {
    /// Record for a word with no observations.
    pub fn unknown(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            pos: None,
            morph: Vec::new(),
        }
    }
}

mod pos_or_empty {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Pos;

    pub fn serialize<S: Serializer>(pos: &Option<Pos>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(pos.map(Pos::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Pos>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        Pos::from_tag(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unknown POS tag {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(pairs: &[(MorphAttr, &str)]) -> MorphProfile {
        pairs
            .iter()
            .fold(MorphProfile::default(), |p, (attr, value)| p.with(*attr, *value))
    }

    #[test]
    fn parses_pos_tags() {
        assert_eq!(Pos::from_tag("PROPN"), Some(Pos::Propn));
        assert_eq!(Pos::from_tag("CCONJ"), Some(Pos::Cconj));
        assert_eq!(Pos::from_tag("noun"), None);
        for pos in Pos::ALL {
            assert_eq!(Pos::from_tag(pos.as_str()), Some(pos));
        }
    }

    #[test]
    fn parses_feats_column() {
        let raw = RawMorph::parse_feats("Gender=Masc,Fem|Number=Sing|Mood=Ind");
        assert_eq!(raw.get("Gender").unwrap(), ["Masc", "Fem"]);
        assert_eq!(raw.get("Number").unwrap(), ["Sing"]);
        assert!(raw.get("Person").is_none());
        assert!(RawMorph::parse_feats("_").is_empty());
        assert!(RawMorph::parse_feats("garbage").is_empty());
    }

    #[test]
    fn normalizes_both_projections() {
        let raw = RawMorph::parse_feats("Gender=Masc,Fem|Number=Sing|Tense=Past|Person=");
        let strict = MorphProfile::normalize(&raw, Projection::FirstValue);
        let dict = MorphProfile::normalize(&raw, Projection::AllValues);
        assert_eq!(strict.get(MorphAttr::Gender), Some("Masc"));
        assert_eq!(dict.get(MorphAttr::Gender), Some("Masc,Fem"));
        assert_eq!(dict.get(MorphAttr::Number), Some("Sing"));
        assert_eq!(dict.get(MorphAttr::Person), None);
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn subsumes_compatible_profiles() {
        let masc = profile(&[(MorphAttr::Gender, "Masc")]);
        let masc_sing = profile(&[(MorphAttr::Gender, "Masc"), (MorphAttr::Number, "Sing")]);
        assert_eq!(subsume(&masc, &masc_sing), Some(masc_sing.clone()));
        assert_eq!(subsume(&masc_sing, &masc), Some(masc_sing.clone()));
        assert_eq!(subsume(&MorphProfile::default(), &masc), Some(masc.clone()));
    }

    #[test]
    fn rejects_conflicting_profiles() {
        let masc = profile(&[(MorphAttr::Gender, "Masc")]);
        let fem = profile(&[(MorphAttr::Gender, "Fem")]);
        assert_eq!(subsume(&masc, &fem), None);

        let sing = profile(&[(MorphAttr::Gender, "Masc"), (MorphAttr::Number, "Sing")]);
        let plur = profile(&[(MorphAttr::Gender, "Masc"), (MorphAttr::Number, "Plur")]);
        assert_eq!(subsume(&sing, &plur), None);
    }

    #[test]
    fn subsume_is_union_when_disjoint() {
        let gender = profile(&[(MorphAttr::Gender, "Fem")]);
        let person = profile(&[(MorphAttr::Person, "3"), (MorphAttr::Number, "Plur")]);
        let merged = subsume(&gender, &person).unwrap();
        assert_eq!(
            merged,
            profile(&[
                (MorphAttr::Gender, "Fem"),
                (MorphAttr::Number, "Plur"),
                (MorphAttr::Person, "3"),
            ])
        );
        assert_eq!(subsume(&person, &gender), Some(merged));
    }

    #[test]
    fn serializes_records_in_fixed_key_order() {
        let record = WordRecord {
            word: "été".into(),
            pos: Some(Pos::Noun),
            morph: vec![profile(&[(MorphAttr::Number, "Sing"), (MorphAttr::Gender, "Masc")])],
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"word":"été","pos":"NOUN","morph":[{"Gender":"Masc","Number":"Sing"}]}"#
        );

        let unknown = serde_json::to_string(&WordRecord::unknown("ou")).unwrap();
        assert_eq!(unknown, r#"{"word":"ou","pos":"","morph":[]}"#);

        let back: WordRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn displays_profiles_in_feats_syntax() {
        let p = profile(&[(MorphAttr::Person, "1"), (MorphAttr::Number, "Plur")]);
        assert_eq!(p.to_string(), "Number=Plur|Person=1");
        assert_eq!(MorphProfile::default().to_string(), "_");
    }
}
