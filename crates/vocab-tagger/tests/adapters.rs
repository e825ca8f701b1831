use std::path::PathBuf;

use vocab_tagger::{LexiconTagger, Tagger, TaggerError, parse_conllu};
use vocab_types::{MorphAttr, MorphProfile, Pos, Projection};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn parses_conllu_fixture() {
    let text = std::fs::read_to_string(fixture("sample.conllu")).expect("read fixture");
    let sentences = parse_conllu(&text).expect("parse fixture");
    assert_eq!(sentences.len(), 2);

    let dort = &sentences[0][2];
    assert_eq!(dort.text, "dort");
    assert_eq!(dort.pos, Pos::Verb);
    let profile = MorphProfile::normalize(&dort.morph, Projection::FirstValue);
    assert_eq!(profile.get(MorphAttr::Person), Some("3"));
    assert_eq!(profile.get(MorphAttr::Gender), None);

    assert_eq!(sentences[1][0].pos, Pos::Propn);
}

#[test]
fn loads_lexicon_fixture() {
    let mut tagger = LexiconTagger::load(fixture("lexicon.tsv")).expect("load lexicon");
    assert_eq!(tagger.len(), 7);

    let tagged = tagger
        .tag(&["Marie dort vite.".to_string(), "la chats".to_string()])
        .expect("tag");
    let tags: Vec<Pos> = tagged[0].iter().map(|t| t.pos).collect();
    assert_eq!(tags, [Pos::Propn, Pos::Verb, Pos::Adv, Pos::Punct]);
    assert_eq!(tagged[1][1].morph.get("Number").unwrap(), ["Plur"]);
}

#[test]
fn lexicon_rejects_unknown_tags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.tsv");
    std::fs::write(&path, "chat\tNOUN\nchien\tANIMAL\n").unwrap();
    let err = LexiconTagger::load(&path).unwrap_err();
    assert!(matches!(err, TaggerError::Lexicon { line: 2, .. }));
}

#[cfg(unix)]
mod command {
    use super::*;
    use vocab_tagger::CommandTagger;

    fn replaying_tagger(conllu: &std::path::Path) -> CommandTagger {
        CommandTagger::new("sh")
            .arg("-c")
            .arg(format!("cat > /dev/null; cat '{}'", conllu.display()))
    }

    #[test]
    fn reads_conllu_from_external_program() {
        let mut tagger = replaying_tagger(&fixture("sample.conllu"));
        let lines = vec!["Le chat dort.".to_string(), "Marie chante".to_string()];
        let tagged = tagger.tag(&lines).expect("tag through sh");
        assert_eq!(tagged.len(), 2);
        assert_eq!(tagged[1][1].text, "chante");
    }

    #[test]
    fn misaligned_output_is_fatal() {
        let mut tagger = replaying_tagger(&fixture("sample.conllu"));
        let err = tagger.tag(&["une seule ligne".to_string()]).unwrap_err();
        assert!(matches!(
            err,
            TaggerError::Misaligned {
                expected: 1,
                got: 2
            }
        ));
    }

    #[test]
    fn lines_without_output_are_tagged_empty() {
        // Echoes every line as one NOUN token, except "vide" which yields nothing.
        let script = r#"while IFS= read -r line; do
  case "$line" in
    vide) ;;
    *) printf '1\t%s\t%s\tNOUN\t_\t_\t0\troot\t_\t_\n\n' "$line" "$line" ;;
  esac
done"#;
        let mut tagger = CommandTagger::new("sh").arg("-c").arg(script);
        let lines = vec!["chat".to_string(), "vide".to_string(), "chien".to_string()];
        let tagged = tagger.tag(&lines).expect("tag through sh");
        assert_eq!(tagged.len(), 3);
        assert_eq!(tagged[0][0].text, "chat");
        assert!(tagged[1].is_empty());
        assert_eq!(tagged[2][0].text, "chien");
        assert_eq!(tagged[2][0].pos, Pos::Noun);
    }

    #[test]
    fn failing_program_reports_exit_status() {
        let mut tagger = CommandTagger::new("sh")
            .arg("-c")
            .arg("cat > /dev/null; echo 'model not found' >&2; exit 3");
        let err = tagger.warm_up().unwrap_err();
        match err {
            TaggerError::Exit { stderr, .. } => assert_eq!(stderr, "model not found"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
