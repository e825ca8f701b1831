use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use vocab_tagger::{LexiconTagger, Tagger};
use vocab_types::{MorphProfile, Projection};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let lexicon = args.next().map(PathBuf::from).context(
        "usage: cargo run -p vocab-tagger --example tag_lines -- <lexicon.tsv> <line>...",
    )?;
    let lines: Vec<String> = args.collect();

    let mut tagger = LexiconTagger::load(&lexicon)
        .with_context(|| format!("loading lexicon from {}", lexicon.display()))?;

    for (line, tokens) in lines.iter().zip(tagger.tag(&lines)?) {
        println!("{line}");
        for token in tokens {
            let morph = MorphProfile::normalize(&token.morph, Projection::AllValues);
            println!("  {:<16} {:<6} {}", token.text, token.pos, morph);
        }
    }

    Ok(())
}
