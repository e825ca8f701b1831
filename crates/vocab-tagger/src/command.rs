use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use tracing::{debug, warn};

use crate::conllu::parse_conllu;
use crate::{TaggedLine, Tagger, TaggerError};

const PROBE_LINE: &str = "ok";

/// Runs an external tagging program once per batch.
///
/// The batch is written to the program's stdin, one line per input line, and
/// stdout is read as CoNLL-U with one sentence block per input line (for
/// UDPipe that means `--tokenizer=presegmented`). A line the program prints
/// no block for is tagged as empty.
#[derive(Clone, Debug)]
pub struct CommandTagger {
    program: String,
    args: Vec<String>,
}

impl CommandTagger {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// One run of the program over `lines`, without the alignment check.
    fn run_batch(&self, lines: &[String]) -> Result<Vec<TaggedLine>, TaggerError> {
        let mut input = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines {
            input.push_str(&line.replace(['\r', '\n'], " "));
            input.push('\n');
        }

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TaggerError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("tagger stdin unavailable"))?;
        // Feed stdin from a separate thread so a chatty tagger cannot deadlock
        // on a full stdout pipe.
        let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));
        let output = child.wait_with_output()?;
        writer
            .join()
            .map_err(|_| io::Error::other("tagger stdin writer panicked"))??;

        if !output.status.success() {
            return Err(TaggerError::Exit {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8(output.stdout)?;
        parse_conllu(&text)
    }

    /// Tag one line; a line the program emits no sentence for has no tokens.
    fn tag_single(&self, line: &str) -> Result<TaggedLine, TaggerError> {
        let mut sentences = self.run_batch(&[line.to_string()])?;
        match sentences.len() {
            0 => Ok(Vec::new()),
            1 => Ok(sentences.pop().unwrap_or_default()),
            got => Err(TaggerError::Misaligned { expected: 1, got }),
        }
    }
}

impl Tagger for CommandTagger {
    /// Tags the batch in one run of the program.
    ///
    /// When the program prints fewer sentences than it was given lines, some
    /// line produced no tokens; the batch is then retagged line by line so
    /// that line contributes nothing. More sentences than lines is an error.
    fn tag(&mut self, lines: &[String]) -> Result<Vec<TaggedLine>, TaggerError> {
        if lines.is_empty() {
            return Ok(Vec::new());
        }

        let sentences = self.run_batch(lines)?;
        if sentences.len() > lines.len() {
            return Err(TaggerError::Misaligned {
                expected: lines.len(),
                got: sentences.len(),
            });
        }
        if sentences.len() < lines.len() {
            warn!(
                "tagger returned {} sentences for {} lines, retagging line by line",
                sentences.len(),
                lines.len()
            );
            if lines.len() == 1 {
                return Ok(vec![Vec::new()]);
            }
            return lines.iter().map(|line| self.tag_single(line)).collect();
        }
        debug!(
            "tagged {} lines into {} tokens",
            lines.len(),
            sentences.iter().map(Vec::len).sum::<usize>()
        );
        Ok(sentences)
    }

    fn warm_up(&mut self) -> Result<(), TaggerError> {
        self.tag(&[PROBE_LINE.to_string()]).map(|_| ())
    }
}
