use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("failed to read word list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse word table {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("word table {path} has no column named {column:?}")]
    MissingColumn { path: PathBuf, column: String },
}

/// Candidate words the scan is restricted to.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReferenceSet {
    words: HashSet<String>,
}

impl ReferenceSet {
    /// Load a word list.
    ///
    /// `.csv` and `.tsv` files are read as tables with a header row and the
    /// words taken from `column`; anything else is one word per line. Cells
    /// are trimmed and blanks skipped.
    pub fn load(path: impl AsRef<Path>, column: &str) -> Result<Self, ReferenceError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let set = match extension.as_deref() {
            Some("csv") => load_table(path, b',', column)?,
            Some("tsv") | Some("tab") => load_table(path, b'\t', column)?,
            _ => load_lines(path)?,
        };
        info!("loaded {} words from {}", set.len(), path.display());
        Ok(set)
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Remove every word of `other`, returning how many were present.
    pub fn subtract(&mut self, other: &ReferenceSet) -> usize {
        let before = self.words.len();
        self.words.retain(|w| !other.words.contains(w));
        before - self.words.len()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

fn load_table(path: &Path, delimiter: u8, column: &str) -> Result<ReferenceSet, ReferenceError> {
    let csv_err = |source| ReferenceError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;

    let headers = reader.headers().map_err(csv_err)?;
    let idx = headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| ReferenceError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })?;

    let mut words = HashSet::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        if let Some(word) = record.get(idx).map(str::trim)
            && !word.is_empty()
        {
            words.insert(word.to_string());
        }
    }
    Ok(ReferenceSet { words })
}

fn load_lines(path: &Path) -> Result<ReferenceSet, ReferenceError> {
    let text = fs::read_to_string(path).map_err(|source| ReferenceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ReferenceSet::from_words(
        text.lines().map(str::trim).filter(|w| !w.is_empty()),
    ))
}
