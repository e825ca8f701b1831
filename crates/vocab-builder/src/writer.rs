use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize record for {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to move output into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

/// Write one JSON document per line, replacing `path` atomically.
///
/// Returns the number of lines written.
pub fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> Result<usize, WriteError> {
    let io_err = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(io_err)?;

    let temp = NamedTempFile::new_in(parent).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(&temp);
        for item in items {
            serde_json::to_writer(&mut writer, item).map_err(|source| WriteError::Json {
                path: path.to_path_buf(),
                source,
            })?;
            writer.write_all(b"\n").map_err(io_err)?;
        }
        writer.flush().map_err(io_err)?;
    }
    temp.persist(path).map_err(|source| WriteError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(items.len())
}
