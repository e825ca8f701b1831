//! Line-oriented corpus files, memory-mapped or read into memory.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use memmap2::Mmap;

/// Strategy for loading corpus files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map each corpus file (fast, zero-copy).
    Mmap,
    /// Read each file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// One corpus file. Lines are yielded in file order.
pub struct CorpusSource {
    path: PathBuf,
    buffer: Buffer,
}

impl CorpusSource {
    pub fn open(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let buffer = load_file(&path, mode)?;
        Ok(Self { path, buffer })
    }

    /// In-memory source, labelled with `name` in logs.
    pub fn from_bytes(name: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: name.into(),
            buffer: Buffer::Owned(bytes.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len_bytes(&self) -> usize {
        self.buffer.as_slice().len()
    }

    /// Iterate lines; `None` marks a line that is not valid UTF-8.
    pub fn lines(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        let bytes = self.buffer.as_slice();
        let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
        bytes
            .split(|b| *b == b'\n')
            .filter(move |_| !bytes.is_empty())
            .map(|line| std::str::from_utf8(strip_cr(line)).ok())
    }
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    // Zero-length files cannot be mapped on every platform.
    if len == 0 {
        return Ok(Buffer::Owned(Vec::new()));
    }
    match mode {
        LoadMode::Mmap => unsafe { Mmap::map(&file) }
            .map(Buffer::Mmap)
            .with_context(|| format!("mmap {}", path.display())),
        LoadMode::Owned => {
            let mut buf = Vec::with_capacity(len as usize);
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}
