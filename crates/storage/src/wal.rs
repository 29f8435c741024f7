// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead log for durable storage
//!
//! One JSON entry per line. The log is generic over its operation type so the
//! slot registry and the booking ledger each keep their own file.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur in WAL operations
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("corrupt entry at line {line} of {path}: {source}")]
    Corrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Write-ahead log for durable operation storage
pub struct Wal<Op> {
    file: File,
    sequence: u64,
    _op: PhantomData<fn(Op)>,
}

impl<Op> Wal<Op>
where
    Op: Serialize + DeserializeOwned,
{
    /// Open or create a WAL at the given path
    pub fn open(path: &Path) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;

        // Count existing entries to set sequence number
        let reader = BufReader::new(File::open(path)?);
        let sequence = reader.lines().count() as u64;

        Ok(Self {
            file,
            sequence,
            _op: PhantomData,
        })
    }

    /// Append an operation to the log and sync it to disk
    pub fn append(&mut self, op: &Op) -> Result<u64, WalError> {
        let entry = WalEntry {
            seq: self.sequence + 1,
            op,
        };
        let line = serde_json::to_string(&entry)?;
        writeln!(self.file, "{}", line)?;
        self.file.sync_all()?;
        self.sequence += 1;
        Ok(self.sequence)
    }

    /// Get the current sequence number
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Replay all operations from the log
    ///
    /// A torn final line (crash mid-append) is skipped with a warning; a
    /// corrupt line anywhere else is an error.
    pub fn replay(path: &Path) -> Result<Vec<Op>, WalError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let lines: Vec<String> = BufReader::new(file).lines().collect::<Result<_, _>>()?;
        let last = lines.len().saturating_sub(1);
        let mut ops = Vec::with_capacity(lines.len());

        for (idx, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<OwnedEntry<Op>>(line) {
                Ok(entry) => ops.push(entry.op),
                Err(e) if idx == last => {
                    tracing::warn!(
                        path = %path.display(),
                        line = idx + 1,
                        error = %e,
                        "skipping torn WAL tail"
                    );
                }
                Err(source) => {
                    return Err(WalError::Corrupt {
                        path: path.to_path_buf(),
                        line: idx + 1,
                        source,
                    })
                }
            }
        }

        Ok(ops)
    }
}

#[derive(Serialize)]
struct WalEntry<'a, Op> {
    seq: u64,
    op: &'a Op,
}

// `seq` is informational on read
#[derive(Deserialize)]
struct OwnedEntry<Op> {
    op: Op,
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
