//! Append-only CSV record store for accepted submissions.
//!
//! The file starts with the fixed [`CSV_HEADER`] row and then gets one row
//! per submission, never rewritten. Two properties matter under concurrent
//! requests:
//!
//! - The header is written to a temporary file in the target directory and
//!   linked into place with `persist_noclobber`, so the record file never
//!   exists without its header and a second creator loses the race cleanly
//!   instead of adding another header.
//! - Each row is CSV-encoded into memory first and handed to a file opened in
//!   append mode with one `write_all`, so rows from parallel requests do not
//!   interleave.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use common::model::submission::{Submission, CSV_HEADER};
use log::{debug, warn};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not create storage directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("could not create record file {path}: {source}")]
    CreateFile { path: PathBuf, source: io::Error },

    #[error("could not encode row: {0}")]
    Encode(#[from] csv::Error),

    #[error("could not append to {path}: {source}")]
    Append { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone)]
pub struct SubmissionStore {
    data_dir: PathBuf,
    csv_file: PathBuf,
}

impl SubmissionStore {
    pub fn new(data_dir: impl Into<PathBuf>, csv_file: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            csv_file: csv_file.into(),
        }
    }

    pub fn csv_file(&self) -> &Path {
        &self.csv_file
    }

    /// Creates the storage directory and, when missing, the record file with
    /// its header row. Safe to call any number of times, from any number of
    /// threads or processes.
    pub fn ensure_storage(&self) -> Result<(), StoreError> {
        create_dir(&self.data_dir)?;
        let parent = match self.csv_file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        create_dir(&parent)?;

        if self.csv_file.exists() {
            return Ok(());
        }

        let header = encode_row(&CSV_HEADER)?;
        let create_err = |source| StoreError::CreateFile {
            path: self.csv_file.clone(),
            source,
        };

        let mut staged = NamedTempFile::new_in(&parent).map_err(create_err)?;
        staged.write_all(&header).map_err(create_err)?;
        staged.as_file().sync_all().map_err(create_err)?;

        match staged.persist_noclobber(&self.csv_file) {
            Ok(_) => {
                debug!("Created record file {}", self.csv_file.display());
                Ok(())
            }
            // Someone else created it between our check and the link.
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(create_err(e.error)),
        }
    }

    /// Appends one row for `submission`.
    pub fn append(&self, submission: &Submission) -> Result<(), StoreError> {
        self.ensure_storage()?;

        let row = encode_row(&submission.record())?;
        let append_err = |source| StoreError::Append {
            path: self.csv_file.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.csv_file)
            .map_err(append_err)?;
        file.write_all(&row).map_err(append_err)?;
        Ok(())
    }

    /// Best-effort [`append`](Self::append): failures are logged and reported
    /// as `false`.
    pub fn save(&self, submission: &Submission) -> bool {
        match self.append(submission) {
            Ok(()) => true,
            Err(e) => {
                warn!("Submission not saved: {e}");
                false
            }
        }
    }
}

fn create_dir(path: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(path).map_err(|source| StoreError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

/// Encodes a single CSV record, terminator included.
fn encode_row(fields: &[&str]) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(fields)?;
    writer
        .into_inner()
        .map_err(|e| StoreError::Encode(csv::Error::from(e.into_error())))
}
