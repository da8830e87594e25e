use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::report::{build_report_document, report_filename};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("report directory {} exists but is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("cannot create report directory {}: {source}", dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write report {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(PersistError::NotADirectory(dir.to_path_buf())),
        Err(_) => fs::create_dir_all(dir).map_err(|source| PersistError::CreateDir {
            dir: dir.to_path_buf(),
            source,
        }),
    }
}

/// Stores finished research reports in one directory.
///
/// Each report is staged in a temp file next to its target and renamed into
/// place, so a reader never sees a partial paper. Publishing the same topic
/// twice replaces the earlier report.
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the paper for `topic` with its front matter and returns the path.
    pub fn publish(
        &self,
        topic: &str,
        completed_utc: &str,
        body: &str,
    ) -> Result<PathBuf, PersistError> {
        let document = build_report_document(topic, completed_utc, body);
        self.write(&report_filename(topic), &document)
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let path = self.dir.join(filename);
        let write_error = |source: io::Error| PersistError::Write {
            path: path.clone(),
            source,
        };
        let mut staged = NamedTempFile::new_in(&self.dir).map_err(write_error)?;
        staged.write_all(content.as_bytes()).map_err(write_error)?;
        staged.as_file().sync_all().map_err(write_error)?;
        staged.persist(&path).map_err(|err| write_error(err.error))?;
        Ok(path)
    }
}
