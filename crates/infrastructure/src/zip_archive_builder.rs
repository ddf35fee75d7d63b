//! ZIP archives assembled from temp-file staged parts.

use std::io::{Cursor, Seek, Write};
use std::path::PathBuf;

use tempfile::Builder;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use surveyrpc_application::{ArchiveBuilder, ArchiveWriter};
use surveyrpc_core::{AppError, AppResult};

/// Creates deflate-compressed ZIP archives, staging parts under `temp_dir`.
#[derive(Debug, Clone)]
pub struct ZipArchiveBuilder {
    temp_dir: PathBuf,
}

impl ZipArchiveBuilder {
    /// Creates a builder staging parts in the given directory.
    #[must_use]
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
        }
    }
}

impl ArchiveBuilder for ZipArchiveBuilder {
    fn create(&self) -> AppResult<Box<dyn ArchiveWriter>> {
        Ok(Box::new(ZipArchiveWriter {
            temp_dir: self.temp_dir.clone(),
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }))
    }
}

struct ZipArchiveWriter {
    temp_dir: PathBuf,
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

fn archive_error(operation: &str, error: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("failed to {operation}: {error}"))
}

impl ArchiveWriter for ZipArchiveWriter {
    fn add_part(&mut self, entry_name: &str, content: &[u8]) -> AppResult<()> {
        let mut staged = Builder::new()
            .prefix("surveyrpc-part-")
            .tempfile_in(&self.temp_dir)
            .map_err(|error| archive_error("create export temp file", error))?;
        staged
            .write_all(content)
            .and_then(|()| staged.flush())
            .and_then(|()| staged.rewind())
            .map_err(|error| archive_error("stage export part", error))?;

        self.zip
            .start_file(
                entry_name,
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            )
            .map_err(|error| archive_error("start archive entry", error))?;
        std::io::copy(&mut staged, &mut self.zip)
            .map_err(|error| archive_error("write archive entry", error))?;

        staged
            .close()
            .map_err(|error| archive_error("remove export temp file", error))
    }

    fn finish(self: Box<Self>) -> AppResult<Vec<u8>> {
        self.zip
            .finish()
            .map(Cursor::into_inner)
            .map_err(|error| archive_error("finish archive", error))
    }
}
