use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where finished reports go.
pub trait ReportSink {
    /// Store `bytes` under `file_name`, returning where they ended up.
    fn write(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Writes reports into a directory, creating it on first use.
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for FileSink {
    fn write(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}
