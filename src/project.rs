//! Project directory holding decompiled resources

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use crate::error::Result;

/// Extension of every document resource
pub const RESOURCE_EXT: &str = "json";

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/<key>.<ext>`; keys may contain `/` to nest resources
    pub fn resource_path(&self, key: &str, ext: &str) -> PathBuf {
        self.root.join(format!("{key}.{ext}"))
    }

    pub fn open_reader(&self, key: &str, ext: &str) -> Result<BufReader<File>> {
        Ok(BufReader::new(File::open(self.resource_path(key, ext))?))
    }

    pub fn create_writer(&self, key: &str, ext: &str) -> Result<BufWriter<File>> {
        let path = self.resource_path(key, ext);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(BufWriter::new(File::create(path)?))
    }
}
