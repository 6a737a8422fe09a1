//! Reading declared source files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use rayon::prelude::*;

use crate::error::BuildError;

/// Source of file contents keyed by declared path.
pub trait SourceReader: Send + Sync {
    /// Read the full contents of `path`.
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Reads from the local filesystem, resolving relative paths against an optional root.
#[derive(Debug, Clone, Default)]
pub struct FsReader {
    root: Option<PathBuf>,
}

impl FsReader {
    /// Relative paths resolve against `root`, or the working directory when unset.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self { root }
    }

    fn locate(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl SourceReader for FsReader {
    fn read(&self, path: &Path) -> io::Result<String> {
        let bytes = fs::read(self.locate(path))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Read every path, returning contents in input order.
///
/// An empty list is [`BuildError::EmptyInput`]; the first unreadable path aborts the call with
/// [`BuildError::UnreadableFile`]. With `parallel` the reads run on the rayon pool, but the
/// output is still ordered by index.
pub fn read_all(
    reader: &dyn SourceReader,
    paths: &[PathBuf],
    parallel: bool,
) -> Result<Vec<String>, BuildError> {
    if paths.is_empty() {
        return Err(BuildError::empty("there are no filenames to read"));
    }

    let read_one = |path: &PathBuf| {
        debug!("Reading file: {:?}", path);
        reader
            .read(path)
            .map_err(|source| BuildError::UnreadableFile {
                path: path.clone(),
                source,
            })
    };

    if parallel {
        paths.par_iter().map(read_one).collect()
    } else {
        paths.iter().map(read_one).collect()
    }
}
