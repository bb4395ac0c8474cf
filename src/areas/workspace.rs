//! Local file system access
//!
//! [`LocalFileSystem`] is the seam the pattern engine walks through;
//! [`Workspace`] is the real implementation over `std::fs` and `walkdir`.

use crate::artifacts::paths::project_path::ProjectPath;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directories never scanned for sources or translations.
pub const IGNORED_PATHS: [&str; 2] = [".git", ".idea"];

pub type FileWalk<'a> = Box<dyn Iterator<Item = io::Result<PathBuf>> + Send + 'a>;

pub trait LocalFileSystem: Send + Sync {
    /// Lazily yields every regular file under `root` in a deterministic order.
    fn walk<'a>(&'a self, root: &'a Path) -> FileWalk<'a>;

    fn is_file(&self, path: &Path) -> bool;

    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Writes `bytes`, creating missing parent directories.
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

pub fn is_ignored(path: &ProjectPath) -> bool {
    path.segments().any(|segment| IGNORED_PATHS.contains(&segment))
}

fn is_ignored_name(name: &OsStr) -> bool {
    IGNORED_PATHS.contains(&name.to_string_lossy().as_ref())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Workspace;

impl LocalFileSystem for Workspace {
    fn walk<'a>(&'a self, root: &'a Path) -> FileWalk<'a> {
        let files = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_ignored_name(entry.file_name()))
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
                Ok(_) => None,
                Err(error) => Some(Err(error.into())),
            });

        Box::new(files)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, bytes)
    }
}
