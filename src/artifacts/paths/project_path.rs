//! Canonical root-relative paths
//!
//! Local files, remote files, glob patterns and translation templates are all
//! compared in one form: a leading `/`, forward slashes, no empty or `.`
//! segments, `..` folded into its parent. Configuration written on Windows
//! (`src\values\strings.xml`) and on Unix therefore compare equal.

use std::fmt;
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectPath(String);

impl ProjectPath {
    pub fn root() -> Self {
        Self("/".to_string())
    }

    pub fn parse(raw: &str) -> Self {
        let unix = raw.replace('\\', "/");
        let mut segments: Vec<&str> = Vec::new();

        for segment in unix.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                segment => segments.push(segment),
            }
        }

        Self(format!("/{}", segments.join("/")))
    }

    /// Project path of `path` relative to `root`, or `None` if it lies outside.
    pub fn from_local(root: &Path, path: &Path) -> Option<Self> {
        let relative = path.strip_prefix(root).ok()?;
        let segments = relative
            .components()
            .map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self::parse(&segments.join("/")))
    }

    pub fn to_local(&self, root: &Path) -> PathBuf {
        self.segments()
            .fold(root.to_path_buf(), |path, segment| path.join(segment))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// File name without its last extension (`app.min.js` -> `app.min`).
    pub fn file_stem(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(index) if index > 0 => &name[..index],
            _ => name,
        }
    }

    /// Last extension without the dot, empty when there is none.
    pub fn extension(&self) -> &str {
        let name = self.file_name();
        match name.rfind('.') {
            Some(index) if index > 0 => &name[index + 1..],
            _ => "",
        }
    }

    pub fn parent(&self) -> Self {
        match self.0.rfind('/') {
            Some(0) | None => Self::root(),
            Some(index) => Self(self.0[..index].to_string()),
        }
    }

    /// Directory part without the leading slash (`/src/app/en.json` -> `src/app`).
    pub fn original_path(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) | None => "",
            Some(index) => &self.0[1..index],
        }
    }

    pub fn join(&self, relative: &str) -> Self {
        Self::parse(&format!("{}/{}", self.0, relative))
    }
}

impl AsRef<str> for ProjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
