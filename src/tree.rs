//! Read-only view of a decompiled application.
//!
//! Every analysis stage works on a [`DecompiledTree`], so that the detection logic never touches
//! the file system directly. [`DiskTree`] is the implementation used for the output of `apktool`.

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// A file or directory found inside a decompiled tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    path: PathBuf,
    path_str: String,
    is_dir: bool,
}

impl Entry {
    /// Creates a new entry for the given absolute path.
    pub fn new<P: Into<PathBuf>>(path: P, is_dir: bool) -> Self {
        let path = path.into();
        let path_str = slash_path(&path);
        Self {
            path,
            path_str,
            is_dir,
        }
    }

    /// Gets the absolute path of the entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the absolute path of the entry, using `/` as separator on every platform.
    ///
    /// All the path signatures are matched against this string.
    pub fn path_str(&self) -> &str {
        &self.path_str
    }

    /// Gets the file name of the entry, or an empty string for the file system root.
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Checks if the entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.is_dir
    }
}

/// Read-only access to the file tree of a decompiled application.
///
/// All relative paths are relative to [`DecompiledTree::root`].
pub trait DecompiledTree {
    /// Absolute path of the root of the tree.
    fn root(&self) -> &Path;

    /// Checks if the given relative path exists in the tree.
    fn exists(&self, relative: &Path) -> bool;

    /// Lists the direct children of the given relative directory.
    ///
    /// A missing directory has no children.
    fn children(&self, relative: &Path) -> io::Result<Vec<Entry>>;

    /// Recursively walks every file and directory in the tree, root excluded.
    fn walk(&self) -> Box<dyn Iterator<Item = io::Result<Entry>> + '_>;

    /// Reads the whole given relative file as text.
    fn read_to_string(&self, relative: &Path) -> io::Result<String>;
}

/// Decompiled tree stored on disk.
#[derive(Debug, Clone)]
pub struct DiskTree {
    root: PathBuf,
}

impl DiskTree {
    /// Opens the tree rooted at the given directory.
    pub fn open<P: AsRef<Path>>(root: P) -> io::Result<Self> {
        let root = fs::canonicalize(root.as_ref())?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("`{}` is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }
}

impl DecompiledTree for DiskTree {
    fn root(&self) -> &Path {
        &self.root
    }

    fn exists(&self, relative: &Path) -> bool {
        self.root.join(relative).exists()
    }

    fn children(&self, relative: &Path) -> io::Result<Vec<Entry>> {
        let dir = self.root.join(relative);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut children = Vec::new();
        for f in fs::read_dir(&dir)? {
            let f = f?;
            children.push(Entry::new(f.path(), f.file_type()?.is_dir()));
        }
        children.sort_by(|a, b| a.path().cmp(b.path()));
        Ok(children)
    }

    fn walk(&self) -> Box<dyn Iterator<Item = io::Result<Entry>> + '_> {
        Box::new(
            WalkDir::new(&self.root)
                .min_depth(1)
                .sort_by_file_name()
                .into_iter()
                .map(|e| {
                    e.map(|e| {
                        let is_dir = e.file_type().is_dir();
                        Entry::new(e.into_path(), is_dir)
                    })
                    .map_err(io::Error::from)
                }),
        )
    }

    fn read_to_string(&self, relative: &Path) -> io::Result<String> {
        fs::read_to_string(self.root.join(relative))
    }
}

/// Renders the path with `/` separators.
fn slash_path(path: &Path) -> String {
    let path = path.to_string_lossy();
    if cfg!(windows) {
        path.replace('\\', "/")
    } else {
        path.into_owned()
    }
}
