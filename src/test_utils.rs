//! Helpers to build decompiled trees on disk for tests.

use crate::{
    catalog::Library,
    tree::{DecompiledTree, DiskTree, Entry},
};
use std::{
    fs, io, iter,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

/// Temporary decompiled application tree.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Creates a fixture whose root directory is called `name`.
    pub fn named(name: &str) -> (Self, PathBuf) {
        let fixture = Self::new();
        let root = fixture.path().join(name);
        fs::create_dir_all(&root).unwrap();
        (fixture, root)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file<P: AsRef<Path>>(&self, relative: P, contents: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    pub fn dir<P: AsRef<Path>>(&self, relative: P) {
        fs::create_dir_all(self.dir.path().join(relative)).unwrap();
    }
}

pub fn library(id: u32, package_name: &str, category: &str) -> Library {
    Library::new(id, package_name.to_uppercase(), package_name, category)
}

/// Tree on disk whose walk fails after listing every entry, as an unreadable directory would.
pub struct FailingTree(pub DiskTree);

impl DecompiledTree for FailingTree {
    fn root(&self) -> &Path {
        self.0.root()
    }

    fn exists(&self, relative: &Path) -> bool {
        self.0.exists(relative)
    }

    fn children(&self, relative: &Path) -> io::Result<Vec<Entry>> {
        self.0.children(relative)
    }

    fn walk(&self) -> Box<dyn Iterator<Item = io::Result<Entry>> + '_> {
        Box::new(self.0.walk().chain(iter::once(Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "permission denied",
        )))))
    }

    fn read_to_string(&self, relative: &Path) -> io::Result<String> {
        self.0.read_to_string(relative)
    }
}

/// Makes the given directory of the fixture unreadable.
///
/// Returns `false` if it can still be listed, which happens when running as root.
#[cfg(unix)]
pub fn lock_dir(fixture: &Fixture, relative: &str) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let dir = fixture.path().join(relative);
    fs::create_dir_all(&dir).unwrap();
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o000)).unwrap();
    fs::read_dir(&dir).is_err()
}

/// Makes a directory locked with [`lock_dir`] readable again, so the fixture can be removed.
#[cfg(unix)]
pub fn unlock_dir(fixture: &Fixture, relative: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(
        fixture.path().join(relative),
        fs::Permissions::from_mode(0o755),
    )
    .unwrap();
}
