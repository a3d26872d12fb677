//! Third party library detection.
//!
//! Libraries are detected by their package directories in the smali output. Every directory of
//! the tree is checked against the signature of every library in the catalog, so this is the
//! most expensive step of the analysis: the cost grows with the number of directories times the
//! size of the catalog.

mod merge;

pub use self::merge::{categorize, merge, Categories, MergeRule, DEFAULT_MERGE_RULES};

use super::platform::Platform;
use crate::{
    catalog::{Catalog, Library},
    tree::{DecompiledTree, Entry},
};
use anyhow::Result;
use log::debug;
use std::{
    collections::{BTreeSet, HashSet},
    path::PathBuf,
};

/// Libraries found in a decompiled tree.
#[derive(Debug, Default, Clone)]
pub struct MatchResult {
    libraries: Vec<Library>,
    untracked: BTreeSet<String>,
}

impl MatchResult {
    /// Gets the matched libraries, in the order they were first found.
    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    /// Gets the packages with code that did not match any known library.
    pub fn untracked(&self) -> &BTreeSet<String> {
        &self.untracked
    }

    /// Splits the result into matched libraries and untracked packages.
    pub fn into_parts(self) -> (Vec<Library>, BTreeSet<String>) {
        (self.libraries, self.untracked)
    }

    fn add_library(&mut self, library: &Library, found: &mut HashSet<u32>) {
        if found.insert(library.id()) {
            self.libraries.push(library.clone());
        }
    }
}

/// Detects the libraries of the application, merged and grouped by category.
///
/// Only native applications are inspected; for any other platform the result is empty.
pub fn analysis<T: DecompiledTree + ?Sized>(
    platform: Platform,
    tree: &T,
    catalog: &Catalog,
    rules: &[MergeRule],
) -> Result<(Categories, BTreeSet<String>)> {
    match platform {
        Platform::NativeJava | Platform::NativeKotlin => {
            let (libraries, untracked) = find_libraries(tree, catalog)?.into_parts();
            let libraries = merge(libraries, rules);
            let categories = categorize(libraries);
            debug!(
                "{} libraries found in {} categories, {} untracked packages",
                categories.libraries_len(),
                categories.len(),
                untracked.len()
            );
            Ok((categories, untracked))
        }
        Platform::PhoneGap
        | Platform::Cordova
        | Platform::Xamarin
        | Platform::ReactNative
        | Platform::Flutter => {
            debug!(
                "library detection is not supported for {} applications, skipping it",
                platform
            );
            Ok((Categories::default(), BTreeSet::new()))
        }
    }
}

/// Matches every directory of the tree against the catalog.
///
/// A directory is claimed by the first library of the catalog whose signature matches its path.
/// Directories that are not claimed, but have files in them under a smali root, are reported as
/// untracked packages.
pub fn find_libraries<T: DecompiledTree + ?Sized>(
    tree: &T,
    catalog: &Catalog,
) -> Result<MatchResult> {
    let mut dirs: Vec<Entry> = Vec::new();
    let mut dirs_with_files: HashSet<PathBuf> = HashSet::new();
    for entry in tree.walk() {
        let entry = entry?;
        if entry.is_dir() {
            dirs.push(entry);
        } else if let Some(parent) = entry.path().parent() {
            let _ = dirs_with_files.insert(parent.to_path_buf());
        }
    }

    let mut result = MatchResult::default();
    let mut found = HashSet::new();
    for dir in &dirs {
        if let Some(library) = catalog.first_match(dir.path_str()) {
            result.add_library(library, &mut found);
        } else if dirs_with_files.contains(dir.path()) {
            if let Some(package) = untracked_package(dir.path_str()) {
                let _ = result.untracked.insert(package);
            }
        }
    }

    Ok(result)
}

/// Gets the package name of a directory under a smali root.
///
/// The package starts after the first `/smali` in the path and the segment holding it, so that
/// `/app/smali_classes2/com/example` becomes `com.example`. Smali roots themselves have no
/// package.
fn untracked_package(path: &str) -> Option<String> {
    let start = path.find("/smali")?;
    let after_smali = &path[start + "/smali".len()..];
    let first_slash = after_smali.find('/')?;
    let package = &after_smali[first_slash + 1..];

    if package.is_empty() {
        None
    } else {
        Some(package.replace('/', "."))
    }
}
