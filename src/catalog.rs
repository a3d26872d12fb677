//! Known library catalog.
//!
//! The catalog is reference data: it is loaded once, its signatures are compiled once, and it is
//! then shared read-only between every analysis.

use crate::error::ErrorKind;
use anyhow::{Context, Result};
use colored::Colorize;
use regex::{RegexSet, RegexSetBuilder};
use serde_derive::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    fs::File,
    hash::{Hash, Hasher},
    io::BufReader,
    path::Path,
};

/// Size limit for the compiled signature set. Catalogs have thousands of entries.
const SIGNATURE_SIZE_LIMIT: usize = 256 * (1 << 20);

/// Library that can be detected in an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    id: u32,
    name: String,
    package_name: String,
    category: String,
}

impl Library {
    /// Creates a new library.
    pub fn new<N: Into<String>, P: Into<String>, C: Into<String>>(
        id: u32,
        name: N,
        package_name: P,
        category: C,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            package_name: package_name.into(),
            category: category.into(),
        }
    }

    /// Gets the unique identifier of the library.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Gets the display name of the library.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the package name of the library, in reverse domain notation.
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Gets the category of the library.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Regular expression matching the smali directories of the library.
    fn signature(&self) -> String {
        let package_as_path = self
            .package_name
            .split('.')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("/");
        format!(r"smali(_classes\d+)?/{}", package_as_path)
    }
}

impl PartialEq for Library {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Library {}

impl Hash for Library {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Ordered collection of known libraries, with their compiled signatures.
#[derive(Debug)]
pub struct Catalog {
    libraries: Vec<Library>,
    signatures: RegexSet,
}

impl Catalog {
    /// Creates a catalog, compiling the signature of every library.
    pub fn new(libraries: Vec<Library>) -> Result<Self> {
        let mut ids = HashSet::with_capacity(libraries.len());
        for library in &libraries {
            if !ids.insert(library.id()) {
                return Err(ErrorKind::Catalog {
                    message: format!(
                        "the library id {} is used by more than one library",
                        library.id()
                    ),
                }
                .into());
            }
        }

        let signatures = RegexSetBuilder::new(libraries.iter().map(Library::signature))
            .size_limit(SIGNATURE_SIZE_LIMIT)
            .build()
            .map_err(|e| ErrorKind::Catalog {
                message: format!("could not compile the library signatures: {}", e),
            })?;

        Ok(Self {
            libraries,
            signatures,
        })
    }

    /// Loads the catalog from a JSON file with an array of libraries.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path.as_ref()).with_context(|| {
            format!(
                "could not open the library catalog at `{}`",
                path.as_ref().display()
            )
        })?;
        let libraries: Vec<Library> =
            serde_json::from_reader(BufReader::new(f)).with_context(|| {
                format!(
                    "libraries must be objects with the following structure:\n{}",
                    "{\n\t\"id\": 1,\n\t\"name\": \"Retrofit\",\n\t\"package_name\": \
                     \"retrofit2\",\n\t\"category\": \"Networking\"\n}"
                        .italic()
                )
            })?;

        Self::new(libraries)
    }

    /// Gets the libraries of the catalog, in catalog order.
    pub fn libraries(&self) -> &[Library] {
        &self.libraries
    }

    /// Gets the number of libraries in the catalog.
    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    /// Checks if the catalog has no libraries.
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Finds the first library, in catalog order, whose signature matches the given path.
    ///
    /// All signatures are tested in a single pass over the path; the lowest matching index wins,
    /// so earlier catalog entries claim a path before later ones.
    pub fn first_match(&self, path: &str) -> Option<&Library> {
        self.signatures
            .matches(path)
            .iter()
            .next()
            .map(|i| &self.libraries[i])
    }
}
