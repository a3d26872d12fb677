//! Merging of implied dependencies and grouping by category.

use crate::catalog::Library;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_derive::{Deserialize, Serialize as DeriveSerialize};
use std::borrow::Cow;

/// Rule removing a library when another library that always bundles it is present.
#[derive(Debug, Clone, PartialEq, Eq, DeriveSerialize, Deserialize)]
pub struct MergeRule {
    drop: Cow<'static, str>,
    trigger: Cow<'static, str>,
}

impl MergeRule {
    /// Creates a rule dropping the `drop` package when the `trigger` package is found.
    pub fn new<D, T>(drop: D, trigger: T) -> Self
    where
        D: Into<Cow<'static, str>>,
        T: Into<Cow<'static, str>>,
    {
        Self {
            drop: drop.into(),
            trigger: trigger.into(),
        }
    }

    /// Gets the package name of the library to remove.
    pub fn drop(&self) -> &str {
        &self.drop
    }

    /// Gets the package name of the library that implies the removed one.
    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    fn apply(&self, libraries: &mut Vec<Library>) {
        let triggered = libraries
            .iter()
            .any(|l| l.package_name().to_lowercase() == self.trigger);
        if !triggered {
            return;
        }

        let dropped = libraries
            .iter()
            .find(|l| l.package_name() == self.drop)
            .map(Library::id);
        if let Some(id) = dropped {
            libraries.retain(|l| l.id() != id);
        }
    }
}

/// Default merge rules: Retrofit always depends on OkHttp.
pub const DEFAULT_MERGE_RULES: &[MergeRule] = &[MergeRule {
    drop: Cow::Borrowed("okhttp3"),
    trigger: Cow::Borrowed("retrofit2"),
}];

/// Removes the libraries implied by other libraries in the list, applying the rules in order.
pub fn merge(mut libraries: Vec<Library>, rules: &[MergeRule]) -> Vec<Library> {
    for rule in rules {
        rule.apply(&mut libraries);
    }
    libraries
}

/// Libraries grouped by category.
///
/// Categories keep the order in which they were first seen, and libraries keep their order
/// inside each category.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Categories {
    categories: Vec<(String, Vec<Library>)>,
}

impl Categories {
    /// Gets the libraries of the given category.
    pub fn get(&self, category: &str) -> Option<&[Library]> {
        self.categories
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, libs)| libs.as_slice())
    }

    /// Iterates over the categories and their libraries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Library])> {
        self.categories
            .iter()
            .map(|(c, libs)| (c.as_str(), libs.as_slice()))
    }

    /// Gets the number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Checks if there are no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Gets the total number of libraries in all categories.
    pub fn libraries_len(&self) -> usize {
        self.categories.iter().map(|(_, libs)| libs.len()).sum()
    }

    fn push(&mut self, library: Library) {
        if let Some((_, libs)) = self
            .categories
            .iter_mut()
            .find(|(c, _)| c == library.category())
        {
            libs.push(library);
        } else {
            self.categories
                .push((library.category().to_owned(), vec![library]));
        }
    }
}

impl Serialize for Categories {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (category, libraries) in &self.categories {
            map.serialize_entry(category, libraries)?;
        }
        map.end()
    }
}

/// Groups the libraries by their category.
pub fn categorize<I: IntoIterator<Item = Library>>(libraries: I) -> Categories {
    let mut categories = Categories::default();
    for library in libraries {
        categories.push(library);
    }
    categories
}
