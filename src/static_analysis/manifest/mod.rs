//! Module containing the application metadata extraction.


use crate::{error::ErrorKind, tree::DecompiledTree};
use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

/// Path of the manifest in the decompiled tree.
const MANIFEST_PATH: &str = "AndroidManifest.xml";
/// Path of the default string resources in the decompiled tree.
const STRINGS_PATH: &str = "res/values/strings.xml";
/// Prefix of string resource references.
const STRING_REFERENCE_PREFIX: &str = "@string/";

lazy_static! {
    static ref APP_LABEL_MANIFEST_REGEX: Regex =
        Regex::new(r#"<application.+?label="(.+?)""#).unwrap();
}

/// Gets the display name of the application.
///
/// The label of the `<application>` element is used, resolving it from the string resources if
/// it is a `@string/` reference. Nothing is guessed: if any of the steps fails, the extraction
/// fails.
pub fn app_name<T: DecompiledTree + ?Sized>(tree: &T) -> Result<String> {
    let label = app_label(tree)?;

    match label.strip_prefix(STRING_REFERENCE_PREFIX) {
        Some(key) => string_resource(tree, key),
        None => Ok(label),
    }
}

/// Gets the raw value of the application label in the manifest.
fn app_label<T: DecompiledTree + ?Sized>(tree: &T) -> Result<String> {
    let manifest = read(tree, MANIFEST_PATH)?;

    APP_LABEL_MANIFEST_REGEX
        .captures(&manifest)
        .and_then(|caps| caps.get(1))
        .map(|label| label.as_str().to_owned())
        .ok_or_else(|| {
            ErrorKind::MissingMetadata {
                message: format!("no application label found in {}", MANIFEST_PATH),
            }
            .into()
        })
}

/// Resolves the given key in the string resources.
fn string_resource<T: DecompiledTree + ?Sized>(tree: &T, key: &str) -> Result<String> {
    let strings = read(tree, STRINGS_PATH)?;
    let regex = Regex::new(&format!(
        r#"<string name="{}">(.+?)</string>"#,
        regex::escape(key)
    ))?;

    regex
        .captures(&strings)
        .and_then(|caps| caps.get(1))
        .map(|value| value.as_str().to_owned())
        .ok_or_else(|| {
            ErrorKind::MissingMetadata {
                message: format!(
                    "the string resource `{}` could not be found in {}",
                    key, STRINGS_PATH
                ),
            }
            .into()
        })
}

fn read<T: DecompiledTree + ?Sized>(tree: &T, relative: &str) -> Result<String> {
    tree.read_to_string(Path::new(relative)).map_err(|e| {
        ErrorKind::MissingMetadata {
            message: format!("could not read {}: {}", relative, e),
        }
        .into()
    })
}
