//! Utilities module.

use anyhow::Error;
use colored::Colorize;
use log::error;
use std::path::Path;

/// Prints the given error, with its causes in verbose mode.
pub fn print_error(e: &Error, verbose: bool) {
    error!("{}", e);
    if verbose {
        for cause in e.chain().skip(1) {
            error!("caused by: {}", cause);
        }
    } else {
        println!(
            "If you need more information, try to run the program again with the {} flag.",
            "-v".bold()
        );
    }
}

/// Gets the package name from a package argument.
///
/// Users can give the package name, the decompiled folder or the original `.apk` file; the
/// package name is the last component without the `.apk` extension.
pub fn get_package_name<P: AsRef<Path>>(package: P) -> String {
    let name = package
        .as_ref()
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.strip_suffix(".apk") {
        Some(stripped) => stripped.to_owned(),
        None => name,
    }
}
