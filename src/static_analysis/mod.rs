//! Static analysis of the decompiled application.
//!
//! The analysis first detects the platform of the application, since library detection only
//! makes sense for native applications, then looks for libraries and finally extracts the
//! application name from the manifest.

pub mod libraries;
pub mod manifest;
pub mod platform;

use self::libraries::MergeRule;
use crate::{
    catalog::Catalog,
    results::{AnalysisReport, Benchmark},
    tree::DecompiledTree,
};
use anyhow::{Context, Result};
use log::debug;
use std::time::Instant;

/// Runs the whole analysis of the given decompiled tree.
///
/// * Benchmarking support: one benchmark is recorded for each step.
pub fn analysis<T: DecompiledTree + ?Sized>(
    tree: &T,
    package: &str,
    catalog: &Catalog,
    rules: &[MergeRule],
    benchmarks: &mut Vec<Benchmark>,
) -> Result<AnalysisReport> {
    let start = Instant::now();
    let platform = platform::classify(tree).context("platform detection failed")?;
    benchmarks.push(Benchmark::new("Platform detection", start.elapsed()));
    debug!("{} was developed with {}", package, platform);

    let start = Instant::now();
    let (libraries, untracked) = libraries::analysis(platform, tree, catalog, rules)
        .context("library detection failed")?;
    benchmarks.push(Benchmark::new("Library detection", start.elapsed()));

    let start = Instant::now();
    let app_name = manifest::app_name(tree)?;
    benchmarks.push(Benchmark::new("Application name extraction", start.elapsed()));
    debug!("the name of {} is `{}`", package, app_name);

    Ok(AnalysisReport::new(
        package, app_name, platform, libraries, untracked,
    ))
}
