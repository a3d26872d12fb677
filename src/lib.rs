//! Stack Analyzer
//!
//! Detects the platform used to develop an Android application and the third party libraries it
//! bundles, from the output of `apktool`.

#![forbid(unsafe_code, overflowing_literals, unconditional_recursion, while_true)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_qualifications,
    unused_import_braces,
    unused_extern_crates
)]

pub mod batch;
pub mod catalog;
/// Command Line Interface
pub mod cli;
mod config;
mod error;
pub mod results;
pub mod static_analysis;
#[cfg(test)]
mod test_utils;
pub mod tree;
mod utils;

pub use crate::{
    batch::{analyze_packages, BatchOutcome},
    catalog::{Catalog, Library},
    config::Config,
    error::ErrorKind,
    results::{AnalysisReport, Benchmark},
    static_analysis::platform::Platform,
    tree::{DecompiledTree, DiskTree},
    utils::{get_package_name, print_error},
};

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use env_logger::Builder;
use log::{debug, info, Level, LevelFilter};
use std::{env, io::Write, path::PathBuf, time::Instant};

/// Initialize the config with the config files and command line options.
///
/// On UNIX, if local file (`config.toml`) does not exist, but the global one does
/// (`/etc/stack-analyzer/config.toml`), the latter is used. Otherwise, the local file is used.
/// Finally, if none of the files could be loaded, the default config is used.
///
/// The logger is set up from the loaded configuration, so nothing is logged here.
pub fn initialize_config(cli: &ArgMatches<'_>) -> Result<Config> {
    let config_path = PathBuf::from("config.toml");
    let global_config_path = PathBuf::from("/etc/stack-analyzer/config.toml");

    let mut config =
        if cfg!(target_family = "unix") && !config_path.exists() && global_config_path.exists() {
            Config::from_file(&global_config_path).context(
                "there was an error when reading the /etc/stack-analyzer/config.toml file",
            )?
        } else if config_path.exists() {
            Config::from_file(&config_path)
                .context("there was an error when reading the config.toml file")?
        } else {
            Config::default()
        };

    config
        .decorate_with_cli(cli)
        .context("there was an error reading config from CLI")?;

    Ok(config)
}

/// Analyzes the decompiled tree of the given package and writes its report.
///
/// The decompiled tree is expected in the dist folder, in a folder named after the package.
pub fn analyze_package(
    config: &Config,
    catalog: &Catalog,
    package: &str,
) -> Result<(AnalysisReport, Vec<Benchmark>)> {
    info!("Starting analysis of {}.", package.italic());
    let start_time = Instant::now();

    let tree_path = config.dist_folder().join(package);
    let tree = DiskTree::open(&tree_path).with_context(|| {
        format!(
            "could not open the decompiled application at `{}`",
            tree_path.display()
        )
    })?;

    let mut benchmarks = Vec::with_capacity(5);
    let report = static_analysis::analysis(
        &tree,
        package,
        catalog,
        config.merge_rules(),
        &mut benchmarks,
    )
    .with_context(|| format!("the analysis of {} failed", package))?;

    let report_start = Instant::now();
    let written = results::write_report(config, &report).with_context(|| {
        format!(
            "there was an error generating the results report. Tried to generate at: {}",
            config.results_folder().join(package).display()
        )
    })?;
    benchmarks.push(Benchmark::new("Report generation", report_start.elapsed()));
    benchmarks.push(Benchmark::new(
        format!("Total time for {}", package),
        start_time.elapsed(),
    ));

    info!(
        "{} ({}) is a {} application with {} known libraries and {} untracked packages.",
        report.app_name().bold(),
        package,
        report.platform().to_string().green(),
        report.libraries().libraries_len(),
        report.untracked_libraries().len()
    );
    for (category, libraries) in report.libraries().iter() {
        let names: Vec<_> = libraries.iter().map(Library::name).collect();
        debug!("{}: {}", category, names.join(", "));
    }

    if config.is_open() && written {
        let open_path = config.results_folder().join(package).join("results.json");
        open::that(&open_path).context("report could not be opened automatically")?;
    }

    Ok((report, benchmarks))
}

/// Initializes the logger with the level given by [`Config::log_level`].
///
/// The `RUST_LOG` environment variable takes precedence over the configuration.
pub fn initialize_logger(log_level: LevelFilter) -> Result<()> {
    let mut builder = Builder::new();
    let _ = builder.format(|buf, record| match record.level() {
        Level::Warn => writeln!(
            buf,
            "{}{}",
            "Warning: ".bold().yellow(),
            record.args().to_string().yellow()
        ),
        Level::Error => writeln!(
            buf,
            "{}{}",
            "Error: ".bold().red(),
            record.args().to_string().red()
        ),
        Level::Debug => writeln!(
            buf,
            "{}{}",
            "Debug: ".bold(),
            record.args().to_string().bold()
        ),
        Level::Info => writeln!(buf, "{}", record.args()),
        Level::Trace => writeln!(buf, "{}: {}", record.level(), record.args()),
    });

    if let Ok(env_log) = env::var("RUST_LOG") {
        let _ = builder.parse_filters(&env_log);
    } else {
        let _ = builder
            .filter(Some("stack_analyzer_core"), log_level)
            .filter(Some("stack_analyzer"), log_level);
    }

    builder
        .try_init()
        .context("could not initialize the logger")
}
