//! Stack Analyzer command line interface.

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use colored::Colorize;
use log::{info, warn};
use stack_analyzer_core::{
    analyze_package, analyze_packages, cli, get_package_name, initialize_config,
    initialize_logger, print_error, Catalog, Config,
};
use std::{process::exit, sync::Arc};

/// Program entry point.
fn main() {
    let cli = cli::generate_cli().get_matches();

    let config = match initialize_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".bold().red(), e);
            for cause in e.chain().skip(1) {
                eprintln!("{} {}", "Caused by:".bold(), cause);
            }
            exit(1);
        }
    };

    if let Err(e) = initialize_logger(config.log_level()) {
        eprintln!("{} {}", "Error:".bold().red(), e);
    }
    if config.loaded_files().is_empty() {
        warn!("config file not found. Using default configuration");
    }

    let verbose = config.is_verbose();
    match run(config) {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(e) => {
            print_error(&e, verbose);
            exit(1);
        }
    }
}

/// Analyzes every package of the configuration.
///
/// Returns `false` if the analysis of any package failed.
fn run(mut config: Config) -> Result<bool> {
    let packages: Vec<String> = config.packages().iter().map(get_package_name).collect();
    config.set_packages(packages);

    if !config.check() {
        let mut error_string = String::from("configuration errors were found:\n");
        for error in config.errors() {
            error_string.push_str(&error);
            error_string.push('\n');
        }
        error_string.push_str(
            "the configuration was loaded, in order, from the following files: \n\t- Default \
             built-in configuration\n",
        );
        for file in config.loaded_files() {
            error_string.push_str(&format!("\t- {}\n", file.display()));
        }
        anyhow::bail!(error_string);
    }

    let catalog = Catalog::from_file(config.libraries_file()).with_context(|| {
        format!(
            "could not load the library catalog from `{}`",
            config.libraries_file().display()
        )
    })?;
    info!("{} known libraries loaded.", catalog.len());

    let packages = config.packages().to_vec();
    let threads = config.threads();
    let verbose = config.is_verbose();
    let config = Arc::new(config);
    let catalog = Arc::new(catalog);

    let thread_config = Arc::clone(&config);
    let outcome = analyze_packages(packages, threads, verbose, move |package| {
        analyze_package(&thread_config, &catalog, package).map(|(_, benchmarks)| benchmarks)
    });

    if config.is_bench() {
        for (package, package_benchmarks) in outcome.benchmarks() {
            println!();
            println!("{}", format!("Benchmarks for {}:", package).bold());
            for bench in package_benchmarks {
                println!("{}", bench);
            }
        }
    }

    if outcome.is_success() {
        info!("{}", "Everything went smoothly.".green());
        Ok(true)
    } else {
        if !outcome.failed().is_empty() {
            warn!("the analysis failed for: {}", outcome.failed().join(", "));
        }
        if outcome.panicked() > 0 {
            warn!(
                "{} analysis threads stopped unexpectedly",
                outcome.panicked()
            );
        }
        Ok(false)
    }
}
