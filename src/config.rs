//! Configuration module.
//!
//! Handles and configures the initial settings and variables needed to run the program. The
//! configuration is read from a TOML file and then decorated with the command line options.

use crate::{
    error::ErrorKind,
    static_analysis::libraries::{MergeRule, DEFAULT_MERGE_RULES},
};
use anyhow::{Context, Result};
use clap::ArgMatches;
use log::LevelFilter;
use serde_derive::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Largest number of worker threads accepted.
const MAX_THREADS: usize = u8::MAX as usize;

/// Configuration of the analyzer.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Packages to analyze.
    #[serde(skip)]
    packages: Vec<String>,
    /// Boolean to represent `--verbose` mode.
    verbose: bool,
    /// Boolean to represent `--quiet` mode.
    quiet: bool,
    /// Boolean to represent `--force` mode.
    force: bool,
    /// Boolean to represent `--bench` mode.
    bench: bool,
    /// Boolean to represent `--open` mode.
    open: bool,
    /// Number of applications analyzed at the same time.
    threads: usize,
    /// Folder with one decompiled tree per package.
    dist_folder: PathBuf,
    /// Folder where the reports are written.
    results_folder: PathBuf,
    /// JSON file with the catalog of known libraries.
    libraries_file: PathBuf,
    /// Rules to remove libraries implied by other libraries.
    merge_rules: Vec<MergeRule>,
    /// Configuration files loaded.
    #[serde(skip)]
    loaded_files: Vec<PathBuf>,
}

impl Config {
    /// Loads the configuration from the given TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let toml = fs::read_to_string(path.as_ref())?;
        let mut config: Self = toml::from_str(&toml).map_err(|e| ErrorKind::Config {
            message: format!("{}: {}", path.as_ref().display(), e),
        })?;
        config.loaded_files.push(path.as_ref().to_path_buf());

        Ok(config)
    }

    /// Modifies the configuration with the command line options.
    pub fn decorate_with_cli(&mut self, cli: &ArgMatches<'_>) -> Result<()> {
        if let Some(packages) = cli.values_of("package") {
            self.packages = packages.map(String::from).collect();
        }

        self.verbose = self.verbose || cli.is_present("verbose");
        self.quiet = self.quiet || cli.is_present("quiet");
        self.force = self.force || cli.is_present("force");
        self.bench = self.bench || cli.is_present("bench");
        self.open = self.open || cli.is_present("open");
        if self.verbose {
            self.quiet = false;
        }

        if let Some(threads) = cli.value_of("threads") {
            self.threads = threads
                .parse()
                .map_err(|_| ErrorKind::Config {
                    message: format!(
                        "the number of threads must be an integer between 1 and {}, found `{}`",
                        MAX_THREADS, threads
                    ),
                })
                .context("invalid --threads option")?;
        }
        if let Some(dist_folder) = cli.value_of("dist") {
            self.dist_folder = PathBuf::from(dist_folder);
        }
        if let Some(results_folder) = cli.value_of("results") {
            self.results_folder = PathBuf::from(results_folder);
        }
        if let Some(libraries_file) = cli.value_of("libraries") {
            self.libraries_file = PathBuf::from(libraries_file);
        }

        Ok(())
    }

    /// Checks if the configuration is valid.
    pub fn check(&self) -> bool {
        self.errors().is_empty()
    }

    /// Gets the problems found in the configuration.
    pub fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.threads == 0 || self.threads > MAX_THREADS {
            errors.push(format!(
                "the number of threads must be between 1 and {}, found {}",
                MAX_THREADS, self.threads
            ));
        }
        if !self.dist_folder.is_dir() {
            errors.push(format!(
                "the dist folder `{}` does not exist",
                self.dist_folder.display()
            ));
        }
        if !self.libraries_file.is_file() {
            errors.push(format!(
                "the library catalog `{}` does not exist",
                self.libraries_file.display()
            ));
        }
        errors
    }

    /// Gets the packages to analyze.
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Sets the packages to analyze.
    pub fn set_packages(&mut self, packages: Vec<String>) {
        self.packages = packages;
    }

    /// Returns true if the application is running in `--verbose` mode.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Sets the `--verbose` mode.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Returns true if the application is running in `--quiet` mode.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Sets the `--quiet` mode.
    pub fn set_quiet(&mut self, quiet: bool) {
        self.quiet = quiet;
    }

    /// Gets the log level for the `--verbose` and `--quiet` modes. Verbose mode wins.
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        }
    }

    /// Returns true if the application is running in `--force` mode.
    pub fn is_force(&self) -> bool {
        self.force
    }

    /// Sets the `--force` mode.
    pub fn set_force(&mut self, force: bool) {
        self.force = force;
    }

    /// Returns true if the application is running in `--bench` mode.
    pub fn is_bench(&self) -> bool {
        self.bench
    }

    /// Returns true if the report has to be opened after the analysis.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns the number of applications analyzed at the same time.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Returns the folder with the decompiled applications.
    pub fn dist_folder(&self) -> &Path {
        &self.dist_folder
    }

    /// Sets the folder with the decompiled applications.
    pub fn set_dist_folder<P: Into<PathBuf>>(&mut self, dist_folder: P) {
        self.dist_folder = dist_folder.into();
    }

    /// Returns the folder where the reports are written.
    pub fn results_folder(&self) -> &Path {
        &self.results_folder
    }

    /// Sets the folder where the reports are written.
    pub fn set_results_folder<P: Into<PathBuf>>(&mut self, results_folder: P) {
        self.results_folder = results_folder.into();
    }

    /// Returns the path of the library catalog.
    pub fn libraries_file(&self) -> &Path {
        &self.libraries_file
    }

    /// Returns the rules used to merge implied libraries.
    pub fn merge_rules(&self) -> &[MergeRule] {
        &self.merge_rules
    }

    /// Returns the configuration files that were loaded.
    pub fn loaded_files(&self) -> &[PathBuf] {
        &self.loaded_files
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            packages: Vec::new(),
            verbose: false,
            quiet: false,
            force: false,
            bench: false,
            open: false,
            threads: num_cpus::get(),
            dist_folder: PathBuf::from("dist"),
            results_folder: PathBuf::from("results"),
            libraries_file: PathBuf::from("libraries.json"),
            merge_rules: DEFAULT_MERGE_RULES.to_vec(),
            loaded_files: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::{cli::generate_cli, error::ErrorKind, static_analysis::libraries::MergeRule};
    use log::LevelFilter;
    use std::{fs, path::Path};
    use tempfile::TempDir;

    #[test]
    fn it_config() {
        let config = Config::default();

        assert!(config.packages().is_empty());
        assert!(!config.is_verbose());
        assert!(!config.is_quiet());
        assert!(!config.is_force());
        assert!(!config.is_bench());
        assert!(!config.is_open());
        assert_eq!(config.threads(), num_cpus::get());
        assert_eq!(config.dist_folder(), Path::new("dist"));
        assert_eq!(config.results_folder(), Path::new("results"));
        assert_eq!(config.libraries_file(), Path::new("libraries.json"));
        assert_eq!(
            config.merge_rules(),
            &[MergeRule::new("okhttp3", "retrofit2")]
        );
        assert!(config.loaded_files().is_empty());
    }

    #[test]
    fn it_config_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
threads = 3
verbose = true
dist_folder = "decompiled"

[[merge_rules]]
drop = "okhttp3"
trigger = "retrofit2"

[[merge_rules]]
drop = "com.google.gson"
trigger = "com.squareup.moshi"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.threads(), 3);
        assert!(config.is_verbose());
        assert_eq!(config.dist_folder(), Path::new("decompiled"));
        assert_eq!(config.results_folder(), Path::new("results"));
        assert_eq!(config.merge_rules().len(), 2);
        assert_eq!(config.merge_rules()[1].drop(), "com.google.gson");
        assert_eq!(config.merge_rules()[1].trigger(), "com.squareup.moshi");
        assert_eq!(config.loaded_files(), &[path.clone()]);

        fs::write(&path, "threads = \"many\"").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        match err.downcast_ref::<ErrorKind>() {
            Some(ErrorKind::Config { .. }) => {}
            _ => panic!("unexpected error: {}", err),
        }
    }

    #[test]
    fn it_config_sample() {
        let config = Config::from_file("config.toml.sample").unwrap();
        let default = Config::default();

        assert_eq!(config.dist_folder(), default.dist_folder());
        assert_eq!(config.results_folder(), default.results_folder());
        assert_eq!(config.libraries_file(), default.libraries_file());
        assert_eq!(config.merge_rules(), default.merge_rules());
    }

    #[test]
    fn it_log_level() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "quiet = true").unwrap();

        let mut config = Config::from_file(&path).unwrap();
        let cli = generate_cli().get_matches_from(vec!["stack-analyzer", "app"]);
        config.decorate_with_cli(&cli).unwrap();
        assert!(config.is_quiet());
        assert_eq!(config.log_level(), LevelFilter::Warn);

        let cli = generate_cli().get_matches_from(vec!["stack-analyzer", "-v", "app"]);
        config.decorate_with_cli(&cli).unwrap();
        assert_eq!(config.log_level(), LevelFilter::Debug);

        assert_eq!(Config::default().log_level(), LevelFilter::Info);
    }

    #[test]
    fn it_decorates_with_cli() {
        let cli = generate_cli().get_matches_from(vec![
            "stack-analyzer",
            "-v",
            "--force",
            "-t",
            "4",
            "--dist",
            "apps",
            "--libraries",
            "catalog.json",
            "com.example.one",
            "com.example.two",
        ]);
        let mut config = Config::default();
        config.set_quiet(true);
        config.decorate_with_cli(&cli).unwrap();

        assert_eq!(config.packages(), &["com.example.one", "com.example.two"]);
        assert!(config.is_verbose());
        assert!(!config.is_quiet());
        assert!(config.is_force());
        assert!(!config.is_bench());
        assert_eq!(config.threads(), 4);
        assert_eq!(config.dist_folder(), Path::new("apps"));
        assert_eq!(config.results_folder(), Path::new("results"));
        assert_eq!(config.libraries_file(), Path::new("catalog.json"));

        let cli = generate_cli().get_matches_from(vec!["stack-analyzer", "-t", "x", "app"]);
        assert!(Config::default().decorate_with_cli(&cli).is_err());
    }

    #[test]
    fn it_checks_config() {
        let dir = TempDir::new().unwrap();
        let libraries = dir.path().join("libraries.json");
        let missing = dir.path().join("missing.json");
        fs::write(&libraries, "[]").unwrap();

        let mut config = Config::default();
        config.set_dist_folder(dir.path().join("missing"));
        let cli = generate_cli().get_matches_from(vec![
            "stack-analyzer",
            "--libraries",
            missing.to_str().unwrap(),
            "app",
        ]);
        config.decorate_with_cli(&cli).unwrap();
        assert!(!config.check());
        assert_eq!(config.errors().len(), 2);

        let cli = generate_cli().get_matches_from(vec![
            "stack-analyzer",
            "--libraries",
            libraries.to_str().unwrap(),
            "--threads",
            "0",
            "app",
        ]);
        config.decorate_with_cli(&cli).unwrap();
        config.set_dist_folder(dir.path());
        assert_eq!(config.errors().len(), 1);

        let cli = generate_cli().get_matches_from(vec!["stack-analyzer", "-t", "2", "app"]);
        config.decorate_with_cli(&cli).unwrap();
        assert!(config.check());
    }
}
