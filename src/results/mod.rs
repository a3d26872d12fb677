//! Analysis results and report generation.

pub mod report;

use crate::{static_analysis::libraries::Categories, static_analysis::platform::Platform, Config};
use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, info, warn};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::{collections::BTreeSet, fmt, fs, time::Duration};

use self::report::{Generator, Json};

/// Final report of the analysis of an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    package_name: String,
    app_name: String,
    platform: Platform,
    libraries: Categories,
    untracked_libraries: BTreeSet<String>,
}

impl AnalysisReport {
    /// Creates the report from the results of every analysis step.
    pub fn new<P: Into<String>, N: Into<String>>(
        package_name: P,
        app_name: N,
        platform: Platform,
        libraries: Categories,
        untracked_libraries: BTreeSet<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            app_name: app_name.into(),
            platform,
            libraries,
            untracked_libraries,
        }
    }

    /// Gets the package name of the application.
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Gets the display name of the application.
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Gets the platform used to develop the application.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Gets the libraries found in the application, by category.
    pub fn libraries(&self) -> &Categories {
        &self.libraries
    }

    /// Gets the packages with code that did not match any known library.
    pub fn untracked_libraries(&self) -> &BTreeSet<String> {
        &self.untracked_libraries
    }
}

impl Serialize for AnalysisReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let now = Local::now();
        let mut ser_struct = serializer.serialize_struct("AnalysisReport", 10)?;

        ser_struct.serialize_field("analyzer_version", env!("CARGO_PKG_VERSION"))?;
        ser_struct.serialize_field("now", &now)?;
        ser_struct.serialize_field("now_rfc3339", &now.to_rfc3339())?;

        ser_struct.serialize_field("package_name", &self.package_name)?;
        ser_struct.serialize_field("app_name", &self.app_name)?;
        ser_struct.serialize_field("platform", &self.platform)?;

        ser_struct.serialize_field("libraries", &self.libraries)?;
        ser_struct.serialize_field("libraries_len", &self.libraries.libraries_len())?;
        ser_struct.serialize_field("untracked_libraries", &self.untracked_libraries)?;
        ser_struct.serialize_field("untracked_len", &self.untracked_libraries.len())?;

        ser_struct.end()
    }
}

/// Writes the report files of the given analysis.
///
/// Returns `false` if the report already existed and it was not regenerated.
pub fn write_report(config: &Config, report: &AnalysisReport) -> Result<bool> {
    let path = config.results_folder().join(report.package_name());
    if path.exists() && !config.is_force() {
        info!(
            "Seems that the report for {} has already been generated. There is no need to do \
             it again.",
            report.package_name()
        );
        return Ok(false);
    }

    if path.exists() {
        debug!("the application results folder exists, removing it");
        if let Err(e) = fs::remove_dir_all(&path) {
            warn!("there was an error when removing the results folder: {}", e);
        }
    }
    fs::create_dir_all(&path).with_context(|| {
        format!(
            "could not create the results folder at `{}`",
            path.display()
        )
    })?;

    Json::new()
        .generate(config, report)
        .context("there was an error generating the JSON report")?;
    debug!("JSON report generated for {}", report.package_name());

    Ok(true)
}

/// Time spent in one step of the analysis.
#[derive(Debug, Clone)]
pub struct Benchmark {
    label: String,
    duration: Duration,
}

impl Benchmark {
    /// Creates a new benchmark.
    pub fn new<S: Into<String>>(label: S, duration: Duration) -> Self {
        Self {
            label: label.into(),
            duration,
        }
    }

    /// Gets the label of the benchmarked step.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Gets the duration of the step.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for Benchmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}.{:03}s",
            self.label,
            self.duration.as_secs(),
            self.duration.subsec_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{write_report, AnalysisReport, Benchmark};
    use crate::{
        static_analysis::{libraries::categorize, platform::Platform},
        test_utils::library,
        Config,
    };
    use std::{collections::BTreeSet, fs, time::Duration};
    use tempfile::TempDir;

    fn report() -> AnalysisReport {
        let mut untracked = BTreeSet::new();
        let _ = untracked.insert(String::from("com.example.app"));
        AnalysisReport::new(
            "com.example.app",
            "Example",
            Platform::NativeJava,
            categorize(vec![
                library(1, "retrofit2", "Networking"),
                library(3, "com.google.gson", "JSON"),
            ]),
            untracked,
        )
    }

    #[test]
    fn it_serializes_report() {
        let json = serde_json::to_value(&report()).unwrap();

        assert_eq!(json["package_name"], "com.example.app");
        assert_eq!(json["app_name"], "Example");
        assert_eq!(json["platform"], "Java");
        assert_eq!(json["libraries"]["Networking"][0]["package_name"], "retrofit2");
        assert_eq!(json["libraries"]["JSON"][0]["id"], 3);
        assert_eq!(json["libraries_len"], 2);
        assert_eq!(json["untracked_libraries"][0], "com.example.app");
        assert_eq!(json["untracked_len"], 1);
        assert_eq!(json["analyzer_version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn it_writes_report() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.set_results_folder(dir.path());

        assert!(write_report(&config, &report()).unwrap());
        let path = dir.path().join("com.example.app").join("results.json");
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["app_name"], "Example");

        assert!(!write_report(&config, &report()).unwrap());

        config.set_force(true);
        assert!(write_report(&config, &report()).unwrap());
        assert!(path.exists());
    }

    #[test]
    fn it_benchmark() {
        let benchmark = Benchmark::new("Library detection", Duration::from_millis(1_234));
        assert_eq!(benchmark.label(), "Library detection");
        assert_eq!(benchmark.duration(), Duration::from_millis(1_234));
        assert_eq!(benchmark.to_string(), "Library detection: 1.234s");
    }
}
