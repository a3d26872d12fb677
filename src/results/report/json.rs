//! JSON report generation module.

use super::Generator;
use crate::{results::AnalysisReport, Config};
use anyhow::Result;
use log::debug;
use serde_json::ser;
use std::{
    fs::File,
    io::{BufWriter, Write},
};

/// JSON report generator.
#[derive(Debug, Default)]
pub struct Json;

impl Json {
    /// Creates a new JSON report generator.
    pub fn new() -> Self {
        Json
    }
}

impl Generator for Json {
    fn generate(&mut self, config: &Config, report: &AnalysisReport) -> Result<()> {
        let path = config
            .results_folder()
            .join(report.package_name())
            .join("results.json");
        debug!("writing the JSON report to {}", path.display());

        let mut f = BufWriter::new(File::create(&path)?);
        ser::to_writer_pretty(&mut f, report)?;
        f.flush()?;

        Ok(())
    }
}
