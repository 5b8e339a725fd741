//! Files written after a successful run.

use std::path::{Path, PathBuf};

use harmonize_model::{HarmonizationReport, MappingDecision, ProcessingSummary};
use serde::Serialize;

const OUTPUT_SUFFIX: &str = "_harmonized.csv";

/// `<dir>/<stem>_harmonized.csv` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
}

/// Audit record written by `--report-json`. Row values are left out.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub profile: &'a str,
    pub success: bool,
    pub error: Option<&'a str>,
    pub source: Option<&'a str>,
    pub digest: Option<&'a str>,
    pub summary: ProcessingSummary,
    pub decisions: &'a [MappingDecision],
    pub missing_fields: &'a [String],
    pub enriched_fields: &'a [String],
}

impl<'a> RunReport<'a> {
    pub fn new(profile: &'a str, report: &'a HarmonizationReport) -> Self {
        Self {
            profile,
            success: report.success,
            error: report.error.as_deref(),
            source: report.source.as_deref(),
            digest: report.digest.as_deref(),
            summary: report.summary(),
            decisions: &report.decisions,
            missing_fields: &report.missing_fields,
            enriched_fields: &report.enriched_fields,
        }
    }
}
