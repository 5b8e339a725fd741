use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use harmonize_cli::demo::{DEMO_FILE_NAME, write_demo};
use harmonize_cli::logging::redact_value;
use harmonize_cli::output::{RunReport, default_output_path};
use harmonize_core::HarmonizationPipeline;
use harmonize_ingest::{write_json, write_records};
use harmonize_model::{HarmonizationReport, TargetSchema};
use harmonize_standards::{ConfigSource, DoctorReport, HarmonizerConfig};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, trace, warn};

use crate::cli::{ConfigArgs, DemoArgs, RunArgs};
use crate::summary::{print_decisions, print_doctor, print_preview, print_schema, print_summary};

/// Harmonizes one file. Returns whether the batch succeeded.
pub async fn run_harmonize(args: &RunArgs) -> Result<bool> {
    let (config, origin) = load_config(&args.config)?;
    let config = config.with_overrides(&args.overrides());
    config
        .validate()
        .context("invalid command-line overrides")?;
    let profile = config.name.clone();
    info!(
        config = %origin,
        acceptance = config.thresholds.acceptance,
        escalation = config.thresholds.escalation,
        classifier = %config.classifier.kind,
        workers = config.runtime.workers,
        "harmonizer configured"
    );

    let pipeline = HarmonizationPipeline::from_config(config).context("build pipeline")?;
    let spinner = spinner(format!("harmonizing {}", args.input.display()));
    let report = tokio::select! {
        report = pipeline.run_file(&args.input) => report,
        _ = tokio::signal::ctrl_c() => {
            spinner.finish_and_clear();
            warn!(input = %args.input.display(), "interrupted");
            bail!("interrupted; no output was written");
        }
    };
    spinner.finish_and_clear();

    print_decisions(&report);
    if !report.success {
        eprintln!(
            "error: {}",
            report.error.as_deref().unwrap_or("harmonization failed")
        );
        write_report_json(args, &profile, &report)?;
        return Ok(false);
    }
    print_summary(&report);
    trace_first_record(&report, pipeline.schema());

    if args.dry_run {
        println!("Dry run: no output written.");
    } else {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&args.input));
        write_records(&output, pipeline.schema(), &report.enhanced_rows)
            .with_context(|| format!("write {}", output.display()))?;
        println!("Output: {}", output.display());
        write_report_json(args, &profile, &report)?;
    }
    print_preview(&report, pipeline.schema(), args.preview);
    Ok(true)
}

pub fn run_demo(args: &DemoArgs) -> Result<()> {
    let path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEMO_FILE_NAME));
    write_demo(&path).with_context(|| format!("write demo file {}", path.display()))?;
    println!("Demo data written to {}", path.display());
    println!("Try: harmonize run {}", path.display());
    Ok(())
}

pub fn run_schema(args: &ConfigArgs) -> Result<()> {
    let (config, _) = load_config(args)?;
    print_schema(&config);
    Ok(())
}

pub fn run_check(args: &ConfigArgs) -> Result<()> {
    let (config, origin) = load_config(args)?;
    let api_key_present = std::env::var_os(&config.classifier.api_key_env)
        .is_some_and(|value| !value.is_empty());
    let report = DoctorReport::from_config(&config, &origin, api_key_present);
    debug!(warnings = report.warnings.len(), "config checked");
    print_doctor(&report);
    Ok(())
}

fn load_config(args: &ConfigArgs) -> Result<(HarmonizerConfig, String)> {
    let source = ConfigSource::resolve(args.config.as_deref(), args.profile);
    let config = source
        .load()
        .with_context(|| format!("load config from {source}"))?;
    debug!(config = %source, name = %config.name, fields = config.fields.len(), "config loaded");
    Ok((config, source.to_string()))
}

fn write_report_json(args: &RunArgs, profile: &str, report: &HarmonizationReport) -> Result<()> {
    if args.dry_run {
        return Ok(());
    }
    let Some(path) = &args.report_json else {
        return Ok(());
    };
    write_json(path, &RunReport::new(profile, report))
        .with_context(|| format!("write report {}", path.display()))?;
    println!("Report: {}", path.display());
    Ok(())
}

fn trace_first_record(report: &HarmonizationReport, schema: &TargetSchema) {
    let Some(record) = report.enhanced_rows.first() else {
        return;
    };
    for (field, value) in record.ordered(schema) {
        let text = value.map(ToString::to_string).unwrap_or_default();
        trace!(field, value = redact_value(&text), "first harmonized record");
    }
}

fn spinner(message: String) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}
