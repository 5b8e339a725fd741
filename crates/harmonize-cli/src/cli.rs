//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use harmonize_standards::{ClassifierKind, ConfigOverrides, Profile};

#[derive(Parser)]
#[command(
    name = "harmonize",
    version,
    about = "Map heterogeneous tabular records onto a fixed target schema",
    long_about = "Map heterogeneous tabular records onto a fixed target schema.\n\n\
                  Columns are matched by name (after glossary translation) and, when the\n\
                  name is ambiguous, by the shape of their values. Mapped values are\n\
                  normalized, missing fields are enriched where possible, and every\n\
                  decision is reported."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machines).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values (names, emails, phone numbers) in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Harmonize one CSV file.
    Run(RunArgs),

    /// Write the multilingual sample sales file.
    Demo(DemoArgs),

    /// List the target fields of a profile or config file.
    Schema(ConfigArgs),

    /// Validate a configuration and report classifier readiness.
    Check(ConfigArgs),
}

/// Where the harmonizer configuration comes from.
#[derive(Args, Clone)]
pub struct ConfigArgs {
    /// TOML config file (takes precedence over HARMONIZE_CONFIG and --profile).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Embedded profile to use.
    #[arg(long = "profile", value_name = "NAME", value_parser = parse_profile)]
    pub profile: Option<Profile>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Input CSV file.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output CSV (default: <INPUT stem>_harmonized.csv next to the input).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Acceptance threshold in [0, 1]; a mapping needs a strictly higher score.
    #[arg(long = "acceptance", value_name = "X", value_parser = parse_unit)]
    pub acceptance: Option<f32>,

    /// Lexical scores strictly below this consult the classifier.
    #[arg(long = "escalation", value_name = "X", value_parser = parse_unit)]
    pub escalation: Option<f32>,

    /// Row worker count.
    #[arg(long = "workers", value_name = "N", value_parser = clap::value_parser!(usize))]
    pub workers: Option<usize>,

    /// Classifier backend (none, shape, remote).
    #[arg(long = "classifier", value_name = "KIND", value_parser = parse_classifier)]
    pub classifier: Option<ClassifierKind>,

    /// Also write the mapping decisions and summary as JSON.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Report without writing any output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Number of harmonized records to print.
    #[arg(long = "preview", value_name = "N", default_value_t = 3)]
    pub preview: usize,
}

impl RunArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            acceptance: self.acceptance,
            escalation: self.escalation,
            workers: self.workers,
            classifier: self.classifier,
        }
    }
}

#[derive(Args)]
pub struct DemoArgs {
    /// Where to write the sample file.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_profile(value: &str) -> Result<Profile, String> {
    value.parse::<Profile>().map_err(|e| e.to_string())
}

fn parse_classifier(value: &str) -> Result<ClassifierKind, String> {
    value.parse::<ClassifierKind>()
}

fn parse_unit(value: &str) -> Result<f32, String> {
    let parsed: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("not a number: {value}"))?;
    if (0.0..=1.0).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(format!("must be within [0, 1], got {parsed}"))
    }
}
