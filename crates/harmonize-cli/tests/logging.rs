//! Cell values must not reach the logs unless `--log-data` is given.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use harmonize_cli::logging::{
    LogConfig, LogFormat, REDACTED_VALUE, init_logging_with_writer, log_data_enabled,
    redact_value,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        let bytes = self.0.lock().expect("capture lock").clone();
        String::from_utf8(bytes).expect("utf-8 logs")
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("capture lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn trace_logs_redact_cell_values() {
    let captured = Captured::default();
    let config = LogConfig::default()
        .with_level_filter(LevelFilter::TRACE)
        .with_env_filter(false)
        .with_format(LogFormat::Json)
        .with_ansi(false)
        .with_log_data(false);
    init_logging_with_writer(&config, captured.clone());

    assert!(!log_data_enabled());
    tracing::trace!(
        target: "harmonize_cli",
        field = "customer_name",
        value = redact_value("María García"),
        "first harmonized record"
    );
    tracing::debug!(target: "reqwest", "noise from a dependency");

    let logs = captured.text();
    assert!(logs.contains(REDACTED_VALUE), "{logs}");
    assert!(!logs.contains("María"), "{logs}");
    assert!(logs.contains("customer_name"));
    assert!(!logs.contains("noise from a dependency"));
}
