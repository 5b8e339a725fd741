use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::WriterBuilder;
use harmonize_model::{HarmonizedRecord, TargetSchema};
use serde::Serialize;
use tracing::info;

/// Renders records as CSV: schema field names as the header, one line per
/// record, absent fields as empty cells.
pub fn render_records(schema: &TargetSchema, records: &[HarmonizedRecord]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(schema.names())
        .context("write header row")?;
    for (idx, record) in records.iter().enumerate() {
        let cells = record
            .ordered(schema)
            .map(|(_, value)| value.map(ToString::to_string).unwrap_or_default());
        writer
            .write_record(cells)
            .with_context(|| format!("write record {}", idx + 1))?;
    }
    writer.into_inner().context("flush csv buffer")
}

/// Writes harmonized records to `path` in schema order.
pub fn write_records(
    path: &Path,
    schema: &TargetSchema,
    records: &[HarmonizedRecord],
) -> Result<()> {
    let bytes = render_records(schema, records)?;
    write_atomic(path, &bytes)?;
    info!(path = %path.display(), records = records.len(), "harmonized records written");
    Ok(())
}

/// Writes any serializable value as pretty JSON.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serialize json")?;
    write_atomic(path, &bytes)
}

/// Sibling temporary path used while writing `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}

/// Writes to a sibling temp file, syncs, then renames over `path`, so readers
/// never observe a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let temp = temp_path(path);
    let result = (|| -> Result<()> {
        let mut file =
            File::create(&temp).with_context(|| format!("create {}", temp.display()))?;
        file.write_all(bytes)
            .with_context(|| format!("write {}", temp.display()))?;
        file.sync_all()
            .with_context(|| format!("sync {}", temp.display()))?;
        fs::rename(&temp, path).with_context(|| {
            format!("rename {} to {}", temp.display(), path.display())
        })
    })();
    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use harmonize_model::{CellValue, FieldType, TargetField};

    fn schema() -> TargetSchema {
        TargetSchema::new(vec![
            TargetField::new("customer_name", FieldType::String),
            TargetField::new("quantity", FieldType::Integer),
            TargetField::new("unit_price", FieldType::Decimal),
        ])
    }

    #[test]
    fn renders_in_schema_order_with_gaps() {
        let mut record = HarmonizedRecord::new();
        record.insert("unit_price", CellValue::Decimal(750.0));
        record.insert("customer_name", CellValue::text("Hans Mueller"));
        let bytes = render_records(&schema(), &[record]).expect("render");
        let text = String::from_utf8(bytes).expect("utf8");
        assert_eq!(text, "customer_name,quantity,unit_price\nHans Mueller,,750.0\n");
    }

    #[test]
    fn temp_path_is_hidden_sibling() {
        let temp = temp_path(Path::new("out/sales_harmonized.csv"));
        assert_eq!(temp, Path::new("out/.sales_harmonized.csv.tmp"));
    }
}
