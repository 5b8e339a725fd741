use std::fs;

use harmonize_ingest::{digest_bytes, digest_file, read_batch, temp_path, write_records};
use harmonize_model::{CellValue, FieldType, HarmonizedRecord, TargetField, TargetSchema};

const SALES: &str = "cliente;cantidad;precio_unitario\n\
María García;2;899,99\n\
\n\
Jean Dubois;1\n";

#[test]
fn reads_semicolon_file_with_digest_and_source() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("ventas.csv");
    fs::write(&path, SALES).expect("write file");

    let batch = read_batch(&path).expect("read csv");
    assert_eq!(batch.headers, vec!["cliente", "cantidad", "precio_unitario"]);
    assert_eq!(batch.row_count(), 2);
    assert_eq!(batch.rows[0][2], CellValue::text("899,99"));
    assert_eq!(batch.rows[1][2], CellValue::Null);
    assert_eq!(batch.sample_value(2), CellValue::text("899,99"));
    assert_eq!(batch.source.as_deref(), Some(path.display().to_string().as_str()));
    assert_eq!(batch.digest, Some(digest_bytes(SALES.as_bytes())));
    assert_eq!(
        digest_file(&path).expect("digest"),
        digest_bytes(SALES.as_bytes())
    );
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.csv");
    let err = read_batch(&path).expect_err("missing file");
    assert!(format!("{err:#}").contains("absent.csv"));
}

#[test]
fn invalid_utf8_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("latin1.csv");
    fs::write(&path, b"cliente\nJos\xe9\n").expect("write file");
    let err = read_batch(&path).expect_err("not utf-8");
    assert!(format!("{err:#}").contains("UTF-8"));
}

#[test]
fn write_replaces_atomically_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("nested").join("out.csv");
    let schema = TargetSchema::new(vec![
        TargetField::new("customer_name", FieldType::String),
        TargetField::new("country", FieldType::String),
    ]);
    let mut record = HarmonizedRecord::new();
    record.insert("customer_name", CellValue::text("Ana, S.L."));
    record.insert("country", CellValue::text("Spain"));

    write_records(&path, &schema, &[record]).expect("write");
    let written = fs::read_to_string(&path).expect("read back");
    assert_eq!(written, "customer_name,country\n\"Ana, S.L.\",Spain\n");
    assert!(!temp_path(&path).exists());

    write_records(&path, &schema, &[]).expect("overwrite");
    let written = fs::read_to_string(&path).expect("read back");
    assert_eq!(written, "customer_name,country\n");
}
