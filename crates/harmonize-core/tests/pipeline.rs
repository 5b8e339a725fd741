use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use harmonize_core::HarmonizationPipeline;
use harmonize_ingest::parse_batch;
use harmonize_map::{Classifier, ClassifierError};
use harmonize_model::{
    CellValue, Classification, ColumnCandidate, OutcomeStatus, RecordBatch, RowView,
    TargetSchema, ValidationOutcome,
};
use harmonize_standards::{EnrichKind, HarmonizerConfig, Profile, load_profile};
use harmonize_transform::{Enricher, Transformed};

const DEMO: &str = "\
cliente,producto,cantidad,precio_unitario,fecha_venta,vendedor
María García,Laptop Dell,2,899.99,2024-01-15,Carlos
Jean Dubois,Ordinateur HP,1,1200.50,2024-01-16,Pierre
Hans Mueller,Computer Lenovo,3,750.00,2024-01-17,Klaus
Giovanni Rossi,Notebook Asus,1,680.00,2024-01-18,Marco
António Silva,Computador Apple,2,1500.00,2024-01-19,João
";

fn sales() -> HarmonizerConfig {
    load_profile(Profile::Sales).expect("sales profile")
}

fn demo_batch() -> RecordBatch {
    parse_batch(DEMO.as_bytes()).expect("demo csv")
}

fn text(value: Option<&CellValue>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

#[tokio::test]
async fn demo_batch_end_to_end() {
    let pipeline = HarmonizationPipeline::from_config(sales()).expect("pipeline");
    let report = pipeline.run(demo_batch()).await;

    assert!(report.success, "{:?}", report.error);
    let summary = report.summary();
    assert_eq!(summary.total_records, 5);
    assert_eq!(summary.fields_mapped, 6);
    assert_eq!(summary.fields_rejected, 0);
    assert_eq!(summary.fields_enriched, 1);
    assert_eq!(report.missing_fields, vec!["country"]);
    assert!((0.0..=1.0).contains(&report.quality_score));
    assert_eq!(report.quality_score, 1.0);
    assert_eq!(summary.outcome_count, 35);
    assert!(report.digest.is_some());

    let countries: Vec<String> = report
        .enhanced_rows
        .iter()
        .map(|r| text(r.get("country")))
        .collect();
    assert_eq!(countries, vec!["Spain", "France", "Germany", "Italy", "Portugal"]);

    let first = &report.enhanced_rows[0];
    assert_eq!(first.get("quantity"), Some(&CellValue::Integer(2)));
    assert_eq!(first.get("unit_price"), Some(&CellValue::Decimal(899.99)));
    assert_eq!(text(first.get("sale_date")), "2024-01-15");
    assert_eq!(text(report.enhanced_rows[2].get("unit_price")), "750.0");
}

#[tokio::test]
async fn blank_country_cell_uses_header_language() {
    let headers = ["cliente", "cantidad", "país"];
    let mut batch = RecordBatch::new(headers.iter().map(ToString::to_string).collect());
    batch.push_row(vec![
        CellValue::text("Dupont SA"),
        CellValue::text("2"),
        CellValue::text(""),
    ]);

    let pipeline = HarmonizationPipeline::from_config(sales()).expect("pipeline");
    let report = pipeline.run(batch).await;

    assert!(report.success, "{:?}", report.error);
    assert!(!report.is_missing("country"));
    assert_eq!(text(report.enhanced_rows[0].get("country")), "Spain");
    assert_eq!(report.tally.enriched, 1);
}

#[tokio::test]
async fn missing_date_column_stays_missing() {
    let mut batch = RecordBatch::new(vec!["cliente".to_string(), "cantidad".to_string()]);
    batch.push_row(vec![CellValue::text("María García"), CellValue::text("1,200")]);

    let pipeline = HarmonizationPipeline::from_config(sales()).expect("pipeline");
    let report = pipeline.run(batch).await;

    assert!(report.success);
    assert!(report.is_missing("sale_date"));
    assert!(report.is_missing("country"));
    let row = &report.enhanced_rows[0];
    assert!(!row.contains("sale_date"));
    assert_eq!(row.get("quantity"), Some(&CellValue::Integer(1200)));
    assert_eq!(text(row.get("country")), "Spain");
    assert_eq!(report.tally.fixed, 1);
    assert_eq!(report.tally.enriched, 1);
}

#[tokio::test]
async fn structural_errors_fail_the_whole_batch() {
    let mut batch = RecordBatch::new(vec!["cliente".to_string(), " Cliente ".to_string()]);
    batch.push_row(vec![CellValue::text("Ana"), CellValue::text("Ana")]);
    batch.source = Some("dup.csv".to_string());

    let pipeline = HarmonizationPipeline::from_config(sales()).expect("pipeline");
    let report = pipeline.run(batch).await;

    assert!(!report.success);
    assert!(report.enhanced_rows.is_empty());
    assert!(report.decisions.is_empty());
    assert_eq!(report.source.as_deref(), Some("dup.csv"));
    assert!(
        report
            .error
            .as_deref()
            .is_some_and(|e| e.contains("duplicate column name"))
    );
}

#[tokio::test]
async fn unreadable_file_is_a_failed_report() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("missing.csv");
    let pipeline = HarmonizationPipeline::from_config(sales()).expect("pipeline");
    let report = pipeline.run_file(&path).await;
    assert!(!report.success);
    assert!(report.error.as_deref().is_some_and(|e| e.contains("missing.csv")));
}

#[tokio::test]
async fn run_file_reads_and_harmonizes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("ventas.csv");
    std::fs::write(&path, DEMO).expect("write demo");
    let pipeline = HarmonizationPipeline::from_config(sales()).expect("pipeline");
    let report = pipeline.run_file(&path).await;
    assert!(report.success);
    assert_eq!(report.total_records, 5);
    assert_eq!(report.source, Some(path.display().to_string()));
}

struct Failing;

#[async_trait]
impl Classifier for Failing {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn classify(
        &self,
        _candidate: &ColumnCandidate,
        _schema: &TargetSchema,
    ) -> Result<Classification, ClassifierError> {
        Err(ClassifierError::Transport {
            message: "connection refused".to_string(),
        })
    }
}

struct Stalled;

#[async_trait]
impl Classifier for Stalled {
    fn name(&self) -> &'static str {
        "stalled"
    }

    async fn classify(
        &self,
        _candidate: &ColumnCandidate,
        _schema: &TargetSchema,
    ) -> Result<Classification, ClassifierError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Classification::new("customer_name", 1.0))
    }
}

fn opaque_batch() -> RecordBatch {
    let mut batch = RecordBatch::new(vec!["cliente".to_string(), "col_17".to_string()]);
    batch.push_row(vec![CellValue::text("Hans Mueller"), CellValue::text("zz")]);
    batch
}

#[tokio::test]
async fn classifier_failures_degrade_to_no_match() {
    let pipeline = HarmonizationPipeline::builder(sales())
        .with_classifier(Arc::new(Failing))
        .build()
        .expect("pipeline");
    let report = pipeline.run(opaque_batch()).await;
    assert!(report.success);
    assert!(report.decisions[0].is_mapped());
    assert!(!report.decisions[1].is_mapped());
    assert_eq!(report.rejected_count, 1);
}

#[tokio::test]
async fn classifier_timeouts_do_not_block_the_batch() {
    let mut config = sales();
    config.runtime.call_timeout_ms = 50;
    let pipeline = HarmonizationPipeline::builder(config)
        .with_classifier(Arc::new(Stalled))
        .build()
        .expect("pipeline");
    let report = tokio::time::timeout(Duration::from_secs(10), pipeline.run(opaque_batch()))
        .await
        .expect("batch finished before the stalled classifier");
    assert!(report.success);
    assert_eq!(report.decisions[0].target_field, "customer_name");
    assert!(!report.decisions[1].is_mapped());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rows_keep_input_order_across_workers() {
    let mut config = sales();
    config.runtime.workers = 3;
    config.runtime.chunk_size = 2;
    let mut batch = RecordBatch::new(vec!["cliente".to_string(), "cantidad".to_string()]);
    for idx in 0..25 {
        batch.push_row(vec![
            CellValue::text(format!("customer {idx}")),
            CellValue::text(idx.to_string()),
        ]);
    }

    let pipeline = HarmonizationPipeline::from_config(config).expect("pipeline");
    let report = pipeline.run(batch).await;

    assert_eq!(report.enhanced_rows.len(), 25);
    for (idx, row) in report.enhanced_rows.iter().enumerate() {
        assert_eq!(row.get("quantity"), Some(&CellValue::Integer(idx as i64)));
        assert_eq!(text(row.get("customer_name")), format!("customer {idx}"));
    }
}

#[tokio::test]
async fn empty_batch_scores_zero() {
    let batch = RecordBatch::new(vec!["cliente".to_string()]);
    let pipeline = HarmonizationPipeline::from_config(sales()).expect("pipeline");
    let report = pipeline.run(batch).await;
    assert!(report.success);
    assert_eq!(report.total_records, 0);
    assert_eq!(report.quality_score, 0.0);
}

/// Panics on any row holding a `boom` cell.
struct Explosive;

impl Enricher for Explosive {
    fn kind(&self) -> EnrichKind {
        EnrichKind::Country
    }

    fn enrich(&self, field: &str, row: RowView<'_>, _hints: &[Option<String>]) -> Transformed {
        if row.iter().any(|(_, cell)| cell.to_string() == "boom") {
            panic!("enricher blew up");
        }
        Transformed {
            value: CellValue::text("-"),
            outcome: ValidationOutcome::new(field, OutcomeStatus::Enriched, "", "-", "placeholder"),
        }
    }
}

#[tokio::test]
async fn panicked_worker_only_fails_its_rows() {
    let mut config = sales();
    config.runtime.workers = 2;
    config.runtime.chunk_size = 1;
    let pipeline = HarmonizationPipeline::builder(config)
        .with_enricher("sales_rep", Arc::new(Explosive))
        .build()
        .expect("pipeline");

    let mut batch = RecordBatch::new(vec!["cliente".to_string(), "cantidad".to_string()]);
    for (name, qty) in [("María García", "2"), ("boom", "1"), ("Hans Mueller", "3")] {
        batch.push_row(vec![CellValue::text(name), CellValue::text(qty)]);
    }
    let report = pipeline.run(batch).await;

    assert!(report.success, "{:?}", report.error);
    assert_eq!(report.enhanced_rows.len(), 3);
    assert_eq!(text(report.enhanced_rows[0].get("customer_name")), "María García");
    assert_eq!(report.enhanced_rows[1], Default::default());
    assert_eq!(text(report.enhanced_rows[2].get("customer_name")), "Hans Mueller");
    // customer_name, quantity, country, sales_rep
    assert_eq!(report.tally.error, 4);
}
