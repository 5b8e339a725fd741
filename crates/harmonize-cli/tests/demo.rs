use harmonize_cli::demo::{DEMO_CSV, write_demo};
use harmonize_cli::output::{RunReport, default_output_path};
use harmonize_core::HarmonizationPipeline;
use harmonize_ingest::{write_json, write_records};
use harmonize_standards::{Profile, load_profile};

#[tokio::test]
async fn demo_file_harmonizes_end_to_end() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("demo_sales.csv");
    write_demo(&input).expect("write demo");
    assert_eq!(std::fs::read_to_string(&input).expect("read demo"), DEMO_CSV);

    let config = load_profile(Profile::Sales).expect("sales profile");
    let pipeline = HarmonizationPipeline::from_config(config).expect("pipeline");
    let report = pipeline.run_file(&input).await;
    assert!(report.success, "{:?}", report.error);

    let output = default_output_path(&input);
    write_records(&output, pipeline.schema(), &report.enhanced_rows).expect("write output");
    let written = std::fs::read_to_string(&output).expect("read output");
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some("customer_name,product_name,quantity,unit_price,sale_date,sales_rep,country")
    );
    assert_eq!(
        lines.next(),
        Some("María García,Laptop Dell,2,899.99,2024-01-15,Carlos,Spain")
    );
    assert_eq!(lines.count(), 4);

    let report_path = dir.path().join("report.json");
    write_json(&report_path, &RunReport::new("sales", &report)).expect("write report");
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).expect("read report"))
            .expect("parse report");
    insta::assert_json_snapshot!(json["summary"], @r#"
    {
      "fields_enriched": 1,
      "fields_mapped": 6,
      "fields_rejected": 0,
      "outcome_count": 35,
      "quality_score": 1.0,
      "total_records": 5
    }
    "#);
    assert_eq!(json["missing_fields"], serde_json::json!(["country"]));
    assert_eq!(json["decisions"].as_array().map(Vec::len), Some(6));
    assert!(json.get("enhanced_rows").is_none());
}
