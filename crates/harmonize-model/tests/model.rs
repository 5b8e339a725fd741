//! Tests for harmonize-model types.

use harmonize_model::{
    CellValue, FieldType, HarmonizationReport, HarmonizedRecord, MappingDecision, MatchBasis,
    OutcomeStatus, OutcomeTally, RejectionReason, TargetField, TargetSchema, TransformationKind,
    ValidationOutcome,
};

#[test]
fn rejected_decision_serialized_shape() {
    let decision = MappingDecision::rejected(
        "precio",
        Some("unit_price".to_string()),
        0.9,
        RejectionReason::DuplicateMapping {
            winner: "price_unit".to_string(),
        },
        MatchBasis::Classifier,
    );
    insta::assert_json_snapshot!(decision, @r#"
    {
      "source_column": "precio",
      "target_field": "unmapped",
      "proposed_field": "unit_price",
      "confidence": 0.9,
      "status": "rejected",
      "rejection_reason": {
        "kind": "duplicate_mapping",
        "winner": "price_unit"
      },
      "transformation_kind": "none",
      "basis": "classifier",
      "reasoning": null
    }
    "#);
}

#[test]
fn mapped_decision_serialized_shape() {
    let decision = MappingDecision::mapped(
        "fecha_venta",
        "sale_date",
        1.0,
        TransformationKind::ParseDate,
        MatchBasis::Lexical,
    );
    insta::assert_json_snapshot!(decision, @r#"
    {
      "source_column": "fecha_venta",
      "target_field": "sale_date",
      "proposed_field": "sale_date",
      "confidence": 1.0,
      "status": "mapped",
      "rejection_reason": null,
      "transformation_kind": "parse_date",
      "basis": "lexical",
      "reasoning": null
    }
    "#);
}

#[test]
fn below_threshold_reason_is_readable() {
    let reason = RejectionReason::BelowThreshold {
        confidence: 0.42,
        threshold: 0.6,
    };
    assert_eq!(reason.to_string(), "confidence below threshold (0.42 <= 0.60)");
    assert_eq!(
        RejectionReason::NoSuitableTarget.to_string(),
        "no suitable target field"
    );
}

#[test]
fn harmonized_record_serializes_as_plain_object() {
    let mut record = HarmonizedRecord::new();
    record.insert("customer_name", CellValue::text("Hans Mueller"));
    record.insert("quantity", CellValue::Integer(3));
    record.insert("unit_price", CellValue::Decimal(750.0));
    let json = serde_json::to_value(&record).expect("serialize record");
    assert_eq!(
        json,
        serde_json::json!({
            "customer_name": "Hans Mueller",
            "quantity": 3,
            "unit_price": 750.0
        })
    );
}

#[test]
fn summary_counts_enriched_fields() {
    let schema = TargetSchema::new(vec![
        TargetField::new("customer_name", FieldType::String),
        TargetField::new("country", FieldType::String)
            .with_transformation(TransformationKind::InferCountry),
    ]);
    let outcomes = [
        ValidationOutcome::new(
            "customer_name",
            OutcomeStatus::Valid,
            "María García",
            "María García",
            "none",
        ),
        ValidationOutcome::new(
            "country",
            OutcomeStatus::Enriched,
            "",
            "Spain",
            "inferred from name patterns and language",
        ),
    ];
    let tally: OutcomeTally = outcomes.iter().collect();
    let report = HarmonizationReport {
        success: true,
        total_records: 1,
        decisions: vec![MappingDecision::mapped(
            "cliente",
            "customer_name",
            1.0,
            TransformationKind::None,
            MatchBasis::Lexical,
        )],
        missing_fields: vec!["country".to_string()],
        enriched_fields: vec!["country".to_string()],
        quality_score: 1.0,
        tally,
        ..HarmonizationReport::default()
    };
    let summary = report.summary();
    assert_eq!(summary.fields_mapped, 1);
    assert_eq!(summary.fields_enriched, 1);
    assert_eq!(summary.outcome_count, 2);
    assert!(report.is_missing("country"));
    assert_eq!(schema.position("country"), Some(1));
}
