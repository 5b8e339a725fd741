//! Row-level work: one mapped transform per mapped column, one enrichment
//! per enrichable missing field.

use std::ops::Range;
use std::sync::Arc;

use harmonize_model::{
    CellValue, HarmonizedRecord, MappingDecision, OutcomeStatus, OutcomeTally, RecordBatch,
    RowView, TransformationKind,
};
use harmonize_transform::{Enricher, FieldTransformer};

static NULL_CELL: CellValue = CellValue::Null;

/// A mapped source column and how to transform it.
#[derive(Debug, Clone)]
pub(crate) struct FieldStep {
    pub column: usize,
    pub field: String,
    pub kind: TransformationKind,
}

impl FieldStep {
    /// Steps for the mapped decisions, in header order.
    pub fn plan(batch: &RecordBatch, decisions: &[MappingDecision]) -> Vec<Self> {
        decisions
            .iter()
            .filter(|d| d.is_mapped())
            .filter_map(|d| {
                batch.column_index(&d.source_column).map(|column| Self {
                    column,
                    field: d.target_field.clone(),
                    kind: d.transformation_kind,
                })
            })
            .collect()
    }
}

/// Read-only state shared by every row worker.
pub(crate) struct RowJob {
    pub batch: Arc<RecordBatch>,
    pub steps: Vec<FieldStep>,
    pub enrichers: Vec<(String, Arc<dyn Enricher>)>,
    pub language_hints: Vec<Option<String>>,
    pub transformer: Arc<FieldTransformer>,
}

impl RowJob {
    pub fn run(&self, range: Range<usize>) -> (Vec<HarmonizedRecord>, OutcomeTally) {
        let mut records = Vec::with_capacity(range.len());
        let mut tally = OutcomeTally::default();
        for cells in &self.batch.rows[range] {
            let row = RowView::new(&self.batch.headers, cells);
            let mut record = HarmonizedRecord::new();
            for step in &self.steps {
                let raw = cells.get(step.column).unwrap_or(&NULL_CELL);
                let transformed = self.transformer.transform(
                    raw,
                    &step.field,
                    step.kind,
                    row,
                    &self.language_hints,
                );
                tally.record(transformed.outcome.status);
                record.insert(step.field.clone(), transformed.value);
            }
            for (field, enricher) in &self.enrichers {
                let enriched = enricher.enrich(field, row, &self.language_hints);
                tally.record(enriched.outcome.status);
                record.insert(field.clone(), enriched.value);
            }
            records.push(record);
        }
        (records, tally)
    }

    /// Stand-in for a chunk whose worker died: empty records and one error
    /// outcome per field the rows would have produced.
    pub fn failed(&self, range: Range<usize>) -> (Vec<HarmonizedRecord>, OutcomeTally) {
        let mut tally = OutcomeTally::default();
        let per_row = self.steps.len() + self.enrichers.len();
        for _ in 0..range.len() * per_row {
            tally.record(OutcomeStatus::Error);
        }
        (vec![HarmonizedRecord::new(); range.len()], tally)
    }
}

/// Contiguous row ranges of at most `chunk_size` rows.
pub(crate) fn chunk_ranges(rows: usize, chunk_size: usize) -> Vec<Range<usize>> {
    let size = chunk_size.max(1);
    (0..rows)
        .step_by(size)
        .map(|start| start..(start + size).min(rows))
        .collect()
}
