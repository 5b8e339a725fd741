pub mod error;
pub mod mapping;
pub mod processing;
pub mod schema;
pub mod table;
pub mod validation;
pub mod value;

pub use error::{HarmonizeError, Result};
pub use mapping::{
    Classification, ColumnCandidate, MappingDecision, MappingStatus, MatchBasis, NO_MATCH,
    RejectionReason, UNMAPPED,
};
pub use processing::{HarmonizationReport, OutcomeTally, ProcessingSummary};
pub use schema::{DATE_FORMATS, FieldType, TargetField, TargetSchema, TransformationKind};
pub use table::{HarmonizedRecord, RecordBatch, RowView};
pub use validation::{OutcomeStatus, ValidationOutcome};
pub use value::{CellValue, format_decimal};
