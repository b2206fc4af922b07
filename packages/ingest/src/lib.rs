// ABOUTME: Roadmap workbook ingestion for the backlog store
// ABOUTME: Reads the sheet, derives initiative fields, and merges them with persisted records

pub mod derive;
pub mod error;
pub mod estimator;
pub mod fields;
pub mod merge;
pub mod sheet;

use std::path::Path;

use bulletin_core::BacklogDatabase;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

// Re-export main types
pub use derive::{derive_row, derive_rows, ParsedInitiative};
pub use error::{IngestError, IngestResult};
pub use estimator::{DetailRichnessEstimator, PlanningSignals, ProgressEstimator};
pub use merge::{build_document, merge_initiatives};
pub use sheet::{read_workbook, try_read_workbook, CellValue, SheetRow};

/// Run a full ingestion pass against the workbook at `source`.
///
/// A missing or unreadable workbook yields a document with no initiatives;
/// ideas and access data always carry over from `existing`.
pub fn seed_document(
    source: &Path,
    existing: Option<BacklogDatabase>,
    estimator: &dyn ProgressEstimator,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> BacklogDatabase {
    let rows = read_workbook(source);
    let parsed = derive_rows(&rows, estimator, today);
    info!(
        rows = rows.len(),
        initiatives = parsed.len(),
        "Ingested roadmap workbook {:?}",
        source
    );
    build_document(parsed, existing, now)
}
