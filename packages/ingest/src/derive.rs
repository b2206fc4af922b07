// ABOUTME: Per-row field extraction and derivation for roadmap ingestion
// ABOUTME: Turns header-keyed sheet rows into initiative fields with derived progress, status, and quarter

use bulletin_core::{InitiativeStatus, UNCATEGORIZED};
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{IngestError, IngestResult};
use crate::estimator::{PlanningSignals, ProgressEstimator};
use crate::fields::{
    extract_urls, format_date, headers, parse_date, parse_number, read_text, read_value,
    to_quarter,
};
use crate::sheet::SheetRow;

/// Initiative fields derived from one sheet row, before merging with stored data
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInitiative {
    /// Zero-based position among the non-blank sheet rows
    pub row_index: usize,
    pub epic: String,
    pub title: String,
    pub detail: String,
    pub quarter: String,
    pub target_date: String,
    pub status: InitiativeStatus,
    pub progress: u8,
    pub customer: String,
    pub constraints: String,
    pub completion_criteria: String,
    pub solution: String,
    pub expectation: String,
    pub roi_metric: String,
    pub roi_value: String,
    pub story_point: Option<f64>,
    pub notes: Vec<String>,
    /// URLs found in the demo column and the detail text
    pub demo_links: Vec<String>,
    /// URLs found in the docs column
    pub doc_links: Vec<String>,
}

impl ParsedInitiative {
    /// Ingestion-assigned id: row position plus one
    pub fn id(&self) -> u64 {
        self.row_index as u64 + 1
    }

    pub fn merge_key(&self) -> String {
        bulletin_core::types::merge_key(&self.epic, &self.title)
    }
}

/// Derive one initiative from a sheet row.
///
/// Rows without a title yield `Ok(None)`. A target date that is present but
/// unreadable is an error so the caller can drop the row.
pub fn derive_row(
    row_index: usize,
    row: &SheetRow,
    estimator: &dyn ProgressEstimator,
    today: NaiveDate,
) -> IngestResult<Option<ParsedInitiative>> {
    let title = read_text(row, headers::TITLE);
    if title.is_empty() {
        return Ok(None);
    }

    let epic = match read_text(row, headers::EPIC) {
        epic if epic.is_empty() => UNCATEGORIZED.to_string(),
        epic => epic,
    };
    let detail = read_text(row, headers::DETAIL);
    let constraints = read_text(row, headers::CONSTRAINTS);
    let completion_criteria = read_text(row, headers::COMPLETION_CRITERIA);
    let solution = read_text(row, headers::SOLUTION);
    let expectation = read_text(row, headers::EXPECTATION);
    let customer = read_text(row, headers::CUSTOMER);
    let roi_metric = read_text(row, headers::ROI_METRIC);
    let roi_value = read_text(row, headers::ROI_VALUE);
    let demo_raw = read_text(row, headers::DEMO_LINKS);
    let doc_raw = read_text(row, headers::DOC_LINKS);

    let story_point = read_value(row, headers::STORY_POINT).and_then(parse_number);

    let target = match read_value(row, headers::TARGET_DATE) {
        Some(value) => Some(parse_date(value).ok_or_else(|| IngestError::InvalidDate {
            row: row_index + 1,
            value: value.as_text(),
        })?),
        None => None,
    };

    let progress = estimator.progress(&PlanningSignals {
        detail: &detail,
        constraints: &constraints,
        completion_criteria: &completion_criteria,
        solution: &solution,
        expectation: &expectation,
        story_point,
    });

    let status_text = read_text(row, headers::STATUS);
    let status = if status_text.is_empty() {
        estimator.status(progress, target, &constraints, today)
    } else {
        InitiativeStatus::normalize(&status_text)
    };

    let mut notes = Vec::with_capacity(3);
    if !detail.is_empty() {
        notes.push(detail.clone());
    }
    if !completion_criteria.is_empty() {
        notes.push(format!("Done when: {}", completion_criteria));
    }
    if !constraints.is_empty() {
        notes.push(format!("Constraint: {}", constraints));
    }

    let mut demo_links = extract_urls(&demo_raw);
    demo_links.extend(extract_urls(&detail));
    let doc_links = extract_urls(&doc_raw);

    Ok(Some(ParsedInitiative {
        row_index,
        epic,
        title,
        detail,
        quarter: to_quarter(target),
        target_date: format_date(target),
        status,
        progress,
        customer,
        constraints,
        completion_criteria,
        solution,
        expectation,
        roi_metric,
        roi_value,
        story_point,
        notes,
        demo_links,
        doc_links,
    }))
}

/// Derive every row, dropping untitled rows and rows that fail to parse
pub fn derive_rows(
    rows: &[SheetRow],
    estimator: &dyn ProgressEstimator,
    today: NaiveDate,
) -> Vec<ParsedInitiative> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match derive_row(index, row, estimator, today) {
            Ok(Some(parsed)) => Some(parsed),
            Ok(None) => {
                debug!("Skipping row {} without a title", index + 1);
                None
            }
            Err(e) => {
                warn!("Dropping roadmap row: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::DetailRichnessEstimator;
    use crate::sheet::CellValue;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
    }

    fn derive(row: &SheetRow) -> Option<ParsedInitiative> {
        derive_row(0, row, &DetailRichnessEstimator, today()).unwrap()
    }

    #[test]
    fn test_row_without_title_is_skipped() {
        let row = SheetRow::new()
            .with("Epic", CellValue::text("Platform"))
            .with("Detay", CellValue::text("orphan detail"));
        assert_eq!(derive(&row), None);
    }

    #[test]
    fn test_turkish_headers_and_derived_fields() {
        let row = SheetRow::new()
            .with("Tema", CellValue::text("Platform"))
            .with("İş Paketi", CellValue::text("SSO login"))
            .with(
                "Detay",
                CellValue::text("Okta rollout, demo at https://demo.example.com/sso"),
            )
            .with("Kısıtlar", CellValue::text("Vendor contract"))
            .with("Tamamlanma Kriteri", CellValue::text("All tenants migrated"))
            .with("Story Point", CellValue::Number(5.0))
            .with(
                "Hedef Tarih",
                CellValue::Date(NaiveDate::from_ymd_opt(2026, 8, 14).unwrap()),
            )
            .with("Project docs", CellValue::text("https://docs.example.com/sso"));

        let parsed = derive(&row).unwrap();

        assert_eq!(parsed.epic, "Platform");
        assert_eq!(parsed.title, "SSO login");
        assert_eq!(parsed.quarter, "Q3, 2026");
        assert_eq!(parsed.target_date, "08/14/2026");
        // 3/5 * 75 = 45, plus 10 from points
        assert_eq!(parsed.progress, 55);
        assert_eq!(parsed.status, InitiativeStatus::OnTrack);
        assert_eq!(
            parsed.notes,
            vec![
                "Okta rollout, demo at https://demo.example.com/sso".to_string(),
                "Done when: All tenants migrated".to_string(),
                "Constraint: Vendor contract".to_string(),
            ]
        );
        assert_eq!(parsed.demo_links, vec!["https://demo.example.com/sso".to_string()]);
        assert_eq!(parsed.doc_links, vec!["https://docs.example.com/sso".to_string()]);
        assert_eq!(parsed.id(), 1);
    }

    #[test]
    fn test_explicit_status_wins_over_heuristic() {
        let row = SheetRow::new()
            .with("Title", CellValue::text("Billing export"))
            .with("Durum", CellValue::text("Riskli"));

        let parsed = derive(&row).unwrap();
        assert_eq!(parsed.epic, "Uncategorized");
        assert_eq!(parsed.status, InitiativeStatus::AtRisk);
        assert_eq!(parsed.quarter, "Backlog");
        assert_eq!(parsed.target_date, "");
        assert_eq!(parsed.progress, 8);
    }

    #[test]
    fn test_story_point_with_decimal_comma() {
        let row = SheetRow::new()
            .with("Task", CellValue::text("Search"))
            .with("Story Point", CellValue::text("2,5"));

        let parsed = derive(&row).unwrap();
        assert_eq!(parsed.story_point, Some(2.5));
        // floor of 8 beats 5 points
        assert_eq!(parsed.progress, 8);
    }

    #[test]
    fn test_unparseable_date_is_an_error() {
        let row = SheetRow::new()
            .with("Task", CellValue::text("Search"))
            .with("Hedef Tarih", CellValue::text("sometime soon"));

        let err = derive_row(4, &row, &DetailRichnessEstimator, today()).unwrap_err();
        assert!(matches!(err, IngestError::InvalidDate { row: 5, .. }));
    }

    #[test]
    fn test_derive_rows_keeps_row_positions_for_ids() {
        let rows = vec![
            SheetRow::new().with("Task", CellValue::text("First")),
            SheetRow::new().with("Detail", CellValue::text("no title")),
            SheetRow::new()
                .with("Task", CellValue::text("Broken"))
                .with("Target Date", CellValue::text("not a date")),
            SheetRow::new().with("Task", CellValue::text("Fourth")),
        ];

        let parsed = derive_rows(&rows, &DetailRichnessEstimator, today());

        let ids: Vec<(u64, &str)> = parsed.iter().map(|p| (p.id(), p.title.as_str())).collect();
        assert_eq!(ids, vec![(1, "First"), (4, "Fourth")]);
    }
}
