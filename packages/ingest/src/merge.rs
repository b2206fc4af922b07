// ABOUTME: Merge engine reconciling freshly parsed rows with persisted initiatives
// ABOUTME: Keeps user-owned fields and link history, replaces the initiative collection wholesale

use std::collections::HashMap;

use bulletin_core::{unique_links, BacklogDatabase, InitiativeRecord, UNASSIGNED};
use chrono::{DateTime, Utc};

use crate::derive::ParsedInitiative;

/// Produce the new initiative set from parsed rows.
///
/// Records are matched on the case-insensitive `epic::title` key. Matched
/// records donate their links, owner fields, ROI fields, and `createdAt`.
/// Ids always come from the row position. Existing records without a
/// matching row are dropped.
pub fn merge_initiatives(
    parsed: Vec<ParsedInitiative>,
    existing: &[InitiativeRecord],
    now: DateTime<Utc>,
) -> Vec<InitiativeRecord> {
    let by_key: HashMap<String, &InitiativeRecord> = existing
        .iter()
        .map(|record| (record.merge_key(), record))
        .collect();

    parsed
        .into_iter()
        .map(|row| {
            let previous = by_key.get(&row.merge_key()).copied();
            merge_one(row, previous, now)
        })
        .collect()
}

fn merge_one(
    row: ParsedInitiative,
    previous: Option<&InitiativeRecord>,
    now: DateTime<Utc>,
) -> InitiativeRecord {
    let id = row.id();

    let demo_links = unique_links(
        row.demo_links
            .into_iter()
            .chain(previous.into_iter().flat_map(|p| p.demo_links.iter().cloned())),
    );
    let doc_links = unique_links(
        row.doc_links
            .into_iter()
            .chain(previous.into_iter().flat_map(|p| p.doc_links.iter().cloned())),
    );

    let lead = first_filled(&row.expectation, previous.map(|p| p.lead.as_str()), UNASSIGNED);
    let customer = first_filled(&row.customer, previous.map(|p| p.customer.as_str()), UNASSIGNED);
    let roi_metric = first_filled(&row.roi_metric, previous.map(|p| p.roi_metric.as_str()), "");
    let roi_value = first_filled(&row.roi_value, previous.map(|p| p.roi_value.as_str()), "");

    InitiativeRecord {
        id,
        epic: row.epic,
        title: row.title,
        detail: row.detail,
        quarter: row.quarter,
        target_date: row.target_date,
        status: row.status,
        progress: row.progress,
        lead,
        customer,
        constraints: row.constraints,
        completion_criteria: row.completion_criteria,
        solution: row.solution,
        expectation: row.expectation,
        roi_metric,
        roi_value,
        story_point: row.story_point,
        notes: row.notes,
        demo_links,
        doc_links,
        created_at: previous.map(|p| p.created_at).unwrap_or(now),
        updated_at: now,
    }
}

fn first_filled(fresh: &str, previous: Option<&str>, fallback: &str) -> String {
    [Some(fresh), previous]
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Build the document persisted after an ingestion pass.
///
/// Ideas and access data carry over untouched; a store that never existed
/// starts with the default ideas.
pub fn build_document(
    parsed: Vec<ParsedInitiative>,
    existing: Option<BacklogDatabase>,
    now: DateTime<Utc>,
) -> BacklogDatabase {
    match existing {
        Some(db) => BacklogDatabase {
            initiatives: merge_initiatives(parsed, &db.initiatives, now),
            ideas: db.ideas,
            access_requests: db.access_requests,
            access_codes: db.access_codes,
        },
        None => BacklogDatabase {
            initiatives: merge_initiatives(parsed, &[], now),
            ideas: BacklogDatabase::default_ideas(now),
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bulletin_core::{IdeaRecord, InitiativeStatus};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap()
    }

    fn parsed(row_index: usize, epic: &str, title: &str) -> ParsedInitiative {
        ParsedInitiative {
            row_index,
            epic: epic.to_string(),
            title: title.to_string(),
            detail: String::new(),
            quarter: "Backlog".to_string(),
            target_date: String::new(),
            status: InitiativeStatus::NotStarted,
            progress: 8,
            customer: String::new(),
            constraints: String::new(),
            completion_criteria: String::new(),
            solution: String::new(),
            expectation: String::new(),
            roi_metric: String::new(),
            roi_value: String::new(),
            story_point: None,
            notes: Vec::new(),
            demo_links: Vec::new(),
            doc_links: Vec::new(),
        }
    }

    #[test]
    fn test_new_rows_get_defaults_and_fresh_timestamps() {
        let merged = merge_initiatives(vec![parsed(2, "Platform", "SSO")], &[], at(9));

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, 3);
        assert_eq!(merged[0].lead, "Unassigned");
        assert_eq!(merged[0].customer, "Unassigned");
        assert_eq!(merged[0].roi_metric, "");
        assert_eq!(merged[0].created_at, at(9));
        assert_eq!(merged[0].updated_at, at(9));
    }

    #[test]
    fn test_matched_rows_keep_user_owned_fields() {
        let existing = InitiativeRecord {
            id: 42,
            epic: "PLATFORM".to_string(),
            title: "sso".to_string(),
            lead: "Deniz".to_string(),
            customer: "Acme".to_string(),
            roi_metric: "Tickets".to_string(),
            roi_value: "-30%".to_string(),
            doc_links: vec!["http://a".to_string()],
            created_at: at(1),
            updated_at: at(1),
            ..Default::default()
        };
        let mut row = parsed(0, "Platform", "SSO");
        row.customer = String::new();
        row.roi_value = "-40%".to_string();
        row.doc_links = vec!["http://b".to_string(), "http://a".to_string()];

        let merged = merge_initiatives(vec![row], &[existing], at(9));

        assert_eq!(merged[0].id, 1);
        assert_eq!(merged[0].lead, "Deniz");
        assert_eq!(merged[0].customer, "Acme");
        assert_eq!(merged[0].roi_metric, "Tickets");
        assert_eq!(merged[0].roi_value, "-40%");
        assert_eq!(
            merged[0].doc_links,
            vec!["http://b".to_string(), "http://a".to_string()]
        );
        assert_eq!(merged[0].created_at, at(1));
        assert_eq!(merged[0].updated_at, at(9));
    }

    #[test]
    fn test_expectation_becomes_lead() {
        let existing = InitiativeRecord {
            epic: "Platform".to_string(),
            title: "SSO".to_string(),
            lead: "Old lead".to_string(),
            ..Default::default()
        };
        let mut row = parsed(0, "Platform", "SSO");
        row.expectation = "Ece".to_string();

        let merged = merge_initiatives(vec![row], &[existing], at(9));
        assert_eq!(merged[0].lead, "Ece");
    }

    #[test]
    fn test_unmatched_existing_records_are_dropped() {
        let existing = InitiativeRecord {
            id: 7,
            epic: "Ops".to_string(),
            title: "Manual item".to_string(),
            ..Default::default()
        };

        let merged = merge_initiatives(vec![parsed(0, "Platform", "SSO")], &[existing], at(9));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "SSO");
    }

    #[test]
    fn test_build_document_seeds_ideas_for_new_store() {
        let db = build_document(vec![parsed(0, "Platform", "SSO")], None, at(9));

        assert_eq!(db.initiatives.len(), 1);
        assert_eq!(db.ideas.len(), 1);
        assert_eq!(db.ideas[0].votes, 5);
        assert!(db.access_requests.is_empty());
    }

    #[test]
    fn test_build_document_carries_over_ideas() {
        let existing = BacklogDatabase {
            ideas: vec![IdeaRecord {
                id: 9,
                title: "Dark mode".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let db = build_document(Vec::new(), Some(existing), at(9));

        assert!(db.initiatives.is_empty());
        assert_eq!(db.ideas.len(), 1);
        assert_eq!(db.ideas[0].title, "Dark mode");
    }
}
