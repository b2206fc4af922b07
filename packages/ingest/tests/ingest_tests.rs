// ABOUTME: End-to-end ingestion tests against a real workbook on disk
// ABOUTME: Covers re-import idempotence, preserved user edits, and link union

use std::path::{Path, PathBuf};

use bulletin_core::{BacklogDatabase, InitiativeStatus};
use bulletin_ingest::{seed_document, DetailRichnessEstimator};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Format, Workbook};
use tempfile::TempDir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
}

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap()
}

/// Author a small roadmap workbook with mixed headers and cell types
fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("roadmap.xlsx");
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();

    let headers = [
        "Epic",
        "İş Paketi",
        "Detay",
        "Kısıtlar",
        "Tamamlanma Kriteri",
        "Müşteri",
        "Story Point",
        "Hedef Tarih",
        "Project docs",
        "Durum",
    ];
    for (col, header) in headers.iter().enumerate() {
        sheet.write(0, col as u16, *header).unwrap();
    }

    sheet.write(1, 0, "Platform").unwrap();
    sheet.write(1, 1, "SSO login").unwrap();
    sheet
        .write(1, 2, "Okta rollout, demo https://demo.example.com/sso")
        .unwrap();
    sheet.write(1, 3, "Vendor contract").unwrap();
    sheet.write(1, 4, "All tenants migrated").unwrap();
    sheet.write(1, 5, "Acme").unwrap();
    sheet.write(1, 6, 5.0).unwrap();
    // 2026-08-14 as a serial with a date format
    sheet.write_with_format(1, 7, 46248.0, &date_format).unwrap();
    sheet.write(1, 8, "https://docs.example.com/sso").unwrap();

    sheet.write(2, 0, "Growth").unwrap();
    sheet.write(2, 1, "Referral program").unwrap();
    sheet.write(2, 7, "15/03/2026").unwrap();
    sheet.write(2, 9, "Yolda").unwrap();

    // No title: dropped
    sheet.write(3, 0, "Ops").unwrap();
    sheet.write(3, 2, "Detail without a work item").unwrap();

    workbook.save(&path).unwrap();
    path
}

fn ingest(path: &Path, existing: Option<BacklogDatabase>, now: DateTime<Utc>) -> BacklogDatabase {
    seed_document(path, existing, &DetailRichnessEstimator, today(), now)
}

#[test]
fn test_first_ingest_derives_fields() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(temp.path());

    let db = ingest(&path, None, at(9));

    assert_eq!(db.initiatives.len(), 2);
    let sso = &db.initiatives[0];
    assert_eq!(sso.id, 1);
    assert_eq!(sso.epic, "Platform");
    assert_eq!(sso.quarter, "Q3, 2026");
    assert_eq!(sso.target_date, "08/14/2026");
    assert_eq!(sso.story_point, Some(5.0));
    assert_eq!(sso.progress, 55);
    assert_eq!(sso.status, InitiativeStatus::OnTrack);
    assert_eq!(sso.customer, "Acme");
    assert_eq!(sso.lead, "Unassigned");
    assert_eq!(sso.demo_links, vec!["https://demo.example.com/sso".to_string()]);
    assert_eq!(sso.doc_links, vec!["https://docs.example.com/sso".to_string()]);

    let referral = &db.initiatives[1];
    assert_eq!(referral.id, 2);
    assert_eq!(referral.quarter, "Q1, 2026");
    assert_eq!(referral.status, InitiativeStatus::OnTrack);
    assert_eq!(referral.progress, 8);

    // Brand-new store gets the default idea
    assert_eq!(db.ideas.len(), 1);
}

#[test]
fn test_reingest_is_idempotent_apart_from_updated_at() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(temp.path());

    let first = ingest(&path, None, at(9));
    let second = ingest(&path, Some(first.clone()), at(10));

    assert_eq!(first.initiatives.len(), second.initiatives.len());
    for (before, after) in first.initiatives.iter().zip(&second.initiatives) {
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.updated_at, at(10));

        let mut normalized = after.clone();
        normalized.updated_at = before.updated_at;
        assert_eq!(&normalized, before);
    }
    assert_eq!(second.ideas, first.ideas);
}

#[test]
fn test_reingest_preserves_dashboard_edits() {
    let temp = TempDir::new().unwrap();
    let path = write_fixture(temp.path());

    let mut db = ingest(&path, None, at(9));
    db.initiatives[1].customer = "Globex".to_string();
    db.initiatives[1].roi_metric = "Signups".to_string();
    db.initiatives[0].doc_links.push("http://a".to_string());

    let reseeded = ingest(&path, Some(db.clone()), at(10));
    let again = ingest(&path, Some(reseeded.clone()), at(11));

    assert_eq!(again.initiatives[1].customer, "Globex");
    assert_eq!(again.initiatives[1].roi_metric, "Signups");
    assert_eq!(
        again.initiatives[0].doc_links,
        vec![
            "https://docs.example.com/sso".to_string(),
            "http://a".to_string()
        ]
    );
}

#[test]
fn test_missing_workbook_yields_empty_initiatives() {
    let temp = TempDir::new().unwrap();
    let existing = BacklogDatabase {
        initiatives: vec![Default::default()],
        ..Default::default()
    };

    let db = ingest(&temp.path().join("absent.xlsx"), Some(existing), at(9));

    assert!(db.initiatives.is_empty());
    assert!(db.ideas.is_empty());
}
