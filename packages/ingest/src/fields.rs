// ABOUTME: Field extraction helpers for roadmap rows
// ABOUTME: Header candidates, number/date parsing, quarter labels, and URL scanning

use bulletin_core::BACKLOG_QUARTER;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;

use crate::sheet::{excel_serial_to_date, CellValue, SheetRow};

lazy_static! {
    static ref URL_PATTERN: Regex =
        Regex::new(r#"(?i)https?://[^\s<>"')\],]+"#).expect("URL pattern is valid");
}

/// Header spellings probed per field, in priority order.
///
/// The source sheet mixes English and Turkish headers, with and without
/// diacritics.
pub mod headers {
    pub const TITLE: &[&str] = &["İş Paketi", "Is Paketi", "İs Paketi", "Task", "Title"];
    pub const EPIC: &[&str] = &["Epic", "Tema"];
    pub const DETAIL: &[&str] = &["Detay", "Detail", "Açıklama"];
    pub const CONSTRAINTS: &[&str] = &["Kısıtlar", "Kisitlar", "Constraints"];
    pub const COMPLETION_CRITERIA: &[&str] = &["Tamamlanma Kriteri", "Completion Criteria"];
    pub const SOLUTION: &[&str] = &["Neyi Çözecek?", "Neyi Cozecek?", "Solution"];
    pub const EXPECTATION: &[&str] = &["Beklenti", "Expectation", "Lead"];
    pub const CUSTOMER: &[&str] = &["Müşteri", "Musteri", "Customer"];
    pub const ROI_METRIC: &[&str] = &["ROI", "ROI Metric", "ROI Metriği", "ROI Metrigi"];
    pub const ROI_VALUE: &[&str] = &["ROI Value", "ROI Değeri", "ROI Degeri"];
    pub const DEMO_LINKS: &[&str] = &[
        "Demo videos / links",
        "Demo Video Links",
        "Demo videos",
        "Demo links",
        "Demo",
        "Video",
        "Video link",
        "Demo Link",
    ];
    pub const DOC_LINKS: &[&str] = &[
        "Project docs",
        "Project doc",
        "Doc",
        "Doc link",
        "Documentation",
        "Dokuman",
        "Dokuman link",
    ];
    pub const STATUS: &[&str] = &["Status", "Durum"];
    pub const TARGET_DATE: &[&str] = &["Hedef Tarih", "Target Date"];
    pub const STORY_POINT: &[&str] = &["Story Point", "Story Points"];
}

/// First non-blank cell among the candidate headers, as trimmed text
pub fn read_text(row: &SheetRow, candidates: &[&str]) -> String {
    read_value(row, candidates)
        .map(|value| value.as_text().trim().to_string())
        .unwrap_or_default()
}

/// First non-blank cell among the candidate headers
pub fn read_value<'a>(row: &'a SheetRow, candidates: &[&str]) -> Option<&'a CellValue> {
    candidates
        .iter()
        .filter_map(|header| row.get(header))
        .find(|value| !value.as_text().trim().is_empty())
}

/// Parse a numeric cell, accepting a decimal comma in text cells
pub fn parse_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(text) => {
            let normalized = text.replacen(',', ".", 1);
            let normalized = normalized.trim();
            if normalized.is_empty() {
                return None;
            }
            normalized.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Parse a date cell: native dates, serial numbers, ISO text, or `D/M/Y` / `Y-M-D` text
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(date) => Some(*date),
        CellValue::Number(serial) => excel_serial_to_date(*serial),
        CellValue::Text(text) => parse_date_text(text),
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.date());
        }
    }

    let parts: Vec<i32> = trimmed
        .split(['.', '/', '-'])
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<_, _>>()
        .ok()?;
    if parts.len() != 3 {
        return None;
    }

    let (year, month, day) = if parts[0] > 1900 {
        (parts[0], parts[1], parts[2])
    } else {
        (parts[2], parts[1], parts[0])
    };
    let year = if (0..100).contains(&year) { year + 2000 } else { year };

    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

/// Quarter label for a target date (`Q<n>, <year>`), `Backlog` when absent
pub fn to_quarter(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => format!("Q{}, {}", date.month0() / 3 + 1, date.year()),
        None => BACKLOG_QUARTER.to_string(),
    }
}

/// Display format for target dates (`MM/DD/YYYY`), empty when absent
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_default()
}

/// All http(s) URLs embedded in free text
pub fn extract_urls(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_read_text_takes_first_non_blank_candidate() {
        let row = SheetRow::new()
            .with("İş Paketi", CellValue::text("   "))
            .with("Task", CellValue::text(" Billing export "))
            .with("Title", CellValue::text("ignored"));

        assert_eq!(read_text(&row, headers::TITLE), "Billing export");
        assert_eq!(read_text(&row, headers::EPIC), "");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(&CellValue::Number(3.0)), Some(3.0));
        assert_eq!(parse_number(&CellValue::text("2,5")), Some(2.5));
        assert_eq!(parse_number(&CellValue::text(" 8 ")), Some(8.0));
        assert_eq!(parse_number(&CellValue::text("eight")), None);
        assert_eq!(parse_number(&CellValue::text("")), None);
    }

    #[test]
    fn test_parse_date_variants() {
        assert_eq!(parse_date(&CellValue::text("2026-03-15")), date(2026, 3, 15));
        assert_eq!(
            parse_date(&CellValue::text("2026-03-15T10:00:00Z")),
            date(2026, 3, 15)
        );
        assert_eq!(parse_date(&CellValue::text("15/03/2026")), date(2026, 3, 15));
        assert_eq!(parse_date(&CellValue::text("15.03.2026")), date(2026, 3, 15));
        assert_eq!(parse_date(&CellValue::text("2026/03/15")), date(2026, 3, 15));
        assert_eq!(parse_date(&CellValue::Number(45658.0)), date(2025, 1, 1));
        assert_eq!(parse_date(&CellValue::text("someday")), None);
        assert_eq!(parse_date(&CellValue::text("31/02/2026")), None);
    }

    #[test]
    fn test_to_quarter() {
        assert_eq!(to_quarter(date(2026, 1, 1)), "Q1, 2026");
        assert_eq!(to_quarter(date(2026, 3, 31)), "Q1, 2026");
        assert_eq!(to_quarter(date(2026, 4, 1)), "Q2, 2026");
        assert_eq!(to_quarter(date(2025, 12, 31)), "Q4, 2025");
        assert_eq!(to_quarter(None), "Backlog");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(date(2026, 3, 5)), "03/05/2026");
        assert_eq!(format_date(None), "");
    }

    #[test]
    fn test_extract_urls_stops_at_delimiters() {
        let text = r#"See (https://demo.example.com/v1) and "http://docs.example.com/a?b=1", plus HTTPS://X.io/y]"#;
        assert_eq!(
            extract_urls(text),
            vec![
                "https://demo.example.com/v1".to_string(),
                "http://docs.example.com/a?b=1".to_string(),
                "HTTPS://X.io/y".to_string(),
            ]
        );
        assert!(extract_urls("no links here").is_empty());
    }
}
