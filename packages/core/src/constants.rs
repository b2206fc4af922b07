use std::path::{Path, PathBuf};

/// Cookie carrying the access-gate grant
pub const ACCESS_COOKIE_NAME: &str = "maistro_access";

/// Value stored in the access cookie once a code has been verified
pub const ACCESS_COOKIE_VALUE: &str = "granted";

/// Quarter label for initiatives without a target date
pub const BACKLOG_QUARTER: &str = "Backlog";

/// Placeholder owner for lead and customer fields
pub const UNASSIGNED: &str = "Unassigned";

/// Epic used when a row or request carries none
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Get the path to the persisted backlog document (<content>/data/backlog-db.json)
pub fn backlog_file(content_dir: &Path) -> PathBuf {
    content_dir.join("data").join("backlog-db.json")
}

/// Get the path to the roadmap workbook (<content>/roadmap/roadmap.xlsx)
pub fn roadmap_workbook(content_dir: &Path) -> PathBuf {
    content_dir.join("roadmap").join("roadmap.xlsx")
}

/// Get the directory holding sprint bulletins (<content>/sprints)
pub fn sprints_dir(content_dir: &Path) -> PathBuf {
    content_dir.join("sprints")
}
