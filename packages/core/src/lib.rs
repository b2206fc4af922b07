// ABOUTME: Core types, constants and helpers for the sprint bulletin
// ABOUTME: Foundational package shared by ingestion, storage, and the HTTP layer

pub mod constants;
pub mod types;
pub mod utils;

// Re-export main types
pub use types::{
    AccessCode, AccessRequest, AccessRequestStatus, BacklogDatabase, IdeaRecord,
    InitiativeRecord, InitiativeStatus,
};

// Re-export constants
pub use constants::{
    backlog_file, roadmap_workbook, sprints_dir, ACCESS_COOKIE_NAME, ACCESS_COOKIE_VALUE,
    BACKLOG_QUARTER, UNASSIGNED, UNCATEGORIZED,
};

// Re-export utilities
pub use utils::{clamp_percent, generate_access_code, normalize_email, unique_links};
