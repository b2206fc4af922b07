// ABOUTME: Backlog document type definitions
// ABOUTME: Initiatives, ideas, access requests and codes, and the root document that holds them

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery status of an initiative.
///
/// The four canonical states serialize as snake_case tokens. Any other text
/// imported from a spreadsheet is kept as a normalized token in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InitiativeStatus {
    #[default]
    NotStarted,
    OnTrack,
    AtRisk,
    Completed,
    Other(String),
}

impl InitiativeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            InitiativeStatus::NotStarted => "not_started",
            InitiativeStatus::OnTrack => "on_track",
            InitiativeStatus::AtRisk => "at_risk",
            InitiativeStatus::Completed => "completed",
            InitiativeStatus::Other(token) => token,
        }
    }

    /// Map free-form status text (English or Turkish) onto a status.
    ///
    /// Unknown text is lowercased and whitespace runs become underscores.
    pub fn normalize(text: &str) -> Self {
        let value = text.trim().to_lowercase();
        if value.is_empty() {
            return InitiativeStatus::NotStarted;
        }

        match value.as_str() {
            "on track" | "on_track" | "track" | "yolda" | "devam" => InitiativeStatus::OnTrack,
            "at risk" | "at_risk" | "risk" | "riskli" | "blok" | "blocked" => {
                InitiativeStatus::AtRisk
            }
            "completed" | "done" | "tamam" | "completed ✅" => InitiativeStatus::Completed,
            "not started" | "not_started" | "başlamadı" | "planned" => {
                InitiativeStatus::NotStarted
            }
            _ => InitiativeStatus::from(value.split_whitespace().collect::<Vec<_>>().join("_")),
        }
    }
}

impl From<String> for InitiativeStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "not_started" => InitiativeStatus::NotStarted,
            "on_track" => InitiativeStatus::OnTrack,
            "at_risk" => InitiativeStatus::AtRisk,
            "completed" => InitiativeStatus::Completed,
            _ => InitiativeStatus::Other(value),
        }
    }
}

impl From<InitiativeStatus> for String {
    fn from(status: InitiativeStatus) -> Self {
        match status {
            InitiativeStatus::Other(token) => token,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for InitiativeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One roadmap work item
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitiativeRecord {
    pub id: u64,
    pub epic: String,
    pub title: String,
    pub detail: String,
    /// `Q<1-4>, <year>` or `Backlog`
    pub quarter: String,
    pub target_date: String,
    pub status: InitiativeStatus,
    pub progress: u8,
    pub lead: String,
    pub customer: String,
    pub constraints: String,
    pub completion_criteria: String,
    pub solution: String,
    pub expectation: String,
    pub roi_metric: String,
    pub roi_value: String,
    pub story_point: Option<f64>,
    pub notes: Vec<String>,
    pub demo_links: Vec<String>,
    pub doc_links: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InitiativeRecord {
    /// Case-insensitive `epic::title` identity used to match re-imported rows
    pub fn merge_key(&self) -> String {
        merge_key(&self.epic, &self.title)
    }
}

/// Build the merge key for an epic/title pair
pub fn merge_key(epic: &str, title: &str) -> String {
    format!("{}::{}", epic, title).to_lowercase()
}

/// A voted suggestion
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdeaRecord {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub votes: u32,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessRequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessRequest {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub status: AccessRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessCode {
    pub code: String,
    pub email: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by: String,
}

/// The whole persisted unit: every read loads it, every write replaces it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BacklogDatabase {
    pub initiatives: Vec<InitiativeRecord>,
    pub ideas: Vec<IdeaRecord>,
    pub access_requests: Vec<AccessRequest>,
    pub access_codes: Vec<AccessCode>,
}

impl BacklogDatabase {
    pub fn next_initiative_id(&self) -> u64 {
        self.initiatives.iter().map(|item| item.id).max().unwrap_or(0) + 1
    }

    pub fn next_idea_id(&self) -> u64 {
        self.ideas.iter().map(|item| item.id).max().unwrap_or(0) + 1
    }

    pub fn next_access_request_id(&self) -> u64 {
        self.access_requests.iter().map(|item| item.id).max().unwrap_or(0) + 1
    }

    /// Ideas a brand-new store starts with
    pub fn default_ideas(now: DateTime<Utc>) -> Vec<IdeaRecord> {
        vec![IdeaRecord {
            id: 1,
            title: "Decentralized agent marketplace infrastructure".to_string(),
            description: "Marketplace infrastructure for commercialising vertical agents."
                .to_string(),
            category: "Strategy".to_string(),
            votes: 5,
            pinned: false,
            created_at: now,
        }]
    }
}
