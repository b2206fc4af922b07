// ABOUTME: Initiative queries and direct edits against the backlog store
// ABOUTME: List with filters, get, create with defaults, partial patch, and delete

use bulletin_core::{
    clamp_percent, unique_links, InitiativeRecord, InitiativeStatus, BACKLOG_QUARTER, UNASSIGNED,
    UNCATEGORIZED,
};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer};
use tracing::info;

use crate::error::{BacklogError, BacklogResult};
use crate::store::BacklogStore;

/// Filters for listing initiatives. `all` disables a filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitiativeQuery {
    pub quarter: Option<String>,
    pub status: Option<String>,
    pub q: Option<String>,
}

impl InitiativeQuery {
    pub fn matches(&self, item: &InitiativeRecord) -> bool {
        if let Some(quarter) = active_filter(&self.quarter) {
            if item.quarter != quarter {
                return false;
            }
        }

        if let Some(status) = active_filter(&self.status) {
            if item.status.as_str() != status {
                return false;
            }
        }

        let needle = self
            .q
            .as_deref()
            .map(|q| q.trim().to_lowercase())
            .unwrap_or_default();
        if needle.is_empty() {
            return true;
        }

        [
            &item.title,
            &item.epic,
            &item.detail,
            &item.solution,
            &item.lead,
            &item.customer,
            &item.roi_metric,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Matching initiatives sorted by id
    pub fn apply(&self, items: &[InitiativeRecord]) -> Vec<InitiativeRecord> {
        let mut rows: Vec<InitiativeRecord> =
            items.iter().filter(|item| self.matches(item)).cloned().collect();
        rows.sort_by_key(|item| item.id);
        rows
    }
}

fn active_filter(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .filter(|value| !value.is_empty() && *value != "all")
}

/// Fields accepted when creating an initiative by hand
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewInitiative {
    pub epic: Option<String>,
    pub title: Option<String>,
    pub detail: Option<String>,
    pub quarter: Option<String>,
    pub target_date: Option<String>,
    pub status: Option<String>,
    pub progress: Option<f64>,
    pub lead: Option<String>,
    pub customer: Option<String>,
    pub constraints: Option<String>,
    pub completion_criteria: Option<String>,
    pub solution: Option<String>,
    pub expectation: Option<String>,
    pub roi_metric: Option<String>,
    pub roi_value: Option<String>,
    pub story_point: Option<f64>,
    pub notes: Option<Vec<String>>,
    pub demo_links: Option<Vec<String>>,
    pub doc_links: Option<Vec<String>>,
}

impl NewInitiative {
    pub fn into_record(self, id: u64, now: DateTime<Utc>) -> InitiativeRecord {
        InitiativeRecord {
            id,
            epic: self.epic.unwrap_or_else(|| UNCATEGORIZED.to_string()),
            title: self.title.unwrap_or_else(|| "New initiative".to_string()),
            detail: self.detail.unwrap_or_default(),
            quarter: self.quarter.unwrap_or_else(|| BACKLOG_QUARTER.to_string()),
            target_date: self.target_date.unwrap_or_default(),
            status: self
                .status
                .map(|status| InitiativeStatus::normalize(&status))
                .unwrap_or_default(),
            progress: clamp_percent(self.progress.unwrap_or(0.0)),
            lead: self.lead.unwrap_or_else(|| UNASSIGNED.to_string()),
            customer: self.customer.unwrap_or_else(|| UNASSIGNED.to_string()),
            constraints: self.constraints.unwrap_or_default(),
            completion_criteria: self.completion_criteria.unwrap_or_default(),
            solution: self.solution.unwrap_or_default(),
            expectation: self.expectation.unwrap_or_default(),
            roi_metric: self.roi_metric.unwrap_or_default(),
            roi_value: self.roi_value.unwrap_or_default(),
            story_point: self.story_point,
            notes: clean_list(self.notes.unwrap_or_default()),
            demo_links: unique_links(self.demo_links.unwrap_or_default()),
            doc_links: unique_links(self.doc_links.unwrap_or_default()),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; absent fields are left alone
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitiativePatch {
    pub epic: Option<String>,
    pub title: Option<String>,
    pub detail: Option<String>,
    pub quarter: Option<String>,
    pub target_date: Option<String>,
    pub status: Option<String>,
    pub progress: Option<f64>,
    pub lead: Option<String>,
    pub customer: Option<String>,
    pub constraints: Option<String>,
    pub completion_criteria: Option<String>,
    pub solution: Option<String>,
    pub expectation: Option<String>,
    pub roi_metric: Option<String>,
    pub roi_value: Option<String>,
    /// `Some(None)` clears the story point (`null` or `""`)
    #[serde(deserialize_with = "story_point_edit")]
    pub story_point: Option<Option<f64>>,
    pub notes: Option<Vec<String>>,
    pub demo_links: Option<Vec<String>>,
    pub doc_links: Option<Vec<String>>,
}

/// Story point as sent by the dashboard form: a number, a numeric string, `""` or `null`
#[derive(Deserialize)]
#[serde(untagged)]
enum StoryPointInput {
    Number(f64),
    Text(String),
}

/// Only called when the key is present, so `Some(None)` is an explicit clear
fn story_point_edit<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<StoryPointInput>::deserialize(deserializer)? {
        None => Ok(Some(None)),
        Some(StoryPointInput::Number(value)) => Ok(Some(Some(value))),
        Some(StoryPointInput::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(Some(None));
            }
            text.replace(',', ".")
                .parse::<f64>()
                .map(|value| Some(Some(value)))
                .map_err(|_| de::Error::custom(format!("invalid storyPoint: {}", text)))
        }
    }
}

impl InitiativePatch {
    pub fn apply(self, item: &mut InitiativeRecord, now: DateTime<Utc>) {
        fn set(target: &mut String, value: Option<String>) {
            if let Some(value) = value {
                *target = value;
            }
        }

        set(&mut item.epic, self.epic);
        set(&mut item.title, self.title);
        set(&mut item.detail, self.detail);
        set(&mut item.quarter, self.quarter);
        set(&mut item.target_date, self.target_date);
        set(&mut item.lead, self.lead);
        set(&mut item.customer, self.customer);
        set(&mut item.constraints, self.constraints);
        set(&mut item.completion_criteria, self.completion_criteria);
        set(&mut item.solution, self.solution);
        set(&mut item.expectation, self.expectation);
        set(&mut item.roi_metric, self.roi_metric);
        set(&mut item.roi_value, self.roi_value);

        if let Some(status) = self.status {
            item.status = InitiativeStatus::normalize(&status);
        }
        if let Some(progress) = self.progress {
            item.progress = clamp_percent(progress);
        }
        if let Some(story_point) = self.story_point {
            item.story_point = story_point;
        }
        if let Some(notes) = self.notes {
            item.notes = clean_list(notes);
        }
        if let Some(links) = self.demo_links {
            item.demo_links = unique_links(links);
        }
        if let Some(links) = self.doc_links {
            item.doc_links = unique_links(links);
        }

        item.updated_at = now;
    }
}

fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

impl BacklogStore {
    pub async fn list_initiatives(
        &self,
        query: &InitiativeQuery,
    ) -> BacklogResult<Vec<InitiativeRecord>> {
        let db = self.read().await?;
        Ok(query.apply(&db.initiatives))
    }

    pub async fn get_initiative(&self, id: u64) -> BacklogResult<InitiativeRecord> {
        let db = self.read().await?;
        db.initiatives
            .into_iter()
            .find(|item| item.id == id)
            .ok_or_else(|| BacklogError::not_found("Initiative", id))
    }

    /// Create an initiative with the next free id
    pub async fn create_initiative(&self, input: NewInitiative) -> BacklogResult<InitiativeRecord> {
        let created = self
            .mutate(move |db| {
                let record = input.into_record(db.next_initiative_id(), Utc::now());
                db.initiatives.push(record.clone());
                Ok(record)
            })
            .await?;

        info!(id = created.id, "Created initiative '{}'", created.title);
        Ok(created)
    }

    pub async fn patch_initiative(
        &self,
        id: u64,
        patch: InitiativePatch,
    ) -> BacklogResult<InitiativeRecord> {
        self.mutate(move |db| {
            let item = db
                .initiatives
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or_else(|| BacklogError::not_found("Initiative", id))?;
            patch.apply(item, Utc::now());
            Ok(item.clone())
        })
        .await
    }

    /// Delete an initiative, returning how many remain
    pub async fn delete_initiative(&self, id: u64) -> BacklogResult<usize> {
        let remaining = self
            .mutate(move |db| {
                let before = db.initiatives.len();
                db.initiatives.retain(|item| item.id != id);
                if db.initiatives.len() == before {
                    return Err(BacklogError::not_found("Initiative", id));
                }
                Ok(db.initiatives.len())
            })
            .await?;

        info!(id, remaining, "Deleted initiative");
        Ok(remaining)
    }
}
