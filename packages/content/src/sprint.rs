// ABOUTME: Sprint bulletin model and the directory-backed source that loads it
// ABOUTME: Derives range label, completion rate, and work counts from front matter

use std::path::{Path, PathBuf};

use bulletin_core::{clamp_percent, sprints_dir};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::markdown::{render_markdown, split_front_matter};
use crate::{ContentError, ContentResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintHealth {
    Green,
    #[default]
    Yellow,
    Red,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FrontMatter {
    title: String,
    goal: String,
    summary: String,
    health: SprintHealth,
    health_note: String,
    start_date: String,
    end_date: String,
    progress: Option<f64>,
    completed: Vec<String>,
    in_progress: Vec<String>,
    risks: Vec<String>,
    learnings: Vec<String>,
    review_date: Option<String>,
    next_sprint_goals: Option<Vec<String>>,
}

/// One sprint bulletin with its derived figures
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub slug: String,
    pub title: String,
    pub goal: String,
    pub summary: String,
    pub health: SprintHealth,
    pub health_note: String,
    pub start_date: String,
    pub end_date: String,
    /// `Mon D - Mon D`
    pub range_label: String,
    pub progress: u8,
    pub completion_rate: u8,
    pub risk_count: usize,
    pub open_work_count: usize,
    pub completed: Vec<String>,
    pub in_progress: Vec<String>,
    pub risks: Vec<String>,
    pub learnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_sprint_goals: Option<Vec<String>>,
    pub body_html: String,
}

impl Sprint {
    fn end(&self) -> Option<NaiveDate> {
        parse_day(&self.end_date)
    }
}

/// Parse one bulletin file's contents
pub fn parse_sprint(slug: &str, source: &str) -> ContentResult<Sprint> {
    let (front, body) =
        split_front_matter(source).ok_or_else(|| ContentError::MissingFrontMatter(slug.to_string()))?;

    let data: FrontMatter =
        serde_yaml::from_str(front).map_err(|source| ContentError::FrontMatter {
            file: slug.to_string(),
            source,
        })?;

    let known_work = data.completed.len() + data.in_progress.len();
    let completion_rate = if known_work > 0 {
        data.completed.len() as f64 / known_work as f64 * 100.0
    } else {
        data.progress.unwrap_or(0.0)
    };
    let progress = match data.progress {
        Some(progress) if progress.is_finite() => clamp_percent(progress),
        _ => clamp_percent(completion_rate),
    };

    Ok(Sprint {
        slug: slug.to_string(),
        range_label: range_label(&data.start_date, &data.end_date),
        progress,
        completion_rate: clamp_percent(completion_rate),
        risk_count: data.risks.len(),
        open_work_count: data.in_progress.len(),
        body_html: render_markdown(body),
        title: data.title,
        goal: data.goal,
        summary: data.summary,
        health: data.health,
        health_note: data.health_note,
        start_date: data.start_date,
        end_date: data.end_date,
        completed: data.completed,
        in_progress: data.in_progress,
        risks: data.risks,
        learnings: data.learnings,
        review_date: data.review_date,
        next_sprint_goals: data.next_sprint_goals,
    })
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| value.get(..10).and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()))
}

fn range_label(start: &str, end: &str) -> String {
    let label = |value: &str| {
        parse_day(value)
            .map(|day| day.format("%b %-d").to_string())
            .unwrap_or_else(|| value.trim().to_string())
    };
    format!("{} - {}", label(start), label(end))
}

/// Sprint bulletins stored as `<slug>.md` files in one directory
#[derive(Debug, Clone)]
pub struct SprintSource {
    dir: PathBuf,
}

impl SprintSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Bulletins under `<content>/sprints`
    pub fn from_content_dir(content_dir: &Path) -> Self {
        Self::new(sprints_dir(content_dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All readable bulletins, latest end date first. Malformed files are skipped.
    pub async fn list(&self) -> ContentResult<Vec<Sprint>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No sprint directory at {:?}", self.dir);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut sprints = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let source = fs::read_to_string(&path).await?;
            match parse_sprint(slug, &source) {
                Ok(sprint) => sprints.push(sprint),
                Err(e) => warn!("Skipping sprint bulletin {:?}: {}", path, e),
            }
        }

        sprints.sort_by(|a, b| b.end().cmp(&a.end()).then_with(|| a.slug.cmp(&b.slug)));
        debug!("Loaded {} sprint bulletins", sprints.len());
        Ok(sprints)
    }

    /// Load one bulletin by slug
    pub async fn get(&self, slug: &str) -> ContentResult<Sprint> {
        if slug.is_empty() || !slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(ContentError::NotFound(slug.to_string()));
        }

        let path = self.dir.join(format!("{}.md", slug));
        let source = match fs::read_to_string(&path).await {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ContentError::NotFound(slug.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        parse_sprint(slug, &source)
    }
}
