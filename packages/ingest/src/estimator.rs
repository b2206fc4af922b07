// ABOUTME: Progress and status estimation for imported initiatives
// ABOUTME: Swappable strategy with a default scoring heuristic based on planning detail

use bulletin_core::{clamp_percent, InitiativeStatus};
use chrono::NaiveDate;

/// Planning text and sizing that the estimator scores
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanningSignals<'a> {
    pub detail: &'a str,
    pub constraints: &'a str,
    pub completion_criteria: &'a str,
    pub solution: &'a str,
    pub expectation: &'a str,
    pub story_point: Option<f64>,
}

impl PlanningSignals<'_> {
    fn narrative_fields(&self) -> [&str; 5] {
        [
            self.detail,
            self.constraints,
            self.completion_criteria,
            self.solution,
            self.expectation,
        ]
    }
}

/// Derives progress and status when the source does not track them.
///
/// Ingestion only talks to this trait, so a real tracking integration can
/// replace the heuristic without touching the import pipeline.
pub trait ProgressEstimator: Send + Sync {
    /// Progress percentage in 0..=100
    fn progress(&self, signals: &PlanningSignals<'_>) -> u8;

    /// Status derived from progress, schedule pressure, and constraint load
    fn status(
        &self,
        progress: u8,
        target_date: Option<NaiveDate>,
        constraints: &str,
        today: NaiveDate,
    ) -> InitiativeStatus;
}

/// Scores progress by how much planning detail has been filled in
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailRichnessEstimator;

impl DetailRichnessEstimator {
    pub const RICHNESS_WEIGHT: f64 = 75.0;
    pub const POINT_CAP: f64 = 25.0;
    pub const PROGRESS_FLOOR: f64 = 8.0;
    pub const COMPLETED_AT: u8 = 90;
    pub const NEAR_DEADLINE_DAYS: i64 = 21;
    pub const HEAVY_CONSTRAINTS_CHARS: usize = 80;
}

impl ProgressEstimator for DetailRichnessEstimator {
    fn progress(&self, signals: &PlanningSignals<'_>) -> u8 {
        let fields = signals.narrative_fields();
        let filled = fields
            .iter()
            .filter(|field| !field.trim().is_empty())
            .count();
        let richness = (filled as f64 / fields.len() as f64) * Self::RICHNESS_WEIGHT;

        let points = match signals.story_point {
            Some(sp) if sp != 0.0 => (sp * 2.0).min(Self::POINT_CAP),
            _ => 0.0,
        };

        clamp_percent((richness + points).max(Self::PROGRESS_FLOOR))
    }

    fn status(
        &self,
        progress: u8,
        target_date: Option<NaiveDate>,
        constraints: &str,
        today: NaiveDate,
    ) -> InitiativeStatus {
        if progress >= Self::COMPLETED_AT {
            return InitiativeStatus::Completed;
        }

        let Some(target) = target_date else {
            return if progress < 35 {
                InitiativeStatus::NotStarted
            } else {
                InitiativeStatus::OnTrack
            };
        };

        let heavy_constraints =
            constraints.chars().count() > Self::HEAVY_CONSTRAINTS_CHARS && progress < 60;
        let days = (target - today).num_days();
        let overdue = days < 0 && progress < 85;
        let near_deadline = days < Self::NEAR_DEADLINE_DAYS && progress < 55;

        if overdue || near_deadline || heavy_constraints {
            InitiativeStatus::AtRisk
        } else if progress <= 25 {
            InitiativeStatus::NotStarted
        } else {
            InitiativeStatus::OnTrack
        }
    }
}
