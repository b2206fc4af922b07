// ABOUTME: Roadmap board grouping of initiatives by epic
// ABOUTME: Rolls up per-epic status and progress and collects the quarters in play

use std::collections::{BTreeMap, BTreeSet};

use bulletin_core::{clamp_percent, InitiativeRecord, InitiativeStatus};
use serde::Serialize;

use crate::error::BacklogResult;
use crate::store::BacklogStore;

const BOARD_TITLE: &str = "Product Strategy";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardGroup {
    pub epic: String,
    pub status: InitiativeStatus,
    pub progress: u8,
    pub item_count: usize,
    pub items: Vec<InitiativeRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapBoard {
    pub title: String,
    pub source_sheet: String,
    pub quarters: Vec<String>,
    pub groups: Vec<BoardGroup>,
    pub total_items: usize,
}

/// Group initiatives by epic (epics and quarters sorted, items by id)
pub fn build_board(initiatives: &[InitiativeRecord], source_sheet: &str) -> RoadmapBoard {
    let mut grouped: BTreeMap<&str, Vec<InitiativeRecord>> = BTreeMap::new();
    for item in initiatives {
        grouped.entry(item.epic.as_str()).or_default().push(item.clone());
    }

    let groups = grouped
        .into_iter()
        .map(|(epic, mut items)| {
            items.sort_by_key(|item| item.id);
            let total: f64 = items.iter().map(|item| item.progress as f64).sum();
            BoardGroup {
                epic: epic.to_string(),
                status: rollup_status(&items),
                progress: clamp_percent(total / items.len().max(1) as f64),
                item_count: items.len(),
                items,
            }
        })
        .collect();

    let quarters: BTreeSet<&str> = initiatives.iter().map(|item| item.quarter.as_str()).collect();

    RoadmapBoard {
        title: BOARD_TITLE.to_string(),
        source_sheet: source_sheet.to_string(),
        quarters: quarters.into_iter().map(str::to_string).collect(),
        groups,
        total_items: initiatives.len(),
    }
}

fn rollup_status(items: &[InitiativeRecord]) -> InitiativeStatus {
    let all = |status: InitiativeStatus| items.iter().all(|item| item.status == status);

    if items.iter().any(|item| item.status == InitiativeStatus::AtRisk) {
        InitiativeStatus::AtRisk
    } else if all(InitiativeStatus::Completed) {
        InitiativeStatus::Completed
    } else if all(InitiativeStatus::NotStarted) {
        InitiativeStatus::NotStarted
    } else {
        InitiativeStatus::OnTrack
    }
}

impl BacklogStore {
    pub async fn roadmap_board(&self) -> BacklogResult<RoadmapBoard> {
        let db = self.read().await?;
        let source_sheet = self
            .source()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(build_board(&db.initiatives, &source_sheet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn item(id: u64, epic: &str, quarter: &str, status: InitiativeStatus, progress: u8) -> InitiativeRecord {
        InitiativeRecord {
            id,
            epic: epic.to_string(),
            quarter: quarter.to_string(),
            status,
            progress,
            ..Default::default()
        }
    }

    #[test]
    fn test_board_groups_by_epic() {
        let items = vec![
            item(3, "Platform", "Q3, 2026", InitiativeStatus::OnTrack, 40),
            item(1, "Growth", "Q2, 2026", InitiativeStatus::Completed, 100),
            item(2, "Platform", "Q2, 2026", InitiativeStatus::AtRisk, 25),
            item(4, "Growth", "Q2, 2026", InitiativeStatus::Completed, 95),
        ];

        let board = build_board(&items, "roadmap.xlsx");

        assert_eq!(board.total_items, 4);
        assert_eq!(board.quarters, vec!["Q2, 2026".to_string(), "Q3, 2026".to_string()]);
        assert_eq!(board.groups.len(), 2);

        let growth = &board.groups[0];
        assert_eq!(growth.epic, "Growth");
        assert_eq!(growth.status, InitiativeStatus::Completed);
        assert_eq!(growth.progress, 98);

        let platform = &board.groups[1];
        assert_eq!(platform.status, InitiativeStatus::AtRisk);
        assert_eq!(platform.item_count, 2);
        assert_eq!(platform.items[0].id, 2);
        // (25 + 40) / 2 = 32.5 rounds up
        assert_eq!(platform.progress, 33);
    }

    #[test]
    fn test_rollup_status() {
        let not_started = vec![
            item(1, "A", "Backlog", InitiativeStatus::NotStarted, 8),
            item(2, "A", "Backlog", InitiativeStatus::NotStarted, 8),
        ];
        assert_eq!(rollup_status(&not_started), InitiativeStatus::NotStarted);

        let mixed = vec![
            item(1, "A", "Backlog", InitiativeStatus::NotStarted, 8),
            item(2, "A", "Backlog", InitiativeStatus::Completed, 95),
        ];
        assert_eq!(rollup_status(&mixed), InitiativeStatus::OnTrack);
    }
}
