// ABOUTME: Offline keyword answerer for backlog questions
// ABOUTME: Handles quarter lookups, at-risk listings and free keyword search

use bulletin_core::{InitiativeRecord, InitiativeStatus};
use lazy_static::lazy_static;
use regex::Regex;

/// Most items listed in one answer
const LIST_LIMIT: usize = 8;

const USAGE_HINT: &str = "I can answer backlog questions like:\n- Find initiatives planned for Q2, 2026\n- Show at-risk initiatives\n- List initiatives with a specific keyword or owner.";

lazy_static! {
    static ref QUARTER_PATTERN: Regex =
        Regex::new(r"(?i)q([1-4])\s*,?\s*(20\d{2})").expect("quarter pattern is valid");
}

/// Answer a question using only the initiatives themselves
pub fn local_answer(question: &str, initiatives: &[InitiativeRecord]) -> String {
    let q = question.to_lowercase();

    if let Some(captures) = QUARTER_PATTERN.captures(&q) {
        let quarter = format!("Q{}, {}", &captures[1], &captures[2]);
        let matches: Vec<&InitiativeRecord> = initiatives
            .iter()
            .filter(|item| item.quarter.to_uppercase() == quarter)
            .collect();

        if matches.is_empty() {
            return format!("No initiatives found for {}.", quarter);
        }
        return format!(
            "Found {} initiatives for {}:\n- {}",
            matches.len(),
            quarter,
            bullet_list(&matches, |item| format!(
                "{} ({}, lead: {})",
                item.title,
                item.status.as_str(),
                item.lead
            ))
        );
    }

    if q.contains("risk") || q.contains("blok") || q.contains("block") {
        let risky: Vec<&InitiativeRecord> = initiatives
            .iter()
            .filter(|item| item.status == InitiativeStatus::AtRisk)
            .collect();

        if risky.is_empty() {
            return "No at-risk initiatives currently.".to_string();
        }
        return format!(
            "At-risk initiatives ({}):\n- {}",
            risky.len(),
            bullet_list(&risky, |item| format!("{} ({})", item.title, item.quarter))
        );
    }

    if let Some(keyword) = q.split_whitespace().find(|token| token.chars().count() > 3) {
        let hits: Vec<&InitiativeRecord> = initiatives
            .iter()
            .filter(|item| {
                [item.title.as_str(), &item.notes.join(" "), item.lead.as_str()]
                    .join(" ")
                    .to_lowercase()
                    .contains(keyword)
            })
            .collect();

        if !hits.is_empty() {
            return format!(
                "I found {} matching initiatives:\n- {}",
                hits.len(),
                bullet_list(&hits, |item| format!(
                    "{} ({}, {})",
                    item.title,
                    item.quarter,
                    item.status.as_str()
                ))
            );
        }
    }

    USAGE_HINT.to_string()
}

fn bullet_list<F>(items: &[&InitiativeRecord], line: F) -> String
where
    F: Fn(&InitiativeRecord) -> String,
{
    items
        .iter()
        .take(LIST_LIMIT)
        .map(|item| line(item))
        .collect::<Vec<_>>()
        .join("\n- ")
}
