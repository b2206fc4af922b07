// ABOUTME: Idea board operations against the backlog store
// ABOUTME: Ranked listing, create, patch, delete, and delta votes that never drop below zero

use bulletin_core::IdeaRecord;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{BacklogError, BacklogResult};
use crate::store::BacklogStore;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewIdea {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub pinned: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdeaPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub pinned: Option<bool>,
    pub votes: Option<i64>,
}

impl IdeaPatch {
    pub fn apply(self, idea: &mut IdeaRecord) {
        if let Some(title) = self.title {
            idea.title = title;
        }
        if let Some(description) = self.description {
            idea.description = description;
        }
        if let Some(category) = self.category {
            idea.category = category;
        }
        if let Some(pinned) = self.pinned {
            idea.pinned = pinned;
        }
        if let Some(votes) = self.votes {
            idea.votes = clamp_votes(votes);
        }
    }
}

fn clamp_votes(votes: i64) -> u32 {
    votes.clamp(0, u32::MAX as i64) as u32
}

/// Apply a signed vote delta, flooring at zero
pub fn apply_vote(idea: &mut IdeaRecord, delta: i64) {
    idea.votes = clamp_votes(i64::from(idea.votes).saturating_add(delta));
}

/// Pinned ideas first, then by votes, highest first
pub fn rank_ideas(ideas: &mut [IdeaRecord]) {
    ideas.sort_by(|a, b| b.pinned.cmp(&a.pinned).then(b.votes.cmp(&a.votes)));
}

impl BacklogStore {
    pub async fn list_ideas(&self) -> BacklogResult<Vec<IdeaRecord>> {
        let mut ideas = self.read().await?.ideas;
        rank_ideas(&mut ideas);
        Ok(ideas)
    }

    pub async fn create_idea(&self, input: NewIdea) -> BacklogResult<IdeaRecord> {
        let created = self
            .mutate(move |db| {
                let idea = IdeaRecord {
                    id: db.next_idea_id(),
                    title: input.title.unwrap_or_else(|| "Untitled idea".to_string()),
                    description: input.description.unwrap_or_default(),
                    category: input.category.unwrap_or_else(|| "General".to_string()),
                    votes: 0,
                    pinned: input.pinned.unwrap_or(false),
                    created_at: Utc::now(),
                };
                db.ideas.push(idea.clone());
                Ok(idea)
            })
            .await?;

        info!(id = created.id, "Created idea '{}'", created.title);
        Ok(created)
    }

    pub async fn patch_idea(&self, id: u64, patch: IdeaPatch) -> BacklogResult<IdeaRecord> {
        self.mutate(move |db| {
            let idea = db
                .ideas
                .iter_mut()
                .find(|idea| idea.id == id)
                .ok_or_else(|| BacklogError::not_found("Idea", id))?;
            patch.apply(idea);
            Ok(idea.clone())
        })
        .await
    }

    /// Delete an idea, returning how many remain
    pub async fn delete_idea(&self, id: u64) -> BacklogResult<usize> {
        self.mutate(move |db| {
            let before = db.ideas.len();
            db.ideas.retain(|idea| idea.id != id);
            if db.ideas.len() == before {
                return Err(BacklogError::not_found("Idea", id));
            }
            Ok(db.ideas.len())
        })
        .await
    }

    /// Add `delta` votes (negative to retract); the count never goes below zero
    pub async fn vote_idea(&self, id: u64, delta: i64) -> BacklogResult<IdeaRecord> {
        let idea = self
            .mutate(move |db| {
                let idea = db
                    .ideas
                    .iter_mut()
                    .find(|idea| idea.id == id)
                    .ok_or_else(|| BacklogError::not_found("Idea", id))?;
                apply_vote(idea, delta);
                Ok(idea.clone())
            })
            .await?;

        debug!(id, delta, votes = idea.votes, "Recorded idea vote");
        Ok(idea)
    }
}
