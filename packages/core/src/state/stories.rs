//! Ephemeral media ("stories")
//!
//! A story is visible until its expiry instant. Viewing is the only
//! mutation and marks it viewed; expired stories are never shown again.
//!
//! ```text
//!   publish ──► [visible, unviewed] ──view──► [visible, viewed]
//!                       │                           │
//!                       └────── now >= expires_at ──┴──► expired (purged)
//! ```

use crate::config::Config;
use crate::utils::error::{ChannelError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EphemeralMedia {
    pub id: String,
    pub owner_id: String,
    /// Opaque handle to the media content.
    pub media_ref: String,
    /// Unix seconds
    pub created_at: i64,
    /// Unix seconds
    pub expires_at: i64,
    pub viewed: bool,
}

impl EphemeralMedia {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    pub fn remaining_secs(&self, now: i64) -> i64 {
        (self.expires_at - now).max(0)
    }
}

/// Ordered set of published stories.
#[derive(Debug, Clone)]
pub struct StoryRail {
    stories: Vec<EphemeralMedia>,
    ttl_secs: i64,
}

impl StoryRail {
    pub fn new() -> Self {
        Self::with_ttl(Config::global().story_ttl_secs)
    }

    pub fn with_ttl(ttl_secs: i64) -> Self {
        Self {
            stories: Vec::new(),
            ttl_secs,
        }
    }

    pub fn publish(&mut self, owner_id: &str, media_ref: &str, now: i64) -> &EphemeralMedia {
        let story = EphemeralMedia {
            id: crate::utils::uuid::generate_v4(),
            owner_id: owner_id.to_string(),
            media_ref: media_ref.to_string(),
            created_at: now,
            expires_at: now + self.ttl_secs,
            viewed: false,
        };

        tracing::debug!(
            target: "stories",
            story_id = %story.id,
            owner = %story.owner_id,
            expires_at = story.expires_at,
            "Story published"
        );

        self.stories.push(story);
        &self.stories[self.stories.len() - 1]
    }

    /// Open a story and mark it viewed.
    pub fn view(&mut self, viewer_id: &str, story_id: &str, now: i64) -> Result<&EphemeralMedia> {
        let story = self
            .stories
            .iter_mut()
            .find(|s| s.id == story_id)
            .ok_or_else(|| ChannelError::StoryNotFound(story_id.to_string()))?;

        if story.is_expired(now) {
            tracing::debug!(target: "stories", story_id = %story_id, "Rejected view of expired story");
            return Err(ChannelError::StoryExpired(story_id.to_string()));
        }

        if !story.viewed {
            story.viewed = true;
            tracing::debug!(target: "stories", story_id = %story_id, viewer = %viewer_id, "Story viewed");
        }

        Ok(story)
    }

    /// Next still-accessible story after `story_id`. `None` closes the viewer.
    pub fn next_after(&self, story_id: &str, now: i64) -> Option<&EphemeralMedia> {
        let position = self.stories.iter().position(|s| s.id == story_id)?;
        self.stories[position + 1..]
            .iter()
            .find(|s| !s.is_expired(now))
    }

    pub fn visible(&self, now: i64) -> Vec<&EphemeralMedia> {
        self.stories.iter().filter(|s| !s.is_expired(now)).collect()
    }

    pub fn unviewed_count(&self, now: i64) -> usize {
        self.stories
            .iter()
            .filter(|s| !s.viewed && !s.is_expired(now))
            .count()
    }

    /// Drop expired stories; returns how many were removed.
    pub fn purge_expired(&mut self, now: i64) -> usize {
        let before = self.stories.len();
        self.stories.retain(|s| !s.is_expired(now));
        let removed = before - self.stories.len();

        if removed > 0 {
            tracing::info!(target: "stories", removed, "Purged expired stories");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }
}

impl Default for StoryRail {
    fn default() -> Self {
        Self::new()
    }
}
