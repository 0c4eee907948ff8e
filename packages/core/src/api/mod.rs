// Публичный API
// Presentation boundary: one conversation pipeline plus the story rail.

pub mod messaging;
pub mod replies;

use crate::protocol::messages::{Message, Payload};
use crate::protocol::transport::Transport;
use crate::state::session::{SessionEpoch, SessionState};
use crate::state::stories::{EphemeralMedia, StoryRail};
use crate::utils::error::Result;
use messaging::MessagePipeline;
use replies::ReplyGenerator;
use tokio::sync::Mutex;

/// Главный API для мессенджера
pub struct MessengerAPI<T: Transport, R: ReplyGenerator> {
    pipeline: MessagePipeline<T, R>,
    stories: Mutex<StoryRail>,
}

impl<T: Transport, R: ReplyGenerator> MessengerAPI<T, R> {
    pub fn new(local_id: &str, peer_id: &str, transport: T, replies: R) -> Self {
        Self::from_pipeline(MessagePipeline::new(local_id, peer_id, transport, replies))
    }

    /// Wrap a pipeline; stories live as long as its config says.
    pub fn from_pipeline(pipeline: MessagePipeline<T, R>) -> Self {
        let stories = StoryRail::with_ttl(pipeline.config().story_ttl_secs);
        Self {
            pipeline,
            stories: Mutex::new(stories),
        }
    }

    /// Establish the channel and show the peer greeting, if configured.
    pub async fn start(&self) -> Result<Option<Message>> {
        self.pipeline.establish().await?;
        let fingerprint = self.pipeline.key_fingerprint().await.unwrap_or_default();
        tracing::info!(
            target: "pipeline",
            peer = %self.pipeline.peer_id(),
            fingerprint = %fingerprint,
            "Secure channel active"
        );
        self.pipeline.inject_greeting().await
    }

    /// Send and wait for the peer's answer.
    pub async fn send(&self, payload: Payload) -> Result<(Message, Option<Message>)> {
        self.pipeline.send_and_reply(payload).await
    }

    pub async fn reset(&self) -> SessionEpoch {
        self.pipeline.teardown().await
    }

    pub async fn status(&self) -> SessionState {
        self.pipeline.state().await
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.pipeline.messages().await
    }

    /// Latest message and number of unreadable ones, for the chat header.
    pub async fn summary(&self) -> (Option<Message>, usize) {
        (
            self.pipeline.last_message().await,
            self.pipeline.undecryptable_count().await,
        )
    }

    pub async fn clear_history(&self) {
        self.pipeline.clear_conversation().await
    }

    pub fn pipeline(&self) -> &MessagePipeline<T, R> {
        &self.pipeline
    }

    // ========================================================================
    // Stories
    // ========================================================================

    pub async fn publish_story(&self, media_ref: &str) -> EphemeralMedia {
        let now = chrono::Utc::now().timestamp();
        self.stories
            .lock()
            .await
            .publish(self.pipeline.local_id(), media_ref, now)
            .clone()
    }

    pub async fn view_story(&self, story_id: &str) -> Result<EphemeralMedia> {
        let now = chrono::Utc::now().timestamp();
        let mut stories = self.stories.lock().await;
        let story = stories.view(self.pipeline.local_id(), story_id, now)?;
        Ok(story.clone())
    }

    pub async fn next_story(&self, story_id: &str) -> Option<EphemeralMedia> {
        let now = chrono::Utc::now().timestamp();
        self.stories.lock().await.next_after(story_id, now).cloned()
    }

    pub async fn visible_stories(&self) -> Vec<EphemeralMedia> {
        let now = chrono::Utc::now().timestamp();
        let mut stories = self.stories.lock().await;
        stories.purge_expired(now);
        stories.visible(now).into_iter().cloned().collect()
    }
}
