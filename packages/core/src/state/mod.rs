// Состояние канала

pub mod conversations;
pub mod session;
pub mod stories;

pub use conversations::Conversation;
pub use session::{Session, SessionEpoch, SessionState};
pub use stories::{EphemeralMedia, StoryRail};
