//! Server collaborator interface.
//!
//! Every call carries the bearer token explicitly. A 401/403 from any call
//! surfaces as [`DatebookError::AuthExpired`](datebook_core::DatebookError)
//! and the store tears the session down.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use datebook_core::DatebookResult;
use datebook_domain::{Event, EventId, EventPatch, FriendMeta, PostponedEntry};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventTransport: Send + Sync {
    /// All dated events of the signed-in user.
    async fn list_events(&self, token: &str) -> DatebookResult<Vec<Event>>;

    /// A friend's dated events, read-only.
    async fn list_friend_events(
        &self,
        token: &str,
        friend_id: &str,
    ) -> DatebookResult<(Vec<Event>, FriendMeta)>;

    /// Bulk insert. Client-generated ids are kept. Returns the inserted count.
    async fn create_events(&self, token: &str, events: &[Event]) -> DatebookResult<usize>;

    /// Full-field replace of one dated event.
    async fn update_event(&self, token: &str, id: &EventId, patch: &EventPatch)
        -> DatebookResult<()>;

    async fn delete_event(&self, token: &str, id: &EventId) -> DatebookResult<()>;

    async fn list_postponed(&self, token: &str) -> DatebookResult<Vec<PostponedEntry>>;

    async fn create_postponed(&self, token: &str, entries: &[PostponedEntry])
        -> DatebookResult<usize>;

    async fn delete_postponed(&self, token: &str, id: &EventId) -> DatebookResult<()>;
}
