use std::sync::Arc;

use tracing::debug;

use crate::{
    dao::{
        codingame::{ClashFetcher, FetchResult},
        models::{GuildGameEntity, GuildId},
        storage::StorageResult,
        tracker_store::TrackerStore,
    },
    state::clash::{Game, LifecycleState},
};

/// Whether a new clash may follow `tracked`: nothing tracked upstream, or it finished.
pub fn allows_new(tracked: Option<&Game>) -> bool {
    tracked.is_none_or(|game| game.state() == LifecycleState::Finished)
}

/// Per-guild pointer to the most recently announced clash.
///
/// Mutations are written through to the store before returning.
pub struct GuildGameTracker {
    entity: GuildGameEntity,
    store: Arc<dyn TrackerStore>,
}

impl GuildGameTracker {
    /// Load the tracker of a guild; a guild without a row gets an empty, unsaved tracker.
    pub async fn load(store: Arc<dyn TrackerStore>, guild_id: GuildId) -> StorageResult<Self> {
        let entity = store
            .find_guild_game(guild_id)
            .await?
            .unwrap_or_else(|| GuildGameEntity::new(guild_id));
        Ok(Self { entity, store })
    }

    /// Guild owning the tracker.
    pub fn guild_id(&self) -> GuildId {
        self.entity.guild_id
    }

    /// Handle of the last announced clash.
    pub fn last_game_id(&self) -> Option<&str> {
        self.entity.last_game_id.as_deref()
    }

    /// Message that announced the last clash.
    pub fn announcement_marker(&self) -> Option<u64> {
        self.entity.announcement_message_id
    }

    /// Fetch the tracked clash; no tracked clash reads as not found.
    pub async fn fetch(&self, fetcher: &dyn ClashFetcher) -> FetchResult<Option<Game>> {
        match self.last_game_id() {
            Some(handle) => fetcher.fetch(handle).await,
            None => Ok(None),
        }
    }

    /// Whether a new clash may be announced: nothing tracked, tracked clash gone, or finished.
    ///
    /// Every call hits the fetcher; fetch failures are returned, not swallowed.
    pub async fn can_start_new(&self, fetcher: &dyn ClashFetcher) -> FetchResult<bool> {
        if self.last_game_id().is_none() {
            return Ok(true);
        }

        let allowed = allows_new(self.fetch(fetcher).await?.as_ref());
        debug!(
            guild_id = self.guild_id(),
            handle = self.last_game_id(),
            allowed,
            "checked whether a new clash can start"
        );
        Ok(allowed)
    }

    /// Drop the tracked clash and its announcement.
    pub async fn forget(&mut self) -> StorageResult<()> {
        self.entity.last_game_id = None;
        self.entity.announcement_message_id = None;
        self.store.save_guild_game(self.entity.clone()).await
    }

    /// Track a newly announced clash. Does not check [`GuildGameTracker::can_start_new`].
    pub async fn start_new(
        &mut self,
        handle: impl Into<String>,
        announcement_message_id: u64,
    ) -> StorageResult<()> {
        self.entity.last_game_id = Some(handle.into());
        self.entity.announcement_message_id = Some(announcement_message_id);
        self.store.save_guild_game(self.entity.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::tracker_store::memory::MemoryTrackerStore,
        services::test_support::{StubFetcher, game},
    };

    async fn tracker(store: &MemoryTrackerStore) -> GuildGameTracker {
        GuildGameTracker::load(Arc::new(store.clone()), 1).await.unwrap()
    }

    #[test]
    fn new_clash_follows_only_a_finished_or_vanished_one() {
        assert!(allows_new(None));
        assert!(!allows_new(Some(&game("h", false, false, &[("a", None)]))));
        assert!(!allows_new(Some(&game("h", true, false, &[("a", None)]))));
        assert!(allows_new(Some(&game("h", true, true, &[("a", Some(1))]))));
    }

    #[tokio::test]
    async fn untracked_guild_can_start_without_fetching() {
        let store = MemoryTrackerStore::new();
        let fetcher = StubFetcher::default();

        let tracker = tracker(&store).await;
        assert!(tracker.can_start_new(&fetcher).await.unwrap());
        assert_eq!(fetcher.calls(), 0);
        assert!(tracker.fetch(&fetcher).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn finished_game_allows_new_one() {
        let store = MemoryTrackerStore::new();
        let fetcher = StubFetcher::default().with_game(game("done", true, true, &[("a", Some(1))]));

        let mut tracker = tracker(&store).await;
        tracker.start_new("done", 10).await.unwrap();
        assert!(tracker.can_start_new(&fetcher).await.unwrap());
    }

    #[tokio::test]
    async fn running_or_pending_game_blocks_new_one() {
        let store = MemoryTrackerStore::new();
        let fetcher = StubFetcher::default()
            .with_game(game("running", true, false, &[("a", None)]))
            .with_game(game("lobby", false, false, &[("a", None)]));

        let mut tracker = tracker(&store).await;
        tracker.start_new("running", 10).await.unwrap();
        assert!(!tracker.can_start_new(&fetcher).await.unwrap());

        tracker.start_new("lobby", 11).await.unwrap();
        assert!(!tracker.can_start_new(&fetcher).await.unwrap());
    }

    #[tokio::test]
    async fn stale_reference_allows_new_one() {
        let store = MemoryTrackerStore::new();
        let fetcher = StubFetcher::default();

        let mut tracker = tracker(&store).await;
        tracker.start_new("vanished", 10).await.unwrap();
        assert!(tracker.can_start_new(&fetcher).await.unwrap());
    }

    #[tokio::test]
    async fn guard_fetches_on_every_call_and_propagates_failures() {
        let store = MemoryTrackerStore::new();
        let fetcher = StubFetcher::default().with_broken("broken");

        let mut tracker = tracker(&store).await;
        tracker.start_new("broken", 10).await.unwrap();
        assert!(tracker.can_start_new(&fetcher).await.is_err());
        assert!(tracker.can_start_new(&fetcher).await.is_err());
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn mutations_are_persisted_immediately() {
        let store = MemoryTrackerStore::new();

        let mut tracker = tracker(&store).await;
        tracker.start_new("abc", 99).await.unwrap();
        assert_eq!(store.commits(), 1);

        let reloaded = GuildGameTracker::load(Arc::new(store.clone()), 1)
            .await
            .unwrap();
        assert_eq!(reloaded.last_game_id(), Some("abc"));
        assert_eq!(reloaded.announcement_marker(), Some(99));

        tracker.forget().await.unwrap();
        assert_eq!(store.commits(), 2);
        let stored = store.find_guild_game(1).await.unwrap().unwrap();
        assert_eq!(stored, GuildGameEntity::new(1));
    }
}
