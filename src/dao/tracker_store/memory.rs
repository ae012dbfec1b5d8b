use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use dashmap::DashMap;
use futures::future::BoxFuture;

use crate::dao::{
    models::{GuildGameEntity, GuildId, RankingEntity, UserId},
    storage::StorageResult,
    tracker_store::{TrackerStore, sort_rankings},
};

/// Process-local store, used when no database is configured and by tests.
#[derive(Clone, Default)]
pub struct MemoryTrackerStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    guild_games: DashMap<GuildId, GuildGameEntity>,
    rankings: DashMap<(GuildId, UserId), RankingEntity>,
    commits: AtomicUsize,
}

impl MemoryTrackerStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes applied since creation.
    pub fn commits(&self) -> usize {
        self.inner.commits.load(Ordering::SeqCst)
    }

    fn commit(&self) {
        self.inner.commits.fetch_add(1, Ordering::SeqCst);
    }
}

impl TrackerStore for MemoryTrackerStore {
    fn find_guild_game(
        &self,
        guild_id: GuildId,
    ) -> BoxFuture<'static, StorageResult<Option<GuildGameEntity>>> {
        let found = self
            .inner
            .guild_games
            .get(&guild_id)
            .map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn save_guild_game(&self, entity: GuildGameEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.inner.guild_games.insert(entity.guild_id, entity);
        self.commit();
        Box::pin(async { Ok(()) })
    }

    fn find_ranking(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> BoxFuture<'static, StorageResult<Option<RankingEntity>>> {
        let found = self
            .inner
            .rankings
            .get(&(guild_id, user_id))
            .map(|entry| entry.value().clone());
        Box::pin(async move { Ok(found) })
    }

    fn increment_wins(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> BoxFuture<'static, StorageResult<u32>> {
        // The entry guard holds the shard lock, so concurrent increments serialise.
        let wins = {
            let mut entry = self
                .inner
                .rankings
                .entry((guild_id, user_id))
                .or_insert_with(|| RankingEntity::new(guild_id, user_id));
            entry.wins += 1;
            entry.wins
        };
        self.commit();
        Box::pin(async move { Ok(wins) })
    }

    fn list_rankings(
        &self,
        guild_id: GuildId,
    ) -> BoxFuture<'static, StorageResult<Vec<RankingEntity>>> {
        let mut rankings = self
            .inner
            .rankings
            .iter()
            .filter(|entry| entry.guild_id == guild_id)
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        sort_rankings(&mut rankings);
        Box::pin(async move { Ok(rankings) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
