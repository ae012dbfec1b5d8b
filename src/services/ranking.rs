use std::sync::Arc;

use tracing::debug;

use crate::dao::{
    models::{GuildId, RankingEntity, UserId},
    storage::StorageResult,
    tracker_store::TrackerStore,
};

/// Win counter of one user inside one guild.
pub struct RankingEntry {
    entity: RankingEntity,
    store: Arc<dyn TrackerStore>,
}

impl RankingEntry {
    /// Load an entry; users without wins get a zeroed, unsaved entry.
    pub async fn load(
        store: Arc<dyn TrackerStore>,
        guild_id: GuildId,
        user_id: UserId,
    ) -> StorageResult<Self> {
        let entity = store
            .find_ranking(guild_id, user_id)
            .await?
            .unwrap_or_else(|| RankingEntity::new(guild_id, user_id));
        Ok(Self { entity, store })
    }

    /// Guild the wins count in.
    pub fn guild_id(&self) -> GuildId {
        self.entity.guild_id
    }

    /// Credited user.
    pub fn user_id(&self) -> UserId {
        self.entity.user_id
    }

    /// Wins as of the last load or increment.
    pub fn wins(&self) -> u32 {
        self.entity.wins
    }

    /// Add exactly one win and persist it.
    ///
    /// The increment happens inside the store, so concurrent callers never lose a win;
    /// the local count is refreshed from the stored total.
    pub async fn add_win(&mut self) -> StorageResult<u32> {
        let wins = self
            .store
            .increment_wins(self.entity.guild_id, self.entity.user_id)
            .await?;
        self.entity.wins = wins;
        debug!(
            guild_id = self.entity.guild_id,
            user_id = self.entity.user_id,
            wins,
            "clash win recorded"
        );
        Ok(wins)
    }
}

/// Rankings of a guild, most wins first.
pub async fn leaderboard(
    store: &dyn TrackerStore,
    guild_id: GuildId,
) -> StorageResult<Vec<RankingEntity>> {
    store.list_rankings(guild_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::tracker_store::memory::MemoryTrackerStore;

    #[tokio::test]
    async fn two_wins_on_fresh_entry() {
        let store = MemoryTrackerStore::new();
        let mut entry = RankingEntry::load(Arc::new(store.clone()), 3, 4)
            .await
            .unwrap();
        assert_eq!(entry.wins(), 0);

        entry.add_win().await.unwrap();
        entry.add_win().await.unwrap();

        assert_eq!(entry.wins(), 2);
        assert_eq!(store.commits(), 2);
        let stored = store.find_ranking(3, 4).await.unwrap().unwrap();
        assert_eq!(stored.wins, 2);
    }

    #[tokio::test]
    async fn entries_loaded_twice_share_the_counter() {
        let store = MemoryTrackerStore::new();
        let shared: Arc<dyn TrackerStore> = Arc::new(store.clone());
        let mut first = RankingEntry::load(shared.clone(), 3, 4).await.unwrap();
        let mut second = RankingEntry::load(shared.clone(), 3, 4).await.unwrap();

        first.add_win().await.unwrap();
        second.add_win().await.unwrap();

        assert_eq!(second.wins(), 2);
        let board = leaderboard(shared.as_ref(), 3).await.unwrap();
        assert_eq!(board, vec![RankingEntity { guild_id: 3, user_id: 4, wins: 2 }]);
    }
}
