/// CouchDB backend.
#[cfg(feature = "couch-store")]
pub mod couchdb;
/// In-process backend.
pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use futures::future::BoxFuture;

use crate::dao::models::{GuildGameEntity, GuildId, RankingEntity, UserId};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for guild trackers and win rankings.
///
/// Every write is durable once the returned future resolves.
pub trait TrackerStore: Send + Sync {
    /// Tracker row of a guild, if one was ever saved.
    fn find_guild_game(
        &self,
        guild_id: GuildId,
    ) -> BoxFuture<'static, StorageResult<Option<GuildGameEntity>>>;
    /// Insert or replace the tracker row of `entity.guild_id`.
    fn save_guild_game(&self, entity: GuildGameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Win counter of one user in one guild.
    fn find_ranking(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> BoxFuture<'static, StorageResult<Option<RankingEntity>>>;
    /// Atomically add one win, creating the row when missing, and return the new total.
    fn increment_wins(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> BoxFuture<'static, StorageResult<u32>>;
    /// Rankings of a guild, most wins first.
    fn list_rankings(&self, guild_id: GuildId)
    -> BoxFuture<'static, StorageResult<Vec<RankingEntity>>>;
    /// Cheap round trip proving the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-open the backend connection in place.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Order rankings by wins (descending) then user id so listings are stable.
pub(crate) fn sort_rankings(rankings: &mut [RankingEntity]) {
    rankings.sort_by(|a, b| b.wins.cmp(&a.wins).then(a.user_id.cmp(&b.user_id)));
}
