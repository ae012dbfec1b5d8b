use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Collection, Database,
    bson::doc,
    options::{IndexOptions, ReturnDocument},
};
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    config::MongoConfig,
    connection::{open_database, ping},
    error::{MongoDaoError, MongoResult},
    models::{
        MongoGuildGameDocument, MongoRankingDocument, guild_doc_id, guild_filter, ranking_filter,
    },
};
use crate::dao::{
    models::{GuildGameEntity, GuildId, RankingEntity, UserId},
    storage::StorageResult,
    tracker_store::TrackerStore,
};

const GUILD_GAME_COLLECTION_NAME: &str = "clash_of_code_guild_game";
const RANKING_COLLECTION_NAME: &str = "clash_of_code_ranking";

/// MongoDB-backed [`TrackerStore`].
#[derive(Clone)]
pub struct MongoTrackerStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    database: Database,
}

impl MongoInner {
    async fn check_health(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        ping(&database)
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database = open_database(&self.config).await?;
        let mut guard = self.state.write().await;
        guard.database = database;
        Ok(())
    }
}

impl MongoTrackerStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = open_database(&config).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        // One ranking row per (guild, user); the upsert in `increment_wins` relies on it.
        let rankings = self.ranking_collection().await;
        let index = mongodb::IndexModel::builder()
            .keys(doc! {"guild_id": 1, "user_id": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("ranking_guild_user_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        rankings
            .create_index(index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: RANKING_COLLECTION_NAME,
                index: "guild_id,user_id",
                source,
            })?;

        Ok(())
    }

    async fn guild_game_collection(&self) -> Collection<MongoGuildGameDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoGuildGameDocument>(GUILD_GAME_COLLECTION_NAME)
    }

    async fn ranking_collection(&self) -> Collection<MongoRankingDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoRankingDocument>(RANKING_COLLECTION_NAME)
    }

    async fn find_guild_game(&self, guild_id: GuildId) -> MongoResult<Option<GuildGameEntity>> {
        let collection = self.guild_game_collection().await;

        let document = collection
            .find_one(guild_doc_id(guild_id))
            .await
            .map_err(|source| MongoDaoError::LoadGuildGame { guild_id, source })?;

        Ok(document.map(Into::into))
    }

    async fn save_guild_game(&self, entity: GuildGameEntity) -> MongoResult<()> {
        let guild_id = entity.guild_id;
        let document: MongoGuildGameDocument = entity.into();
        let collection = self.guild_game_collection().await;

        collection
            .replace_one(guild_doc_id(guild_id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveGuildGame { guild_id, source })?;

        debug!(guild_id, "clash tracker saved");
        Ok(())
    }

    async fn find_ranking(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> MongoResult<Option<RankingEntity>> {
        let collection = self.ranking_collection().await;

        let document = collection
            .find_one(ranking_filter(guild_id, user_id))
            .await
            .map_err(|source| MongoDaoError::LoadRankings { guild_id, source })?;

        Ok(document.map(Into::into))
    }

    async fn increment_wins(&self, guild_id: GuildId, user_id: UserId) -> MongoResult<u32> {
        let collection = self.ranking_collection().await;

        let updated = collection
            .find_one_and_update(
                ranking_filter(guild_id, user_id),
                doc! { "$inc": { "wins": 1_i64 } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|source| MongoDaoError::IncrementWins {
                guild_id,
                user_id,
                source,
            })?
            .ok_or(MongoDaoError::MissingRanking { guild_id, user_id })?;

        let ranking: RankingEntity = updated.into();
        debug!(guild_id, user_id, wins = ranking.wins, "win recorded");
        Ok(ranking.wins)
    }

    async fn list_rankings(&self, guild_id: GuildId) -> MongoResult<Vec<RankingEntity>> {
        let collection = self.ranking_collection().await;

        let documents: Vec<MongoRankingDocument> = collection
            .find(guild_filter(guild_id))
            .sort(doc! { "wins": -1, "user_id": 1 })
            .await
            .map_err(|source| MongoDaoError::LoadRankings { guild_id, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadRankings { guild_id, source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }
}

impl TrackerStore for MongoTrackerStore {
    fn find_guild_game(
        &self,
        guild_id: GuildId,
    ) -> BoxFuture<'static, StorageResult<Option<GuildGameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_guild_game(guild_id).await.map_err(Into::into) })
    }

    fn save_guild_game(&self, entity: GuildGameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_guild_game(entity).await.map_err(Into::into) })
    }

    fn find_ranking(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> BoxFuture<'static, StorageResult<Option<RankingEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_ranking(guild_id, user_id)
                .await
                .map_err(Into::into)
        })
    }

    fn increment_wins(
        &self,
        guild_id: GuildId,
        user_id: UserId,
    ) -> BoxFuture<'static, StorageResult<u32>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .increment_wins(guild_id, user_id)
                .await
                .map_err(Into::into)
        })
    }

    fn list_rankings(
        &self,
        guild_id: GuildId,
    ) -> BoxFuture<'static, StorageResult<Vec<RankingEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_rankings(guild_id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.check_health().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
