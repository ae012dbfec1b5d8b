use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::from_value;
use tracing::debug;

use crate::dao::{
    models::{GuildGameEntity, GuildId, RankingEntity, UserId},
    storage::StorageResult,
    tracker_store::{TrackerStore, sort_rankings},
};

use super::{
    config::{CouchConfig, CouchCredentials},
    error::{CouchDaoError, CouchResult},
    models::{
        AllDocsResponse, CouchGuildGameDocument, CouchRankingDocument, END_SUFFIX,
        guild_game_doc_id, ranking_doc_id, ranking_prefix,
    },
};

/// Read-modify-write attempts before giving up on a contended ranking document.
const MAX_CONFLICT_ATTEMPTS: u32 = 5;

/// CouchDB-backed [`TrackerStore`].
#[derive(Clone)]
pub struct CouchTrackerStore {
    client: Client,
    database_url: Arc<str>,
    database: Arc<str>,
    credentials: Option<Arc<CouchCredentials>>,
}

impl CouchTrackerStore {
    /// Connect to CouchDB and create the tracker database when it is missing.
    pub async fn connect(config: CouchConfig) -> CouchResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| CouchDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            database_url: Arc::from(config.database_url()),
            database: Arc::from(config.database),
            credentials: config.credentials.map(Arc::new),
        };

        store.ensure_database().await?;
        Ok(store)
    }

    fn database_url(&self) -> String {
        self.database_url.to_string()
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.credentials.as_deref() {
            Some(CouchCredentials { username, password }) => {
                builder.basic_auth(username, Some(password))
            }
            None => builder,
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.database_url(), path);
        self.authorize(self.client.request(method, url))
    }

    async fn ensure_database(&self) -> CouchResult<()> {
        let database = self.database.to_string();
        let url = self.database_url();

        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::Database {
                database: database.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::NOT_FOUND => {
                let create = self
                    .authorize(self.client.put(&url))
                    .send()
                    .await
                    .map_err(|source| CouchDaoError::Database {
                        database: database.clone(),
                        source,
                    })?;
                if create.status().is_success() {
                    Ok(())
                } else {
                    Err(CouchDaoError::DatabaseStatus {
                        database,
                        status: create.status(),
                    })
                }
            }
            other => Err(CouchDaoError::DatabaseStatus {
                database,
                status: other,
            }),
        }
    }

    async fn get_document<T>(&self, doc_id: &str) -> CouchResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, doc_id)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                doc_id: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                response.json::<T>().await.map(Some).map_err(|source| {
                    CouchDaoError::Decode {
                        doc_id: doc_id.to_string(),
                        source,
                    }
                })
            }
            other => Err(CouchDaoError::UnexpectedStatus {
                doc_id: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn put_document<T>(&self, doc_id: &str, document: &T) -> CouchResult<()>
    where
        T: ?Sized + Serialize,
    {
        let response = self
            .request(Method::PUT, doc_id)
            .json(document)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                doc_id: doc_id.to_string(),
                source,
            })?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(CouchDaoError::Conflict {
                doc_id: doc_id.to_string(),
            }),
            other => Err(CouchDaoError::UnexpectedStatus {
                doc_id: doc_id.to_string(),
                status: other,
            }),
        }
    }

    async fn list_documents<T>(&self, prefix: &str) -> CouchResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        const ALL_DOCS: &str = "_all_docs";
        let query = [
            ("include_docs", "true".to_string()),
            ("startkey", format!("\"{}\"", prefix)),
            ("endkey", format!("\"{}{}\"", prefix, END_SUFFIX)),
        ];

        let response = self
            .request(Method::GET, ALL_DOCS)
            .query(&query)
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                doc_id: ALL_DOCS.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CouchDaoError::UnexpectedStatus {
                doc_id: ALL_DOCS.to_string(),
                status: response.status(),
            });
        }

        let payload = response.json::<AllDocsResponse>().await.map_err(|source| {
            CouchDaoError::Decode {
                doc_id: ALL_DOCS.to_string(),
                source,
            }
        })?;

        payload
            .rows
            .into_iter()
            .filter_map(|row| row.doc)
            .map(|doc| {
                from_value(doc).map_err(|source| CouchDaoError::Shape {
                    doc_id: ALL_DOCS.to_string(),
                    source,
                })
            })
            .collect()
    }

    async fn save_guild_game(&self, entity: GuildGameEntity) -> CouchResult<()> {
        let doc_id = guild_game_doc_id(entity.guild_id);
        let existing = self
            .get_document::<CouchGuildGameDocument>(&doc_id)
            .await?
            .and_then(|doc| doc.rev);
        let doc = CouchGuildGameDocument::from((entity, existing));
        self.put_document(&doc_id, &doc).await
    }

    async fn increment_wins(&self, guild_id: GuildId, user_id: UserId) -> CouchResult<u32> {
        let doc_id = ranking_doc_id(guild_id, user_id);

        for attempt in 1..=MAX_CONFLICT_ATTEMPTS {
            let current = match self.get_document::<CouchRankingDocument>(&doc_id).await? {
                Some(doc) => doc,
                None => CouchRankingDocument::from((RankingEntity::new(guild_id, user_id), None)),
            };
            let next = current.with_extra_win();

            match self.put_document(&doc_id, &next).await {
                Ok(()) => return Ok(next.body.wins),
                Err(CouchDaoError::Conflict { .. }) => {
                    debug!(guild_id, user_id, attempt, "ranking update conflicted; retrying");
                }
                Err(err) => return Err(err),
            }
        }

        Err(CouchDaoError::ConflictRetriesExhausted {
            doc_id,
            attempts: MAX_CONFLICT_ATTEMPTS,
        })
    }

    async fn health_check(&self) -> CouchResult<()> {
        let url = self.database_url();
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|source| CouchDaoError::Transport {
                doc_id: url.clone(),
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(CouchDaoError::UnexpectedStatus {
                doc_id: url,
                status: response.status(),
            })
        }
    }
}

impl TrackerStore for CouchTrackerStore {
    fn find_guild_game(
        &self,
        guild_id: GuildId,
    ) -> BoxFuture<'static, StorageResult<Option<GuildGameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let doc_id = guild_game_doc_id(guild_id);
            let maybe_doc = store
                .get_document::<CouchGuildGameDocument>(&doc_id)
                .await?;
            Ok(maybe_doc.map(|doc| doc.body))
        })
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
            let doc_id = ranking_doc_id(guild_id, user_id);
            let maybe_doc = store.get_document::<CouchRankingDocument>(&doc_id).await?;
            Ok(maybe_doc.map(|doc| doc.body))
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
        Box::pin(async move {
            let docs = store
                .list_documents::<CouchRankingDocument>(&ranking_prefix(guild_id))
                .await?;
            let mut rankings = docs.into_iter().map(|doc| doc.body).collect::<Vec<_>>();
            sort_rankings(&mut rankings);
            Ok(rankings)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.health_check().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_database().await.map_err(Into::into) })
    }
}
