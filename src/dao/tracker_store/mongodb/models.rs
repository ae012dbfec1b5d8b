//! BSON documents. Snowflakes are stored as `i64`; the cast is lossless both ways.

use mongodb::bson::{Document, doc};
use serde::{Deserialize, Serialize};

use crate::dao::models::{GuildGameEntity, GuildId, RankingEntity, UserId};

/// Tracker row, keyed by the guild snowflake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGuildGameDocument {
    #[serde(rename = "_id")]
    guild_id: i64,
    last_game_id: Option<String>,
    announcement_message_id: Option<i64>,
}

impl From<GuildGameEntity> for MongoGuildGameDocument {
    fn from(value: GuildGameEntity) -> Self {
        Self {
            guild_id: value.guild_id as i64,
            last_game_id: value.last_game_id,
            announcement_message_id: value.announcement_message_id.map(|id| id as i64),
        }
    }
}

impl From<MongoGuildGameDocument> for GuildGameEntity {
    fn from(value: MongoGuildGameDocument) -> Self {
        Self {
            guild_id: value.guild_id as u64,
            last_game_id: value.last_game_id,
            announcement_message_id: value.announcement_message_id.map(|id| id as u64),
        }
    }
}

/// Win counter row; `(guild_id, user_id)` is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRankingDocument {
    guild_id: i64,
    user_id: i64,
    #[serde(default)]
    wins: i64,
}

impl From<MongoRankingDocument> for RankingEntity {
    fn from(value: MongoRankingDocument) -> Self {
        Self {
            guild_id: value.guild_id as u64,
            user_id: value.user_id as u64,
            wins: u32::try_from(value.wins).unwrap_or(u32::MAX),
        }
    }
}

/// Every ranking row of a guild.
pub fn guild_filter(guild_id: GuildId) -> Document {
    doc! { "guild_id": guild_id as i64 }
}

/// The tracker row of a guild.
pub fn guild_doc_id(guild_id: GuildId) -> Document {
    doc! { "_id": guild_id as i64 }
}

/// The ranking row of one user in one guild.
pub fn ranking_filter(guild_id: GuildId, user_id: UserId) -> Document {
    doc! { "guild_id": guild_id as i64, "user_id": user_id as i64 }
}
