use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dao::models::{GuildGameEntity, GuildId, RankingEntity, UserId};

pub const GUILD_GAME_PREFIX: &str = "guild_game::";
pub const RANKING_PREFIX: &str = "ranking::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchGuildGameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub body: GuildGameEntity,
}

impl From<(GuildGameEntity, Option<String>)> for CouchGuildGameDocument {
    fn from((entity, rev): (GuildGameEntity, Option<String>)) -> Self {
        Self {
            id: guild_game_doc_id(entity.guild_id),
            rev,
            body: entity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchRankingDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub body: RankingEntity,
}

impl CouchRankingDocument {
    /// Copy of the document carrying one more win, keeping the revision for the update.
    pub fn with_extra_win(mut self) -> Self {
        self.body.wins = self.body.wins.saturating_add(1);
        self
    }
}

impl From<(RankingEntity, Option<String>)> for CouchRankingDocument {
    fn from((entity, rev): (RankingEntity, Option<String>)) -> Self {
        Self {
            id: ranking_doc_id(entity.guild_id, entity.user_id),
            rev,
            body: entity,
        }
    }
}

pub fn guild_game_doc_id(guild_id: GuildId) -> String {
    format!("{}{}", GUILD_GAME_PREFIX, guild_id)
}

pub fn ranking_doc_id(guild_id: GuildId, user_id: UserId) -> String {
    format!("{}{}", ranking_prefix(guild_id), user_id)
}

/// Key prefix shared by every ranking of a guild.
pub fn ranking_prefix(guild_id: GuildId) -> String {
    format!("{}{}:", RANKING_PREFIX, guild_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ranking_document_flattens_entity() {
        let doc = CouchRankingDocument::from((RankingEntity::new(5, 9), None));
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({"_id": "ranking::5:9", "guild_id": 5, "user_id": 9, "wins": 0})
        );
    }

    #[test]
    fn extra_win_keeps_revision() {
        let doc = CouchRankingDocument::from((RankingEntity::new(5, 9), Some("1-a".into())));
        let bumped = doc.with_extra_win();
        assert_eq!(bumped.body.wins, 1);
        assert_eq!(bumped.rev.as_deref(), Some("1-a"));
    }

    #[test]
    fn guild_prefix_does_not_match_longer_guild_ids() {
        assert!(!ranking_doc_id(12, 3).starts_with(&ranking_prefix(1)));
    }
}
