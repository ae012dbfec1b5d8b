use serde::{Deserialize, Serialize};

/// Discord guild snowflake.
pub type GuildId = u64;
/// Discord user snowflake.
pub type UserId = u64;

/// Per-guild record of the most recently announced clash.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuildGameEntity {
    /// Guild owning the record (unique key).
    pub guild_id: GuildId,
    /// Public handle of the last announced clash.
    pub last_game_id: Option<String>,
    /// Message that announced the clash in the guild.
    pub announcement_message_id: Option<u64>,
}

impl GuildGameEntity {
    /// Empty record for a guild that never announced a clash.
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            last_game_id: None,
            announcement_message_id: None,
        }
    }
}

/// Number of clashes a user won inside a guild.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankingEntity {
    /// Guild the wins were scored in.
    pub guild_id: GuildId,
    /// Winning user.
    pub user_id: UserId,
    /// Number of clashes won.
    pub wins: u32,
}

impl RankingEntity {
    /// Fresh ranking row with no wins.
    pub fn new(guild_id: GuildId, user_id: UserId) -> Self {
        Self {
            guild_id,
            user_id,
            wins: 0,
        }
    }
}
