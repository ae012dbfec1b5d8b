use serde::Serialize;

use crate::{
    dao::models::{GuildId, RankingEntity, UserId},
    dto::embed::Embed,
    state::clash::{Game, LifecycleState},
};

/// Clash tracking status of a guild.
#[derive(Debug, Serialize)]
pub struct GuildClashStatus {
    /// Guild the status belongs to.
    pub guild_id: GuildId,
    /// Handle of the tracked clash, if any.
    pub last_game_id: Option<String>,
    /// Message that announced the tracked clash.
    pub announcement_message_id: Option<u64>,
    /// Whether a new clash may be announced right now.
    pub can_start_new: bool,
    /// Current state of the tracked clash; absent when nothing is tracked or it vanished.
    pub game: Option<GameSummary>,
}

/// Lightweight view of a tracked clash.
#[derive(Debug, Serialize)]
pub struct GameSummary {
    /// Public clash URL.
    pub link: String,
    /// `not_started`, `in_progress` or `finished`.
    pub state: &'static str,
    /// Player nicknames in lobby order.
    pub players: Vec<String>,
    /// Winner nickname once the clash is finished.
    pub winner: Option<String>,
    /// Localized embed for the guild.
    pub embed: Embed,
}

impl GameSummary {
    /// Summarize `game` alongside its rendered embed.
    pub fn new(game: &Game, embed: Embed) -> Self {
        Self {
            link: game.link(),
            state: state_label(game.state()),
            players: game.players.iter().map(|p| p.name.clone()).collect(),
            winner: game.winner().map(|p| p.name.clone()),
            embed,
        }
    }
}

fn state_label(state: LifecycleState) -> &'static str {
    match state {
        LifecycleState::NotStarted => "not_started",
        LifecycleState::InProgress => "in_progress",
        LifecycleState::Finished => "finished",
    }
}

/// One leaderboard line.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct RankingLine {
    /// 1-based rank on the board.
    pub position: usize,
    /// Ranked user.
    pub user_id: UserId,
    /// Clashes won in the guild.
    pub wins: u32,
}

/// Build leaderboard lines from rankings already sorted by wins.
pub fn ranking_lines(rankings: Vec<RankingEntity>) -> Vec<RankingLine> {
    rankings
        .into_iter()
        .enumerate()
        .map(|(index, ranking)| RankingLine {
            position: index + 1,
            user_id: ranking.user_id,
            wins: ranking.wins,
        })
        .collect()
}
