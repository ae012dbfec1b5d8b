use tracing::info;

use crate::{
    dao::models::{GuildId, UserId},
    dto::guild::{GameSummary, GuildClashStatus, RankingLine, ranking_lines},
    error::ServiceError,
    services::{
        embed::render_game_embed,
        guild_game::{GuildGameTracker, allows_new},
        ranking,
    },
    state::{
        SharedState,
        clash::{LifecycleState, Player},
    },
};

/// What [`settle_game`] did with the tracked clash.
#[derive(Debug, PartialEq, Eq)]
pub enum SettleOutcome {
    /// Nothing was tracked, or the tracked clash no longer exists.
    NothingTracked,
    /// The finished clash was settled and forgotten.
    Settled {
        /// Nickname of the winner, if the clash had one.
        winner: Option<String>,
        /// User credited with the win and their new total.
        credited: Option<(UserId, u32)>,
    },
}

/// Current tracker, tracked clash and guard result of a guild.
pub async fn guild_status(
    state: &SharedState,
    guild_id: GuildId,
) -> Result<GuildClashStatus, ServiceError> {
    let store = state.require_tracker_store().await?;
    let tracker = GuildGameTracker::load(store, guild_id).await?;

    let game = tracker.fetch(state.fetcher()).await?;
    let can_start_new = allows_new(game.as_ref());

    Ok(GuildClashStatus {
        guild_id,
        last_game_id: tracker.last_game_id().map(str::to_owned),
        announcement_message_id: tracker.announcement_marker(),
        can_start_new,
        game: game.map(|game| {
            let embed = render_game_embed(&game, state.localizer(), guild_id);
            GameSummary::new(&game, embed)
        }),
    })
}

/// Track a freshly announced clash, refusing while the previous one is still open.
pub async fn announce_game(
    state: &SharedState,
    guild_id: GuildId,
    handle: &str,
    announcement_message_id: u64,
) -> Result<(), ServiceError> {
    let store = state.require_tracker_store().await?;
    let mut tracker = GuildGameTracker::load(store, guild_id).await?;

    if !tracker.can_start_new(state.fetcher()).await? {
        return Err(ServiceError::InvalidState(format!(
            "clash `{}` is still open in guild `{guild_id}`",
            tracker.last_game_id().unwrap_or_default()
        )));
    }

    tracker.start_new(handle, announcement_message_id).await?;
    info!(guild_id, handle, "clash announced");
    Ok(())
}

/// Forget the tracked clash once it is finished, then credit its winner.
///
/// `resolve_user` maps the winning CodinGame player to a guild member; an
/// unmapped winner is reported but not credited. The clash is forgotten before
/// the win is written, so a failed write can drop a win but never repeat one.
pub async fn settle_game<F>(
    state: &SharedState,
    guild_id: GuildId,
    resolve_user: F,
) -> Result<SettleOutcome, ServiceError>
where
    F: Fn(&Player) -> Option<UserId>,
{
    let store = state.require_tracker_store().await?;
    let mut tracker = GuildGameTracker::load(store.clone(), guild_id).await?;

    let Some(game) = tracker.fetch(state.fetcher()).await? else {
        if tracker.last_game_id().is_some() {
            tracker.forget().await?;
        }
        return Ok(SettleOutcome::NothingTracked);
    };

    if game.state() != LifecycleState::Finished {
        return Err(ServiceError::InvalidState(format!(
            "clash `{}` is not finished yet",
            game.handle
        )));
    }

    tracker.forget().await?;

    let winner = game.winner();
    let credited = match winner.and_then(resolve_user) {
        Some(user_id) => {
            let mut entry = ranking::RankingEntry::load(store, guild_id, user_id).await?;
            let wins = entry.add_win().await?;
            Some((user_id, wins))
        }
        None => None,
    };

    info!(
        guild_id,
        handle = %game.handle,
        winner = winner.map(|player| player.name.as_str()),
        "clash settled"
    );

    Ok(SettleOutcome::Settled {
        winner: winner.map(|player| player.name.clone()),
        credited,
    })
}

/// Leaderboard of a guild, most wins first.
pub async fn leaderboard(
    state: &SharedState,
    guild_id: GuildId,
) -> Result<Vec<RankingLine>, ServiceError> {
    let store = state.require_tracker_store().await?;
    let rankings = ranking::leaderboard(store.as_ref(), guild_id).await?;
    Ok(ranking_lines(rankings))
}
