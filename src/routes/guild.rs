use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dao::models::GuildId,
    dto::guild::{GuildClashStatus, RankingLine},
    error::AppError,
    services::clash_service,
    state::SharedState,
};

/// Tracked clash of a guild, with the start guard and the rendered embed.
pub async fn clash_status(
    State(state): State<SharedState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<GuildClashStatus>, AppError> {
    let status = clash_service::guild_status(&state, guild_id).await?;
    Ok(Json(status))
}

/// Win leaderboard of a guild.
pub async fn ranking(
    State(state): State<SharedState>,
    Path(guild_id): Path<GuildId>,
) -> Result<Json<Vec<RankingLine>>, AppError> {
    let lines = clash_service::leaderboard(&state, guild_id).await?;
    Ok(Json(lines))
}

/// Configure the guild routes subtree.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/guilds/{guild_id}/clash", get(clash_status))
        .route("/guilds/{guild_id}/ranking", get(ranking))
}
