use axum::Router;

use crate::state::SharedState;

/// Guild clash status and leaderboard routes.
pub mod guild;
/// Healthcheck route.
pub mod health;

/// Compose all route trees and wire in the shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router().merge(guild::router()).with_state(state)
}
