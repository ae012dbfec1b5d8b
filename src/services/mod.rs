/// Guild-facing clash flows built on the tracker and ranking.
pub mod clash_service;
/// Chat embed rendering.
pub mod embed;
/// Per-guild clash tracker and its start guard.
pub mod guild_game;
/// Health check service.
pub mod health_service;
/// Win counters and leaderboards.
pub mod ranking;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
#[cfg(test)]
pub(crate) mod test_support;
