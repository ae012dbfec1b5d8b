/// Raw CodinGame clash payloads.
pub mod clash;
/// Chat embed value types.
pub mod embed;
/// Guild status and leaderboard responses.
pub mod guild;
/// Healthcheck response.
pub mod health;
