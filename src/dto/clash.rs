//! Raw Clash of Code payload as returned by the CodinGame API.
//!
//! Field names follow the upstream camelCase contract. Fields this crate does
//! not consume are ignored so upstream additions never break hydration.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Top-level clash document returned by `findClashByHandle`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawClash {
    /// Public handle used to build the clash link.
    #[validate(length(min = 1))]
    pub public_handle: String,
    /// Whether the clash has started.
    pub started: bool,
    /// Whether the clash has finished.
    pub finished: bool,
    /// Players registered in the lobby, in upstream order.
    pub players: Vec<RawPlayer>,
    /// Allowed languages; empty means all languages.
    pub programming_languages: Vec<String>,
    /// Candidate game modes.
    pub modes: Vec<String>,
    /// Active mode, only present once the clash has started.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Lobby creation time in the upstream textual format.
    pub start_time: String,
    /// End time, absent until the clash has finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

/// A single player entry of a [`RawClash`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawPlayer {
    /// CodinGame nickname, taken as-is.
    pub codingamer_nickname: String,
    /// Lobby role (`OWNER` or `STANDARD`, any case).
    #[serde(default)]
    pub status: Option<String>,
    /// Final rank, present once results are known.
    #[serde(default)]
    pub rank: Option<u32>,
}
