//! Strongly typed Clash of Code records hydrated from raw API payloads.

use std::fmt;

use serde_json::Value;
use thiserror::Error;
use time::{PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};
use validator::{Validate, ValidationErrors};

use crate::dto::clash::{RawClash, RawPlayer};

/// Base URL of the public clash page; the public handle is appended to it.
pub const CLASH_LINK_BASE: &str = "https://www.codingame.com/clashofcode/clash/";

/// `<Month> <Day>, <Year>, <Hour>:<Minute>:<Second> <AM/PM>`, e.g. `January 5, 2024, 3:04:05 PM`.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[month repr:long case_sensitive:false] [day padding:none], [year], [hour repr:12 padding:none]:[minute]:[second] [period case_sensitive:false]"
);

/// Failure raised when a payload cannot be turned into a [`Game`].
#[derive(Debug, Error)]
pub enum MalformedData {
    /// A required field is missing or has the wrong JSON type.
    #[error("invalid clash payload shape")]
    Shape(#[source] serde_json::Error),
    /// A field is present but violates a value constraint.
    #[error("invalid clash payload: {0}")]
    Invalid(#[from] ValidationErrors),
    /// A timestamp does not follow the upstream textual format.
    #[error("invalid timestamp `{value}` in field `{field}`")]
    Timestamp {
        /// Payload field holding the timestamp.
        field: &'static str,
        /// Text that failed to parse.
        value: String,
        /// Parser error.
        #[source]
        source: time::error::Parse,
    },
    /// A player status does not name a known role.
    #[error("unknown player role `{0}`")]
    UnknownRole(String),
    /// A mode string does not name a known game mode.
    #[error("unknown game mode `{0}`")]
    UnknownMode(String),
}

/// Role of a player inside a clash lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Player who created the lobby.
    Owner,
    /// Any other player.
    Standard,
}

impl Role {
    const TABLE: [(&'static str, Role); 2] = [("OWNER", Role::Owner), ("STANDARD", Role::Standard)];

    /// Parse an upstream status string, case-insensitively.
    ///
    /// Absent or blank statuses default to [`Role::Standard`].
    pub fn parse(status: Option<&str>) -> Result<Self, MalformedData> {
        let Some(status) = status.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Role::Standard);
        };

        let upper = status.to_uppercase();
        Self::TABLE
            .iter()
            .find(|(name, _)| *name == upper)
            .map(|(_, role)| *role)
            .ok_or_else(|| MalformedData::UnknownRole(status.to_owned()))
    }

    /// Upstream spelling of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Standard => "STANDARD",
        }
    }
}

/// Game modes a clash can be played in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameMode {
    /// First correct solution wins.
    Fastest,
    /// Specification hidden, only tests are shown.
    Reverse,
    /// Shortest correct source wins.
    Shortest,
}

impl GameMode {
    const TABLE: [(&'static str, GameMode); 3] = [
        ("FASTEST", GameMode::Fastest),
        ("REVERSE", GameMode::Reverse),
        ("SHORTEST", GameMode::Shortest),
    ];

    /// Parse an upstream mode string, case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, MalformedData> {
        let upper = raw.trim().to_uppercase();
        Self::TABLE
            .iter()
            .find(|(name, _)| *name == upper)
            .map(|(_, mode)| *mode)
            .ok_or_else(|| MalformedData::UnknownMode(raw.to_owned()))
    }

    /// Upstream spelling of the mode.
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Fastest => "FASTEST",
            GameMode::Reverse => "REVERSE",
            GameMode::Shortest => "SHORTEST",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle classification derived from the `started` / `finished` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Lobby is open, nobody is coding yet.
    NotStarted,
    /// Players are coding.
    InProgress,
    /// Results are final.
    Finished,
}

/// A player of a clash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// CodinGame nickname.
    pub name: String,
    /// Lobby role.
    pub role: Role,
    /// Final rank (1 is best), known once the clash has results.
    pub rank: Option<u32>,
}

impl TryFrom<RawPlayer> for Player {
    type Error = MalformedData;

    fn try_from(raw: RawPlayer) -> Result<Self, Self::Error> {
        Ok(Self {
            role: Role::parse(raw.status.as_deref())?,
            name: raw.codingamer_nickname,
            rank: raw.rank,
        })
    }
}

impl From<&Player> for RawPlayer {
    fn from(player: &Player) -> Self {
        Self {
            codingamer_nickname: player.name.clone(),
            status: Some(player.role.as_str().to_owned()),
            rank: player.rank,
        }
    }
}

/// A hydrated Clash of Code game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    /// Public handle identifying the clash.
    pub handle: String,
    /// Whether the clash has started.
    pub started: bool,
    /// Whether the clash has finished.
    pub finished: bool,
    /// Players in upstream order.
    pub players: Vec<Player>,
    /// Allowed languages; empty means all languages.
    pub allowed_languages: Vec<String>,
    /// Candidate modes.
    pub modes: Vec<GameMode>,
    /// Mode drawn for the clash, set once it has started.
    pub active_mode: Option<GameMode>,
    /// Lobby creation time.
    pub start_time: PrimitiveDateTime,
    /// End time, set once the clash has finished.
    pub end_time: Option<PrimitiveDateTime>,
}

impl Game {
    /// Hydrate a game from a loosely typed JSON payload.
    pub fn hydrate(payload: Value) -> Result<Self, MalformedData> {
        let raw: RawClash = serde_json::from_value(payload).map_err(MalformedData::Shape)?;
        raw.try_into()
    }

    /// Public page of the clash.
    pub fn link(&self) -> String {
        format!("{CLASH_LINK_BASE}{}", self.handle)
    }

    /// Lifecycle state derived from the `started` / `finished` flags.
    pub fn state(&self) -> LifecycleState {
        if self.finished {
            LifecycleState::Finished
        } else if self.started {
            LifecycleState::InProgress
        } else {
            LifecycleState::NotStarted
        }
    }

    /// Best ranked player of a finished game.
    ///
    /// Players without a rank come after every ranked player; equal ranks keep
    /// the upstream player order. Unfinished or empty games have no winner.
    pub fn winner(&self) -> Option<&Player> {
        if !self.finished {
            return None;
        }

        self.players
            .iter()
            .min_by_key(|player| (player.rank.is_none(), player.rank))
    }

    /// Re-serialise the game into the upstream payload shape.
    pub fn to_raw(&self) -> RawClash {
        RawClash {
            public_handle: self.handle.clone(),
            started: self.started,
            finished: self.finished,
            players: self.players.iter().map(RawPlayer::from).collect(),
            programming_languages: self.allowed_languages.clone(),
            modes: self.modes.iter().map(|mode| mode.as_str().to_owned()).collect(),
            mode: self.active_mode.map(|mode| mode.as_str().to_owned()),
            start_time: format_timestamp(self.start_time),
            end_time: self.end_time.map(format_timestamp),
        }
    }
}

impl TryFrom<RawClash> for Game {
    type Error = MalformedData;

    fn try_from(raw: RawClash) -> Result<Self, Self::Error> {
        raw.validate()?;

        let players = raw
            .players
            .into_iter()
            .map(Player::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let modes = raw
            .modes
            .iter()
            .map(|mode| GameMode::parse(mode))
            .collect::<Result<Vec<_>, _>>()?;
        let active_mode = raw.mode.as_deref().map(GameMode::parse).transpose()?;

        let start_time = parse_timestamp("startTime", &raw.start_time)?;
        let end_time = match raw.end_time.as_deref() {
            Some(value) if !value.is_empty() => Some(parse_timestamp("endTime", value)?),
            _ => None,
        };

        Ok(Self {
            handle: raw.public_handle,
            started: raw.started,
            finished: raw.finished,
            players,
            allowed_languages: raw.programming_languages,
            modes,
            active_mode,
            start_time,
            end_time,
        })
    }
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<PrimitiveDateTime, MalformedData> {
    PrimitiveDateTime::parse(value, TIMESTAMP_FORMAT).map_err(|source| MalformedData::Timestamp {
        field,
        value: value.to_owned(),
        source,
    })
}

fn format_timestamp(value: PrimitiveDateTime) -> String {
    // Only fails for years outside 0..=9999, which upstream never sends.
    value
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn payload(started: bool, finished: bool) -> Value {
        json!({
            "publicHandle": "2416835c3e5a0e9e2c4b6b8a2e4a43d12ab3f1e",
            "started": started,
            "finished": finished,
            "players": [
                {"codingamerNickname": "alice", "status": "OWNER", "rank": null},
                {"codingamerNickname": "bob", "status": "STANDARD"}
            ],
            "programmingLanguages": ["Rust", "Python3"],
            "modes": ["fastest", "Reverse", "SHORTEST"],
            "startTime": "March 14, 2024, 9:26:53 AM",
            "endTime": null
        })
    }

    fn ranked_game(ranks: &[Option<u32>]) -> Game {
        Game {
            handle: "h".into(),
            started: true,
            finished: true,
            players: ranks
                .iter()
                .enumerate()
                .map(|(index, rank)| Player {
                    name: format!("p{index}"),
                    role: Role::Standard,
                    rank: *rank,
                })
                .collect(),
            allowed_languages: vec![],
            modes: vec![GameMode::Fastest],
            active_mode: Some(GameMode::Fastest),
            start_time: datetime!(2024-03-14 09:26:53),
            end_time: Some(datetime!(2024-03-14 09:41:00)),
        }
    }

    #[test]
    fn hydrates_not_started_game() {
        let game = Game::hydrate(payload(false, false)).unwrap();

        assert_eq!(game.state(), LifecycleState::NotStarted);
        assert_eq!(
            game.link(),
            "https://www.codingame.com/clashofcode/clash/2416835c3e5a0e9e2c4b6b8a2e4a43d12ab3f1e"
        );
        assert_eq!(game.players[0].role, Role::Owner);
        assert_eq!(game.players[1].role, Role::Standard);
        assert_eq!(
            game.modes,
            vec![GameMode::Fastest, GameMode::Reverse, GameMode::Shortest]
        );
        assert_eq!(game.start_time, datetime!(2024-03-14 09:26:53));
        assert_eq!(game.end_time, None);
        assert_eq!(game.active_mode, None);
    }

    #[test]
    fn derives_lifecycle_state() {
        let running = Game::hydrate(payload(true, false)).unwrap();
        assert_eq!(running.state(), LifecycleState::InProgress);

        let done = Game::hydrate(payload(true, true)).unwrap();
        assert_eq!(done.state(), LifecycleState::Finished);
    }

    #[test]
    fn missing_players_is_malformed() {
        let mut value = payload(false, false);
        value.as_object_mut().unwrap().remove("players");

        assert!(matches!(
            Game::hydrate(value),
            Err(MalformedData::Shape(_))
        ));
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let mut value = payload(false, false);
        value["started"] = json!("yes");

        assert!(matches!(
            Game::hydrate(value),
            Err(MalformedData::Shape(_))
        ));
    }

    #[test]
    fn bad_timestamp_is_malformed() {
        let mut value = payload(false, false);
        value["startTime"] = json!("2024-03-14T09:26:53Z");

        match Game::hydrate(value) {
            Err(MalformedData::Timestamp { field, .. }) => assert_eq!(field, "startTime"),
            other => panic!("expected timestamp failure, got {other:?}"),
        }
    }

    #[test]
    fn end_time_and_mode_are_parsed_when_present() {
        let mut value = payload(true, true);
        value["endTime"] = json!("March 14, 2024, 12:05:00 PM");
        value["mode"] = json!("reverse");

        let game = Game::hydrate(value).unwrap();
        assert_eq!(game.end_time, Some(datetime!(2024-03-14 12:05:00)));
        assert_eq!(game.active_mode, Some(GameMode::Reverse));
    }

    #[test]
    fn unknown_mode_is_malformed() {
        let mut value = payload(false, false);
        value["modes"] = json!(["FASTEST", "LONGEST"]);

        assert!(matches!(
            Game::hydrate(value),
            Err(MalformedData::UnknownMode(mode)) if mode == "LONGEST"
        ));
    }

    #[test]
    fn role_parsing_is_case_insensitive() {
        for status in ["owner", "OWNER", "Owner"] {
            assert_eq!(Role::parse(Some(status)).unwrap(), Role::Owner);
        }
        assert!(matches!(
            Role::parse(Some("captain")),
            Err(MalformedData::UnknownRole(role)) if role == "captain"
        ));
    }

    #[test]
    fn blank_or_missing_role_is_standard() {
        assert_eq!(Role::parse(None).unwrap(), Role::Standard);
        assert_eq!(Role::parse(Some("")).unwrap(), Role::Standard);
        assert_eq!(Role::parse(Some("  ")).unwrap(), Role::Standard);
    }

    #[test]
    fn winner_is_lowest_rank() {
        let game = ranked_game(&[Some(3), Some(1), Some(2)]);
        assert_eq!(game.winner().unwrap().name, "p1");
    }

    #[test]
    fn winner_tie_keeps_player_order() {
        let game = ranked_game(&[Some(1), Some(1), Some(2)]);
        for _ in 0..5 {
            assert_eq!(game.winner().unwrap().name, "p0");
        }
    }

    #[test]
    fn unranked_players_sort_last() {
        let game = ranked_game(&[None, Some(2), None, Some(4)]);
        assert_eq!(game.winner().unwrap().name, "p1");

        let nobody_ranked = ranked_game(&[None, None]);
        assert_eq!(nobody_ranked.winner().unwrap().name, "p0");
    }

    #[test]
    fn unfinished_game_has_no_winner() {
        let mut game = ranked_game(&[Some(1)]);
        game.finished = false;
        assert!(game.winner().is_none());

        let empty = ranked_game(&[]);
        assert!(empty.winner().is_none());
    }

    #[test]
    fn rehydrating_serialised_game_is_lossless() {
        let mut value = payload(true, true);
        value["endTime"] = json!("March 14, 2024, 12:05:00 PM");
        value["mode"] = json!("SHORTEST");
        value["players"] = json!([
            {"codingamerNickname": "alice", "status": "owner", "rank": 2},
            {"codingamerNickname": "bob", "rank": 1}
        ]);
        let game = Game::hydrate(value).unwrap();

        let serialised = serde_json::to_value(game.to_raw()).unwrap();
        let again = Game::hydrate(serialised).unwrap();

        assert_eq!(again, game);
    }
}
