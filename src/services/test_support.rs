//! Test doubles shared by service and state tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use futures::future::BoxFuture;
use time::macros::datetime;

use crate::{
    dao::codingame::{ClashFetcher, CodinGameError, FetchResult},
    state::clash::{Game, GameMode, MalformedData, Player, Role},
};

/// In-memory [`ClashFetcher`] serving canned games and counting calls.
#[derive(Default)]
pub struct StubFetcher {
    games: DashMap<String, Game>,
    broken: DashMap<String, ()>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn with_game(self, game: Game) -> Self {
        self.games.insert(game.handle.clone(), game);
        self
    }

    /// Make every fetch of `handle` fail hard.
    pub fn with_broken(self, handle: &str) -> Self {
        self.broken.insert(handle.to_owned(), ());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ClashFetcher for StubFetcher {
    fn fetch(&self, handle: &str) -> BoxFuture<'static, FetchResult<Option<Game>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = if self.broken.contains_key(handle) {
            Err(CodinGameError::Malformed {
                handle: handle.to_owned(),
                source: MalformedData::UnknownMode("LONGEST".into()),
            })
        } else {
            Ok(self.games.get(handle).map(|game| game.value().clone()))
        };
        Box::pin(async move { result })
    }
}

/// A game with the given flags and `(name, rank)` players.
pub fn game(handle: &str, started: bool, finished: bool, players: &[(&str, Option<u32>)]) -> Game {
    Game {
        handle: handle.to_owned(),
        started,
        finished,
        players: players
            .iter()
            .enumerate()
            .map(|(index, (name, rank))| Player {
                name: (*name).to_owned(),
                role: if index == 0 { Role::Owner } else { Role::Standard },
                rank: *rank,
            })
            .collect(),
        allowed_languages: vec![],
        modes: vec![GameMode::Fastest, GameMode::Shortest],
        active_mode: started.then_some(GameMode::Shortest),
        start_time: datetime!(2024-03-14 09:26:53),
        end_time: finished.then_some(datetime!(2024-03-14 09:41:00)),
    }
}
