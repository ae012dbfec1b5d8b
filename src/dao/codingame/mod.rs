mod client;
mod error;

pub use client::{CodinGameClient, CodinGameConfig};
pub use error::{CodinGameError, FetchResult};

use futures::future::BoxFuture;

use crate::state::clash::Game;

/// Source of current clash data, keyed by public handle.
///
/// `Ok(None)` means the clash does not exist (or no longer does); it is not a failure.
pub trait ClashFetcher: Send + Sync {
    /// Current state of the clash published under `handle`.
    fn fetch(&self, handle: &str) -> BoxFuture<'static, FetchResult<Option<Game>>>;
}
