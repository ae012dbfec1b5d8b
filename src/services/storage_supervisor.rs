use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{storage::StorageError, tracker_store::TrackerStore},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Connect to the storage backend and keep the shared state in degraded mode while it is unavailable.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn TrackerStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.set_tracker_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                watch_health(&state, store.as_ref()).await;

                state.clear_tracker_store().await;
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}

/// Poll the store; returns once it failed and could not be revived in place.
async fn watch_health(state: &SharedState, store: &dyn TrackerStore) {
    loop {
        if store.health_check().await.is_ok() {
            if state.is_degraded() {
                info!("storage healthy again; leaving degraded mode");
                state.update_degraded(false);
            }
            sleep(HEALTH_POLL_INTERVAL).await;
            continue;
        }

        let mut reconnect_delay = INITIAL_DELAY;
        let mut reconnected = false;

        for attempt in 0..MAX_RECONNECT_ATTEMPTS {
            match store.try_reconnect().await {
                Ok(()) => {
                    info!("storage reconnection succeeded after health check failure");
                    reconnected = true;
                    break;
                }
                Err(err) => {
                    if attempt == 0 {
                        warn!(
                            attempt, error = %err,
                            "storage reconnect first attempt failed; entering degraded mode"
                        );
                        state.update_degraded(true);
                    } else {
                        warn!(attempt, error = %err, "storage reconnect attempt failed");
                    }
                    sleep(reconnect_delay).await;
                    reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
                }
            }
        }

        if !reconnected {
            warn!("exhausted storage reconnect attempts; dropping the connection");
            return;
        }

        state.update_degraded(false);
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        dao::{
            models::{GuildGameEntity, GuildId, RankingEntity, UserId},
            storage::StorageResult,
            tracker_store::memory::MemoryTrackerStore,
        },
        localization::LangFile,
        services::test_support::StubFetcher,
        state::AppState,
    };

    /// Store whose health check fails until a reconnect revives it, if `revivable`.
    #[derive(Default)]
    struct FlakyHealth {
        inner: MemoryTrackerStore,
        healthy: AtomicBool,
        revivable: bool,
        reconnects: AtomicUsize,
    }

    fn outage() -> StorageError {
        StorageError::unavailable("store down".into(), std::io::Error::other("down"))
    }

    impl TrackerStore for FlakyHealth {
        fn find_guild_game(
            &self,
            guild_id: GuildId,
        ) -> BoxFuture<'static, StorageResult<Option<GuildGameEntity>>> {
            self.inner.find_guild_game(guild_id)
        }

        fn save_guild_game(&self, entity: GuildGameEntity) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.save_guild_game(entity)
        }

        fn find_ranking(
            &self,
            guild_id: GuildId,
            user_id: UserId,
        ) -> BoxFuture<'static, StorageResult<Option<RankingEntity>>> {
            self.inner.find_ranking(guild_id, user_id)
        }

        fn increment_wins(
            &self,
            guild_id: GuildId,
            user_id: UserId,
        ) -> BoxFuture<'static, StorageResult<u32>> {
            self.inner.increment_wins(guild_id, user_id)
        }

        fn list_rankings(
            &self,
            guild_id: GuildId,
        ) -> BoxFuture<'static, StorageResult<Vec<RankingEntity>>> {
            self.inner.list_rankings(guild_id)
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            let result = if self.healthy.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(outage())
            };
            Box::pin(async move { result })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.reconnects.fetch_add(1, Ordering::SeqCst);
            let result = if self.revivable {
                self.healthy.store(true, Ordering::SeqCst);
                Ok(())
            } else {
                Err(outage())
            };
            Box::pin(async move { result })
        }
    }

    fn state() -> SharedState {
        AppState::new(
            Arc::new(StubFetcher::default()),
            Arc::new(LangFile::default()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn unrecoverable_store_ends_the_watch_in_degraded_mode() {
        let state = state();
        state.update_degraded(false);
        let store = FlakyHealth::default();

        watch_health(&state, &store).await;

        assert_eq!(store.reconnects.load(Ordering::SeqCst), MAX_RECONNECT_ATTEMPTS as usize);
        assert!(state.is_degraded());
    }

    #[tokio::test(start_paused = true)]
    async fn revived_store_keeps_being_watched() {
        let state = state();
        let store = FlakyHealth {
            revivable: true,
            ..FlakyHealth::default()
        };

        let watched = tokio::time::timeout(Duration::from_secs(60), watch_health(&state, &store)).await;

        assert!(watched.is_err());
        assert_eq!(store.reconnects.load(Ordering::SeqCst), 1);
        assert!(!state.is_degraded());
    }
}
