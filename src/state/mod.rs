/// Hydrated clash model.
pub mod clash;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    dao::{codingame::ClashFetcher, tracker_store::TrackerStore},
    error::ServiceError,
    localization::Localizer,
};

/// State handle shared by handlers and background tasks.
pub type SharedState = Arc<AppState>;

/// Central application state holding the injected collaborators.
///
/// The storage handle is installed and removed by the storage supervisor; the
/// fetcher and localizer live for the whole process.
pub struct AppState {
    tracker_store: RwLock<Option<Arc<dyn TrackerStore>>>,
    fetcher: Arc<dyn ClashFetcher>,
    localizer: Arc<dyn Localizer>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(fetcher: Arc<dyn ClashFetcher>, localizer: Arc<dyn Localizer>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            tracker_store: RwLock::new(None),
            fetcher,
            localizer,
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the current tracker store, if one is installed.
    pub async fn tracker_store(&self) -> Option<Arc<dyn TrackerStore>> {
        let guard = self.tracker_store.read().await;
        guard.as_ref().cloned()
    }

    /// Like [`AppState::tracker_store`] but fails with [`ServiceError::Degraded`] when absent.
    pub async fn require_tracker_store(&self) -> Result<Arc<dyn TrackerStore>, ServiceError> {
        self.tracker_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new tracker store implementation and leave degraded mode.
    pub async fn set_tracker_store(&self, store: Arc<dyn TrackerStore>) {
        {
            let mut guard = self.tracker_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current tracker store and enter degraded mode.
    pub async fn clear_tracker_store(&self) {
        {
            let mut guard = self.tracker_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Game-fetch collaborator.
    pub fn fetcher(&self) -> &dyn ClashFetcher {
        self.fetcher.as_ref()
    }

    /// Presentation strings collaborator.
    pub fn localizer(&self) -> &dyn Localizer {
        self.localizer.as_ref()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::tracker_store::memory::MemoryTrackerStore, localization::LangFile,
        services::test_support::StubFetcher,
    };

    #[tokio::test]
    async fn degraded_until_store_installed() {
        let state = AppState::new(Arc::new(StubFetcher::default()), Arc::new(LangFile::default()));
        let mut watcher = state.degraded_watcher();
        assert!(state.is_degraded());
        assert!(matches!(
            state.require_tracker_store().await,
            Err(ServiceError::Degraded)
        ));

        state
            .set_tracker_store(Arc::new(MemoryTrackerStore::new()))
            .await;
        assert!(!state.is_degraded());
        assert!(watcher.has_changed().unwrap());
        assert!(!*watcher.borrow_and_update());

        state.clear_tracker_store().await;
        assert!(state.is_degraded());
    }
}
