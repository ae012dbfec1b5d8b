//! Opening the tracker database and checking that it answers.

use std::time::Duration;

use mongodb::{Client, Database, bson::doc, error::Error as MongoError};
use tokio::time::sleep;
use tracing::debug;

use super::{
    config::MongoConfig,
    error::{MongoDaoError, MongoResult},
};

const FIRST_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Pause between ping attempts, doubling up to [`MAX_BACKOFF`].
struct Backoff {
    delay: Duration,
}

impl Backoff {
    fn new() -> Self {
        Self {
            delay: FIRST_BACKOFF,
        }
    }

    fn step(&mut self) -> Duration {
        let current = self.delay;
        self.delay = (current * 2).min(MAX_BACKOFF);
        current
    }
}

pub(super) async fn ping(database: &Database) -> Result<(), MongoError> {
    database.run_command(doc! { "ping": 1 }).await.map(drop)
}

/// Open the configured database, pinging up to `config.connect_attempts` times.
pub(super) async fn open_database(config: &MongoConfig) -> MongoResult<Database> {
    let client = Client::with_options(config.options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(&config.database_name);
    let mut backoff = Backoff::new();
    let mut attempt = 1;

    loop {
        match ping(&database).await {
            Ok(()) => {
                debug!(database = %config.database_name, attempt, "tracker database reachable");
                return Ok(database);
            }
            Err(source) if attempt >= config.connect_attempts => {
                return Err(MongoDaoError::InitialPing {
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                let delay = backoff.step();
                debug!(attempt, ?delay, error = %err, "tracker database ping failed; retrying");
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_until_the_ceiling() {
        let mut backoff = Backoff::new();
        let delays: Vec<_> = (0..7).map(|_| backoff.step()).collect();
        assert_eq!(
            delays,
            [250, 500, 1_000, 2_000, 4_000, 5_000, 5_000].map(Duration::from_millis)
        );
    }
}
