use mongodb::error::Error as MongoError;
use thiserror::Error;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// `MONGO_URI` is not set.
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// URI as configured.
        uri: String,
        /// Driver failure.
        #[source]
        source: MongoError,
    },
    /// The driver refused the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver failure.
        #[source]
        source: MongoError,
    },
    /// The database never answered while connecting.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Pings attempted.
        attempts: u32,
        /// Driver failure.
        #[source]
        source: MongoError,
    },
    /// A periodic health ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver failure.
        #[source]
        source: MongoError,
    },
    /// The unique ranking index could not be created.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Collection name.
        collection: &'static str,
        /// Indexed keys.
        index: &'static str,
        /// Driver failure.
        #[source]
        source: MongoError,
    },
    /// Writing a guild tracker failed.
    #[error("failed to save clash tracker of guild `{guild_id}`")]
    SaveGuildGame {
        /// Guild of the tracker.
        guild_id: u64,
        /// Driver failure.
        #[source]
        source: MongoError,
    },
    /// Reading a guild tracker failed.
    #[error("failed to load clash tracker of guild `{guild_id}`")]
    LoadGuildGame {
        /// Guild of the tracker.
        guild_id: u64,
        /// Driver failure.
        #[source]
        source: MongoError,
    },
    /// The atomic win increment failed.
    #[error("failed to update ranking of user `{user_id}` in guild `{guild_id}`")]
    IncrementWins {
        /// Guild of the ranking.
        guild_id: u64,
        /// Credited user.
        user_id: u64,
        /// Driver failure.
        #[source]
        source: MongoError,
    },
    /// The upsert returned no document.
    #[error("increment of user `{user_id}` in guild `{guild_id}` returned no document")]
    MissingRanking {
        /// Guild of the ranking.
        guild_id: u64,
        /// Credited user.
        user_id: u64,
    },
    /// Reading rankings failed.
    #[error("failed to load rankings of guild `{guild_id}`")]
    LoadRankings {
        /// Guild of the rankings.
        guild_id: u64,
        /// Driver failure.
        #[source]
        source: MongoError,
    },
}
