/// CodinGame API client fetching clashes by handle.
pub mod codingame;
/// Persisted row definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
/// Tracker and ranking persistence backends.
pub mod tracker_store;
