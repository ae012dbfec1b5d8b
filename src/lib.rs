//! Clash of Code tracking for Discord guilds: hydration of CodinGame clashes,
//! per-guild game tracking with a start guard, win rankings and embeds.

/// Application configuration loading.
pub mod config;
/// Persistence backends and the CodinGame client.
pub mod dao;
/// Wire payloads: CodinGame responses and HTTP bodies.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Per-guild display strings.
pub mod localization;
/// HTTP route handlers.
pub mod routes;
/// Tracker, ranking and settlement flows.
pub mod services;
/// Shared application state and the hydrated clash model.
pub mod state;
