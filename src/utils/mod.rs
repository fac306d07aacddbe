//! Cross-cutting helpers for headline-cache.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and secret redaction.
//! - `queue`: The global rate-limited request queue.
//! - `throttle`: Cooldown gate opened by upstream throttling.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
pub mod queue;
pub mod throttle;
