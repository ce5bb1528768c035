//! Session, polling, translation, and write-back engine for kwlbridge.
//!
//! This crate turns the raw device wire layer (`kwlbridge-api`) into a
//! living bridge between a Helios easyControls ventilation unit and a
//! path-keyed state store:
//!
//! - **[`Bridge`]** -- `start(config)` authenticates, runs one complete
//!   poll, then keeps a single event-loop task multiplexing the recurring
//!   poll, the proactive session refresh, the debounced post-401 re-login,
//!   the debounced post-write confirmation poll, and consumer write
//!   requests. [`BridgeHandle::stop`] cancels everything.
//!
//! - **[`StateStore`]** -- typed entries keyed by storage path, with
//!   idempotent creation, unconditional value overwrite, change broadcast,
//!   and the well-known `info.connection` connectivity flag. Every write
//!   carries an ack flag separating device-authoritative updates from
//!   consumer write requests.
//!
//! - **[`Translator`]** -- page body in, state writes out: type inference,
//!   catalog resolution, lazy entry creation.
//!
//! - **[`catalog`]** -- immutable identifier-to-metadata table for the
//!   documented easyControls variables, with a synthetic fallback for
//!   unknown identifiers.

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod error;
pub mod store;
pub mod translate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bridge::{Bridge, BridgeHandle};
pub use config::{BridgeConfig, COMPLETE_PAGES, DEFAULT_UPDATE_PAGES, MIN_POLL_INTERVAL, Timing};
pub use error::CoreError;
pub use store::{
    CONNECTIVITY_PATH, StateChange, StateEntry, StateMeta, StateStore, StateValue, ValueKind,
};
pub use translate::Translator;
