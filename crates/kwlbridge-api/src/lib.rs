//! Async HTTP client for the Helios easyControls ventilation interface.
//!
//! The device exposes its state through a proprietary HTTP+XML polling
//! interface: form-encoded POSTs for login and commands, and numbered
//! XML "pages" (`/data/werte<N>.xml`) batching key/value readings.
//!
//! This crate owns the wire layer only:
//!
//! - **[`DeviceClient`]** -- login, page fetch, and variable write, with
//!   device status codes mapped into the typed [`Error`] taxonomy.
//! - **[`TransportConfig`]** -- keep-alive `reqwest::Client` construction
//!   with the fixed header set the embedded firmware expects.
//! - **[`page::scan`]** -- token scanner for the flat `<ID>`/`<VA>` pair
//!   grammar of a page body, and the [`VarId`] identifier type.
//!
//! Polling policy, state translation, and write-back logic live in
//! `kwlbridge-core`.

pub mod client;
pub mod error;
pub mod page;
pub mod transport;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::DeviceClient;
pub use error::Error;
pub use page::VarId;
pub use transport::TransportConfig;
