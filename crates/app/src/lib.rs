//! # airmon-app
//!
//! Application layer: the monitor's entities and the **port definitions**
//! (traits) they run against.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters implement:
//!   - `DeviceClient`: status, identity and commands of one monitor
//!   - `Integration` / `IntegrationContext`: lifecycle and registration
//!   - `EventPublisher`: fan-out of domain events
//! - Hold the **shared status cache** and the per-entity availability flag
//! - Implement the four entity kinds (air quality, sensor, number, switch)
//!   and build the set a model exposes
//! - Drive the entities from **background poll loops** and keep an
//!   in-memory registry of their snapshots
//!
//! ## Dependency rule
//! Depends on `airmon-domain` only (plus `tokio` for channels, locks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod availability;
pub mod entities;
pub mod event_bus;
pub mod platform;
pub mod poller;
pub mod ports;
pub mod services;
pub mod status_cache;
