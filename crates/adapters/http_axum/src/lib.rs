//! # airmon-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Routes
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `GET` | `/health` | Liveness check |
//! | `GET` | `/api/device` | The registered monitor |
//! | `GET` | `/api/entities` | Every entity snapshot |
//! | `GET` | `/api/entities/{id}` | One entity snapshot |
//! | `POST` | `/api/entities/{id}/services/{service}` | `turn_on`, `turn_off`, `set_value`, `update` |
//! | `GET` | `/api/events/stream` | Server-Sent Events of domain events |
//!
//! ## Dependency rule
//! Depends on `airmon-app` (registry, event bus, `Integration` port) and
//! `airmon-domain`. Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
