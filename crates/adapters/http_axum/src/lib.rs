//! # airhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** over the managed fans (`/api/fans`, …) and the
//!   named remote-control services (`/api/services/{service}`)
//! - Map HTTP requests into [`FanService`](airhub_app::services::fan_service::FanService)
//!   calls (driving adapter)
//! - Map outcomes and errors into JSON responses with matching status codes
//!
//! ## Dependency rule
//! Depends on `airhub-app` (for port traits and services) and `airhub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
