//! # airhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `VendorDevice` — blocking calls into the device-control library
//!   - `DeviceConnector` — opens vendor handles for configured devices
//!   - `StatePublisher` — receives fan snapshots
//! - Dispatch commands to a single device (`FanDevice`): capability gate,
//!   argument check, one vendor call on the blocking pool
//! - Project raw telemetry onto each variant's attribute table
//! - Orchestrate setup, polling and named-service broadcast (`FanService`)
//! - Provide **in-process infrastructure** (state bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `airhub-domain` only (plus `tokio` for channels and the
//! blocking pool). Never imports adapter crates. Adapters depend on *this*
//! crate, not the reverse.

pub mod ports;
pub mod services;
pub mod state_bus;
