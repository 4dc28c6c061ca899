//! Application services — use-case implementations.
//!
//! Services accept port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod device_registry;
pub mod fan_device;
pub mod fan_service;
pub mod telemetry;
