//! # airhub-domain
//!
//! Pure domain model for airhub, a bridge that exposes air purifiers,
//! humidifiers and fresh-air units as uniform fan entities.
//!
//! ## Responsibilities
//! - Foundational types: entity identifiers, error conventions, timestamps
//! - Define **Capabilities** (optional features a variant may support)
//! - Define **Variants** with their static capability, attribute and mode tables
//! - Resolve a vendor **model** string to its variant
//! - Define **Commands** (named actions and their argument domains)
//! - Define the outbound **fan snapshot**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod capability;
pub mod command;
pub mod entity;
pub mod fan;
pub mod model;
pub mod variant;
