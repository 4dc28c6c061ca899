//! Entity — the observable side of a managed fan: its state and attributes.

mod attribute_value;
mod state;

use std::collections::BTreeMap;

pub use attribute_value::AttributeValue;
pub use state::EntityState;

/// Reported attributes keyed by public attribute name.
///
/// Ordering is for stable output only and carries no meaning.
pub type AttributeMap = BTreeMap<String, AttributeValue>;
