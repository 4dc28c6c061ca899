//! Telemetry projection — raw vendor status to reported attributes.

use airhub_domain::entity::{AttributeMap, AttributeValue};
use airhub_domain::variant::VariantSpec;

use crate::ports::RawStatus;

/// Attribute key carrying the model string.
pub const MODEL_ATTRIBUTE: &str = "model";
/// Attribute key carrying the raw operation mode.
pub const MODE_ATTRIBUTE: &str = "mode";

/// Project `status` onto the attribute table of `spec`.
///
/// Every declared attribute is present in the result. Fields the status
/// lacks are reported as null; symbolic values are reduced to their
/// underlying scalar.
#[must_use]
pub fn project(spec: &VariantSpec, status: &RawStatus) -> AttributeMap {
    spec.attributes
        .iter()
        .map(|(name, field)| {
            let value = status
                .fields
                .get(*field)
                .cloned()
                .map_or(AttributeValue::Null, |raw| raw.into_attribute());
            ((*name).to_string(), value)
        })
        .collect()
}

/// Attributes a device reports before its first successful poll.
#[must_use]
pub fn initial_attributes(spec: &VariantSpec, model: &str) -> AttributeMap {
    let mut attributes: AttributeMap = spec
        .attributes
        .iter()
        .map(|(name, _)| ((*name).to_string(), AttributeValue::Null))
        .collect();
    attributes.insert(MODEL_ATTRIBUTE.to_string(), AttributeValue::from(model));
    attributes
}

#[cfg(test)]
mod tests {
    use airhub_domain::variant::Variant;

    use super::*;
    use crate::ports::{RawValue, SymbolValue};

    #[test]
    fn should_report_every_declared_attribute() {
        for variant in Variant::ALL {
            let spec = variant.spec();
            let projected = project(spec, &RawStatus::new(true));
            assert_eq!(projected.len(), spec.attributes.len(), "{variant}");
            assert!(projected.values().all(AttributeValue::is_null), "{variant}");
        }
    }

    #[test]
    fn should_read_renamed_fields_on_purifier_3c() {
        let status = RawStatus::new(true)
            .with("favorite_rpm", RawValue::Int(1200))
            .with(
                "led_brightness_level",
                RawValue::Symbol {
                    name: "Dim".to_string(),
                    value: SymbolValue::Int(1),
                },
            )
            .with("favorite_level", RawValue::Int(99));
        let projected = project(Variant::Purifier3C.spec(), &status);
        assert_eq!(projected["favorite_level"], AttributeValue::Int(1200));
        assert_eq!(projected["led_brightness"], AttributeValue::Int(1));
    }

    #[test]
    fn should_project_purifier_3_status_with_partial_fields() {
        let status = RawStatus::new(true)
            .with("aqi", RawValue::Int(12))
            .with(
                "mode",
                RawValue::Symbol {
                    name: "Auto".to_string(),
                    value: SymbolValue::Int(0),
                },
            )
            .with("unrelated", RawValue::Bool(true));
        let projected = project(Variant::Purifier3.spec(), &status);

        assert_eq!(projected["aqi"], AttributeValue::Int(12));
        assert_eq!(projected["mode"], AttributeValue::Int(0));
        assert!(projected["temperature"].is_null());
        assert!(!projected.contains_key("unrelated"));
    }

    #[test]
    fn should_seed_initial_attributes_with_model() {
        let attributes =
            initial_attributes(Variant::AirFresh.spec(), "zhimi.airfresh.va2");
        assert_eq!(
            attributes[MODEL_ATTRIBUTE],
            AttributeValue::from("zhimi.airfresh.va2")
        );
        assert!(attributes["co2"].is_null());
        assert_eq!(attributes.len(), Variant::AirFresh.spec().attributes.len() + 1);
    }
}
