//! Model identifiers and variant resolution.
//!
//! Exact model lists are consulted first; the family prefixes are the
//! fallback tier and resolve to the family's generic variant.

use crate::error::UnsupportedModelError;
use crate::variant::Variant;

pub const MODEL_AIRPURIFIER_V1: &str = "zhimi.airpurifier.v1";
pub const MODEL_AIRPURIFIER_V2: &str = "zhimi.airpurifier.v2";
pub const MODEL_AIRPURIFIER_V3: &str = "zhimi.airpurifier.v3";
pub const MODEL_AIRPURIFIER_V5: &str = "zhimi.airpurifier.v5";
pub const MODEL_AIRPURIFIER_PRO: &str = "zhimi.airpurifier.v6";
pub const MODEL_AIRPURIFIER_PRO_V7: &str = "zhimi.airpurifier.v7";
pub const MODEL_AIRPURIFIER_M1: &str = "zhimi.airpurifier.m1";
pub const MODEL_AIRPURIFIER_M2: &str = "zhimi.airpurifier.m2";
pub const MODEL_AIRPURIFIER_MA1: &str = "zhimi.airpurifier.ma1";
pub const MODEL_AIRPURIFIER_MA2: &str = "zhimi.airpurifier.ma2";
pub const MODEL_AIRPURIFIER_SA1: &str = "zhimi.airpurifier.sa1";
pub const MODEL_AIRPURIFIER_SA2: &str = "zhimi.airpurifier.sa2";
pub const MODEL_AIRPURIFIER_2S: &str = "zhimi.airpurifier.mc1";
pub const MODEL_AIRPURIFIER_2H: &str = "zhimi.airpurifier.mc2";
pub const MODEL_AIRPURIFIER_3: &str = "zhimi.airpurifier.ma4";
pub const MODEL_AIRPURIFIER_3H: &str = "zhimi.airpurifier.mb3";
pub const MODEL_AIRPURIFIER_3C: &str = "zhimi.airpurifier.mb4";

pub const MODEL_AIRHUMIDIFIER_V1: &str = "zhimi.humidifier.v1";
pub const MODEL_AIRHUMIDIFIER_CA1: &str = "zhimi.humidifier.ca1";
pub const MODEL_AIRHUMIDIFIER_CA4: &str = "zhimi.humidifier.ca4";
pub const MODEL_AIRHUMIDIFIER_CB1: &str = "zhimi.humidifier.cb1";

pub const MODEL_AIRFRESH_VA2: &str = "zhimi.airfresh.va2";

const PREFIX_AIRPURIFIER: &str = "zhimi.airpurifier.";
const PREFIX_HUMIDIFIER: &str = "zhimi.humidifier.";
const PREFIX_AIRFRESH: &str = "zhimi.airfresh.";

/// Models with a dedicated variant.
const EXACT_MODELS: &[(&str, Variant)] = &[
    (MODEL_AIRPURIFIER_3C, Variant::Purifier3C),
    (MODEL_AIRPURIFIER_3, Variant::Purifier3),
    (MODEL_AIRPURIFIER_3H, Variant::Purifier3),
    (MODEL_AIRPURIFIER_PRO, Variant::PurifierPro),
    (MODEL_AIRPURIFIER_PRO_V7, Variant::PurifierProV7),
    (MODEL_AIRPURIFIER_2S, Variant::Purifier2S),
    (MODEL_AIRPURIFIER_V3, Variant::PurifierV3),
    (MODEL_AIRHUMIDIFIER_CA4, Variant::HumidifierCa4),
    (MODEL_AIRHUMIDIFIER_CA1, Variant::HumidifierCaCb),
    (MODEL_AIRHUMIDIFIER_CB1, Variant::HumidifierCaCb),
];

/// Family namespaces and the generic variant they fall back to.
const FAMILY_PREFIXES: &[(&str, Variant)] = &[
    (PREFIX_AIRPURIFIER, Variant::PurifierGeneric),
    (PREFIX_HUMIDIFIER, Variant::HumidifierGeneric),
    (PREFIX_AIRFRESH, Variant::AirFresh),
];

/// Which tier of the lookup produced a [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    FamilyPrefix,
}

/// Result of resolving a model string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub variant: Variant,
    pub tier: MatchTier,
}

/// Resolve a model identifier to its variant.
///
/// # Errors
///
/// Returns [`UnsupportedModelError`] when the model is neither a known model
/// nor inside a known family namespace.
pub fn resolve(model: &str) -> Result<Resolution, UnsupportedModelError> {
    if let Some((_, variant)) = EXACT_MODELS.iter().find(|(known, _)| *known == model) {
        return Ok(Resolution {
            variant: *variant,
            tier: MatchTier::Exact,
        });
    }
    FAMILY_PREFIXES
        .iter()
        .find(|(prefix, _)| model.starts_with(*prefix))
        .map(|(_, variant)| Resolution {
            variant: *variant,
            tier: MatchTier::FamilyPrefix,
        })
        .ok_or_else(|| UnsupportedModelError {
            model: model.to_string(),
        })
}

/// Every model identifier listed in this module.
pub const KNOWN_MODELS: &[&str] = &[
    MODEL_AIRPURIFIER_V1,
    MODEL_AIRPURIFIER_V2,
    MODEL_AIRPURIFIER_V3,
    MODEL_AIRPURIFIER_V5,
    MODEL_AIRPURIFIER_PRO,
    MODEL_AIRPURIFIER_PRO_V7,
    MODEL_AIRPURIFIER_M1,
    MODEL_AIRPURIFIER_M2,
    MODEL_AIRPURIFIER_MA1,
    MODEL_AIRPURIFIER_MA2,
    MODEL_AIRPURIFIER_SA1,
    MODEL_AIRPURIFIER_SA2,
    MODEL_AIRPURIFIER_2S,
    MODEL_AIRPURIFIER_2H,
    MODEL_AIRPURIFIER_3,
    MODEL_AIRPURIFIER_3H,
    MODEL_AIRPURIFIER_3C,
    MODEL_AIRHUMIDIFIER_V1,
    MODEL_AIRHUMIDIFIER_CA1,
    MODEL_AIRHUMIDIFIER_CA4,
    MODEL_AIRHUMIDIFIER_CB1,
    MODEL_AIRFRESH_VA2,
];
