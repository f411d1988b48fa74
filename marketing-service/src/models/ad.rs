//! Advertisement record served by `/ad`.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// A short ATM advertisement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AdMessage {
    #[validate(length(min = 5, max = 100))]
    pub title: String,

    #[validate(length(min = 10, max = 300))]
    pub description: String,

    /// Minimum purchase amount that qualifies for the reward.
    pub min_purchase: f64,

    #[validate(length(min = 1))]
    pub reward: String,
}

static FALLBACK_AD: Lazy<AdMessage> = Lazy::new(|| AdMessage {
    title: "ATM Promotion!".to_string(),
    description: "Make purchases of at least 500 lei and you could win a vacation in Dubai!"
        .to_string(),
    min_purchase: 500.0,
    reward: "vacation in Dubai".to_string(),
});

/// The static ad served whenever generation is off or fails.
pub fn fallback_ad() -> &'static AdMessage {
    &FALLBACK_AD
}

/// Why a loosely-typed mapping could not become an [`AdMessage`].
#[derive(Debug, Error)]
pub enum AdCoercionError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

impl AdMessage {
    /// Coerce a JSON object into a validated ad.
    ///
    /// Text fields must be strings. `min_purchase` may be a number or a
    /// numeric string. Anything else is rejected rather than guessed at.
    pub fn from_mapping(map: &Map<String, Value>) -> Result<Self, AdCoercionError> {
        let ad = AdMessage {
            title: string_field(map, "title")?,
            description: string_field(map, "description")?,
            min_purchase: number_field(map, "min_purchase")?,
            reward: string_field(map, "reward")?,
        };
        ad.validate()?;
        Ok(ad)
    }

    /// JSON schema handed to the model as its required output shape.
    pub fn json_schema() -> Value {
        json!({
            "type": "object",
            "title": "AdMessage",
            "properties": {
                "title": { "type": "string", "minLength": 5, "maxLength": 100 },
                "description": { "type": "string", "minLength": 10, "maxLength": 300 },
                "min_purchase": { "type": "number" },
                "reward": { "type": "string", "minLength": 1 }
            },
            "required": ["title", "description", "min_purchase", "reward"]
        })
    }
}

fn string_field(map: &Map<String, Value>, field: &'static str) -> Result<String, AdCoercionError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(AdCoercionError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(AdCoercionError::InvalidType {
            field,
            expected: "a string",
        }),
    }
}

fn number_field(map: &Map<String, Value>, field: &'static str) -> Result<f64, AdCoercionError> {
    let invalid = AdCoercionError::InvalidType {
        field,
        expected: "a finite number",
    };

    let value = match map.get(field) {
        None | Some(Value::Null) => return Err(AdCoercionError::MissingField(field)),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(invalid),
    }
}
