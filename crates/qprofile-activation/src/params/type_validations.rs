//! Built-in parameter type validation.

use qprofile_core::constants::MULTI_VALUE_SEPARATOR;
use qprofile_core::traits::{InvalidValue, ParamValidator};
use qprofile_core::types::{ParamKind, ParamType, RuleParam};

/// Validates values against the param kinds the catalog declares.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeValidations;

impl TypeValidations {
    pub fn new() -> Self {
        Self
    }

    /// Validate a single (already split) value.
    pub fn validate_value(param_type: &ParamType, value: &str) -> Result<(), InvalidValue> {
        match param_type.kind {
            ParamKind::String | ParamKind::Text => Ok(()),
            ParamKind::Integer => value
                .trim()
                .parse::<i64>()
                .map(|_| ())
                .map_err(|_| InvalidValue::new(format!("Value '{value}' must be an integer."))),
            ParamKind::Float => value
                .trim()
                .parse::<f64>()
                .map(|_| ())
                .map_err(|_| InvalidValue::new(format!("Value '{value}' must be a floating point number."))),
            ParamKind::Boolean => match value.trim() {
                "true" | "false" => Ok(()),
                _ => Err(InvalidValue::new(format!(
                    "Value '{value}' must be one of : true,false."
                ))),
            },
            ParamKind::SingleSelectList => {
                if param_type.values.iter().any(|allowed| allowed == value.trim()) {
                    Ok(())
                } else {
                    Err(InvalidValue::new(format!(
                        "Value '{value}' must be one of : {}.",
                        param_type.values.join(", ")
                    )))
                }
            }
        }
    }
}

impl ParamValidator for TypeValidations {
    fn validate(&self, param: &RuleParam, value: &str) -> Result<(), InvalidValue> {
        let param_type = &param.param_type;
        if param_type.multiple {
            value
                .split(MULTI_VALUE_SEPARATOR)
                .try_for_each(|item| Self::validate_value(param_type, item))
        } else {
            Self::validate_value(param_type, value)
        }
    }
}
