use serde_json::Value;

use super::metadata::{FlowParameterSchema, ParameterKind, ParameterMetadata, ValidationReport};
use crate::flow::FlowParameters;

/// 校验参数是否符合 flow 的参数 schema
///
/// Every offending parameter is reported on its own; validation never stops
/// at the first problem.
pub fn validate_parameters(
    parameters: &FlowParameters,
    schema: &FlowParameterSchema,
) -> ValidationReport {
    let mut errors = Vec::new();

    for (name, value) in parameters.iter() {
        if value.is_null() {
            continue;
        }
        let Some(definition) = schema.parameter(name) else {
            errors.push(format!("Unknown parameter: {name}"));
            continue;
        };
        if let Some(message) = check_kind(definition, value) {
            errors.push(message);
        }
    }

    for definition in &schema.parameters {
        if definition.required
            && definition.default_value.is_none()
            && !parameters.contains(&definition.name)
        {
            errors.push(format!("Required parameter {} is missing", definition.name));
        }
    }

    ValidationReport::from_errors(errors)
}

fn check_kind(definition: &ParameterMetadata, value: &Value) -> Option<String> {
    let name = &definition.name;
    let matches = match definition.kind {
        ParameterKind::Number => value.is_number(),
        ParameterKind::String => value.is_string(),
        ParameterKind::Boolean => value.is_boolean(),
        ParameterKind::Enum => {
            let Some(allowed) = definition.enum_values.as_ref() else {
                return None;
            };
            let ok = value
                .as_str()
                .map(|candidate| allowed.iter().any(|v| v == candidate))
                .unwrap_or(false);
            if !ok {
                return Some(format!(
                    "Parameter {name} must be one of: {}",
                    allowed.join(", ")
                ));
            }
            true
        }
    };
    if matches {
        None
    } else {
        Some(format!(
            "Parameter {name} must be a {}",
            definition.kind.as_str()
        ))
    }
}
