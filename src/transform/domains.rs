use serde_json::{Map, Number, Value};

use super::PayloadTransform;
use crate::flow::parameters::names;
use crate::flow::FlowParameters;

/// Position offsets, scale, color override and rotation.
pub struct VisualTransform;

impl PayloadTransform for VisualTransform {
    fn apply(&self, fields: &mut Map<String, Value>, parameters: &FlowParameters) {
        if let Some(dx) = parameters.number(names::X_OFFSET) {
            offset(fields, "x", dx);
        }
        if let Some(dy) = parameters.number(names::Y_OFFSET) {
            offset(fields, "y", dy);
        }

        if let Some(factor) = parameters.number(names::SCALE) {
            for key in ["size", "width", "height", "fontSize"] {
                if let Some(current) = fields.get(key).and_then(Value::as_f64) {
                    set_number(fields, key, current * factor);
                }
            }
        }

        if let Some(color) = parameters.get(names::COLOR) {
            for key in ["strokeColor", "backgroundColor"] {
                if let Some(slot) = fields.get_mut(key) {
                    *slot = color.clone();
                }
            }
        }

        // only payloads that carry an angle rotate; a null angle counts as 0
        if let Some(rotation) = parameters.number(names::ROTATION) {
            if let Some(angle) = fields.get("angle") {
                let angle = angle.as_f64().unwrap_or(0.0);
                set_number(fields, "angle", angle + rotation);
            }
        }
    }
}

/// Text templating, value offsets and enum overrides.
pub struct BusinessTransform;

impl PayloadTransform for BusinessTransform {
    fn apply(&self, fields: &mut Map<String, Value>, parameters: &FlowParameters) {
        if let Some(template) = parameters.text(names::TEXT_TEMPLATE) {
            if fields.contains_key("text") {
                let index = parameters
                    .get(names::INSTANCE_INDEX)
                    .map(render_index)
                    .unwrap_or_else(|| "0".to_string());
                let text = template.replacen("{index}", &index, 1);
                fields.insert("text".to_string(), Value::String(text));
            }
        }

        if let Some(delta) = parameters.number(names::VALUE_OFFSET) {
            offset(fields, "salary", delta);
        }

        if let Some(role) = parameters.get(names::ROLE_OVERRIDE) {
            if let Some(slot) = fields.get_mut("role") {
                *slot = role.clone();
            }
        }
    }
}

/// Stamps the instance index, when one was supplied.
pub struct GenericTransform;

impl PayloadTransform for GenericTransform {
    fn apply(&self, fields: &mut Map<String, Value>, parameters: &FlowParameters) {
        if let Some(index) = parameters.get(names::INSTANCE_INDEX) {
            fields.insert(names::INSTANCE_INDEX.to_string(), index.clone());
        }
    }
}

fn offset(fields: &mut Map<String, Value>, key: &str, delta: f64) {
    if let Some(current) = fields.get(key).and_then(Value::as_f64) {
        set_number(fields, key, current + delta);
    }
}

fn set_number(fields: &mut Map<String, Value>, key: &str, value: f64) {
    if let Some(number) = Number::from_f64(value) {
        fields.insert(key.to_string(), Value::Number(number));
    }
}

fn render_index(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => match number.as_f64() {
            Some(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
            _ => number.to_string(),
        },
        other => other.to_string(),
    }
}
