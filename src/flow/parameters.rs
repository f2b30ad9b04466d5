use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CanvasFlowError, Result};

/// 参数名常量
pub mod names {
    // generic
    pub const COUNT: &str = "count";
    pub const SPACING: &str = "spacing";
    pub const DELAY: &str = "delay";
    pub const CONDITION: &str = "condition";
    pub const PRIORITY: &str = "priority";

    // visual
    pub const X_OFFSET: &str = "xOffset";
    pub const Y_OFFSET: &str = "yOffset";
    pub const SCALE: &str = "scale";
    pub const COLOR: &str = "color";
    pub const ROTATION: &str = "rotation";

    // business
    pub const TEXT_TEMPLATE: &str = "textTemplate";
    pub const INSTANCE_INDEX: &str = "instanceIndex";
    pub const VALUE_OFFSET: &str = "valueOffset";
    pub const ROLE_OVERRIDE: &str = "roleOverride";

    pub const FLOW_NAME: &str = "flowName";
}

/// Free-form replay parameters, as extracted from a chat request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowParameters(Map<String, Value>);

impl FlowParameters {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::new()),
            other => Err(CanvasFlowError::Other(anyhow::anyhow!(
                "flow parameters must be a JSON object, got `{other}`"
            ))),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    /// A supplied value. Explicit `null` counts as not supplied.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn count(&self) -> Option<f64> {
        self.number(names::COUNT)
    }

    pub fn spacing(&self) -> Option<f64> {
        self.number(names::SPACING)
    }

    pub fn delay(&self) -> Option<f64> {
        self.number(names::DELAY)
    }

    pub fn x_offset(&self) -> Option<f64> {
        self.number(names::X_OFFSET)
    }

    pub fn y_offset(&self) -> Option<f64> {
        self.number(names::Y_OFFSET)
    }
}

impl From<Map<String, Value>> for FlowParameters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
