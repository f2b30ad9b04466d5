use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 参数值类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Number,
    String,
    Boolean,
    Enum,
}

impl ParameterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::Number => "number",
            ParameterKind::String => "string",
            ParameterKind::Boolean => "boolean",
            ParameterKind::Enum => "enum",
        }
    }
}

/// Selects which payload transform applies to a tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterDomain {
    Generic,
    Visual,
    Business,
    Custom,
}

/// 参数元数据
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    pub description: String,
    pub domain: ParameterDomain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

impl ParameterMetadata {
    pub fn new(
        name: impl Into<String>,
        kind: ParameterKind,
        description: impl Into<String>,
        domain: ParameterDomain,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            domain,
            enum_values: None,
            default_value: None,
            required: false,
        }
    }

    pub fn number(name: &str, description: &str, domain: ParameterDomain) -> Self {
        Self::new(name, ParameterKind::Number, description, domain)
    }

    pub fn string(name: &str, description: &str, domain: ParameterDomain) -> Self {
        Self::new(name, ParameterKind::String, description, domain)
    }

    pub fn boolean(name: &str, description: &str, domain: ParameterDomain) -> Self {
        Self::new(name, ParameterKind::Boolean, description, domain)
    }

    pub fn enumeration(
        name: &str,
        description: &str,
        domain: ParameterDomain,
        values: &[&str],
    ) -> Self {
        let mut meta = Self::new(name, ParameterKind::Enum, description, domain);
        meta.enum_values = Some(values.iter().map(|v| v.to_string()).collect());
        meta
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// What a particular flow can be parameterized by. Derived, never stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowParameterSchema {
    pub flow_id: String,
    pub flow_name: String,
    pub parameters: Vec<ParameterMetadata>,
    pub examples: Vec<String>,
}

impl FlowParameterSchema {
    pub fn parameter(&self, name: &str) -> Option<&ParameterMetadata> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn has_domain(&self, domain: ParameterDomain) -> bool {
        self.parameters.iter().any(|p| p.domain == domain)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn flow_not_found() -> Self {
        Self::from_errors(vec!["Flow not found".to_string()])
    }
}
