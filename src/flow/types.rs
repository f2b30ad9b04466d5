use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payload::ToolPayload;

// Flow 核心类型定义

pub fn flow_id() -> String {
    format!("flow_{}", uuid::Uuid::new_v4().simple())
}

pub fn step_id() -> String {
    format!("step_{}", uuid::Uuid::new_v4().simple())
}

/// 录制的工作流
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Vec<FlowStep>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
}

impl Flow {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: flow_id(),
            name: name.into(),
            description: None,
            steps: Vec::new(),
            created_at: now,
            updated_at: now,
            is_published: false,
            workspace_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_step(mut self, step: FlowStep) -> Self {
        self.steps.push(step);
        self
    }

    /// All recorded invocations in replay order.
    pub fn invocations(&self) -> impl Iterator<Item = &ToolInvocation> {
        self.steps.iter().flat_map(|step| step.tools_used.iter())
    }
}

/// 一次用户请求产生的工具调用
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowStep {
    pub id: String,
    #[serde(default)]
    pub user_message: String,
    #[serde(default)]
    pub assistant_response: String,
    pub tools_used: Vec<ToolInvocation>,
    pub timestamp: DateTime<Utc>,
}

impl FlowStep {
    pub fn new(
        user_message: impl Into<String>,
        assistant_response: impl Into<String>,
        tools_used: Vec<ToolInvocation>,
    ) -> Self {
        Self {
            id: step_id(),
            user_message: user_message.into(),
            assistant_response: assistant_response.into(),
            tools_used,
            timestamp: Utc::now(),
        }
    }
}

/// A recorded tool call. `element_id` is a read-only copy of the identifier
/// the canvas handed back when the call was first made.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawInvocation", into = "RawInvocation")]
pub struct ToolInvocation {
    pub tool: String,
    pub payload: ToolPayload,
    pub element_id: Option<String>,
}

impl ToolInvocation {
    pub fn new(tool: impl Into<String>, payload: serde_json::Value) -> Self {
        let tool = tool.into();
        let payload = ToolPayload::from_value(&tool, payload);
        Self {
            tool,
            payload,
            element_id: None,
        }
    }

    pub fn with_element_id(mut self, element_id: impl Into<String>) -> Self {
        self.element_id = Some(element_id.into());
        self
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInvocation {
    tool: String,
    #[serde(default)]
    payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    element_id: Option<String>,
}

impl From<RawInvocation> for ToolInvocation {
    fn from(raw: RawInvocation) -> Self {
        let payload = ToolPayload::from_value(&raw.tool, raw.payload);
        Self {
            tool: raw.tool,
            payload,
            element_id: raw.element_id,
        }
    }
}

impl From<ToolInvocation> for RawInvocation {
    fn from(invocation: ToolInvocation) -> Self {
        Self {
            payload: invocation.payload.to_value(),
            tool: invocation.tool,
            element_id: invocation.element_id,
        }
    }
}
