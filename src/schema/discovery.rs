use std::collections::HashSet;

use tracing::debug;

use super::metadata::{FlowParameterSchema, ParameterDomain, ParameterMetadata};
use super::registry::SharedSchemaRegistry;
use crate::flow::Flow;

/// Works out what a recorded flow can be parameterized by.
#[derive(Clone)]
pub struct ParameterDiscovery {
    registry: SharedSchemaRegistry,
}

impl ParameterDiscovery {
    pub fn new(registry: SharedSchemaRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SharedSchemaRegistry {
        &self.registry
    }

    /// Generic parameters followed by the parameters of every tool the flow
    /// uses, in first-seen order. A name is only added once.
    pub fn discover(&self, flow: &Flow) -> FlowParameterSchema {
        let registry = self.registry.read();
        let mut parameters: Vec<ParameterMetadata> = registry.generic().to_vec();
        let mut seen: HashSet<String> = parameters.iter().map(|p| p.name.clone()).collect();
        let mut used_tools: Vec<&str> = Vec::new();

        for invocation in flow.invocations() {
            let tool = invocation.tool.as_str();
            if used_tools.contains(&tool) {
                continue;
            }
            used_tools.push(tool);

            let Some(tool_parameters) = registry.get(tool) else {
                debug!(tool, flow_id = %flow.id, "no parameter schema registered for tool");
                continue;
            };
            for parameter in tool_parameters {
                if seen.insert(parameter.name.clone()) {
                    parameters.push(parameter.clone());
                }
            }
        }

        let examples = generate_examples(&flow.name, &parameters, &used_tools);
        FlowParameterSchema {
            flow_id: flow.id.clone(),
            flow_name: flow.name.clone(),
            parameters,
            examples,
        }
    }
}

fn generate_examples(
    flow_name: &str,
    parameters: &[ParameterMetadata],
    used_tools: &[&str],
) -> Vec<String> {
    let mut examples: Vec<String> = Vec::new();
    let mut push = |suffix: &str| {
        let example = format!("{flow_name} {suffix}");
        if !examples.contains(&example) {
            examples.push(example);
        }
    };

    push("5 times");
    push("with high priority");

    let has_domain = |domain: ParameterDomain| parameters.iter().any(|p| p.domain == domain);
    if has_domain(ParameterDomain::Visual) {
        push("in red");
        push("at position 100, 200");
        push("twice as large");
    }
    if has_domain(ParameterDomain::Business) {
        push("for admin users");
        push("with custom text");
    }

    let uses = |tool: &str| used_tools.contains(&tool);
    if uses("addText") {
        push("with different text");
    }
    if uses("createUser") {
        push("for different roles");
    }
    if uses("sendEmail") {
        push("with high priority");
    }

    examples
}
