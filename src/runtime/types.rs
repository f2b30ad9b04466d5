use serde::Serialize;

/// Outcome of a replay.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionSummary {
    /// Instances that ran to completion.
    pub instances: usize,
    pub invocations: usize,
    /// Element ids handed back by the tools, in call order.
    pub element_ids: Vec<String>,
}
