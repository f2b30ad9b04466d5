use tracing::debug;

use super::types::{Flow, FlowStep, ToolInvocation};

/// Name given to a draft until the user names it on save.
pub const DRAFT_NAME: &str = "Untitled flow";

/// 录制状态：录制期间每次成功的工具调用都会追加为一个步骤
#[derive(Debug, Default)]
pub struct FlowRecorder {
    current: Option<Flow>,
}

impl FlowRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a fresh draft. A draft already in progress is dropped.
    pub fn start(&mut self) -> &Flow {
        if let Some(previous) = self.current.take() {
            debug!(flow_id = %previous.id, "discarding unfinished recording");
        }
        self.current.insert(Flow::new(DRAFT_NAME))
    }

    pub fn is_recording(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&Flow> {
        self.current.as_ref()
    }

    /// Appends a step. Ignored when not recording or when the request had
    /// no tool effects.
    pub fn record_step(
        &mut self,
        user_message: impl Into<String>,
        assistant_response: impl Into<String>,
        tools_used: Vec<ToolInvocation>,
    ) -> bool {
        let Some(flow) = self.current.as_mut() else {
            return false;
        };
        if tools_used.is_empty() {
            return false;
        }
        let step = FlowStep::new(user_message, assistant_response, tools_used);
        flow.updated_at = step.timestamp.max(flow.updated_at);
        flow.steps.push(step);
        debug!(flow_id = %flow.id, steps = flow.steps.len(), "recorded flow step");
        true
    }

    /// Ends recording and hands back the draft, if it captured anything.
    pub fn stop(&mut self) -> Option<Flow> {
        self.current.take().filter(|flow| !flow.steps.is_empty())
    }

    pub fn discard(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square() -> ToolInvocation {
        ToolInvocation::new("drawSquare", json!({"x": 0, "y": 0, "size": 10}))
    }

    #[test]
    fn records_only_while_recording() {
        let mut recorder = FlowRecorder::new();
        assert!(!recorder.record_step("draw", "ok", vec![square()]));

        recorder.start();
        assert!(recorder.record_step("draw", "ok", vec![square()]));
        assert!(!recorder.record_step("hello", "hi", Vec::new()));

        let flow = recorder.stop().unwrap();
        assert_eq!(flow.steps.len(), 1);
        assert!(!recorder.is_recording());
    }

    #[test]
    fn empty_recording_yields_nothing() {
        let mut recorder = FlowRecorder::new();
        recorder.start();
        assert!(recorder.stop().is_none());
    }
}
