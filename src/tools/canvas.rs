use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::flow::ToolPayload;

use super::registry::ToolRegistry;
use super::tool::Tool;

/// Tools that act on an existing element and hand its id back.
const ELEMENT_TOOLS: [&str; 4] = ["move", "moveTo", "deleteElement", "editStroke"];

/// One call received by the [`RecordingCanvas`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CanvasCall {
    pub tool: String,
    pub payload: Value,
    pub element_id: Option<String>,
}

/// In-memory stand-in for the drawing surface. Records every call and
/// hands out sequential element ids, which makes replays observable in
/// tests and in `canvasflow run`.
#[derive(Default)]
pub struct RecordingCanvas {
    calls: Mutex<Vec<CanvasCall>>,
    next_id: AtomicU64,
}

impl RecordingCanvas {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<CanvasCall> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Registers every built-in tool name against this canvas.
    pub fn install(self: &Arc<Self>, registry: &ToolRegistry) {
        for name in ToolPayload::KNOWN_TOOLS {
            registry.register(Arc::new(CanvasTool {
                name,
                canvas: Arc::clone(self),
            }));
        }
    }

    fn record(&self, tool: &str, payload: &ToolPayload) -> Option<String> {
        let element_id = if ELEMENT_TOOLS.contains(&tool) {
            payload
                .field("elementId")
                .and_then(|value| value.as_str().map(str::to_string))
        } else {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            Some(format!("el_{id}"))
        };
        self.calls.lock().push(CanvasCall {
            tool: tool.to_string(),
            payload: payload.to_value(),
            element_id: element_id.clone(),
        });
        element_id
    }
}

struct CanvasTool {
    name: &'static str,
    canvas: Arc<RecordingCanvas>,
}

#[async_trait]
impl Tool for CanvasTool {
    fn name(&self) -> &str {
        self.name
    }

    async fn call(&self, payload: &ToolPayload) -> Result<Option<String>> {
        Ok(self.canvas.record(self.name, payload))
    }
}
