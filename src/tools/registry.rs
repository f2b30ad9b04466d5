use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::Result;
use crate::flow::ToolPayload;
use crate::tools::tool::{FnTool, Tool};

/// Tool name → handler. Tools can be added at any time; a later
/// registration under the same name replaces the earlier one.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, tool: Arc<dyn Tool>) {
        debug!(tool = %tool.name(), "registered tool");
        self.tools.write().insert(tool.name().to_string(), tool);
    }

    pub fn register_fn<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&ToolPayload) -> Result<Option<String>> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnTool::new(name, handler)));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().get(name).map(Arc::clone)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Calls a tool by name. An unregistered name is a logged no-op.
    pub async fn invoke(&self, name: &str, payload: &ToolPayload) -> Result<Option<String>> {
        let Some(tool) = self.get(name) else {
            warn!(tool = %name, "unknown tool, skipping");
            return Ok(None);
        };
        tool.call(payload).await
    }
}
