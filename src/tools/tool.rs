use async_trait::async_trait;

use crate::error::Result;
use crate::flow::ToolPayload;

/// A named operation on the canvas (or any other surface a flow drives).
///
/// `call` returns the identifier of the element the call created or
/// touched, when there is one.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    async fn call(&self, payload: &ToolPayload) -> Result<Option<String>>;
}

type Handler = dyn Fn(&ToolPayload) -> Result<Option<String>> + Send + Sync;

/// Wraps a plain function as a [`Tool`].
pub struct FnTool {
    name: String,
    handler: Box<Handler>,
}

impl FnTool {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ToolPayload) -> Result<Option<String>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Box::new(handler),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, payload: &ToolPayload) -> Result<Option<String>> {
        (self.handler)(payload)
    }
}
