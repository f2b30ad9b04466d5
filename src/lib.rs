pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod manager;
pub mod runtime;
pub mod schema;
pub mod state;
pub mod tools;
pub mod transform;
pub mod utils;

pub use config::{EnvConfig, FlowConfig};
pub use error::{CanvasFlowError, Result};
pub use flow::{
    find_all_by_name, find_by_name, Flow, FlowParameters, FlowRecorder, FlowStep,
    ToolInvocation, ToolPayload,
};
pub use manager::FlowManager;
pub use runtime::{ExecutionSummary, FlowExecutor};
pub use schema::{
    validate_parameters, FlowParameterSchema, ParameterDiscovery, ParameterDomain,
    ParameterKind, ParameterMetadata, ParameterSchemaRegistry, SharedSchemaRegistry,
    ValidationReport,
};
pub use state::{ContextStore, FileStore, FlowStore, MemoryStore};
pub use tools::{CanvasCall, FnTool, RecordingCanvas, Tool, ToolRegistry};
pub use transform::{ParameterTransformer, PayloadTransform};
pub use utils::{InputValidator, LoggingConfig};
