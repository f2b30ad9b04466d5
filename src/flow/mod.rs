// Flow 模块 - 录制的工作流及其参数

pub mod matcher;
pub mod parameters;
pub mod payload;
pub mod recorder;
pub mod types;

// 重新导出核心类型
pub use matcher::{find_all_by_name, find_by_name};
pub use parameters::FlowParameters;
pub use payload::ToolPayload;
pub use recorder::FlowRecorder;
pub use types::{Flow, FlowStep, ToolInvocation};
