// 工具调用面：按名称注册与调用

pub mod canvas;
pub mod registry;
pub mod tool;

pub use canvas::{CanvasCall, RecordingCanvas};
pub use registry::ToolRegistry;
pub use tool::{FnTool, Tool};
