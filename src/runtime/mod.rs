// 运行时执行引擎模块

mod executor;
mod types;

pub use executor::{FlowExecutor, DEFAULT_SPACING, DEFAULT_STEP_DELAY};
pub use types::ExecutionSummary;
