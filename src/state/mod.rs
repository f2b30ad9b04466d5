// 状态管理模块

mod flows;
mod store;

pub use flows::FlowStore;
#[cfg(feature = "redis-store")]
pub use store::redis::RedisStore;
pub use store::{ContextStore, FileStore, MemoryStore};
