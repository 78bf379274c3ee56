//! 记忆层：会话状态（临时）、长期记忆（持久）、JSON 文档持久化、LLM 消息

pub mod long_term;
pub mod manager;
pub mod message;
pub mod persistence;
pub mod session;

pub use long_term::{DecisionRecord, LongTermMemory, TaskRecord};
pub use manager::{StateManager, MEMORY_FILE, STATE_FILE};
pub use message::{Message, Role};
pub use persistence::JsonDocument;
pub use session::SessionState;
