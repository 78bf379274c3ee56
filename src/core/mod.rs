//! 核心编排层：错误、任务上下文、生命周期阶段、编排器

pub mod context;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use context::{TaskContext, DEFAULT_TASK_TYPE};
pub use error::{AgentError, AgentResult};
pub use orchestrator::{reset_session, StatefulAgent, TaskSummary};
pub use state::AgentPhase;
