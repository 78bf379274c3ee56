//! 会话状态（临时）：当前任务、计划、已完成 / 待完成步骤、上下文、会话 id

use serde::{Deserialize, Serialize};

use crate::core::TaskContext;
use crate::plan::{Plan, Step};

/// 顶层字段名，update_state / get_state 按这些键寻址
pub const SESSION_KEYS: &[&str] = &[
    "current_task",
    "plan",
    "completed_steps",
    "pending_steps",
    "context",
    "session_id",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub current_task: Option<String>,
    pub plan: Option<Plan>,
    #[serde(default)]
    pub completed_steps: Vec<Step>,
    #[serde(default)]
    pub pending_steps: Vec<Step>,
    #[serde(default)]
    pub context: TaskContext,
    pub session_id: Option<String>,
}
