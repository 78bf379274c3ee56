//! 长期记忆（持久）：历史任务、学到的模式、用户偏好、决策记录，跨会话累积
//!
//! 除 user_preferences（键唯一、后写覆盖）外只追加不修改。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::actions::StepResult;
use crate::plan::Plan;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LongTermMemory {
    #[serde(default)]
    pub past_tasks: Vec<TaskRecord>,
    #[serde(default)]
    pub learned_patterns: Map<String, Value>,
    #[serde(default)]
    pub user_preferences: Map<String, Value>,
    #[serde(default)]
    pub decisions: Vec<DecisionRecord>,
}

/// 完成任务的记录；finalize 时创建一次，之后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub plan: Plan,
    pub results: Vec<StepResult>,
    /// 取值 [0, 1]
    pub success_rate: f64,
    pub session_id: Option<String>,
    /// 由 StateManager::add_completed_task 写入
    #[serde(default)]
    pub completed_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub timestamp: String,
    pub decision: String,
    pub reasoning: String,
    #[serde(default)]
    pub context: Value,
}
