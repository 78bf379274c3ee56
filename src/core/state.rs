//! 任务生命周期阶段
//!
//! 单次任务严格按 Idle → Planning → Executing → Finalizing → Idle 推进，同一次运行内不重入。

use serde::Serialize;

/// Agent 阶段
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentPhase {
    #[default]
    Idle,
    Planning,
    Executing,
    Finalizing,
}

impl std::fmt::Display for AgentPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentPhase::Idle => write!(f, "idle"),
            AgentPhase::Planning => write!(f, "planning"),
            AgentPhase::Executing => write!(f, "executing"),
            AgentPhase::Finalizing => write!(f, "finalizing"),
        }
    }
}
