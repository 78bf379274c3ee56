//! 单步执行上下文：任务上下文 + 依赖结果 + 已处理步骤

use std::collections::BTreeMap;

use serde::Serialize;

use crate::actions::StepResult;
use crate::core::TaskContext;
use crate::plan::{Step, StepId};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionContext {
    #[serde(flatten)]
    pub task: TaskContext,
    /// 仅当步骤声明了依赖时存在：已完成且 id 在依赖集合内的结果
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_results: Option<BTreeMap<StepId, StepResult>>,
    /// 本次运行已处理过的步骤（不论成败）
    pub previous_steps: Vec<Step>,
}

/// 执行上下文自带的键；任务上下文里的同名键会被丢弃
pub const RESERVED_KEYS: &[&str] = &["dependency_results", "previous_steps"];

impl ExecutionContext {
    pub fn for_step(
        task: &TaskContext,
        step: &Step,
        results: &[StepResult],
        processed: &[Step],
    ) -> Self {
        let dependency_results =
            (!step.dependencies.is_empty()).then(|| dependency_results(step, results));
        let mut task = task.clone();
        for key in RESERVED_KEYS {
            if task.extra.remove(*key).is_some() {
                tracing::warn!("Context key '{}' is reserved, dropped", key);
            }
        }
        Self {
            task,
            dependency_results,
            previous_steps: processed.to_vec(),
        }
    }

    /// 供 prompt 嵌入的缩进 JSON
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// 过滤出 step 声明依赖、且已成功完成的前序结果
pub fn dependency_results(step: &Step, results: &[StepResult]) -> BTreeMap<StepId, StepResult> {
    results
        .iter()
        .filter(|r| r.is_completed() && step.depends_on(r.step_id))
        .map(|r| (r.step_id, r.clone()))
        .collect()
}
