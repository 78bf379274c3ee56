//! Agent 编排器：plan → execute → finalize 三阶段生命周期
//!
//! 严格顺序执行，不并发、不重试。计划顺序即执行顺序，依赖只用来挑出前序结果拼进上下文。
//! 单步失败在步骤边界被转为 failed 结果，不会中断整次运行；只有规划阶段模型调用失败
//! 或持久化失败才会让 run_task 返回 Err。

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::actions::{ActionExecutor, ExecutionContext, StepResult};
use crate::config::AppConfig;
use crate::core::{AgentPhase, AgentResult, TaskContext};
use crate::llm::{create_llm_from_config, LlmClient};
use crate::memory::{StateManager, TaskRecord};
use crate::plan::{Plan, Step, TaskPlanner};
use crate::trace::{DecisionTraceEntry, DecisionTracer};

/// 一次任务运行的汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub task: String,
    pub goal: String,
    pub total_steps: usize,
    pub successful_steps: usize,
    pub failed_steps: usize,
    pub success_rate: f64,
    pub results: Vec<StepResult>,
    pub decision_trace: Vec<DecisionTraceEntry>,
}

/// 有状态的任务执行 Agent
pub struct StatefulAgent {
    planner: TaskPlanner,
    executor: ActionExecutor,
    memory: StateManager,
    tracer: DecisionTracer,
    session_id: String,
    phase: AgentPhase,
}

fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn success_rate(successful: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        successful as f64 / total as f64
    }
}

impl StatefulAgent {
    /// 组装 Agent 并立即把新会话 id 写入会话状态
    pub fn new(
        llm: Arc<dyn LlmClient>,
        storage_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> AgentResult<Self> {
        let mut agent = Self {
            planner: TaskPlanner::new(llm.clone()),
            executor: ActionExecutor::new(llm, output_dir)?,
            memory: StateManager::open(storage_dir.as_ref())?,
            tracer: DecisionTracer::open(storage_dir.as_ref())?,
            session_id: new_session_id(),
            phase: AgentPhase::Idle,
        };
        let id = agent.session_id.clone();
        agent.memory.update_session(|s| s.session_id = Some(id))?;
        tracing::info!("Agent initialized, session {}", agent.session_id);
        Ok(agent)
    }

    /// 按配置创建 LLM 后端与存储目录；缺少凭据时返回 Config 错误
    pub fn from_config(cfg: &AppConfig) -> AgentResult<Self> {
        let llm = create_llm_from_config(cfg)?;
        Self::new(llm, &cfg.app.storage_dir, &cfg.app.output_dir)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    pub fn state_manager(&self) -> &StateManager {
        &self.memory
    }

    /// 本 Agent 的模型累计 token 用量：(prompt, completion, total)
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.planner.token_usage()
    }

    pub fn tracer(&self) -> &DecisionTracer {
        &self.tracer
    }

    /// 运行一个任务；无论运行成败，结束后阶段回到 Idle
    pub async fn run_task(
        &mut self,
        task_description: &str,
        context: TaskContext,
    ) -> AgentResult<TaskSummary> {
        tracing::info!("Starting new task: {}", task_description.trim());
        let outcome = self.run_phases(task_description, context).await;
        self.phase = AgentPhase::Idle;
        if let Err(e) = &outcome {
            tracing::error!("Task aborted: {}", e);
        }
        outcome
    }

    async fn run_phases(
        &mut self,
        task_description: &str,
        context: TaskContext,
    ) -> AgentResult<TaskSummary> {
        self.phase = AgentPhase::Planning;
        let plan = self.plan_task(task_description, &context).await?;

        self.phase = AgentPhase::Executing;
        let results = self.execute_plan(&plan, &context).await?;

        self.phase = AgentPhase::Finalizing;
        self.finalize_task(task_description, plan, results)
    }

    async fn plan_task(&mut self, task_description: &str, context: &TaskContext) -> AgentResult<Plan> {
        tracing::info!("PHASE 1: PLANNING");
        let task = task_description.to_string();
        let ctx = context.clone();
        self.memory.update_session(|s| {
            s.current_task = Some(task);
            s.context = ctx;
        })?;

        self.tracer.log_decision(
            "Task Initiation",
            "Received task request",
            "User provided a new task to execute",
            Some(json!({ "task": task_description, "context": context })),
            None,
        )?;

        let task_type = context.task_type_or_default();
        let similar = self.memory.get_relevant_past_tasks(task_type).len();
        let mut full_context = context.clone();
        if similar > 0 {
            tracing::info!("Found {} past tasks of type {}", similar, task_type);
            full_context = full_context
                .with_extra("previous_similar_tasks", similar)
                .with_extra(
                    "learned_from_past",
                    "Agent has experience with similar tasks",
                );
        }

        let plan = self.planner.decompose(task_description, &full_context).await?;

        self.tracer.log_decision(
            "Planning",
            "Task decomposition",
            "Breaking down complex task into manageable steps for systematic execution",
            Some(json!({ "task": task_description, "context": full_context })),
            Some(json!({ "plan": plan })),
        )?;

        let planned = plan.clone();
        self.memory.update_session(|s| {
            s.pending_steps = planned.steps.clone();
            s.plan = Some(planned);
        })?;

        tracing::info!("Goal: {}", plan.goal);
        for step in &plan.steps {
            tracing::info!("  {}. {}", step.id, step.action);
        }

        self.memory.record_decision(
            &format!("Created execution plan with {} steps", plan.steps.len()),
            "Task decomposition allows for systematic execution and progress tracking",
            json!({ "plan": plan }),
        )?;

        Ok(plan)
    }

    async fn execute_plan(
        &mut self,
        plan: &Plan,
        context: &TaskContext,
    ) -> AgentResult<Vec<StepResult>> {
        tracing::info!("PHASE 2: EXECUTION ({} steps)", plan.steps.len());
        let total = plan.steps.len();
        let mut results: Vec<StepResult> = Vec::with_capacity(total);
        let mut completed: Vec<Step> = Vec::new();
        let mut processed: Vec<Step> = Vec::new();

        for (i, step) in plan.steps.iter().enumerate() {
            let n = i + 1;
            tracing::info!("Step {}/{}: {}", n, total, step.action);
            if !step.dependencies.is_empty() {
                tracing::debug!("Dependencies: {:?}", step.dependencies);
            }

            let exec_ctx = ExecutionContext::for_step(context, step, &results, &processed);
            let expected = if step.expected_output.is_empty() {
                "step completion"
            } else {
                step.expected_output.as_str()
            };

            self.tracer.log_decision(
                &format!("Execution - Step {}", n),
                &step.action,
                &format!("Executing planned step to achieve: {}", expected),
                Some(json!({ "step": step, "context": exec_ctx })),
                None,
            )?;

            match self.executor.execute(step, &exec_ctx).await {
                Ok(result) => {
                    tracing::info!(
                        "Status: completed ({})",
                        result.result.as_ref().map(|p| p.kind()).unwrap_or("none")
                    );
                    results.push(result.clone());
                    completed.push(step.clone());

                    let done = completed.clone();
                    let pending: Vec<Step> = plan
                        .steps
                        .iter()
                        .filter(|s| !completed.contains(s))
                        .cloned()
                        .collect();
                    self.memory.update_session(|s| {
                        s.completed_steps = done;
                        s.pending_steps = pending;
                    })?;

                    self.tracer.log_decision(
                        &format!("Execution Result - Step {}", n),
                        "Step completed successfully",
                        &format!("Step produced expected output: {}", step.expected_output),
                        None,
                        Some(serde_json::to_value(&result)?),
                    )?;
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::warn!("Status: failed ({})", message);
                    let failed = StepResult::failed(step, message.clone());
                    results.push(failed.clone());

                    self.tracer.log_decision(
                        &format!("Execution Error - Step {}", n),
                        "Step failed",
                        &format!("Encountered error during execution: {}", message),
                        None,
                        Some(serde_json::to_value(&failed)?),
                    )?;
                }
            }

            processed.push(step.clone());
        }

        Ok(results)
    }

    fn finalize_task(
        &mut self,
        task_description: &str,
        plan: Plan,
        results: Vec<StepResult>,
    ) -> AgentResult<TaskSummary> {
        tracing::info!("PHASE 3: COMPLETION");
        let total = results.len();
        let successful = results.iter().filter(|r| r.is_completed()).count();
        let failed = total - successful;
        let rate = success_rate(successful, total);
        tracing::info!(
            "Task execution completed: total {}, successful {}, failed {}",
            total,
            successful,
            failed
        );

        let goal = plan.goal.clone();
        let record = TaskRecord {
            task: task_description.to_string(),
            task_type: self.memory.state().context.task_type_or_default().to_string(),
            plan,
            results: results.clone(),
            success_rate: rate,
            session_id: Some(self.session_id.clone()),
            completed_at: String::new(),
        };
        self.memory.add_completed_task(record)?;

        self.tracer.log_decision(
            "Task Completion",
            "Finalize and record task",
            &format!("Task completed with {}/{} steps successful", successful, total),
            None,
            Some(json!({
                "summary": format!("{} steps completed successfully", successful),
                "success_rate": rate,
            })),
        )?;

        Ok(TaskSummary {
            task: task_description.to_string(),
            goal,
            total_steps: total,
            successful_steps: successful,
            failed_steps: failed,
            success_rate: rate,
            results,
            decision_trace: self.tracer.get_trace().to_vec(),
        })
    }

    /// 可读的完整决策路径
    pub fn get_decision_trace(&self) -> String {
        self.tracer.explain_decision_path()
    }

    pub fn export_session(&self, path: impl AsRef<Path>) -> AgentResult<()> {
        self.tracer.export_trace(path.as_ref())?;
        tracing::info!("Session trace exported to {}", path.as_ref().display());
        Ok(())
    }

    /// 新会话：新 id、清空会话状态与决策追踪；长期记忆保留
    pub fn start_new_session(&mut self) -> AgentResult<&str> {
        self.session_id = reset_session(&mut self.memory, &mut self.tracer)?;
        Ok(&self.session_id)
    }
}

/// 清空会话状态与决策追踪并写入新的会话 id，返回该 id；不需要 LLM，CLI 也直接使用
pub fn reset_session(memory: &mut StateManager, tracer: &mut DecisionTracer) -> AgentResult<String> {
    let id = new_session_id();
    memory.clear_session()?;
    tracer.clear_trace()?;
    let stored = id.clone();
    memory.update_session(|s| s.session_id = Some(stored))?;
    tracing::info!("New session started: {}", id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate_zero_steps() {
        assert_eq!(success_rate(0, 0), 0.0);
        assert_eq!(success_rate(2, 4), 0.5);
        assert_eq!(success_rate(3, 3), 1.0);
    }
}
