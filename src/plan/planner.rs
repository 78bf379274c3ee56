//! TaskPlanner：一次模型调用把任务描述拆成结构化计划
//!
//! 解析失败不算错误：decompose 退回单步计划（原始输出作为步骤描述），refine 原样返回原步骤。

use std::sync::Arc;

use serde::Deserialize;

use crate::core::{AgentError, AgentResult, TaskContext};
use crate::llm::LlmClient;
use crate::plan::parse::parse_json_response;
use crate::plan::{Plan, Step};

const PLAN_FORMAT: &str = r#"Format your response as JSON with this structure:
{
  "goal": "main objective",
  "steps": [
    {
      "id": 1,
      "action": "what to do",
      "description": "detailed explanation",
      "expected_output": "what this produces",
      "dependencies": []
    }
  ],
  "success_criteria": "how to know task is complete"
}"#;

/// refine 的局部覆盖：出现的键覆盖原步骤
#[derive(Debug, Default, Deserialize)]
struct StepRefinement {
    action: Option<String>,
    description: Option<String>,
    expected_output: Option<String>,
}

pub struct TaskPlanner {
    llm: Arc<dyn LlmClient>,
}

impl TaskPlanner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// 获取 LLM 累计 token 使用统计
    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.llm.token_usage()
    }

    pub fn build_plan_prompt(task_description: &str, context: &TaskContext) -> String {
        let context_str = if context.is_empty() {
            String::new()
        } else {
            format!("\n\nAdditional context:\n{}", context.render_lines())
        };

        format!(
            "You are a task planning assistant. Break down the following task into a clear, executable plan.\n\n\
             Task: {}{}\n\n\
             Provide a structured breakdown with:\n\
             1. Main goal (one sentence)\n\
             2. List of concrete steps (3-8 steps, each actionable)\n\
             3. Expected outputs for each step\n\
             4. Any dependencies between steps\n\n{}",
            task_description.trim(),
            context_str,
            PLAN_FORMAT
        )
    }

    /// 拆解任务；只有模型调用本身失败才返回 Err
    pub async fn decompose(
        &self,
        task_description: &str,
        context: &TaskContext,
    ) -> AgentResult<Plan> {
        let prompt = Self::build_plan_prompt(task_description, context);
        let response = self.llm.generate(&prompt).await.map_err(AgentError::Llm)?;

        let plan = match parse_json_response::<Plan>(&response) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!("Plan response not parseable ({}), using single-step fallback", e);
                return Ok(Plan::fallback(task_description, &response));
            }
        };

        for issue in plan.ordering_issues() {
            tracing::warn!("Plan ordering issue: {}", issue);
        }
        tracing::info!("Planned {} steps: {}", plan.steps.len(), plan.goal);
        Ok(plan)
    }

    /// 根据反馈改写步骤；任何失败都返回原步骤
    pub async fn refine(&self, step: &Step, feedback: &str) -> Step {
        let prompt = format!(
            "Refine this task step based on feedback.\n\n\
             Original step:\nAction: {}\nDescription: {}\n\n\
             Feedback: {}\n\n\
             Provide an improved version of this step as JSON:\n\
             {{\n  \"action\": \"refined action\",\n  \"description\": \"refined description\",\n  \"expected_output\": \"what this produces\"\n}}",
            step.action, step.description, feedback
        );

        let response = match self.llm.generate(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Refine call failed for step {}: {}", step.id, e);
                return step.clone();
            }
        };

        match parse_json_response::<StepRefinement>(&response) {
            Ok(refined) => Step {
                action: refined.action.unwrap_or_else(|| step.action.clone()),
                description: refined.description.unwrap_or_else(|| step.description.clone()),
                expected_output: refined
                    .expected_output
                    .unwrap_or_else(|| step.expected_output.clone()),
                ..step.clone()
            },
            Err(e) => {
                tracing::warn!("Refine response not parseable for step {}: {}", step.id, e);
                step.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedLlmClient;

    const PLAN_JSON: &str = r#"```json
{
  "goal": "Launch the dashboard",
  "steps": [
    {"id": 1, "action": "Research users", "description": "d1", "expected_output": "notes", "dependencies": []},
    {"id": 2, "action": "Draft spec", "description": "d2", "expected_output": "doc", "dependencies": [1]},
    {"id": 3, "action": "Calculate metrics", "description": "d3", "expected_output": "kpis", "dependencies": [1]}
  ],
  "success_criteria": "Spec approved"
}
```"#;

    fn sample_step() -> Step {
        Step {
            id: 2,
            action: "Draft spec".into(),
            description: "first pass".into(),
            expected_output: "doc".into(),
            dependencies: vec![1],
        }
    }

    #[tokio::test]
    async fn test_decompose_parses_fenced_plan() {
        let llm = Arc::new(ScriptedLlmClient::new([Ok(PLAN_JSON)]));
        let planner = TaskPlanner::new(llm.clone());
        let ctx = TaskContext::new().with_task_type("saas_launch");

        let plan = planner.decompose("Launch it", &ctx).await.unwrap();
        assert_eq!(plan.goal, "Launch the dashboard");
        assert_eq!(plan.steps.len(), 3);
        assert_eq!(plan.steps[1].dependencies, vec![1]);
        assert_eq!(plan.success_criteria, "Spec approved");

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains("Task: Launch it"));
        assert!(prompt.contains("- task_type: saas_launch"));
        assert!(prompt.contains("\"success_criteria\""));
    }

    #[tokio::test]
    async fn test_decompose_keeps_plan_with_null_dependencies() {
        let raw = r#"{"goal": "Ship", "steps": [
            {"id": 1, "action": "Research users", "description": "d1", "expected_output": "notes", "dependencies": null},
            {"id": 2, "action": "Draft spec", "description": null, "expected_output": "doc", "dependencies": [1]}
        ], "success_criteria": "done"}"#;
        let llm = Arc::new(ScriptedLlmClient::new([Ok(raw)]));
        let planner = TaskPlanner::new(llm);

        let plan = planner.decompose("Task", &TaskContext::new()).await.unwrap();
        assert_eq!(plan.goal, "Ship");
        assert_eq!(plan.steps.len(), 2);
        assert!(plan.steps[0].dependencies.is_empty());
        assert!(plan.steps[1].description.is_empty());
        assert_eq!(plan.steps[1].dependencies, vec![1]);
    }

    #[tokio::test]
    async fn test_decompose_falls_back_on_unstructured_output() {
        let raw = "1. Do the thing\n2. Then the other thing";
        let llm = Arc::new(ScriptedLlmClient::new([Ok(raw)]));
        let planner = TaskPlanner::new(llm);

        let plan = planner.decompose("Ship", &TaskContext::new()).await.unwrap();
        assert_eq!(plan.goal, "Ship");
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].description, raw);
        assert!(plan.steps[0].dependencies.is_empty());
    }

    #[tokio::test]
    async fn test_decompose_propagates_model_failure() {
        let llm = Arc::new(ScriptedLlmClient::new([Err("unreachable")]));
        let planner = TaskPlanner::new(llm);
        let err = planner.decompose("Ship", &TaskContext::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(_)));
    }

    #[tokio::test]
    async fn test_prompt_omits_context_block_when_empty() {
        let prompt = TaskPlanner::build_plan_prompt("Ship", &TaskContext::new());
        assert!(!prompt.contains("Additional context"));
    }

    #[tokio::test]
    async fn test_refine_merges_partial_override() {
        let llm = Arc::new(ScriptedLlmClient::new([Ok(
            r#"{"description": "cover pricing tiers"}"#,
        )]));
        let planner = TaskPlanner::new(llm);

        let refined = planner.refine(&sample_step(), "mention pricing").await;
        assert_eq!(refined.description, "cover pricing tiers");
        assert_eq!(refined.action, "Draft spec");
        assert_eq!(refined.id, 2);
        assert_eq!(refined.dependencies, vec![1]);
    }

    #[tokio::test]
    async fn test_refine_is_noop_on_garbage_or_error() {
        let llm = Arc::new(ScriptedLlmClient::new([Ok("can't help with that"), Err("down")]));
        let planner = TaskPlanner::new(llm);
        let original = sample_step();

        assert_eq!(planner.refine(&original, "x").await, original);
        assert_eq!(planner.refine(&original, "x").await, original);
    }
}
