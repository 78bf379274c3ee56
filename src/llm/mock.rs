//! Mock / 脚本化 LLM 客户端（用于测试与离线演示，无需 API）
//!
//! - MockLlmClient：规划类 prompt 返回固定的三步计划 JSON，其余回显 prompt 首行
//! - ScriptedLlmClient：按顺序吐出预设回复（或错误），并记录收到的 prompt 供断言

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

const MOCK_PLAN: &str = r#"```json
{
  "goal": "Complete the requested task offline",
  "steps": [
    {"id": 1, "action": "Research the problem space", "description": "Collect background information", "expected_output": "Research notes", "dependencies": []},
    {"id": 2, "action": "Draft the deliverable", "description": "Write the main document", "expected_output": "Document file", "dependencies": [1]},
    {"id": 3, "action": "Calculate success metrics", "description": "Derive metrics from user data", "expected_output": "Metrics", "dependencies": [1]}
  ],
  "success_criteria": "All steps completed"
}
```"#;

fn last_user(messages: &[Message]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| matches!(m.role, Role::User))
        .map(|m| m.content.as_str())
        .unwrap_or("(no input)")
}

/// Mock 客户端：离线可跑通完整 plan → execute → finalize
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let prompt = last_user(messages);
        if prompt.contains("\"success_criteria\"") {
            return Ok(MOCK_PLAN.to_string());
        }
        let first_line = prompt.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        Ok(format!("Mock output for: {}", first_line.trim()))
    }
}

/// 脚本化客户端：回复队列耗尽后返回 fallback 文本
#[derive(Debug)]
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    fallback: String,
}

impl ScriptedLlmClient {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<S, S>>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(Into::into).map_err(Into::into))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
            fallback: "ok".to_string(),
        }
    }

    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = text.into();
        self
    }

    /// 已收到的全部 prompt（按调用顺序）
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(last_user(messages).to_string());
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_in_order_then_fallback() {
        let llm = ScriptedLlmClient::new([Ok("first"), Err("boom")]).with_fallback("rest");
        assert_eq!(llm.generate("a").await.unwrap(), "first");
        assert_eq!(llm.generate("b").await.unwrap_err(), "boom");
        assert_eq!(llm.generate("c").await.unwrap(), "rest");
        assert_eq!(llm.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_returns_plan_for_planning_prompt() {
        let out = MockLlmClient
            .generate("Format as JSON with \"success_criteria\"")
            .await
            .unwrap();
        assert!(out.contains("\"steps\""));
        let echo = MockLlmClient.generate("\nWrite a memo\nmore").await.unwrap();
        assert_eq!(echo, "Mock output for: Write a memo");
    }
}
