//! 任务上下文：核心只读取 task_type 与 user_data，其余键原样透传给 prompt

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_TASK_TYPE: &str = "general";

/// 调用方传入的任务上下文
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskContext {
    /// 任务类型，用于检索同类历史任务；缺省为 "general"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    /// 业务数据，calculate_metrics 会原样回显到产物中
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<Map<String, Value>>,
    /// 其它领域字段，只参与 prompt 拼装，不做校验
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task_type(mut self, task_type: impl Into<String>) -> Self {
        self.task_type = Some(task_type.into());
        self
    }

    pub fn with_user_data(mut self, data: Map<String, Value>) -> Self {
        self.user_data = Some(data);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn task_type_or_default(&self) -> &str {
        self.task_type.as_deref().unwrap_or(DEFAULT_TASK_TYPE)
    }

    pub fn is_empty(&self) -> bool {
        self.task_type.is_none() && self.user_data.is_none() && self.extra.is_empty()
    }

    /// 渲染为 `- key: value` 行，字符串不带引号
    pub fn render_lines(&self) -> String {
        let mut lines = Vec::new();
        if let Some(t) = &self.task_type {
            lines.push(format!("- task_type: {}", t));
        }
        if let Some(data) = &self.user_data {
            lines.push(format!("- user_data: {}", Value::Object(data.clone())));
        }
        for (key, value) in &self.extra {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            lines.push(format!("- {}: {}", key, rendered));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_known_and_extra_fields_split() {
        let ctx: TaskContext = serde_json::from_value(json!({
            "task_type": "saas_launch",
            "user_data": {"churn_rate_percent": 3.2},
            "product": "Analytics Dashboard",
            "team_size": 8
        }))
        .unwrap();
        assert_eq!(ctx.task_type_or_default(), "saas_launch");
        assert_eq!(ctx.user_data.as_ref().unwrap()["churn_rate_percent"], json!(3.2));
        assert_eq!(ctx.extra.len(), 2);

        let back = serde_json::to_value(&ctx).unwrap();
        assert_eq!(back["product"], "Analytics Dashboard");
        assert_eq!(back["task_type"], "saas_launch");
    }

    #[test]
    fn test_default_task_type() {
        assert_eq!(TaskContext::new().task_type_or_default(), "general");
        assert!(TaskContext::new().is_empty());
    }

    #[test]
    fn test_user_data_must_be_object() {
        let res = serde_json::from_value::<TaskContext>(json!({"user_data": 5}));
        assert!(res.is_err());
    }

    #[test]
    fn test_render_lines() {
        let ctx = TaskContext::new()
            .with_task_type("general")
            .with_extra("timeline", "6 weeks")
            .with_extra("team_size", 8);
        let text = ctx.render_lines();
        assert!(text.contains("- task_type: general"));
        assert!(text.contains("- timeline: 6 weeks"));
        assert!(text.contains("- team_size: 8"));
    }
}
