//! 步骤执行结果与产物载荷

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::plan::{Step, StepId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Failed,
}

/// 产物载荷：按 type 区分；document / generated_content 只保留文件路径与预览，全文在文件里
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArtifactPayload {
    Document {
        filepath: String,
        content_preview: String,
    },
    Analysis {
        findings: String,
        summary: String,
    },
    GeneratedContent {
        filepath: String,
        preview: String,
    },
    Research {
        findings: String,
    },
    Metrics {
        calculations: String,
        data_used: Map<String, Value>,
    },
    Generic {
        output: String,
    },
}

impl ArtifactPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            ArtifactPayload::Document { .. } => "document",
            ArtifactPayload::Analysis { .. } => "analysis",
            ArtifactPayload::GeneratedContent { .. } => "generated_content",
            ArtifactPayload::Research { .. } => "research",
            ArtifactPayload::Metrics { .. } => "metrics",
            ArtifactPayload::Generic { .. } => "generic",
        }
    }

    /// 产物文件路径（仅 document / generated_content 有）
    pub fn filepath(&self) -> Option<&str> {
        match self {
            ArtifactPayload::Document { filepath, .. }
            | ArtifactPayload::GeneratedContent { filepath, .. } => Some(filepath),
            _ => None,
        }
    }
}

/// 单步执行结果；每次运行每个步骤恰好产生一个，创建顺序即汇报顺序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: StepId,
    pub action: String,
    pub status: StepStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ArtifactPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl StepResult {
    pub fn completed(step: &Step, payload: ArtifactPayload) -> Self {
        Self {
            step_id: step.id,
            action: step.action.to_lowercase(),
            status: StepStatus::Completed,
            result: Some(payload),
            error: None,
            timestamp: now_iso(),
        }
    }

    pub fn failed(step: &Step, error: impl Into<String>) -> Self {
        Self {
            step_id: step.id,
            action: step.action.clone(),
            status: StepStatus::Failed,
            result: None,
            error: Some(error.into()),
            timestamp: now_iso(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }
}

pub(crate) fn now_iso() -> String {
    chrono::Local::now().to_rfc3339()
}

/// 截断为前 limit 个字符，超出时追加 "..."
pub fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
