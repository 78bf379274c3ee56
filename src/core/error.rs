//! Agent 错误类型
//!
//! 步骤级错误由 Orchestrator 在单步边界捕获并转为 failed 的 StepResult；
//! 配置错误在启动时致命；持久化错误向调用方暴露，不静默吞掉。

use std::path::PathBuf;

use thiserror::Error;

/// Agent 运行过程中可能出现的错误（模型调用、解析、配置、持久化）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 持久化文档存在但无法解析：宁可报错也不用默认值覆盖
    #[error("Corrupt document {}: {reason}", path.display())]
    CorruptDocument { path: PathBuf, reason: String },

    #[error("Unknown state key: {0}")]
    UnknownStateKey(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
