//! Stagent - Rust 有状态任务执行智能体
//!
//! 把自然语言任务拆成计划，逐步交给 LLM 执行，并记录每个决策的时间线。
//!
//! 模块划分：
//! - **actions**: 步骤分类、执行上下文、ActionExecutor 与产物载荷
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误、任务上下文、生命周期阶段、编排器（StatefulAgent）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Gemini / DeepSeek / Mock）
//! - **memory**: 会话状态、长期记忆与 JSON 文档持久化
//! - **observability**: tracing 初始化
//! - **plan**: 计划类型、模型回复解析、TaskPlanner
//! - **trace**: 决策追踪
//! - **use_cases**: 示例工作流

pub mod actions;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod plan;
pub mod trace;
pub mod use_cases;

pub use crate::core::{AgentError, AgentResult, StatefulAgent, TaskContext, TaskSummary};
