//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Gemini / DeepSeek / Mock）

pub mod deepseek;
pub mod factory;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod traits;

pub use deepseek::{create_deepseek_client, DEEPSEEK_API_KEY_ENV, DEEPSEEK_CHAT};
pub use factory::create_llm_from_config;
pub use gemini::{create_gemini_client, GEMINI_API_KEY_ENV, GEMINI_FLASH};
pub use mock::{MockLlmClient, ScriptedLlmClient};
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::LlmClient;
