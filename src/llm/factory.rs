//! 根据配置创建 LLM 后端
//!
//! 真实后端缺少 API Key 时直接返回 Config 错误：启动即失败，不会悄悄退化为 Mock。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{AgentError, AgentResult};
use crate::llm::{
    create_deepseek_client, create_gemini_client, LlmClient, MockLlmClient, OpenAiClient,
    DEEPSEEK_API_KEY_ENV, GEMINI_API_KEY_ENV,
};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

fn require_key(var: &str) -> AgentResult<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(AgentError::Config(format!("{} not found", var))),
    }
}

/// 按 [llm].provider 选择后端（gemini / deepseek / openai / mock）
pub fn create_llm_from_config(cfg: &AppConfig) -> AgentResult<Arc<dyn LlmClient>> {
    let provider = cfg.llm.provider.to_lowercase();
    let timeout = cfg.llm.timeouts.request;

    let client = match provider.as_str() {
        "gemini" => {
            let key = require_key(GEMINI_API_KEY_ENV)?;
            let model = cfg.llm.gemini.model.as_deref().or(cfg.llm.model.as_deref());
            create_gemini_client(&key, model).with_timeout_secs(timeout)
        }
        "deepseek" => {
            let key = require_key(DEEPSEEK_API_KEY_ENV)?;
            let model = cfg.llm.deepseek.model.as_deref().or(cfg.llm.model.as_deref());
            create_deepseek_client(&key, model).with_timeout_secs(timeout)
        }
        "openai" => {
            let key = require_key(OPENAI_API_KEY_ENV)?;
            let model = cfg
                .llm
                .openai
                .model
                .as_deref()
                .or(cfg.llm.model.as_deref())
                .unwrap_or("gpt-4o-mini");
            OpenAiClient::new(cfg.llm.base_url.as_deref(), model, &key).with_timeout_secs(timeout)
        }
        "mock" => {
            tracing::warn!("Using Mock LLM, outputs are canned");
            return Ok(Arc::new(MockLlmClient));
        }
        other => {
            return Err(AgentError::Config(format!("unknown llm provider '{}'", other)));
        }
    };

    tracing::info!("Using {} LLM ({})", provider, client.model());
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_needs_no_key() {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = "mock".to_string();
        assert!(create_llm_from_config(&cfg).is_ok());
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let mut cfg = AppConfig::default();
        cfg.llm.provider = "carrier-pigeon".to_string();
        let err = create_llm_from_config(&cfg).err().unwrap();
        assert!(matches!(err, AgentError::Config(msg) if msg.contains("carrier-pigeon")));
    }
}
