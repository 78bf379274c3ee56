//! Gemini 客户端（走 Google 提供的 OpenAI 兼容端点）

use crate::llm::OpenAiClient;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const GEMINI_FLASH: &str = "gemini-2.5-flash";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// 创建 Gemini 客户端；模型未指定时用 gemini-2.5-flash
pub fn create_gemini_client(api_key: &str, model: Option<&str>) -> OpenAiClient {
    let model = model.unwrap_or(GEMINI_FLASH);
    OpenAiClient::new(Some(GEMINI_BASE_URL), model, api_key)
}
