//! 模型回复中的 JSON 提取
//!
//! 模型经常把 JSON 包在 ```json ... ``` 里，或前后夹带说明文字；这里尽力剥掉外壳再解码，
//! 失败时返回 JsonParse 错误，由调用方决定兜底策略。

use serde::de::DeserializeOwned;

use crate::core::{AgentError, AgentResult};

/// 剥掉可选的代码块围栏，返回候选 JSON 文本
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + "```json".len()..];
        return rest.find("```").map(|end| &rest[..end]).unwrap_or(rest).trim();
    }
    if let Some(start) = trimmed.find("```") {
        let rest = &trimmed[start + 3..];
        if let Some(end) = rest.find("```") {
            return rest[..end].trim();
        }
    }
    trimmed
}

/// 从首个 '{' 到最后一个 '}' 的片段
fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// 宽松解析：先按围栏内容解码，不行再退到最外层花括号
pub fn parse_json_response<T: DeserializeOwned>(text: &str) -> AgentResult<T> {
    let candidate = strip_code_fence(text);
    match serde_json::from_str(candidate) {
        Ok(value) => Ok(value),
        Err(first) => outer_object(candidate)
            .filter(|obj| *obj != candidate)
            .and_then(|obj| serde_json::from_str(obj).ok())
            .ok_or_else(|| AgentError::JsonParse(first.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_strip_json_fence() {
        let text = "Here you go:\n```json\n{\"a\": 1}\n```\nThanks";
        assert_eq!(strip_code_fence(text), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_plain_fence() {
        assert_eq!(strip_code_fence("```\n{\"a\": 2}\n```"), "{\"a\": 2}");
    }

    #[test]
    fn test_no_fence_is_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\": 3}\n"), "{\"a\": 3}");
    }

    #[test]
    fn test_parse_with_surrounding_prose() {
        let v: Value = parse_json_response("Sure! {\"goal\": \"x\"} Hope that helps").unwrap();
        assert_eq!(v["goal"], "x");
    }

    #[test]
    fn test_parse_failure_is_json_parse_error() {
        let err = parse_json_response::<Value>("no structure here").unwrap_err();
        assert!(matches!(err, AgentError::JsonParse(_)));
    }
}
