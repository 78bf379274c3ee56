//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `STAGENT__*` 覆盖（双下划线表示嵌套，如 `STAGENT__LLM__PROVIDER=deepseek`）。
//! API Key 只从环境变量读取（GEMINI_API_KEY / DEEPSEEK_API_KEY / OPENAI_API_KEY），不写入配置文件。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
}

/// [app] 段：持久化目录与产物目录
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    /// 会话状态、长期记忆、决策追踪三个 JSON 文档所在目录
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// 文档 / 生成内容产物写入目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("storage")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

/// [llm] 段：后端选择、模型与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：gemini / deepseek / openai / mock
    #[serde(default = "default_provider")]
    pub provider: String,
    /// 通用模型名；各后端子段的 model 优先
    pub model: Option<String>,
    /// 仅 openai 后端使用：自建代理或其它兼容端点
    pub base_url: Option<String>,
    #[serde(default)]
    pub gemini: ProviderModelSection,
    #[serde(default)]
    pub deepseek: ProviderModelSection,
    #[serde(default)]
    pub openai: ProviderModelSection,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: None,
            gemini: ProviderModelSection::default(),
            deepseek: ProviderModelSection::default(),
            openai: ProviderModelSection::default(),
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProviderModelSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次模型请求超时（秒），0 表示不设超时
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    120
}

/// 从 config 目录加载配置，环境变量 STAGENT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 则追加该文件（可覆盖前面的键）；文件缺失或格式错误直接返回错误
/// 3. 最后叠加环境变量 STAGENT__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(path) = config_path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("STAGENT")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.app.storage_dir, PathBuf::from("storage"));
        assert_eq!(cfg.app.output_dir, PathBuf::from("outputs"));
        assert_eq!(cfg.llm.provider, "gemini");
        assert_eq!(cfg.llm.timeouts.request, 120);
    }

    #[test]
    fn test_load_explicit_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("agent.toml");
        std::fs::write(
            &path,
            "[app]\nstorage_dir = \"/tmp/agent-state\"\n\n[llm]\nprovider = \"mock\"\n\n[llm.deepseek]\nmodel = \"deepseek-reasoner\"\n",
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.app.storage_dir, PathBuf::from("/tmp/agent-state"));
        assert_eq!(cfg.app.output_dir, PathBuf::from("outputs"));
        assert_eq!(cfg.llm.provider, "mock");
        assert_eq!(cfg.llm.deepseek.model.as_deref(), Some("deepseek-reasoner"));
    }

    #[test]
    fn test_explicit_file_must_exist_and_parse() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(load_config(Some(dir.path().join("absent.toml"))).is_err());

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "[app\nstorage_dir = ").unwrap();
        assert!(load_config(Some(bad)).is_err());
    }
}
