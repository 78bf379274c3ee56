//! JSON 文档持久化
//!
//! 每个文档一个文件，UTF-8 缩进 JSON，整文档覆盖写。文件不存在视为「用默认值」；
//! 文件存在但解析失败返回 CorruptDocument，不会用默认值悄悄顶替。
//! 写到一半崩溃可能留下损坏文件，这里不做恢复。

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::{AgentError, AgentResult};

#[derive(Debug, Clone)]
pub struct JsonDocument {
    path: PathBuf,
}

impl JsonDocument {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取文档；文件不存在返回 None
    pub fn load<T: DeserializeOwned>(&self) -> AgentResult<Option<T>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|e| AgentError::CorruptDocument {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    pub fn load_or_default<T: DeserializeOwned + Default>(&self) -> AgentResult<T> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// 整文档覆盖写；父目录不存在时自动创建
    pub fn save<T: Serialize>(&self, doc: &T) -> AgentResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(doc)?)?;
        tracing::debug!("Saved {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let doc = JsonDocument::new(dir.path().join("absent.json"));
        assert!(doc.load::<Value>().unwrap().is_none());
        assert_eq!(doc.load_or_default::<Vec<u32>>().unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn test_save_creates_parent_and_pretty_prints() {
        let dir = TempDir::new().unwrap();
        let doc = JsonDocument::new(dir.path().join("nested/doc.json"));
        doc.save(&json!({"a": [1, 2]})).unwrap();
        let raw = std::fs::read_to_string(doc.path()).unwrap();
        assert!(raw.contains('\n'));
        assert_eq!(doc.load::<Value>().unwrap(), Some(json!({"a": [1, 2]})));
    }

    #[test]
    fn test_malformed_file_fails_loudly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonDocument::new(&path).load::<Value>().unwrap_err();
        assert!(matches!(err, AgentError::CorruptDocument { .. }));
    }
}
