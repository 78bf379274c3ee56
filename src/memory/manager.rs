//! StateManager：会话状态与长期记忆两个文档的唯一持有者与唯一写盘者
//!
//! 所有持久化同步完成；每次修改都整文档重写对应文件。

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::actions::result::now_iso;
use crate::core::{AgentError, AgentResult};
use crate::memory::session::SESSION_KEYS;
use crate::memory::{DecisionRecord, JsonDocument, LongTermMemory, SessionState, TaskRecord};

pub const STATE_FILE: &str = "agent_state.json";
pub const MEMORY_FILE: &str = "long_term_memory.json";

#[derive(Debug)]
pub struct StateManager {
    storage_dir: PathBuf,
    state_doc: JsonDocument,
    memory_doc: JsonDocument,
    current_state: SessionState,
    long_term: LongTermMemory,
}

impl StateManager {
    /// 打开存储目录（不存在则创建），读取两个文档；缺失的用默认值
    pub fn open(storage_dir: impl AsRef<Path>) -> AgentResult<Self> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&storage_dir)?;

        let mut manager = Self {
            state_doc: JsonDocument::new(storage_dir.join(STATE_FILE)),
            memory_doc: JsonDocument::new(storage_dir.join(MEMORY_FILE)),
            storage_dir,
            current_state: SessionState::default(),
            long_term: LongTermMemory::default(),
        };
        manager.load_state()?;
        manager.load_memory()?;
        Ok(manager)
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// 从磁盘重新读取会话状态
    pub fn load_state(&mut self) -> AgentResult<&SessionState> {
        self.current_state = self.state_doc.load_or_default()?;
        Ok(&self.current_state)
    }

    /// 从磁盘重新读取长期记忆
    pub fn load_memory(&mut self) -> AgentResult<&LongTermMemory> {
        self.long_term = self.memory_doc.load_or_default()?;
        Ok(&self.long_term)
    }

    pub fn save_state(&self) -> AgentResult<()> {
        self.state_doc.save(&self.current_state)
    }

    pub fn save_memory(&self) -> AgentResult<()> {
        self.memory_doc.save(&self.long_term)
    }

    pub fn state(&self) -> &SessionState {
        &self.current_state
    }

    pub fn long_term(&self) -> &LongTermMemory {
        &self.long_term
    }

    /// 按顶层键写入一个字段后保存；值类型不匹配时返回序列化错误，状态不变
    pub fn update_state(&mut self, key: &str, value: Value) -> AgentResult<()> {
        if !SESSION_KEYS.contains(&key) {
            return Err(AgentError::UnknownStateKey(key.to_string()));
        }
        let mut doc = match serde_json::to_value(&self.current_state)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        doc.insert(key.to_string(), value);
        self.current_state = serde_json::from_value(Value::Object(doc))?;
        self.save_state()
    }

    /// 类型化的修改入口，Orchestrator 在阶段切换时使用
    pub fn update_session(&mut self, mutate: impl FnOnce(&mut SessionState)) -> AgentResult<()> {
        mutate(&mut self.current_state);
        self.save_state()
    }

    /// 读取顶层字段；未知键返回 None
    pub fn get_state(&self, key: &str) -> Option<Value> {
        if !SESSION_KEYS.contains(&key) {
            return None;
        }
        serde_json::to_value(&self.current_state)
            .ok()
            .and_then(|v| v.get(key).cloned())
    }

    pub fn record_decision(
        &mut self,
        decision: &str,
        reasoning: &str,
        context: Value,
    ) -> AgentResult<DecisionRecord> {
        let record = DecisionRecord {
            timestamp: now_iso(),
            decision: decision.to_string(),
            reasoning: reasoning.to_string(),
            context,
        };
        self.long_term.decisions.push(record.clone());
        self.save_memory()?;
        Ok(record)
    }

    pub fn store_user_preference(&mut self, key: &str, value: Value) -> AgentResult<()> {
        self.long_term.user_preferences.insert(key.to_string(), value);
        self.save_memory()
    }

    pub fn get_user_preference(&self, key: &str) -> Option<&Value> {
        self.long_term.user_preferences.get(key)
    }

    /// 追加任务记录并注入完成时间
    pub fn add_completed_task(&mut self, mut record: TaskRecord) -> AgentResult<&TaskRecord> {
        record.completed_at = now_iso();
        self.long_term.past_tasks.push(record);
        self.save_memory()?;
        let idx = self.long_term.past_tasks.len() - 1;
        Ok(&self.long_term.past_tasks[idx])
    }

    /// 按 type 精确匹配，保持插入顺序
    pub fn get_relevant_past_tasks(&self, task_type: &str) -> Vec<&TaskRecord> {
        self.long_term
            .past_tasks
            .iter()
            .filter(|t| t.task_type == task_type)
            .collect()
    }

    /// 重置会话状态为默认值并保存；长期记忆不动
    pub fn clear_session(&mut self) -> AgentResult<()> {
        self.current_state = SessionState::default();
        self.save_state()
    }
}
