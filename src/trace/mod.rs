//! 决策追踪：只追加的推理日志，用于解释与导出
//!
//! 与 StateManager 一样整文档覆盖写；条目顺序即时间顺序，本身就是解释。

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::actions::result::now_iso;
use crate::core::AgentResult;
use crate::memory::JsonDocument;

pub const TRACE_FILE: &str = "decision_trace.json";
pub const EMPTY_TRACE_MESSAGE: &str = "No decisions recorded yet.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTraceEntry {
    pub timestamp: String,
    /// 阶段 / 标签，如 "Planning"、"Execution - Step 2"
    pub step: String,
    pub action: String,
    pub reasoning: String,
    #[serde(default)]
    pub inputs: Map<String, Value>,
    #[serde(default)]
    pub outputs: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct TraceDocument {
    #[serde(default)]
    trace: Vec<DecisionTraceEntry>,
}

#[derive(Serialize)]
struct TraceDocumentRef<'a> {
    trace: &'a [DecisionTraceEntry],
}

#[derive(Serialize)]
struct TraceExport<'a> {
    exported_at: String,
    trace: &'a [DecisionTraceEntry],
}

/// 把任意 JSON 值规整为键值映射：对象原样，null 为空，其它包成 {"value": ..}
pub fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            map
        }
    }
}

fn pretty4(value: &Map<String, Value>) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => Value::Object(value.clone()).to_string(),
    }
}

#[derive(Debug)]
pub struct DecisionTracer {
    doc: JsonDocument,
    trace: Vec<DecisionTraceEntry>,
}

impl DecisionTracer {
    /// 打开存储目录下的追踪文档；已有文件则载入
    pub fn open(storage_dir: impl AsRef<Path>) -> AgentResult<Self> {
        let doc = JsonDocument::new(storage_dir.as_ref().join(TRACE_FILE));
        let trace = doc.load_or_default::<TraceDocument>()?.trace;
        Ok(Self { doc, trace })
    }

    fn save(&self) -> AgentResult<()> {
        self.doc.save(&TraceDocumentRef { trace: &self.trace })
    }

    pub fn log_decision(
        &mut self,
        step: &str,
        action: &str,
        reasoning: &str,
        inputs: Option<Value>,
        outputs: Option<Value>,
    ) -> AgentResult<DecisionTraceEntry> {
        let entry = DecisionTraceEntry {
            timestamp: now_iso(),
            step: step.to_string(),
            action: action.to_string(),
            reasoning: reasoning.to_string(),
            inputs: inputs.map(fields).unwrap_or_default(),
            outputs: outputs.map(fields).unwrap_or_default(),
        };
        self.trace.push(entry.clone());
        self.save()?;
        Ok(entry)
    }

    pub fn get_trace(&self) -> &[DecisionTraceEntry] {
        &self.trace
    }

    /// 最近 n 条；不足 n 条时返回全部
    pub fn get_recent_decisions(&self, n: usize) -> &[DecisionTraceEntry] {
        &self.trace[self.trace.len().saturating_sub(n)..]
    }

    /// 编号列出全部决策，含推理与输入输出
    pub fn explain_decision_path(&self) -> String {
        if self.trace.is_empty() {
            return EMPTY_TRACE_MESSAGE.to_string();
        }

        let mut out = String::from("Decision Path:\n");
        out.push_str(&"=".repeat(50));
        out.push_str("\n\n");

        for (i, entry) in self.trace.iter().enumerate() {
            out.push_str(&format!("Step {}: {}\n", i + 1, entry.step));
            out.push_str(&format!("  Action: {}\n", entry.action));
            out.push_str(&format!("  Reasoning: {}\n", entry.reasoning));
            if !entry.inputs.is_empty() {
                out.push_str(&format!("  Inputs: {}\n", pretty4(&entry.inputs)));
            }
            if !entry.outputs.is_empty() {
                out.push_str(&format!("  Outputs: {}\n", pretty4(&entry.outputs)));
            }
            out.push('\n');
        }
        out
    }

    pub fn clear_trace(&mut self) -> AgentResult<()> {
        self.trace.clear();
        self.save()
    }

    /// 导出快照到任意路径，主追踪文件不受影响
    pub fn export_trace(&self, path: impl AsRef<Path>) -> AgentResult<()> {
        JsonDocument::new(path).save(&TraceExport {
            exported_at: now_iso(),
            trace: &self.trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_empty_trace_message() {
        let dir = TempDir::new().unwrap();
        let tracer = DecisionTracer::open(dir.path()).unwrap();
        assert_eq!(tracer.explain_decision_path(), "No decisions recorded yet.");
        assert!(tracer.get_recent_decisions(5).is_empty());
    }

    #[test]
    fn test_log_defaults_and_persistence() {
        let dir = TempDir::new().unwrap();
        let mut tracer = DecisionTracer::open(dir.path()).unwrap();
        let entry = tracer
            .log_decision("Planning", "Task decomposition", "why", None, Some(json!({"plan": 1})))
            .unwrap();
        assert!(entry.inputs.is_empty());
        assert_eq!(entry.outputs["plan"], json!(1));

        let reopened = DecisionTracer::open(dir.path()).unwrap();
        assert_eq!(reopened.get_trace(), &[entry][..]);
    }

    #[test]
    fn test_recent_decisions() {
        let dir = TempDir::new().unwrap();
        let mut tracer = DecisionTracer::open(dir.path()).unwrap();
        for i in 0..4 {
            tracer
                .log_decision(&format!("s{i}"), "a", "r", None, None)
                .unwrap();
        }
        let recent: Vec<&str> = tracer
            .get_recent_decisions(2)
            .iter()
            .map(|e| e.step.as_str())
            .collect();
        assert_eq!(recent, vec!["s2", "s3"]);
        assert_eq!(tracer.get_recent_decisions(10).len(), 4);
    }

    #[test]
    fn test_explain_numbers_entries_and_nests_io() {
        let dir = TempDir::new().unwrap();
        let mut tracer = DecisionTracer::open(dir.path()).unwrap();
        tracer
            .log_decision("Task Initiation", "Received task request", "new task", Some(json!({"task": "x"})), None)
            .unwrap();
        tracer
            .log_decision("Planning", "Task decomposition", "break it down", None, None)
            .unwrap();

        let text = tracer.explain_decision_path();
        assert!(text.starts_with("Decision Path:\n"));
        assert!(text.contains("Step 1: Task Initiation"));
        assert!(text.contains("  Reasoning: new task"));
        assert!(text.contains("  Inputs: {\n    \"task\": \"x\"\n}"));
        assert!(text.contains("Step 2: Planning"));
        assert!(!text.contains("Outputs"));
    }

    #[test]
    fn test_clear_and_export_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut tracer = DecisionTracer::open(dir.path()).unwrap();
        tracer.log_decision("Planning", "a", "r", None, None).unwrap();

        let export = dir.path().join("exports/session.json");
        tracer.export_trace(&export).unwrap();
        let snapshot: Value = serde_json::from_str(&std::fs::read_to_string(&export).unwrap()).unwrap();
        assert!(snapshot["exported_at"].is_string());
        assert_eq!(snapshot["trace"].as_array().unwrap().len(), 1);

        tracer.clear_trace().unwrap();
        assert!(tracer.get_trace().is_empty());
        assert!(DecisionTracer::open(dir.path()).unwrap().get_trace().is_empty());
        // 导出文件是快照，不随清空变化
        let again: Value = serde_json::from_str(&std::fs::read_to_string(&export).unwrap()).unwrap();
        assert_eq!(again["trace"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_fields_normalisation() {
        assert!(fields(Value::Null).is_empty());
        assert_eq!(fields(json!(3))["value"], json!(3));
        assert_eq!(fields(json!({"k": "v"}))["k"], json!("v"));
    }

    #[test]
    fn test_trace_file_layout() {
        let dir = TempDir::new().unwrap();
        let mut tracer = DecisionTracer::open(dir.path()).unwrap();
        tracer.log_decision("Planning", "a", "r", None, None).unwrap();
        tracer.log_decision("Task Completion", "b", "r", None, None).unwrap();

        let raw = std::fs::read_to_string(dir.path().join(TRACE_FILE)).unwrap();
        let doc: Value = serde_json::from_str(&raw).unwrap();
        let steps: Vec<&str> = doc["trace"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["step"].as_str().unwrap())
            .collect();
        assert_eq!(steps, vec!["Planning", "Task Completion"]);
        assert_eq!(DecisionTracer::open(dir.path()).unwrap().get_trace(), tracer.get_trace());
    }
}
