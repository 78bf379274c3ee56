//! 计划数据类型：Plan（目标 + 有序步骤 + 成功标准）与 Step

use serde::{Deserialize, Deserializer, Serialize};

pub type StepId = u32;

/// 缺失或为 null 的字段都取默认值
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

/// 计划中的一个步骤；规划后不可变，执行期只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expected_output: String,
    /// 依赖的步骤 id，仅用于拼装上下文，不参与调度
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<StepId>,
}

impl Step {
    pub fn depends_on(&self, id: StepId) -> bool {
        self.dependencies.contains(&id)
    }
}

/// 规划结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub goal: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<Step>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub success_criteria: String,
}

impl Plan {
    /// 模型输出无法解析时的单步兜底计划：原始输出整体作为唯一步骤的描述
    pub fn fallback(task_description: &str, raw_output: &str) -> Self {
        Self {
            goal: task_description.to_string(),
            steps: vec![Step {
                id: 1,
                action: "Execute task".to_string(),
                description: raw_output.to_string(),
                expected_output: "Task completion".to_string(),
                dependencies: Vec::new(),
            }],
            success_criteria: "Task completed".to_string(),
        }
    }

    /// 找出不满足「id 递增、唯一、依赖指向更早步骤」的问题，返回可读描述
    ///
    /// 执行顺序始终以计划顺序为准，这里只用于告警。
    pub fn ordering_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut seen: Vec<StepId> = Vec::new();
        for step in &self.steps {
            if let Some(&last) = seen.last() {
                if step.id <= last {
                    issues.push(format!("step {} is not in ascending id order", step.id));
                }
            }
            if seen.contains(&step.id) {
                issues.push(format!("duplicate step id {}", step.id));
            }
            for dep in &step.dependencies {
                if !seen.contains(dep) {
                    issues.push(format!(
                        "step {} depends on {} which does not appear earlier",
                        step.id, dep
                    ));
                }
            }
            seen.push(step.id);
        }
        issues
    }
}
