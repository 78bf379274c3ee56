//! 动作分类：对 action + description 做关键词匹配，按固定优先级取第一个命中的类别

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateDocument,
    AnalyzeData,
    GenerateContent,
    Research,
    CalculateMetrics,
    Generic,
}

/// 优先级顺序即表中顺序
const KEYWORDS: &[(ActionKind, &[&str])] = &[
    (ActionKind::CreateDocument, &["create", "write", "draft", "document"]),
    (ActionKind::AnalyzeData, &["analyze", "evaluate", "assess"]),
    (ActionKind::GenerateContent, &["generate", "produce", "develop"]),
    (ActionKind::Research, &["research", "investigate", "explore"]),
    (ActionKind::CalculateMetrics, &["calculate", "metric", "measure"]),
];

impl ActionKind {
    /// 子串匹配（"documentation" 也算命中 "document"）
    pub fn classify(action: &str, description: &str) -> Self {
        let text = format!("{} {}", action, description).to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| text.contains(w)))
            .map(|(kind, _)| *kind)
            .unwrap_or(ActionKind::Generic)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::CreateDocument => "create_document",
            ActionKind::AnalyzeData => "analyze_data",
            ActionKind::GenerateContent => "generate_content",
            ActionKind::Research => "research",
            ActionKind::CalculateMetrics => "calculate_metrics",
            ActionKind::Generic => "generic",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_examples() {
        assert_eq!(
            ActionKind::classify("Draft a feature spec", ""),
            ActionKind::CreateDocument
        );
        assert_eq!(
            ActionKind::classify("Research competitor pricing", ""),
            ActionKind::Research
        );
        assert_eq!(ActionKind::classify("Tabulate revenue", ""), ActionKind::Generic);
    }

    #[test]
    fn test_priority_order_breaks_ties() {
        // analyze 与 write 同时命中时 create_document 优先
        assert_eq!(
            ActionKind::classify("Analyze churn", "and write up the findings"),
            ActionKind::CreateDocument
        );
        assert_eq!(
            ActionKind::classify("Investigate", "then produce a summary"),
            ActionKind::GenerateContent
        );
    }

    #[test]
    fn test_description_and_case_participate() {
        assert_eq!(
            ActionKind::classify("Step four", "MEASURE weekly retention"),
            ActionKind::CalculateMetrics
        );
        assert_eq!(ActionKind::classify("Assess risk", ""), ActionKind::AnalyzeData);
        assert_eq!(
            ActionKind::classify("Explore channels", ""),
            ActionKind::Research
        );
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(ActionKind::CalculateMetrics.to_string(), "calculate_metrics");
        let v = serde_json::to_value(ActionKind::AnalyzeData).unwrap();
        assert_eq!(v, "analyze_data");
    }
}
