//! ActionExecutor：分类步骤 → 拼 prompt → 调一次模型 → 包装为 StepResult
//!
//! 不校验、不重试模型输出，任何文本都被当作产物接受。document / generated_content 的全文写入
//! output_dir 下的独立文件，载荷里只留路径与预览。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Map;

use crate::actions::{preview, ActionKind, ArtifactPayload, ExecutionContext, StepResult};
use crate::core::{AgentError, AgentResult};
use crate::llm::LlmClient;
use crate::plan::Step;

const DOCUMENT_PREVIEW_CHARS: usize = 200;
const GENERATED_PREVIEW_CHARS: usize = 250;
const ANALYSIS_SUMMARY_CHARS: usize = 300;

pub struct ActionExecutor {
    llm: Arc<dyn LlmClient>,
    output_dir: PathBuf,
}

impl ActionExecutor {
    /// 创建执行器；output_dir 不存在时自动创建
    pub fn new(llm: Arc<dyn LlmClient>, output_dir: impl AsRef<Path>) -> AgentResult<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self { llm, output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn classify(step: &Step) -> ActionKind {
        ActionKind::classify(&step.action, &step.description)
    }

    /// 执行单步；模型调用失败或产物写盘失败时返回 Err，由调用方转为 failed 结果
    pub async fn execute(&self, step: &Step, ctx: &ExecutionContext) -> AgentResult<StepResult> {
        let kind = Self::classify(step);
        tracing::debug!(step_id = step.id, kind = %kind, "Dispatching step");

        let payload = match kind {
            ActionKind::CreateDocument => self.create_document(step, ctx).await?,
            ActionKind::AnalyzeData => self.analyze_data(step, ctx).await?,
            ActionKind::GenerateContent => self.generate_content(step, ctx).await?,
            ActionKind::Research => self.research(step, ctx).await?,
            ActionKind::CalculateMetrics => self.calculate_metrics(step, ctx).await?,
            ActionKind::Generic => self.generic(step, ctx).await?,
        };

        Ok(StepResult::completed(step, payload))
    }

    async fn generate(&self, prompt: &str) -> AgentResult<String> {
        self.llm.generate(prompt).await.map_err(AgentError::Llm)
    }

    async fn create_document(
        &self,
        step: &Step,
        ctx: &ExecutionContext,
    ) -> AgentResult<ArtifactPayload> {
        let prompt = format!(
            "Create a professional document based on this requirement:\n\n\
             Task: {}\nDetails: {}\n\nContext: {}\n\n\
             Generate a well-structured document with appropriate sections and content.",
            step.action,
            step.description,
            ctx.to_pretty_json()
        );
        let content = self.generate(&prompt).await?;
        let path = self.write_artifact("document", step, "md", &content)?;

        Ok(ArtifactPayload::Document {
            filepath: path.display().to_string(),
            content_preview: preview(&content, DOCUMENT_PREVIEW_CHARS),
        })
    }

    async fn analyze_data(
        &self,
        step: &Step,
        ctx: &ExecutionContext,
    ) -> AgentResult<ArtifactPayload> {
        let prompt = format!(
            "Perform analysis based on this requirement:\n\n\
             Task: {}\nDetails: {}\n\nData context: {}\n\n\
             Provide structured analysis with key findings, insights, and recommendations.",
            step.action,
            step.description,
            ctx.to_pretty_json()
        );
        let analysis = self.generate(&prompt).await?;

        Ok(ArtifactPayload::Analysis {
            summary: preview(&analysis, ANALYSIS_SUMMARY_CHARS),
            findings: analysis,
        })
    }

    async fn generate_content(
        &self,
        step: &Step,
        ctx: &ExecutionContext,
    ) -> AgentResult<ArtifactPayload> {
        let prompt = format!(
            "Generate content for:\n\n\
             Task: {}\nRequirements: {}\n\nContext: {}\n\n\
             Create high-quality, relevant content that meets the requirements.",
            step.action,
            step.description,
            ctx.to_pretty_json()
        );
        let content = self.generate(&prompt).await?;
        let path = self.write_artifact("generated", step, "txt", &content)?;

        Ok(ArtifactPayload::GeneratedContent {
            filepath: path.display().to_string(),
            preview: preview(&content, GENERATED_PREVIEW_CHARS),
        })
    }

    async fn research(&self, step: &Step, ctx: &ExecutionContext) -> AgentResult<ArtifactPayload> {
        let prompt = format!(
            "Research and compile information on:\n\n\
             Topic: {}\nFocus: {}\n\nContext: {}\n\n\
             Provide comprehensive research findings with sources and key points.",
            step.action,
            step.description,
            ctx.to_pretty_json()
        );
        let findings = self.generate(&prompt).await?;
        Ok(ArtifactPayload::Research { findings })
    }

    async fn calculate_metrics(
        &self,
        step: &Step,
        ctx: &ExecutionContext,
    ) -> AgentResult<ArtifactPayload> {
        let data = ctx.task.user_data.clone().unwrap_or_else(Map::new);
        let prompt = format!(
            "Calculate relevant metrics based on:\n\n\
             Task: {}\nDetails: {}\n\nAvailable data: {}\n\n\
             Provide calculated metrics with formulas and interpretations.",
            step.action,
            step.description,
            serde_json::to_string_pretty(&data)?
        );
        let calculations = self.generate(&prompt).await?;

        Ok(ArtifactPayload::Metrics {
            calculations,
            data_used: data,
        })
    }

    async fn generic(&self, step: &Step, ctx: &ExecutionContext) -> AgentResult<ArtifactPayload> {
        let prompt = format!(
            "Execute this task step:\n\n\
             Action: {}\nDescription: {}\n\nContext: {}\n\n\
             Provide a detailed execution result.",
            step.action,
            step.description,
            ctx.to_pretty_json()
        );
        let output = self.generate(&prompt).await?;
        Ok(ArtifactPayload::Generic { output })
    }

    /// 写产物文件：`<prefix>_<step_id>_<时间戳>.<ext>`，同名已存在时追加序号
    fn write_artifact(
        &self,
        prefix: &str,
        step: &Step,
        ext: &str,
        content: &str,
    ) -> AgentResult<PathBuf> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
        let stem = format!("{}_{}_{}", prefix, step.id, stamp);
        let mut path = self.output_dir.join(format!("{}.{}", stem, ext));
        let mut n = 1;
        while path.exists() {
            path = self.output_dir.join(format!("{}_{}.{}", stem, n, ext));
            n += 1;
        }
        std::fs::write(&path, content)?;
        tracing::debug!("Artifact written to {}", path.display());
        Ok(path)
    }
}
