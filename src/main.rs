//! Stagent 命令行入口
//!
//! 初始化日志与配置，按子命令运行任务或查看 / 维护持久化的会话、记忆与决策追踪。

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use stagent::config::{load_config, AppConfig};
use stagent::core::{reset_session, StatefulAgent, TaskContext, TaskSummary};
use stagent::memory::StateManager;
use stagent::trace::DecisionTracer;
use stagent::use_cases::saas_dashboard_launch;

#[derive(Parser, Debug)]
#[command(name = "stagent", version, about = "Stateful task execution agent")]
struct Cli {
    /// 额外的 TOML 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 规划并执行一个任务
    Run {
        /// 任务描述
        task: String,
        /// JSON 上下文文件
        #[arg(long)]
        context: Option<PathBuf>,
        /// 覆盖上下文中的 task_type
        #[arg(long)]
        task_type: Option<String>,
    },
    /// 运行 SaaS 看板上线示例
    Demo,
    /// 打印决策路径
    Trace {
        /// 只输出最近 N 条（JSON）
        #[arg(long)]
        recent: Option<usize>,
    },
    /// 导出决策追踪快照
    Export { path: PathBuf },
    /// 开始新会话（长期记忆保留）
    NewSession,
    /// 列出历史任务
    History {
        #[arg(long)]
        task_type: Option<String>,
    },
    /// 用户偏好
    #[command(subcommand)]
    Pref(PrefCommand),
}

#[derive(Subcommand, Debug)]
enum PrefCommand {
    /// 设置偏好，值为 JSON（非法 JSON 按字符串存）
    Set { key: String, value: String },
    Get { key: String },
}

fn read_context(path: Option<&PathBuf>, task_type: Option<String>) -> anyhow::Result<TaskContext> {
    let mut ctx = match path {
        Some(p) => {
            let raw = std::fs::read_to_string(p)
                .with_context(|| format!("Failed to read context file {}", p.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid context file {}", p.display()))?
        }
        None => TaskContext::new(),
    };
    if task_type.is_some() {
        ctx.task_type = task_type;
    }
    Ok(ctx)
}

fn print_summary(summary: &TaskSummary, agent: &StatefulAgent) {
    println!("\nTASK SUMMARY");
    println!("Goal: {}", summary.goal);
    println!(
        "Steps Completed: {}/{}",
        summary.successful_steps, summary.total_steps
    );
    println!("Success Rate: {:.1}%", summary.success_rate * 100.0);
    let (prompt, completion, total) = agent.token_usage();
    if total > 0 {
        println!("Tokens: {} (prompt {}, completion {})", total, prompt, completion);
    }
    for r in &summary.results {
        match (&r.result, &r.error) {
            (Some(payload), _) => match payload.filepath() {
                Some(path) => println!("  [{}] {} -> {}", r.step_id, payload.kind(), path),
                None => println!("  [{}] {}", r.step_id, payload.kind()),
            },
            (None, Some(err)) => println!("  [{}] failed: {}", r.step_id, err),
            (None, None) => println!("  [{}] {:?}", r.step_id, r.status),
        }
    }
    println!("\nDECISION TRACE");
    println!("{}", agent.get_decision_trace());
}

async fn run_task(cfg: &AppConfig, task: &str, ctx: TaskContext) -> anyhow::Result<()> {
    let mut agent = StatefulAgent::from_config(cfg).context("Failed to create agent")?;
    let summary = agent.run_task(task, ctx).await.context("Task failed")?;
    print_summary(&summary, &agent);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stagent::observability::init();

    let cli = Cli::parse();
    let cfg = match (load_config(cli.config.clone()), cli.config.as_ref()) {
        (Ok(cfg), _) => cfg,
        (Err(e), Some(path)) => {
            return Err(e).with_context(|| format!("Failed to load config {}", path.display()));
        }
        (Err(e), None) => {
            tracing::warn!("Config load failed ({}), using defaults", e);
            AppConfig::default()
        }
    };
    let storage = cfg.app.storage_dir.clone();

    match cli.command {
        Commands::Run {
            task,
            context,
            task_type,
        } => {
            let ctx = read_context(context.as_ref(), task_type)?;
            run_task(&cfg, &task, ctx).await?;
        }
        Commands::Demo => {
            let (task, ctx) = saas_dashboard_launch();
            run_task(&cfg, &task, ctx).await?;
        }
        Commands::Trace { recent } => {
            let tracer = DecisionTracer::open(&storage)?;
            match recent {
                Some(n) => println!(
                    "{}",
                    serde_json::to_string_pretty(tracer.get_recent_decisions(n))?
                ),
                None => println!("{}", tracer.explain_decision_path()),
            }
        }
        Commands::Export { path } => {
            DecisionTracer::open(&storage)?.export_trace(&path)?;
            println!("Session trace exported to: {}", path.display());
        }
        Commands::NewSession => {
            let mut memory = StateManager::open(&storage)?;
            let mut tracer = DecisionTracer::open(&storage)?;
            let id = reset_session(&mut memory, &mut tracer)?;
            println!("New session started: {}", id);
        }
        Commands::History { task_type } => {
            let memory = StateManager::open(&storage)?;
            let records: Vec<_> = match task_type.as_deref() {
                Some(t) => memory.get_relevant_past_tasks(t),
                None => memory.long_term().past_tasks.iter().collect(),
            };
            if records.is_empty() {
                println!("No past tasks recorded.");
            }
            for r in records {
                println!(
                    "{}  [{}]  {:.0}%  {}",
                    r.completed_at,
                    r.task_type,
                    r.success_rate * 100.0,
                    r.task.trim()
                );
            }
        }
        Commands::Pref(PrefCommand::Set { key, value }) => {
            let mut memory = StateManager::open(&storage)?;
            let parsed = serde_json::from_str(&value)
                .unwrap_or(serde_json::Value::String(value));
            memory.store_user_preference(&key, parsed)?;
        }
        Commands::Pref(PrefCommand::Get { key }) => {
            let memory = StateManager::open(&storage)?;
            match memory.get_user_preference(&key) {
                Some(v) => println!("{}", v),
                None => println!("(unset)"),
            }
        }
    }

    Ok(())
}
