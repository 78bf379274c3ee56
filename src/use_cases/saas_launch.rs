//! SaaS 分析看板上线

use serde_json::json;

use crate::core::TaskContext;

pub const SAAS_LAUNCH_TASK_TYPE: &str = "saas_launch";

const TASK: &str = "Launch a new analytics dashboard feature for our SaaS product. \
This involves creating a feature specification document, generating preliminary \
success metrics based on user data, drafting a go-to-market plan, and preparing \
internal communication for the engineering and product teams.";

/// 返回 (任务描述, 上下文)
pub fn saas_dashboard_launch() -> (String, TaskContext) {
    let user_data = json!({
        "current_active_users": 12500,
        "avg_session_duration_minutes": 24,
        "weekly_active_users": 8900,
        "monthly_active_users": 11200,
        "churn_rate_percent": 3.2,
        "avg_revenue_per_user": 49.99
    });

    let context = TaskContext::new()
        .with_task_type(SAAS_LAUNCH_TASK_TYPE)
        .with_user_data(user_data.as_object().cloned().unwrap_or_default())
        .with_extra("product", "Analytics Dashboard")
        .with_extra("target_audience", "B2B SaaS customers")
        .with_extra("timeline", "6 week launch cycle")
        .with_extra("team_size", 8)
        .with_extra("budget", "allocated for development and marketing");

    (TASK.to_string(), context)
}
