//! 示例工作流：任务描述 + 上下文的预设组合

pub mod saas_launch;

pub use saas_launch::{saas_dashboard_launch, SAAS_LAUNCH_TASK_TYPE};
