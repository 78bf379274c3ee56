//! 规划层：计划类型、模型回复解析、TaskPlanner

pub mod parse;
pub mod planner;
pub mod types;

pub use parse::{parse_json_response, strip_code_fence};
pub use planner::TaskPlanner;
pub use types::{Plan, Step, StepId};
