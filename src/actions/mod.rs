//! 动作层：步骤分类、执行上下文、执行器与结果类型

pub mod context;
pub mod executor;
pub mod kind;
pub mod result;

pub use context::{dependency_results, ExecutionContext};
pub use executor::ActionExecutor;
pub use kind::ActionKind;
pub use result::{preview, ArtifactPayload, StepResult, StepStatus};
