//! 研究向导的状态机：查询 → 推荐 → 摘要 → 对话

mod category;
mod controller;
mod generation;
mod state;

pub use category::ResearchCategory;
pub use controller::{RequestOutcome, ResearchFlowController};
pub use generation::RequestKind;
pub use state::{FlowState, SelectionSet};

/// 研究问题为空时的提示
pub const QUERY_REQUIRED: &str = "Research query is required";
/// 未选择任何文章时的提示
pub const SELECTION_REQUIRED: &str = "Select at least one article";
/// 对话问题为空时的提示
pub const QUESTION_REQUIRED: &str = "Question is required";

// Include tests
#[cfg(test)]
mod tests;
