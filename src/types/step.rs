use serde::{Deserialize, Serialize};

/// 向导流程所处的步骤
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    #[default]
    Query,
    Recommendations,
    Summaries,
    Chat,
}

impl std::fmt::Display for FlowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowStep::Query => write!(f, "query"),
            FlowStep::Recommendations => write!(f, "recommendations"),
            FlowStep::Summaries => write!(f, "summaries"),
            FlowStep::Chat => write!(f, "chat"),
        }
    }
}
