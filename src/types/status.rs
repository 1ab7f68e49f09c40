use serde::{Deserialize, Serialize};

/// 系统状态快照，仅作参考，不影响任何流程步骤
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SystemStatus {
    /// operational / degraded
    pub status: String,
    pub articles_available: u64,
    pub openai_configured: bool,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

impl SystemStatus {
    pub fn is_operational(&self) -> bool {
        self.status == "operational"
    }
}

/// 与查询相关的配图
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct QueryImage {
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}
