use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 消息角色
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// 助手给出的后续问题
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FollowUpQuestion {
    #[serde(default)]
    pub id: String,
    pub question: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// 对话消息
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub role: ChatRole,
    pub content: String,
    /// Unix时间戳（秒）
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_up_questions: Vec<FollowUpQuestion>,
}

impl ChatMessage {
    /// 创建一条本地的用户消息，尚未经过服务确认
    pub fn local_user(content: &str) -> Self {
        let now = Utc::now();
        Self {
            id: format!("local_{}", uuid::Uuid::new_v4()),
            role: ChatRole::User,
            content: content.to_string(),
            timestamp: now.timestamp_millis() as f64 / 1000.0,
            follow_up_questions: Vec::new(),
        }
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis((self.timestamp * 1000.0) as i64)
    }
}
