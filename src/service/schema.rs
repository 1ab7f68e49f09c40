//! 各接口的请求体与响应体

use serde::{Deserialize, Serialize};

use crate::types::{
    Article, ArticleSummary, ChatMessage, FollowUpQuestion, QueryImage, ResearchInsights,
    SuggestedQuestion, SummaryBundle,
};

#[derive(Debug, Serialize)]
pub struct RecommendationsRequest<'a> {
    pub research_query: &'a str,
    pub top_k: usize,
}

#[derive(Debug, Serialize)]
pub struct SummariesRequest<'a> {
    pub selected_articles: &'a [Article],
    pub research_query: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub user_question: &'a str,
    pub selected_articles: &'a [Article],
    pub research_query: &'a str,
    pub chat_history: &'a [ChatMessage],
}

#[derive(Debug, Serialize)]
pub struct QueryImagesRequest<'a> {
    pub research_query: &'a str,
    pub article_urls: &'a [String],
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RecommendationsReply {
    pub recommendations: Vec<Article>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SummariesReply {
    pub article_summaries: Vec<ArticleSummary>,
    #[serde(default)]
    pub suggested_questions: Vec<SuggestedQuestion>,
    #[serde(default)]
    pub research_insights: Option<ResearchInsights>,
}

impl SummariesReply {
    pub fn into_bundle(self) -> SummaryBundle {
        SummaryBundle {
            article_summaries: self.article_summaries,
            suggested_questions: self.suggested_questions,
            combined_summary: self
                .research_insights
                .map(|insights| insights.overall_insights)
                .filter(|text| !text.trim().is_empty()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ChatReply {
    pub chat_history: Vec<ChatMessage>,
    #[serde(default)]
    pub follow_up_questions: Vec<FollowUpQuestion>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ImagesReply {
    #[serde(default)]
    pub images: Vec<QueryImage>,
}

/// FastAPI风格的错误响应体
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<serde_json::Value>,
    pub message: Option<String>,
}

impl ErrorBody {
    /// 从原始响应体中提取错误说明，无法解析时返回原文
    pub fn detail_from(raw: &str) -> String {
        match serde_json::from_str::<ErrorBody>(raw) {
            Ok(ErrorBody {
                detail: Some(serde_json::Value::String(detail)),
                ..
            }) => detail,
            Ok(ErrorBody {
                detail: Some(other),
                ..
            }) => other.to_string(),
            Ok(ErrorBody {
                message: Some(message),
                ..
            }) => message,
            _ => raw.trim().to_string(),
        }
    }
}
