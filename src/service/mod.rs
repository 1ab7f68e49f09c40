//! 研究服务客户端 - 与AI后端之间的请求/响应约定

use async_trait::async_trait;

use crate::error::ResearchResult;
use crate::types::{Article, ChatMessage, SystemStatus};

mod http;
pub mod schema;
#[cfg(test)]
pub(crate) mod testing;

pub use http::HttpResearchService;
pub use schema::{ChatReply, ImagesReply, RecommendationsReply, SummariesReply};

/// 研究服务，控制器唯一依赖的外部协作方
#[async_trait]
pub trait ResearchService: Send + Sync {
    /// 系统状态，仅作参考
    async fn get_status(&self) -> ResearchResult<SystemStatus>;

    /// 根据研究问题获取文章推荐
    async fn get_recommendations(
        &self,
        query: &str,
        top_k: usize,
    ) -> ResearchResult<RecommendationsReply>;

    /// 为已选文章生成摘要和推荐追问
    async fn get_summaries(
        &self,
        selected_articles: &[Article],
        query: &str,
    ) -> ResearchResult<SummariesReply>;

    /// 围绕已选文章进行对话，返回服务端确认后的完整对话记录
    async fn chat_with_articles(
        &self,
        question: &str,
        selected_articles: &[Article],
        query: &str,
        history: &[ChatMessage],
    ) -> ResearchResult<ChatReply>;

    /// 查询配图，纯装饰性
    async fn get_query_images(
        &self,
        query: &str,
        article_urls: &[String],
    ) -> ResearchResult<ImagesReply>;
}
