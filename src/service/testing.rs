//! 测试用的内存研究服务

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::ResearchService;
use super::schema::{ChatReply, ImagesReply, RecommendationsReply, SummariesReply};
use crate::error::{ResearchError, ResearchResult};
use crate::types::{
    Article, ArticleSummary, ChatMessage, ChatRole, FollowUpQuestion, QueryImage,
    ResearchInsights, SuggestedQuestion, SystemStatus,
};

pub(crate) const STATUS: &str = "status";
pub(crate) const RECOMMENDATIONS: &str = "recommendations";
pub(crate) const SUMMARIES: &str = "summaries";
pub(crate) const CHAT: &str = "chat";
pub(crate) const IMAGES: &str = "images";

/// 按调用次数计数；可以让某次调用失败，或阻塞到测试放行
#[derive(Default)]
pub(crate) struct FakeService {
    calls: Mutex<HashMap<&'static str, usize>>,
    failures: Mutex<HashMap<(&'static str, usize), ResearchError>>,
    gates: Mutex<HashMap<(&'static str, usize), Arc<Notify>>>,
    in_flight: AtomicUsize,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第n次（从1开始）调用该操作时返回错误
    pub fn fail_on(&self, op: &'static str, nth: usize, error: ResearchError) {
        self.failures.lock().unwrap().insert((op, nth), error);
    }

    /// 第n次调用该操作时阻塞，直到返回的Notify被放行
    pub fn gate_on(&self, op: &'static str, nth: usize) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert((op, nth), notify.clone());
        notify
    }

    pub fn calls(&self, op: &'static str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self, op: &'static str) -> ResearchResult<()> {
        let nth = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(op).or_insert(0);
            *count += 1;
            *count
        };
        let gate = self.gates.lock().unwrap().remove(&(op, nth));
        if let Some(gate) = gate {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            gate.notified().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        match self.failures.lock().unwrap().remove(&(op, nth)) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

pub(crate) fn sample_article(id: &str, query: &str) -> Article {
    Article {
        id: id.to_string(),
        title: format!("{} study {}", query, id),
        relevance_score: 8.0,
        relevance_reasons: vec![format!("addresses {}", query)],
        research_applications: vec!["long-duration missions".to_string()],
        url: format!("https://example.org/articles/{}", id),
        organisms: vec!["Arabidopsis thaliana".to_string()],
        key_concepts: vec!["gravitropism".to_string()],
        selected: false,
    }
}

fn reply_message(id: usize, role: ChatRole, content: String) -> ChatMessage {
    ChatMessage {
        id: format!("msg_{}", id),
        role,
        content,
        timestamp: 1_700_000_000.0 + id as f64,
        follow_up_questions: vec![],
    }
}

#[async_trait]
impl ResearchService for FakeService {
    async fn get_status(&self) -> ResearchResult<SystemStatus> {
        self.enter(STATUS).await?;
        Ok(SystemStatus {
            status: "operational".to_string(),
            articles_available: 608,
            openai_configured: true,
            timestamp: Some(1_700_000_000.0),
        })
    }

    async fn get_recommendations(
        &self,
        query: &str,
        top_k: usize,
    ) -> ResearchResult<RecommendationsReply> {
        self.enter(RECOMMENDATIONS).await?;
        let recommendations = (1..=top_k)
            .map(|i| {
                let mut article = sample_article(&format!("a{}", i), query);
                // 服务端的selected标记不应被信任
                article.selected = i % 2 == 0;
                article
            })
            .collect();
        Ok(RecommendationsReply { recommendations })
    }

    async fn get_summaries(
        &self,
        selected_articles: &[Article],
        query: &str,
    ) -> ResearchResult<SummariesReply> {
        self.enter(SUMMARIES).await?;
        Ok(SummariesReply {
            article_summaries: selected_articles
                .iter()
                .map(|a| ArticleSummary {
                    article_id: a.id.clone(),
                    title: a.title.clone(),
                    summary: format!("Summary of {}", a.title),
                    url: a.url.clone(),
                    relevance_score: a.relevance_score,
                    organisms: a.organisms.clone(),
                    key_concepts: a.key_concepts.clone(),
                })
                .collect(),
            suggested_questions: selected_articles
                .iter()
                .enumerate()
                .map(|(i, a)| SuggestedQuestion {
                    id: format!("q_{}", i + 1),
                    question: format!("What methods did {} use?", a.id),
                    kind: "methodological".to_string(),
                    focus: "methods".to_string(),
                    article_id: Some(a.id.clone()),
                    article_title: Some(a.title.clone()),
                })
                .collect(),
            research_insights: Some(ResearchInsights {
                overall_insights: format!("Combined view on {}", query),
                articles_analyzed: selected_articles.len() as u64,
                research_query: query.to_string(),
            }),
        })
    }

    async fn chat_with_articles(
        &self,
        question: &str,
        _selected_articles: &[Article],
        _query: &str,
        history: &[ChatMessage],
    ) -> ResearchResult<ChatReply> {
        self.enter(CHAT).await?;
        let mut chat_history = history.to_vec();
        let next = history.len() + 1;
        chat_history.push(reply_message(next, ChatRole::User, question.to_string()));
        chat_history.push(reply_message(
            next + 1,
            ChatRole::Assistant,
            format!("Answer to: {}", question),
        ));
        Ok(ChatReply {
            chat_history,
            follow_up_questions: vec![FollowUpQuestion {
                id: format!("fq_{}", next),
                question: "Which organisms were studied?".to_string(),
                kind: "conceptual".to_string(),
            }],
        })
    }

    async fn get_query_images(
        &self,
        _query: &str,
        article_urls: &[String],
    ) -> ResearchResult<ImagesReply> {
        self.enter(IMAGES).await?;
        Ok(ImagesReply {
            images: article_urls
                .iter()
                .map(|url| QueryImage {
                    image_url: format!("{}/figure1.png", url),
                    caption: None,
                    source_url: Some(url.clone()),
                })
                .collect(),
        })
    }
}
