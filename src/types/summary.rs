use serde::{Deserialize, Serialize};

/// 单篇文章的摘要
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ArticleSummary {
    pub article_id: String,
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub organisms: Vec<String>,
    #[serde(default)]
    pub key_concepts: Vec<String>,
}

/// 推荐追问
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SuggestedQuestion {
    pub id: String,
    pub question: String,
    /// methodological / conceptual / practical / comparative
    #[serde(rename = "type")]
    pub kind: String,
    pub focus: String,
    #[serde(default)]
    pub article_id: Option<String>,
    #[serde(default)]
    pub article_title: Option<String>,
}

/// 跨文章的整体研究洞察
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResearchInsights {
    pub overall_insights: String,
    #[serde(default)]
    pub articles_analyzed: u64,
    #[serde(default)]
    pub research_query: String,
}

/// 摘要步骤的完整结果
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SummaryBundle {
    pub article_summaries: Vec<ArticleSummary>,
    pub suggested_questions: Vec<SuggestedQuestion>,
    /// 所有已选文章的综合摘要
    pub combined_summary: Option<String>,
}
