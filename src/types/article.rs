use serde::{Deserialize, Serialize};

/// 推荐文章
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Article {
    /// 推荐ID，在一次推荐结果中唯一
    pub id: String,
    pub title: String,
    /// 相关性评分，约定范围 0-10，不做强制校验
    pub relevance_score: f64,
    /// 相关原因（有序）
    pub relevance_reasons: Vec<String>,
    /// 研究应用方向
    pub research_applications: Vec<String>,
    /// 原文链接
    pub url: String,
    #[serde(default)]
    pub organisms: Vec<String>,
    #[serde(default)]
    pub key_concepts: Vec<String>,
    /// 是否被用户选中
    #[serde(default)]
    pub selected: bool,
}

impl Article {
    /// 用于终端列表展示的简短相关原因
    pub fn headline_reasons(&self, limit: usize) -> String {
        self.relevance_reasons
            .iter()
            .take(limit)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_optional_fields_default() {
        let json = r#"{
            "id": "rec_1",
            "title": "Arabidopsis root growth in microgravity",
            "relevance_score": 8.5,
            "relevance_reasons": ["plant growth", "spaceflight"],
            "research_applications": ["crop production"],
            "url": "https://example.org/a1"
        }"#;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.id, "rec_1");
        assert!(article.organisms.is_empty());
        assert!(article.key_concepts.is_empty());
        assert!(!article.selected);
    }

    #[test]
    fn test_article_missing_required_field_rejected() {
        let json = r#"{"id": "rec_1", "title": "No score"}"#;
        assert!(serde_json::from_str::<Article>(json).is_err());
    }

    #[test]
    fn test_headline_reasons() {
        let article = Article {
            id: "rec_1".to_string(),
            title: "t".to_string(),
            relevance_score: 7.0,
            relevance_reasons: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            research_applications: vec![],
            url: String::new(),
            organisms: vec![],
            key_concepts: vec![],
            selected: false,
        };
        assert_eq!(article.headline_reasons(2), "a, b");
        assert_eq!(article.headline_reasons(0), "");
    }
}
