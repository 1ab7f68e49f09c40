//! 终端视图：把流程状态格式化为文本

use crate::chat::{Delivery, DisplayMessage};
use crate::flow::{FlowState, ResearchCategory};
use crate::types::SystemStatus;

/// 摘要正文在列表中展示的最大字符数
const SUMMARY_PREVIEW_CHARS: usize = 400;

pub fn render_status(status: &SystemStatus) -> String {
    let marker = if status.is_operational() { "✅" } else { "⚠️" };
    format!(
        "{} Research service {} ({} articles available, AI {})",
        marker,
        status.status,
        status.articles_available,
        if status.openai_configured {
            "configured"
        } else {
            "not configured"
        }
    )
}

pub fn render_categories() -> String {
    ResearchCategory::all()
        .iter()
        .map(|c| format!("  - {} ({})", c, c.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_recommendations(state: &FlowState) -> String {
    let mut out = format!(
        "📚 Top {} recommendations for \"{}\":\n",
        state.recommendations.len(),
        state.research_query
    );
    for (i, article) in state.recommendations.iter().enumerate() {
        let marker = if article.selected { "[x]" } else { "[ ]" };
        out.push_str(&format!(
            "{} {}. {} (score {:.1}/10)\n",
            marker,
            i + 1,
            article.title,
            article.relevance_score
        ));
        if !article.relevance_reasons.is_empty() {
            out.push_str(&format!("      {}\n", article.headline_reasons(2)));
        }
    }
    out
}

pub fn render_summaries(state: &FlowState, suggestions_shown: usize) -> String {
    let Some(bundle) = state.summaries.as_ref() else {
        return String::new();
    };

    let mut out = String::from("📝 Article summaries:\n");
    for summary in &bundle.article_summaries {
        out.push_str(&format!(
            "\n# {}\n{}\n",
            summary.title,
            preview(&summary.summary, SUMMARY_PREVIEW_CHARS)
        ));
    }
    if let Some(combined) = &bundle.combined_summary {
        out.push_str(&format!("\n🔭 Overall insights:\n{}\n", combined));
    }
    if !bundle.suggested_questions.is_empty() {
        out.push_str(&format!(
            "\n💡 Suggested questions ({}):\n",
            bundle.suggested_questions.len()
        ));
        for (i, q) in bundle
            .suggested_questions
            .iter()
            .take(suggestions_shown)
            .enumerate()
        {
            out.push_str(&format!(
                "  {}. {} [{} | {}]\n",
                i + 1,
                q.question,
                q.kind,
                q.focus
            ));
        }
    }
    out
}

pub fn render_transcript(messages: &[DisplayMessage]) -> String {
    messages
        .iter()
        .map(|m| {
            let suffix = match m.delivery {
                Delivery::Confirmed => "",
                Delivery::Pending => " (sending...)",
                Delivery::Failed => " (failed)",
            };
            let time = m
                .message
                .sent_at()
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string());
            format!("{} [{}]{} {}", time, m.message.role, suffix, m.message.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_follow_ups(state: &FlowState) -> String {
    state
        .follow_up_questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("  {}. {}", i + 1, q.question))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 解析 "1,3" 形式的文章序号（从1开始），返回去重后的下标
pub fn parse_selection(input: &str, available: usize) -> Result<Vec<usize>, String> {
    let mut indices = Vec::new();
    for part in input.split([',', ' ']).filter(|p| !p.trim().is_empty()) {
        let number: usize = part
            .trim()
            .parse()
            .map_err(|_| format!("Invalid article number: {}", part.trim()))?;
        if number == 0 || number > available {
            return Err(format!(
                "Article number {} is out of range (1-{})",
                number, available
            ));
        }
        if !indices.contains(&(number - 1)) {
            indices.push(number - 1);
        }
    }
    if indices.is_empty() {
        return Err("No articles selected".to_string());
    }
    Ok(indices)
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
