use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio::io::BufReader;

use crate::chat::{ChatSession, SendOutcome};
use crate::config::Config;
use crate::flow::ResearchFlowController;
use crate::service::HttpResearchService;

mod interactive;
pub mod render;

pub use interactive::run_interactive;

/// 启动研究流程
pub async fn launch(config: &Config) -> Result<()> {
    let service = HttpResearchService::new(&config.service)?;
    let controller = ResearchFlowController::new(Arc::new(service));

    // 系统状态仅作参考，获取失败不影响后续流程
    match controller.load_status().await {
        Some(status) => println!("{}", render::render_status(&status)),
        None => println!("⚠️ Research service status unavailable, continuing anyway"),
    }

    if config.is_interactive() {
        let input = BufReader::new(tokio::io::stdin());
        run_interactive(config, &controller, input).await
    } else {
        run_batch(config, &controller).await
    }
}

/// 批处理模式：推荐 → 选择 → 摘要 → 依次提问
pub async fn run_batch(config: &Config, controller: &ResearchFlowController) -> Result<()> {
    let query = config
        .effective_query()
        .context("A research query or category is required in batch mode")?;

    println!("🔎 Step 1: getting article recommendations for \"{}\"...", query);
    controller
        .get_recommendations(&query, config.flow.top_k)
        .await
        .context("Failed to get recommendations")?;
    let state = controller.snapshot().await;
    println!("{}", render::render_recommendations(&state));

    let indices: Vec<usize> = if config.selections.is_empty() {
        println!(
            "Auto-selecting the top {} articles...",
            config.flow.default_selection_count
        );
        (0..config.flow.default_selection_count.min(state.recommendations.len())).collect()
    } else {
        config
            .selections
            .iter()
            .filter_map(|n| n.checked_sub(1))
            .collect()
    };
    for index in indices {
        if let Some(article) = state.recommendations.get(index) {
            controller.select_article(&article.id).await;
        }
    }

    println!("📝 Step 2: generating summaries and suggested questions...");
    // 配图与摘要互不依赖，并行请求
    let fetch_images = async {
        if config.flow.fetch_images {
            controller.fetch_query_images().await
        } else {
            0
        }
    };
    let (images, summaries) = futures::join!(fetch_images, controller.request_summaries());
    if images > 0 {
        info!("{} related images found", images);
    }
    summaries.context("Failed to generate summaries")?;
    let state = controller.snapshot().await;
    println!("{}", render::render_summaries(&state, config.flow.suggestions_shown));

    if config.questions.is_empty() {
        return Ok(());
    }

    println!("💬 Step 3: chatting with the selected articles...");
    let session = ChatSession::new(controller.clone());
    for question in &config.questions {
        println!("\n❓ {}", question);
        match session.send(question).await.context("Chat request failed")? {
            SendOutcome::Sent => {
                let state = controller.snapshot().await;
                if let Some(answer) = state.chat_history.last() {
                    println!("🤖 {}", answer.content);
                }
                let follow_ups = render::render_follow_ups(&state);
                if !follow_ups.is_empty() {
                    println!("Follow-up questions:\n{}", follow_ups);
                }
            }
            outcome => info!("question skipped: {:?}", outcome),
        }
    }

    println!("\n✅ Research session complete");
    Ok(())
}
