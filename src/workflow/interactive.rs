use anyhow::{Context, Result};
use log::debug;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::render;
use crate::chat::ChatSession;
use crate::config::Config;
use crate::flow::{ResearchCategory, ResearchFlowController};
use crate::types::FlowStep;

/// 用户在任意步骤可输入的命令
#[derive(Debug, PartialEq)]
enum Command {
    Quit,
    Reset,
    Back,
    Clear,
    Summaries,
    Suggestions,
    Pick(usize),
    Text(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let command = match line.to_lowercase().as_str() {
        "quit" | "exit" | "q" => Command::Quit,
        "reset" => Command::Reset,
        "back" => Command::Back,
        "clear" => Command::Clear,
        "summaries" | "s" => Command::Summaries,
        "suggestions" => Command::Suggestions,
        _ => match line.parse::<usize>() {
            Ok(n) => Command::Pick(n),
            Err(_) => Command::Text(line.to_string()),
        },
    };
    Some(command)
}

fn prompt_for(step: FlowStep) -> &'static str {
    match step {
        FlowStep::Query => {
            "\nWhat is your research question? (or a category name, 'quit' to exit)"
        }
        FlowStep::Recommendations => {
            "\nSelect articles (e.g. 1,3), 'summaries' to continue, 'clear', 'reset' or 'quit'"
        }
        FlowStep::Summaries | FlowStep::Chat => {
            "\nAsk a question, pick a suggested question by number, 'suggestions', 'back', 'reset' or 'quit'"
        }
    }
}

/// 交互模式，逐行读取用户输入驱动向导
pub async fn run_interactive<R>(
    config: &Config,
    controller: &ResearchFlowController,
    input: R,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    println!("🚀 NASA Space Biology interactive research session");
    println!("Categories:\n{}", render::render_categories());

    let session = ChatSession::new(controller.clone());
    let mut lines = input.lines();

    loop {
        let step = controller.current_step().await;
        println!("{}", prompt_for(step));

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        let Some(command) = parse_command(&line) else {
            continue;
        };
        debug!("step {} command {:?}", step, command);

        match command {
            Command::Quit => break,
            Command::Reset => {
                controller.reset_flow().await;
                session.sync().await;
                println!("🔄 Starting over");
            }
            Command::Back => match step {
                FlowStep::Summaries | FlowStep::Chat => controller.go_back().await,
                FlowStep::Query | FlowStep::Recommendations => {
                    println!("⚠️ Nothing to go back to yet")
                }
            },
            _ => match step {
                FlowStep::Query => on_query(config, controller, command).await,
                FlowStep::Recommendations => on_recommendations(config, controller, command).await,
                FlowStep::Summaries | FlowStep::Chat => {
                    on_conversation(config, controller, &session, command).await
                }
            },
        }
    }

    println!("\n👋 Research session ended");
    Ok(())
}

async fn on_query(config: &Config, controller: &ResearchFlowController, command: Command) {
    let Command::Text(text) = command else {
        println!("⚠️ Please type a research question");
        return;
    };

    let result = match text.parse::<ResearchCategory>() {
        Ok(category) => controller.apply_category(category, config.flow.top_k).await,
        Err(_) => controller.get_recommendations(&text, config.flow.top_k).await,
    };
    if let Err(e) = result {
        println!("❌ {}", e.user_message());
        return;
    }

    if config.flow.fetch_images {
        let images = controller.fetch_query_images().await;
        if images > 0 {
            println!("🖼️ {} related images found", images);
        }
    }
    println!("{}", render::render_recommendations(&controller.snapshot().await));
}

async fn on_recommendations(
    config: &Config,
    controller: &ResearchFlowController,
    command: Command,
) {
    match command {
        Command::Clear => {
            controller.clear_selections().await;
            println!("{}", render::render_recommendations(&controller.snapshot().await));
        }
        Command::Summaries => request_summaries(config, controller).await,
        Command::Pick(n) => select_articles(config, controller, &n.to_string()).await,
        Command::Text(text) => select_articles(config, controller, &text).await,
        _ => println!("⚠️ Nothing to show yet"),
    }
}

async fn select_articles(config: &Config, controller: &ResearchFlowController, input: &str) {
    let state = controller.snapshot().await;
    let indices = match render::parse_selection(input, state.recommendations.len()) {
        Ok(indices) => indices,
        Err(message) => {
            println!("⚠️ {}", message);
            return;
        }
    };
    for index in indices {
        let article = &state.recommendations[index];
        controller.select_article(&article.id).await;
    }
    println!(
        "Selected {} articles",
        controller.snapshot().await.selection.len()
    );
    request_summaries(config, controller).await;
}

async fn request_summaries(config: &Config, controller: &ResearchFlowController) {
    println!("📝 Generating summaries and suggested questions...");
    match controller.request_summaries().await {
        Ok(_) => println!(
            "{}",
            render::render_summaries(&controller.snapshot().await, config.flow.suggestions_shown)
        ),
        Err(e) => println!("❌ {}", e.user_message()),
    }
}

async fn on_conversation(
    config: &Config,
    controller: &ResearchFlowController,
    session: &ChatSession,
    command: Command,
) {
    let state = controller.snapshot().await;
    let result = match command {
        Command::Suggestions | Command::Summaries => {
            println!("{}", render::render_summaries(&state, config.flow.suggestions_shown));
            let follow_ups = render::render_follow_ups(&state);
            if !follow_ups.is_empty() {
                println!("Follow-up questions:\n{}", follow_ups);
            }
            return;
        }
        Command::Pick(n) => {
            let Some(question) = n
                .checked_sub(1)
                .and_then(|i| state.suggested_questions().get(i))
            else {
                println!("⚠️ No suggested question #{}", n);
                return;
            };
            session
                .dispatch_initial_question(Some(&question.question))
                .await
        }
        Command::Text(text) => session.send(&text).await.map(|_| true),
        _ => return,
    };

    match result {
        Ok(_) => println!("{}", render::render_transcript(&session.displayed().await)),
        Err(e) => println!("❌ {}", e.user_message()),
    }
}
