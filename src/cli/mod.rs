use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::flow::ResearchCategory;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Bionabu - NASA空间生物学文献研究助手
#[derive(Parser, Debug)]
#[command(name = "bionabu")]
#[command(
    about = "Explore NASA space biology publications: get article recommendations for a research question, summarize the selected articles and chat with them."
)]
#[command(version)]
pub struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 研究服务地址
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// 数据服务地址，用于查询配图
    #[arg(long)]
    pub data_api_base_url: Option<String>,

    /// 请求超时时间（秒）
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// 研究问题
    #[arg(short, long)]
    pub query: Option<String>,

    /// 预设研究方向 (plant-biology, human-physiology, microbiology, radiation, bone-muscle, cell-biology)
    #[arg(long)]
    pub category: Option<String>,

    /// 选中的文章序号，例如 1,3
    #[arg(short, long)]
    pub select: Option<String>,

    /// 依次发送的问题，可多次指定
    #[arg(long = "question")]
    pub questions: Vec<String>,

    /// 推荐文章数量
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// 进入交互模式
    #[arg(short, long)]
    pub interactive: bool,

    /// 不请求查询配图
    #[arg(long)]
    pub no_images: bool,

    /// 是否启用详细日志
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            // 显式指定的配置文件必须能读取
            Some(config_path) => Config::from_file(config_path)?,
            None => {
                let default_config_path = std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join(DEFAULT_CONFIG_FILE);

                if default_config_path.exists() {
                    Config::from_file(&default_config_path).unwrap_or_else(|e| {
                        eprintln!(
                            "⚠️ 警告: 无法读取默认配置文件 {:?}，使用默认配置: {}",
                            default_config_path, e
                        );
                        Config::default()
                    })
                } else {
                    Config::default()
                }
            }
        };

        // 覆盖服务配置
        if let Some(api_base_url) = self.api_base_url {
            config.service.api_base_url = api_base_url;
        }
        if let Some(data_api_base_url) = self.data_api_base_url {
            config.service.data_api_base_url = Some(data_api_base_url);
        }
        if let Some(timeout_seconds) = self.timeout_seconds {
            config.service.timeout_seconds = timeout_seconds;
        }

        // 研究问题与方向
        if let Some(query) = self.query {
            config.research_query = Some(query);
        }
        if let Some(category_str) = self.category {
            match category_str.parse::<ResearchCategory>() {
                Ok(category) => config.category = Some(category),
                Err(e) => eprintln!("⚠️ 警告: {}，忽略该参数", e),
            }
        }

        if let Some(select) = self.select {
            match parse_indices(&select) {
                Ok(selections) => config.selections = selections,
                Err(e) => eprintln!("⚠️ 警告: 无法解析文章序号 {:?}: {}", select, e),
            }
        }
        if !self.questions.is_empty() {
            config.questions = self.questions;
        }

        if let Some(top_k) = self.top_k {
            config.flow.top_k = top_k;
        }
        if self.no_images {
            config.flow.fetch_images = false;
        }

        config.interactive = config.interactive || self.interactive;
        config.verbose = config.verbose || self.verbose;

        Ok(config)
    }
}

/// 解析逗号分隔的序号列表，序号从1开始
fn parse_indices(input: &str) -> Result<Vec<usize>, String> {
    let mut indices = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let index: usize = part
            .parse()
            .map_err(|_| format!("'{}' is not a number", part))?;
        if index == 0 {
            return Err("article numbers start at 1".to_string());
        }
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    if indices.is_empty() {
        return Err("no article numbers given".to_string());
    }
    Ok(indices)
}
