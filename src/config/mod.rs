use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use crate::flow::ResearchCategory;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "bionabu.toml";

/// 应用程序配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// 研究服务配置
    pub service: ServiceConfig,

    /// 流程参数
    pub flow: FlowConfig,

    /// 批处理模式下的研究问题
    pub research_query: Option<String>,

    /// 预设研究方向，未指定research_query时使用
    pub category: Option<ResearchCategory>,

    /// 批处理模式下选中的文章序号（从1开始）
    pub selections: Vec<usize>,

    /// 批处理模式下依次发送的对话问题
    pub questions: Vec<String>,

    /// 是否进入交互模式
    pub interactive: bool,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// 研究服务配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServiceConfig {
    /// AI后端地址
    pub api_base_url: String,

    /// 数据后端地址，用于查询配图；为空时不请求配图
    pub data_api_base_url: Option<String>,

    /// API路径前缀
    pub api_prefix: String,

    /// 超时时间（秒），AI生成较慢，需要留出足够余量
    pub timeout_seconds: u64,
}

/// 流程参数
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct FlowConfig {
    /// 推荐文章数量
    pub top_k: usize,

    /// 批处理模式下未指定选择时，自动选中前几篇
    pub default_selection_count: usize,

    /// 展示的推荐追问数量
    pub suggestions_shown: usize,

    /// 是否请求查询配图
    pub fetch_images: bool,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 批处理模式下实际使用的研究问题：显式问题优先，其次是预设方向
    pub fn effective_query(&self) -> Option<String> {
        if let Some(ref query) = self.research_query
            && !query.trim().is_empty()
        {
            return Some(query.trim().to_string());
        }
        self.category.map(|category| category.query().to_string())
    }

    /// 是否以交互模式运行
    pub fn is_interactive(&self) -> bool {
        self.interactive || self.effective_query().is_none()
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// 拼接AI后端的接口地址
    pub fn endpoint(&self, path: &str) -> String {
        join_url(&self.api_base_url, &self.api_prefix, path)
    }

    /// 拼接数据后端的接口地址
    pub fn data_endpoint(&self, path: &str) -> Option<String> {
        self.data_api_base_url
            .as_deref()
            .filter(|base| !base.trim().is_empty())
            .map(|base| join_url(base, &self.api_prefix, path))
    }
}

fn join_url(base: &str, prefix: &str, path: &str) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in [prefix, path] {
        let segment = segment.trim_matches('/');
        if !segment.is_empty() {
            url.push('/');
            url.push_str(segment);
        }
    }
    url
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            flow: FlowConfig::default(),
            research_query: None,
            category: None,
            selections: vec![],
            questions: vec![],
            interactive: false,
            verbose: false,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base_url: std::env::var("BIONABU_API_BASE_URL")
                .unwrap_or_else(|_| String::from("http://localhost:8000")),
            data_api_base_url: std::env::var("BIONABU_DATA_API_BASE_URL").ok(),
            api_prefix: String::from("/api/v1"),
            timeout_seconds: 120,
        }
    }
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            default_selection_count: 2,
            suggestions_shown: 5,
            fetch_images: true,
        }
    }
}
