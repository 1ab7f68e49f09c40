use anyhow::Result;
use bionabu::{cli, launch};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    let config = args.into_config()?;

    // RUST_LOG优先，其次由verbose决定默认级别
    let default_level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    launch(&config).await
}
