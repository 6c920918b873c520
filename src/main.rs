use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use pdf_search_scraper::config::{Config, SearchEngine};
use pdf_search_scraper::{logger, App};

/// 通过搜索引擎批量下载 PDF 文档
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML 配置文件
    #[arg(short, long, env = "SCRAPER_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    engine: Option<SearchEngine>,

    #[arg(long)]
    max_pages: Option<usize>,

    #[arg(long)]
    concurrency: Option<usize>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// 查询模板，给出时替换配置文件中的查询
    queries: Vec<String>,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?.with_env_overrides()?;

        if let Some(engine) = self.engine {
            config.search_engine = engine;
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if !self.queries.is_empty() {
            config.search_queries = self.queries;
        }

        Ok(config.validate()?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Cli::parse().into_config().context("配置无效")?;

    // 初始化并运行应用
    let app = App::initialize(config).await?;

    let cancel = app.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到 Ctrl-C，正在停止...");
            cancel.cancel();
        }
    });

    app.run_to_completion().await?;

    Ok(())
}
