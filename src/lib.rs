//! # PDF Search Scraper
//!
//! 通过搜索引擎批量查找并下载 PDF 文档
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（浏览器、页面、日志文件），只暴露能力
//! - `Renderer` / `Session` - 渲染器抽象，`ChromeRenderer` 为 chromiumoxide 实现
//! - `RunLog` - 只追加的运行日志
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个查询或单个链接
//! - `query_expander` - 查询模板展开
//! - `link_filter` - PDF 链接启发式与域名过滤
//! - `Downloader` - 单个链接的下载
//!
//! ### ③ 流程层（Workflow）
//! - `CrawlJob` - 单个查询的完整流程（翻页 → 提取 → 过滤 → 下载）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 运行编排，管理浏览器生命周期和分批并发
//! - `orchestrator/batcher` - 分批

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, SearchEngine};
pub use error::{ScrapeError, ScrapeResult};
pub use infrastructure::{ChromeRenderer, Renderer, RunLog, Session};
pub use orchestrator::{App, RunReport};
pub use workflow::{CrawlCtx, CrawlJob, CrawlReport};
