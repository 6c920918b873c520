//! 单个查询的抓取流程 - 流程层
//!
//! 状态流转：
//!
//! ```text
//! Initializing → PagingResults → ExtractingLinks → DispatchingDownloads ─┐
//!                     ↑                                                  │
//!                     └──────────────────── 下一页 ───────────────────────┘
//!                     │
//!                     └→ Completed（达到页数上限或运行被取消）
//! ```
//!
//! 某一页导航或提取链接失败时，记录日志后跳到下一页，不会中止整个查询。
//! 同一查询内的下载严格按提取顺序逐个执行。

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ScrapeError, ScrapeResult};
use crate::infrastructure::{fs_store, navigate_with_timeout, Renderer, RunLog, Session, SessionGuard};
use crate::services::{is_allowed_domain, pdf_links, DownloadOutcome, Downloader};
use crate::utils::sanitize_directory_name;
use crate::workflow::CrawlCtx;

/// 抓取状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlState {
    Initializing,
    PagingResults { page: usize },
    ExtractingLinks { page: usize },
    DispatchingDownloads { page: usize, links: Vec<String> },
    Completed,
}

/// 单个查询的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlReport {
    pub pages_visited: usize,
    pub pages_failed: usize,
    /// 包含 `.pdf` 的候选链接数
    pub links_found: usize,
    pub links_accepted: usize,
    pub downloaded: usize,
    pub download_failed: usize,
    /// 运行被取消导致提前结束
    pub cancelled: bool,
}

/// 抓取流程
///
/// - 持有共享的渲染器，但每次运行只使用自己创建的会话
/// - 下载委托给 `Downloader`
pub struct CrawlJob {
    renderer: Arc<dyn Renderer>,
    downloader: Downloader,
    run_log: Arc<RunLog>,
    config: Arc<Config>,
    cancel: CancellationToken,
}

impl CrawlJob {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        run_log: Arc<RunLog>,
        config: Arc<Config>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            downloader: Downloader::new(renderer.clone(), run_log.clone(), &config),
            renderer,
            run_log,
            config,
            cancel,
        }
    }

    /// 运行一个查询的完整抓取流程
    ///
    /// 只有初始化失败（无法创建会话或输出目录）才返回错误。
    pub async fn run(&self, ctx: &CrawlCtx) -> ScrapeResult<CrawlReport> {
        info!("{} 开始抓取", ctx);

        let guard = SessionGuard::new(self.renderer.create_session().await?);
        let result = self.crawl(guard.session(), ctx).await;
        guard.release().await;

        if let Ok(report) = &result {
            info!(
                "{} ✅ 抓取完成: 页面 {}/{}, 候选链接 {}, 下载成功 {}, 失败 {}",
                ctx,
                report.pages_visited,
                self.config.max_pages,
                report.links_found,
                report.downloaded,
                report.download_failed
            );
        }
        result
    }

    async fn crawl(&self, session: &dyn Session, ctx: &CrawlCtx) -> ScrapeResult<CrawlReport> {
        let mut report = CrawlReport::default();
        let mut directory = PathBuf::new();
        let mut state = CrawlState::Initializing;

        loop {
            state = match state {
                CrawlState::Initializing => {
                    directory = self
                        .config
                        .output_dir
                        .join(sanitize_directory_name(&ctx.query));
                    fs_store::ensure_directory(&directory).await?;
                    debug!("{} 输出目录: {}", ctx, directory.display());
                    CrawlState::PagingResults { page: 0 }
                }

                CrawlState::PagingResults { page } => {
                    if page >= self.config.max_pages {
                        CrawlState::Completed
                    } else if self.cancel.is_cancelled() {
                        warn!("{} 运行已取消，停止翻页", ctx);
                        report.cancelled = true;
                        CrawlState::Completed
                    } else {
                        self.load_results_page(session, ctx, page, &mut report)
                            .await
                    }
                }

                CrawlState::ExtractingLinks { page } => match session.extract_links().await {
                    Ok(raw_links) => {
                        let links = pdf_links(raw_links);
                        debug!("{} 第 {} 页找到 {} 个 PDF 链接", ctx, page + 1, links.len());
                        report.links_found += links.len();
                        CrawlState::DispatchingDownloads { page, links }
                    }
                    Err(e) => {
                        self.page_failed(ctx, page, &e, &mut report).await;
                        CrawlState::PagingResults { page: page + 1 }
                    }
                },

                CrawlState::DispatchingDownloads { page, links } => {
                    for link in links {
                        if !is_allowed_domain(&link, &self.config.allowed_domains) {
                            debug!("{} 域名不在允许列表中，跳过: {}", ctx, link);
                            continue;
                        }
                        report.links_accepted += 1;

                        match self.downloader.download(&link, &directory).await {
                            DownloadOutcome::Success { path, bytes } => {
                                info!("{} 📥 已下载: {} ({} 字节)", ctx, path.display(), bytes);
                                report.downloaded += 1;
                            }
                            DownloadOutcome::Failure { .. } => {
                                report.download_failed += 1;
                            }
                        }
                    }
                    CrawlState::PagingResults { page: page + 1 }
                }

                CrawlState::Completed => break,
            };
        }

        Ok(report)
    }

    async fn load_results_page(
        &self,
        session: &dyn Session,
        ctx: &CrawlCtx,
        page: usize,
        report: &mut CrawlReport,
    ) -> CrawlState {
        let url = self.config.search_engine.search_url(&ctx.query, page);
        debug!("{} 打开第 {}/{} 页: {}", ctx, page + 1, self.config.max_pages, url);

        match navigate_with_timeout(session, &url, self.config.navigation_timeout()).await {
            Ok(()) => {
                report.pages_visited += 1;
                CrawlState::ExtractingLinks { page }
            }
            Err(e) => {
                self.page_failed(ctx, page, &e, report).await;
                CrawlState::PagingResults { page: page + 1 }
            }
        }
    }

    async fn page_failed(
        &self,
        ctx: &CrawlCtx,
        page: usize,
        err: &ScrapeError,
        report: &mut CrawlReport,
    ) {
        report.pages_failed += 1;
        warn!("{} ⚠️ 第 {} 页加载失败，跳过: {}", ctx, page + 1, err);

        let message = format!(
            "Error loading results page {} for query: {}",
            page + 1,
            ctx.query
        );
        if let Err(e) = self.run_log.record_error(&message, err).await {
            warn!("写入运行日志失败: {}", e);
        }
    }
}
