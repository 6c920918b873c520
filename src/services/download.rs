//! 下载任务 - 业务能力层
//!
//! 只负责"把一个链接保存为 PDF"：新开会话 → 导航 → 打印 A4 PDF → 写文件。
//! 失败不会向上抛出，而是以 `DownloadOutcome::Failure` 返回并写入运行日志。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ScrapeError, ScrapeResult};
use crate::infrastructure::{
    fs_store, navigate_with_timeout, PaperFormat, Renderer, RunLog, Session, SessionGuard,
};
use crate::utils::filename_from_link;

/// 单次下载的结果
#[derive(Debug)]
pub enum DownloadOutcome {
    Success { path: PathBuf, bytes: usize },
    Failure { link: String, error: ScrapeError },
}

/// 下载服务
pub struct Downloader {
    renderer: Arc<dyn Renderer>,
    run_log: Arc<RunLog>,
    navigation_timeout: Duration,
}

impl Downloader {
    pub fn new(renderer: Arc<dyn Renderer>, run_log: Arc<RunLog>, config: &Config) -> Self {
        Self {
            renderer,
            run_log,
            navigation_timeout: config.navigation_timeout(),
        }
    }

    /// 下载一个链接到 `directory`，同名文件直接覆盖
    ///
    /// 每次下载使用独立的会话，结束后无论成败都会释放。
    /// 成功和失败都会写入运行日志，错误不会向上传播。
    ///
    /// # 参数
    /// - `link`: 已通过过滤的 PDF 链接
    /// - `directory`: 查询对应的输出目录，需已存在
    ///
    /// # 返回
    /// `DownloadOutcome::Success` 带保存路径和字节数；
    /// `DownloadOutcome::Failure` 带导航、渲染或写文件错误
    pub async fn download(&self, link: &str, directory: &Path) -> DownloadOutcome {
        let filename = filename_from_link(link);
        let path = directory.join(&filename);
        debug!("下载 {} -> {}", link, path.display());

        let outcome = match self.fetch_and_save(link, &path).await {
            Ok(bytes) => DownloadOutcome::Success { path, bytes },
            Err(error) => DownloadOutcome::Failure {
                link: link.to_string(),
                error,
            },
        };

        let logged = match &outcome {
            DownloadOutcome::Success { .. } => {
                self.run_log
                    .record(&format!("Downloaded: {} from {}", filename, link))
                    .await
            }
            DownloadOutcome::Failure { link, error } => {
                self.run_log
                    .record_error(&format!("Error downloading {}", link), error)
                    .await
            }
        };
        if let Err(e) = logged {
            warn!("写入运行日志失败: {}", e);
        }

        outcome
    }

    async fn fetch_and_save(&self, link: &str, path: &Path) -> ScrapeResult<usize> {
        let guard = SessionGuard::new(self.renderer.create_session().await?);
        let result = self.render_to_file(guard.session(), link, path).await;
        guard.release().await;
        result
    }

    async fn render_to_file(
        &self,
        session: &dyn Session,
        link: &str,
        path: &Path,
    ) -> ScrapeResult<usize> {
        navigate_with_timeout(session, link, self.navigation_timeout).await?;
        let pdf = session.render_document(PaperFormat::A4).await?;
        fs_store::write_file(path, &pdf).await?;
        Ok(pdf.len())
    }
}
