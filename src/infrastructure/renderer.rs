//! 渲染器抽象 - 基础设施层
//!
//! 抓取流程只依赖这里的两个 trait：
//! - `Renderer`：整个运行期间共享的浏览器客户端，只负责创建会话和最终释放
//! - `Session`：一个独立的渲染上下文（相当于浏览器标签页），由创建者独占
//!
//! 会话通过 `SessionGuard` 持有，保证所有退出路径上都会被释放。

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::ScrapeResult;

/// 导航完成的判定策略
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitPolicy {
    /// 在稳定窗口内没有任何进行中的网络请求
    NetworkIdle { idle_window: Duration },
}

impl WaitPolicy {
    /// 固定策略：0 个进行中的连接，持续 500ms
    pub const fn network_idle() -> Self {
        WaitPolicy::NetworkIdle {
            idle_window: Duration::from_millis(500),
        }
    }
}

/// 文档纸张规格
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PaperFormat {
    A4,
}

impl PaperFormat {
    /// 纸张尺寸（英寸，宽 x 高）
    pub fn size_inches(self) -> (f64, f64) {
        match self {
            PaperFormat::A4 => (8.27, 11.69),
        }
    }
}

/// 共享的渲染器客户端
#[async_trait]
pub trait Renderer: Send + Sync {
    /// 创建一个新的独立会话
    async fn create_session(&self) -> ScrapeResult<Box<dyn Session>>;

    /// 释放客户端本身
    async fn close(&self) -> ScrapeResult<()>;
}

/// 单个渲染会话
#[async_trait]
pub trait Session: Send + Sync {
    async fn navigate(&self, url: &str, wait: WaitPolicy) -> ScrapeResult<()>;

    /// 返回当前页面中所有锚点的 href（未过滤）
    async fn extract_links(&self) -> ScrapeResult<Vec<String>>;

    /// 将当前页面序列化为 PDF 字节流
    async fn render_document(&self, format: PaperFormat) -> ScrapeResult<Vec<u8>>;

    async fn close(&self) -> ScrapeResult<()>;
}

/// 带超时的导航，超时视为导航失败
pub async fn navigate_with_timeout(
    session: &dyn Session,
    url: &str,
    timeout: Duration,
) -> ScrapeResult<()> {
    match tokio::time::timeout(timeout, session.navigate(url, WaitPolicy::network_idle())).await {
        Ok(result) => result,
        Err(elapsed) => Err(crate::error::ScrapeError::navigation(url, elapsed)),
    }
}

/// 会话守卫
///
/// 正常路径上由持有者调用 `release()` 并等待关闭完成；
/// 如果持有者提前返回或 panic，`Drop` 会在后台调度关闭。
pub struct SessionGuard {
    session: Option<Box<dyn Session>>,
}

impl SessionGuard {
    pub fn new(session: Box<dyn Session>) -> Self {
        Self {
            session: Some(session),
        }
    }

    pub fn session(&self) -> &dyn Session {
        // session 只会在 release / drop 中被取走
        self.session
            .as_deref()
            .expect("session already released")
    }

    /// 释放会话
    pub async fn release(mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.close().await {
                warn!("关闭会话失败: {}", e);
            }
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("会话未显式释放，后台关闭");
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        warn!("后台关闭会话失败: {}", e);
                    }
                });
            }
            Err(_) => warn!("没有可用的运行时，会话未能关闭"),
        }
    }
}
