//! 基于 chromiumoxide 的渲染器实现

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::browser;
use crate::config::BrowserSettings;
use crate::error::{ScrapeError, ScrapeResult};
use crate::infrastructure::renderer::{PaperFormat, Renderer, Session, WaitPolicy};
use crate::infrastructure::JsExecutor;

const NETWORK_POLL_INTERVAL: Duration = Duration::from_millis(100);

const COLLECT_HREFS_JS: &str =
    "Array.from(document.querySelectorAll('a')).map(a => a.href).filter(href => !!href)";

const DOCUMENT_READY_JS: &str = "document.readyState === 'complete'";

/// 共享的 Chrome 客户端
pub struct ChromeRenderer {
    /// 创建会话只需读锁，关闭时取写锁
    browser: RwLock<Option<Browser>>,
    handler_task: JoinHandle<()>,
    /// 连接的是外部浏览器时，关闭只断开连接，不结束浏览器进程
    owns_process: bool,
}

impl ChromeRenderer {
    /// 根据配置启动新浏览器或连接已有浏览器
    pub async fn start(settings: &BrowserSettings, request_timeout: Duration) -> ScrapeResult<Self> {
        let (browser, handler_task, owns_process) = match &settings.remote_debugging_url {
            Some(url) => {
                let (browser, task) = browser::connect_to_browser(url, request_timeout).await?;
                (browser, task, false)
            }
            None => {
                let (browser, task) = browser::launch_browser(settings, request_timeout).await?;
                (browser, task, true)
            }
        };

        Ok(Self {
            browser: RwLock::new(Some(browser)),
            handler_task,
            owns_process,
        })
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn create_session(&self) -> ScrapeResult<Box<dyn Session>> {
        let guard = self.browser.read().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| ScrapeError::browser("创建页面失败", "浏览器已关闭"))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::browser("创建页面失败", e))?;

        Ok(Box::new(ChromeSession {
            executor: JsExecutor::new(page),
        }))
    }

    async fn close(&self) -> ScrapeResult<()> {
        let Some(mut browser) = self.browser.write().await.take() else {
            return Ok(());
        };

        if self.owns_process {
            info!("关闭浏览器...");
            browser
                .close()
                .await
                .map_err(|e| ScrapeError::browser("关闭浏览器失败", e))?;
            if let Err(e) = browser.wait().await {
                warn!("等待浏览器进程退出失败: {}", e);
            }
        } else {
            info!("断开与外部浏览器的连接");
        }

        drop(browser);
        self.handler_task.abort();
        Ok(())
    }
}

/// 进行中的网络请求
///
/// 订阅页面的请求事件，按 request id 记录尚未结束的请求。
/// 重定向沿用同一个 id，所以用集合而不是计数器。
struct InflightRequests {
    pending: Arc<Mutex<HashSet<String>>>,
    task: JoinHandle<()>,
}

impl InflightRequests {
    /// 必须在 `goto` 之前调用，否则会漏掉导航发出的第一批请求
    async fn track(page: &Page) -> Result<Self, chromiumoxide::error::CdpError> {
        if let Err(e) = page.execute(EnableParams::default()).await {
            warn!("启用 Network 域失败: {}", e);
        }

        let mut started = page.event_listener::<EventRequestWillBeSent>().await?;
        let mut finished = page.event_listener::<EventLoadingFinished>().await?;
        let mut failed = page.event_listener::<EventLoadingFailed>().await?;

        let pending = Arc::new(Mutex::new(HashSet::new()));
        let tracked = pending.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(event) = started.next() => {
                        mark_started(&tracked, event.request_id.inner());
                    }
                    Some(event) = finished.next() => {
                        mark_done(&tracked, event.request_id.inner());
                    }
                    Some(event) = failed.next() => {
                        mark_done(&tracked, event.request_id.inner());
                    }
                    else => break,
                }
            }
        });

        Ok(Self { pending, task })
    }

    fn count(&self) -> usize {
        self.pending.lock().map(|set| set.len()).unwrap_or(0)
    }
}

fn mark_started(pending: &Mutex<HashSet<String>>, request_id: &str) {
    if let Ok(mut set) = pending.lock() {
        set.insert(request_id.to_string());
    }
}

fn mark_done(pending: &Mutex<HashSet<String>>, request_id: &str) {
    if let Ok(mut set) = pending.lock() {
        set.remove(request_id);
    }
}

impl Drop for InflightRequests {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// 一个 Chrome 标签页
pub struct ChromeSession {
    executor: JsExecutor,
}

impl ChromeSession {
    /// 等待文档加载完成，且进行中的请求数在整个稳定窗口内保持为 0
    async fn wait_for_network_idle(
        &self,
        url: &str,
        requests: &InflightRequests,
        idle_window: Duration,
    ) -> ScrapeResult<()> {
        let mut idle_since: Option<Instant> = None;

        loop {
            let ready: bool = self
                .executor
                .eval_as(DOCUMENT_READY_JS)
                .await
                .map_err(|e| ScrapeError::navigation(url, e))?;

            if !ready || requests.count() > 0 {
                idle_since = None;
            } else {
                let since = *idle_since.get_or_insert_with(Instant::now);
                if since.elapsed() >= idle_window {
                    return Ok(());
                }
            }

            sleep(NETWORK_POLL_INTERVAL).await;
        }
    }

    /// 当前页面地址，仅用于错误信息
    async fn location(&self) -> String {
        self.executor
            .page()
            .url()
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Session for ChromeSession {
    async fn navigate(&self, url: &str, wait: WaitPolicy) -> ScrapeResult<()> {
        debug!("导航到: {}", url);
        let requests = InflightRequests::track(self.executor.page())
            .await
            .map_err(|e| ScrapeError::navigation(url, e))?;

        self.executor
            .page()
            .goto(url)
            .await
            .map_err(|e| ScrapeError::navigation(url, e))?;

        match wait {
            WaitPolicy::NetworkIdle { idle_window } => {
                self.wait_for_network_idle(url, &requests, idle_window).await
            }
        }
    }

    async fn extract_links(&self) -> ScrapeResult<Vec<String>> {
        match self.executor.eval_as(COLLECT_HREFS_JS).await {
            Ok(links) => Ok(links),
            Err(e) => Err(ScrapeError::navigation(self.location().await, e)),
        }
    }

    async fn render_document(&self, format: PaperFormat) -> ScrapeResult<Vec<u8>> {
        let (width, height) = format.size_inches();
        let params = PrintToPdfParams {
            paper_width: Some(width),
            paper_height: Some(height),
            print_background: Some(true),
            ..Default::default()
        };

        match self.executor.page().pdf(params).await {
            Ok(bytes) => Ok(bytes),
            Err(e) => Err(ScrapeError::render(self.location().await, e)),
        }
    }

    async fn close(&self) -> ScrapeResult<()> {
        self.executor
            .page()
            .clone()
            .close()
            .await
            .map_err(|e| ScrapeError::browser("关闭页面失败", e))
    }
}
