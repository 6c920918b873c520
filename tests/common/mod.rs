//! 测试用的内存渲染器
//!
//! 按 URL 子串返回预设的链接列表，记录会话的打开、导航、关闭事件，
//! 用来检查并发上限、批次顺序和会话释放。

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pdf_search_scraper::error::{ScrapeError, ScrapeResult};
use pdf_search_scraper::infrastructure::{PaperFormat, Renderer, Session, WaitPolicy};
use pdf_search_scraper::{Config, RunLog};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Open(usize),
    Navigate(usize, String),
    Close(usize),
}

#[derive(Default)]
struct Shared {
    next_id: usize,
    open: usize,
    peak_open: usize,
    events: Vec<Event>,
    renderer_closed: bool,
}

#[derive(Clone, Default)]
pub struct FakeRenderer {
    shared: Arc<Mutex<Shared>>,
    /// (URL 子串, 该页面上的全部链接)
    results: Vec<(String, Vec<String>)>,
    /// 导航到包含这些子串的 URL 时失败
    failing: Vec<String>,
    /// 当前页面 URL 包含这些子串时打印失败
    failing_render: Vec<String>,
    navigate_delay: Duration,
    fail_create: bool,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url_pattern: &str, links: &[&str]) -> Self {
        self.results.push((
            url_pattern.to_string(),
            links.iter().map(|l| l.to_string()).collect(),
        ));
        self
    }

    pub fn failing_on(mut self, url_pattern: &str) -> Self {
        self.failing.push(url_pattern.to_string());
        self
    }

    pub fn failing_render_on(mut self, url_pattern: &str) -> Self {
        self.failing_render.push(url_pattern.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.navigate_delay = delay;
        self
    }

    pub fn failing_sessions(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.shared.lock().unwrap().events.clone()
    }

    pub fn peak_open(&self) -> usize {
        self.shared.lock().unwrap().peak_open
    }

    pub fn open_sessions(&self) -> usize {
        self.shared.lock().unwrap().open
    }

    pub fn renderer_closed(&self) -> bool {
        self.shared.lock().unwrap().renderer_closed
    }

    /// 会话 id → 第一次导航的 URL
    pub fn first_url(&self, session: usize) -> Option<String> {
        self.events().into_iter().find_map(|e| match e {
            Event::Navigate(id, url) if id == session => Some(url),
            _ => None,
        })
    }

    /// 全部导航过的 URL，按时间顺序
    pub fn navigations(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Navigate(_, url) => Some(url),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn create_session(&self) -> ScrapeResult<Box<dyn Session>> {
        if self.fail_create {
            return Err(ScrapeError::browser("创建页面失败", "fake renderer refuses"));
        }

        let mut shared = self.shared.lock().unwrap();
        shared.next_id += 1;
        shared.open += 1;
        shared.peak_open = shared.peak_open.max(shared.open);
        let id = shared.next_id;
        shared.events.push(Event::Open(id));

        Ok(Box::new(FakeSession {
            id,
            renderer: self.clone(),
            current: Mutex::new(None),
        }))
    }

    async fn close(&self) -> ScrapeResult<()> {
        self.shared.lock().unwrap().renderer_closed = true;
        Ok(())
    }
}

struct FakeSession {
    id: usize,
    renderer: FakeRenderer,
    current: Mutex<Option<String>>,
}

#[async_trait]
impl Session for FakeSession {
    async fn navigate(&self, url: &str, _wait: WaitPolicy) -> ScrapeResult<()> {
        self.renderer
            .shared
            .lock()
            .unwrap()
            .events
            .push(Event::Navigate(self.id, url.to_string()));

        if !self.renderer.navigate_delay.is_zero() {
            tokio::time::sleep(self.renderer.navigate_delay).await;
        }

        if self.renderer.failing.iter().any(|p| url.contains(p.as_str())) {
            return Err(ScrapeError::navigation(url, "net::ERR_CONNECTION_REFUSED"));
        }

        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn extract_links(&self) -> ScrapeResult<Vec<String>> {
        let current = self.current.lock().unwrap().clone().unwrap_or_default();
        Ok(self
            .renderer
            .results
            .iter()
            .find(|(pattern, _)| current.contains(pattern.as_str()))
            .map(|(_, links)| links.clone())
            .unwrap_or_default())
    }

    async fn render_document(&self, _format: PaperFormat) -> ScrapeResult<Vec<u8>> {
        let current = self.current.lock().unwrap().clone().unwrap_or_default();
        if self
            .renderer
            .failing_render
            .iter()
            .any(|p| current.contains(p.as_str()))
        {
            return Err(ScrapeError::render(current, "Printing failed"));
        }
        Ok(format!("%PDF-1.4 {}", current).into_bytes())
    }

    async fn close(&self) -> ScrapeResult<()> {
        let mut shared = self.renderer.shared.lock().unwrap();
        shared.open -= 1;
        shared.events.push(Event::Close(self.id));
        Ok(())
    }
}

/// 测试配置：输出和日志都放在临时目录中
pub fn test_config(dir: &Path, queries: &[&str]) -> Config {
    Config {
        search_queries: queries.iter().map(|q| q.to_string()).collect(),
        max_pages: 1,
        output_dir: dir.join("out"),
        log_dir: dir.join("logs"),
        navigation_timeout_secs: 5,
        ..Config::default()
    }
}

pub async fn test_log(dir: &Path) -> Arc<RunLog> {
    Arc::new(RunLog::create(&dir.join("logs"), "test").await.unwrap())
}
