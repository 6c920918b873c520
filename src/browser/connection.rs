use std::time::Duration;

use chromiumoxide::handler::HandlerConfig;
use chromiumoxide::Browser;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{ScrapeError, ScrapeResult};

/// 连接到已经运行的浏览器（remote debugging）
pub async fn connect_to_browser(
    debugging_url: &str,
    request_timeout: Duration,
) -> ScrapeResult<(Browser, JoinHandle<()>)> {
    info!("正在连接到浏览器: {}", debugging_url);

    let handler_config = HandlerConfig {
        request_timeout,
        ..Default::default()
    };

    let (browser, mut handler) = Browser::connect_with_config(debugging_url, handler_config)
        .await
        .map_err(|e| {
            error!("连接浏览器失败: {}", e);
            ScrapeError::browser(format!("连接浏览器 {} 失败", debugging_url), e)
        })?;
    debug!("浏览器连接成功");

    // 在后台处理浏览器事件
    let handler_task = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    Ok((browser, handler_task))
}
