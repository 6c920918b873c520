use std::time::Duration;

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::BrowserSettings;
use crate::error::{ScrapeError, ScrapeResult};

/// 启动浏览器，返回浏览器句柄和后台事件处理任务
pub async fn launch_browser(
    settings: &BrowserSettings,
    request_timeout: Duration,
) -> ScrapeResult<(Browser, JoinHandle<()>)> {
    info!("🚀 启动浏览器 (headless: {})...", settings.headless);

    let mut builder = BrowserConfig::builder()
        .request_timeout(request_timeout)
        .args(vec![
            "--disable-gpu",           // 无头模式下禁用 GPU
            "--no-sandbox",            // 容器中运行时避免沙盒权限问题
            "--disable-dev-shm-usage", // 防止共享内存不足
        ]);

    if settings.headless {
        builder = builder.new_headless_mode();
    } else {
        builder = builder.with_head();
    }

    if let Some(path) = &settings.chrome_executable {
        debug!("使用指定的浏览器: {}", path.display());
        builder = builder.chrome_executable(path);
    }

    let config = builder.build().map_err(|e| {
        error!("配置浏览器失败: {}", e);
        ScrapeError::browser("配置浏览器失败", e)
    })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        ScrapeError::browser("启动浏览器失败", e)
    })?;
    debug!("浏览器启动成功");

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
