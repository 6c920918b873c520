use std::path::PathBuf;

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 抓取流程错误类型
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// 渲染器在等待策略内无法加载页面
    #[error("NavigationError: 导航到 {url} 失败: {source}")]
    Navigation {
        url: String,
        #[source]
        source: BoxError,
    },

    /// PDF 序列化失败
    #[error("RenderError: 渲染 {url} 为 PDF 失败: {source}")]
    Render {
        url: String,
        #[source]
        source: BoxError,
    },

    /// 目录创建或文件写入失败
    #[error("IOError: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 参数或配置不合法
    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),

    /// 浏览器启动、连接或创建会话失败
    #[error("BrowserError: {message}: {source}")]
    Browser {
        message: String,
        #[source]
        source: BoxError,
    },

    /// 配置文件读取或解析失败
    #[error("ConfigError: {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl ScrapeError {
    pub fn navigation(
        url: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        ScrapeError::Navigation {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn render(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ScrapeError::Render {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScrapeError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn browser(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ScrapeError::Browser {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ScrapeError::InvalidArgument(message.into())
    }
}

/// 抓取流程结果类型
pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// 将错误及其 source 链展开为多行文本，用于日志中的堆栈信息
pub fn error_trace(err: &(dyn std::error::Error + 'static)) -> String {
    let mut trace = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        trace.push_str("\n    caused by: ");
        trace.push_str(&cause.to_string());
        current = cause.source();
    }
    trace
}
