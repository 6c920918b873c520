//! 程序配置
//!
//! 配置在运行开始前一次性构建：默认值 → TOML 文件 → 环境变量 → 命令行，
//! 校验后冻结，以 `Arc<Config>` 的形式传给各个组件，运行期间不再修改。

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ScrapeError, ScrapeResult};

/// 搜索引擎
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    #[serde(alias = "Google")]
    Google,
    #[serde(alias = "Yandex")]
    Yandex,
}

impl SearchEngine {
    /// 查询模板里表示"文件类型过滤"的占位符
    pub const FILE_TYPE_PLACEHOLDER: &'static str = "filetype";

    /// 引擎实际使用的文件类型参数名
    pub fn file_type_param(self) -> &'static str {
        match self {
            SearchEngine::Google => "filetype",
            SearchEngine::Yandex => "mime",
        }
    }

    /// 构造第 `page_index` 页（从 0 开始）的搜索结果 URL
    pub fn search_url(self, query: &str, page_index: usize) -> String {
        let encoded = urlencoding::encode(query);
        match self {
            SearchEngine::Google => format!(
                "https://www.google.com/search?q={}&start={}",
                encoded,
                page_index * 10
            ),
            SearchEngine::Yandex => {
                format!("https://yandex.ru/search/?text={}&p={}", encoded, page_index)
            }
        }
    }
}

impl std::str::FromStr for SearchEngine {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(SearchEngine::Google),
            "yandex" => Ok(SearchEngine::Yandex),
            other => Err(ScrapeError::invalid_argument(format!(
                "未知的搜索引擎: {}",
                other
            ))),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 查询模板
    pub search_queries: Vec<String>,
    /// 每个查询最多翻几页结果
    pub max_pages: usize,
    /// 允许的域名后缀（子串匹配）
    pub allowed_domains: Vec<String>,
    pub search_engine: SearchEngine,
    /// 同时运行的抓取任务数，同时也是批大小
    pub concurrency: usize,
    /// 运行日志文件名前缀
    pub log_file_prefix: String,
    /// 下载目录的根目录
    pub output_dir: PathBuf,
    /// 运行日志所在目录
    pub log_dir: PathBuf,
    /// 单次导航超时（秒）
    pub navigation_timeout_secs: u64,
    /// 浏览器相关配置
    pub browser: BrowserSettings,
}

/// 浏览器启动配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub headless: bool,
    /// Chrome 可执行文件路径，不填则由 chromiumoxide 自动查找
    pub chrome_executable: Option<PathBuf>,
    /// 连接已运行浏览器的调试地址，例如 `http://localhost:9222`
    pub remote_debugging_url: Option<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            remote_debugging_url: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_queries: vec!["земельное право \"принципы\" filetype:pdf".to_string()],
            max_pages: 3,
            allowed_domains: vec![".ru".to_string(), ".by".to_string()],
            search_engine: SearchEngine::Google,
            concurrency: 5,
            log_file_prefix: "scraping".to_string(),
            output_dir: PathBuf::from("."),
            log_dir: PathBuf::from("."),
            navigation_timeout_secs: 60,
            browser: BrowserSettings::default(),
        }
    }
}

impl Config {
    /// 从 TOML 文件加载；未给出路径时使用默认值
    pub fn load(path: Option<&Path>) -> ScrapeResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|e| ScrapeError::Config {
            path: path.to_path_buf(),
            message: format!("无法读取配置文件: {}", e),
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ScrapeError::Config { message, .. } => ScrapeError::Config {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> ScrapeResult<Self> {
        toml::from_str(content).map_err(|e| ScrapeError::Config {
            path: PathBuf::new(),
            message: format!("无法解析配置文件: {}", e),
        })
    }

    /// 用环境变量覆盖配置项
    pub fn with_env_overrides(self) -> ScrapeResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ScrapeResult<Self> {
        if let Some(v) = lookup("SCRAPER_MAX_PAGES") {
            self.max_pages = parse_env("SCRAPER_MAX_PAGES", &v)?;
        }
        if let Some(v) = lookup("SCRAPER_CONCURRENCY") {
            self.concurrency = parse_env("SCRAPER_CONCURRENCY", &v)?;
        }
        if let Some(v) = lookup("SCRAPER_SEARCH_ENGINE") {
            self.search_engine = v.parse()?;
        }
        if let Some(v) = lookup("SCRAPER_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("SCRAPER_LOG_DIR") {
            self.log_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("SCRAPER_NAV_TIMEOUT_SECS") {
            self.navigation_timeout_secs = parse_env("SCRAPER_NAV_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("SCRAPER_BROWSER_URL") {
            self.browser.remote_debugging_url = Some(v);
        }
        Ok(self)
    }

    /// 校验配置不变量
    pub fn validate(self) -> ScrapeResult<Self> {
        if self.max_pages == 0 {
            return Err(ScrapeError::invalid_argument("max_pages 必须 >= 1"));
        }
        if self.concurrency == 0 {
            return Err(ScrapeError::invalid_argument("concurrency 必须 >= 1"));
        }
        if self.navigation_timeout_secs == 0 {
            return Err(ScrapeError::invalid_argument(
                "navigation_timeout_secs 必须 >= 1",
            ));
        }
        if self.search_queries.is_empty() {
            return Err(ScrapeError::invalid_argument("search_queries 不能为空"));
        }
        Ok(self)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

fn parse_env<T: std::str::FromStr>(var_name: &str, value: &str) -> ScrapeResult<T> {
    value.trim().parse().map_err(|_| {
        ScrapeError::invalid_argument(format!(
            "环境变量 {} 解析失败: 值 '{}' 无法转换",
            var_name, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default().validate().unwrap();
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.search_engine, SearchEngine::Google);
        assert_eq!(config.allowed_domains, vec![".ru", ".by"]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            search_queries = ["a filetype:pdf", "b filetype:pdf"]
            search_engine = "Yandex"
            concurrency = 2

            [browser]
            remote_debugging_url = "http://localhost:9222"
            "#,
        )
        .unwrap();

        assert_eq!(config.search_queries.len(), 2);
        assert_eq!(config.search_engine, SearchEngine::Yandex);
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.max_pages, 3);
        assert!(config.browser.headless);
        assert_eq!(
            config.browser.remote_debugging_url.as_deref(),
            Some("http://localhost:9222")
        );
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("max_pages = \"many\"").unwrap_err();
        assert!(matches!(err, ScrapeError::Config { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let config = Config {
            concurrency: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ScrapeError::InvalidArgument(_))
        ));

        let config = Config {
            max_pages: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ScrapeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SCRAPER_MAX_PAGES", "7"),
            ("SCRAPER_SEARCH_ENGINE", "yandex"),
            ("SCRAPER_OUTPUT_DIR", "/tmp/pdfs"),
        ]
        .into_iter()
        .collect();

        let config = Config::default()
            .with_overrides_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.max_pages, 7);
        assert_eq!(config.search_engine, SearchEngine::Yandex);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/pdfs"));
    }

    #[test]
    fn test_env_override_parse_failure() {
        let err = Config::default()
            .with_overrides_from(|key| (key == "SCRAPER_CONCURRENCY").then(|| "x".to_string()))
            .unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidArgument(_)));
    }

    #[test]
    fn test_search_urls() {
        assert_eq!(
            SearchEngine::Google.search_url("a b", 2),
            "https://www.google.com/search?q=a%20b&start=20"
        );
        assert_eq!(
            SearchEngine::Yandex.search_url("a b", 2),
            "https://yandex.ru/search/?text=a%20b&p=2"
        );
    }
}
