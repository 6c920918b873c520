//! 运行日志 - 基础设施层
//!
//! 每次运行对应一个只追加的日志文件，格式：
//!
//! ```text
//! [<ISO-8601 时间戳>] <消息>
//! Error details: <错误信息>
//! Error stack trace: <错误链>
//! ```
//!
//! 并发任务共用同一个 `RunLog`，写入通过互斥锁串行化，条目之间不会交错。
//! 每条日志同时通过 tracing 输出到控制台。

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::error::{error_trace, ScrapeResult};
use crate::infrastructure::fs_store;

pub struct RunLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RunLog {
    /// 在 `log_dir` 下按 `<prefix>_<时间戳>.log` 创建日志
    pub async fn create(log_dir: &Path, prefix: &str) -> ScrapeResult<Self> {
        fs_store::ensure_directory(log_dir).await?;
        let path = log_dir.join(log_file_name(prefix, Utc::now()));
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 记录一条普通消息
    pub async fn record(&self, message: &str) -> ScrapeResult<()> {
        info!("{}", message);
        self.append(&format_entry(Utc::now(), message, None)).await
    }

    /// 记录一条失败消息，附带错误详情和错误链
    pub async fn record_error(
        &self,
        message: &str,
        err: &(dyn std::error::Error + Send + Sync + 'static),
    ) -> ScrapeResult<()> {
        error!("{}: {}", message, err);
        self.append(&format_entry(Utc::now(), message, Some(err)))
            .await
    }

    async fn append(&self, entry: &str) -> ScrapeResult<()> {
        let _guard = self.write_lock.lock().await;
        fs_store::append_line(&self.path, entry).await
    }
}

/// 日志文件名：时间戳中的 `:` 替换为 `-`
pub fn log_file_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}.log", prefix, iso_timestamp(now).replace(':', "-"))
}

fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_entry(
    now: DateTime<Utc>,
    message: &str,
    err: Option<&(dyn std::error::Error + Send + Sync + 'static)>,
) -> String {
    let mut entry = format!("[{}] {}\n", iso_timestamp(now), message);
    if let Some(err) = err {
        entry.push_str(&format!("Error details: {}\n", err));
        entry.push_str(&format!("Error stack trace: {}\n", error_trace(err)));
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScrapeError;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_log_file_name_has_no_colons() {
        let name = log_file_name("scraping", fixed_time());
        assert_eq!(name, "scraping_2024-03-09T14-05-07.000Z.log");
    }

    #[test]
    fn test_entry_format() {
        let entry = format_entry(fixed_time(), "Downloaded: a.pdf from https://a.ru/a.pdf", None);
        assert_eq!(
            entry,
            "[2024-03-09T14:05:07.000Z] Downloaded: a.pdf from https://a.ru/a.pdf\n"
        );
    }

    #[test]
    fn test_error_entry_format() {
        let err = ScrapeError::navigation("https://a.ru/a.pdf", "net::ERR_NAME_NOT_RESOLVED");
        let entry = format_entry(fixed_time(), "Error downloading https://a.ru/a.pdf", Some(&err));

        let lines: Vec<&str> = entry.lines().collect();
        assert_eq!(lines[0], "[2024-03-09T14:05:07.000Z] Error downloading https://a.ru/a.pdf");
        assert!(lines[1].starts_with("Error details: NavigationError"));
        assert!(lines[2].starts_with("Error stack trace: NavigationError"));
        assert!(entry.ends_with("net::ERR_NAME_NOT_RESOLVED\n"));
    }

    #[tokio::test]
    async fn test_concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let log = Arc::new(RunLog::create(dir.path(), "scraping").await.unwrap());

        let mut handles = Vec::new();
        for task in 0..8 {
            let log = log.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..20 {
                    log.record(&format!("task {} line {}", task, i)).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 160);
        assert!(lines
            .iter()
            .all(|line| line.starts_with('[') && line.contains("] task ")));
    }
}
