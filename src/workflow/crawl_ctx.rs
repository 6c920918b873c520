//! 抓取任务上下文
//!
//! 封装"我正在处理第几批的哪个查询"这一信息

use std::fmt::Display;

use crate::utils::logging::truncate_text;

/// 抓取任务上下文
#[derive(Debug, Clone)]
pub struct CrawlCtx {
    /// 展开后的最终查询
    pub query: String,

    /// 查询在本次运行中的序号（从1开始，仅用于日志显示）
    pub job_index: usize,

    /// 所属批次（从1开始）
    pub batch_num: usize,
}

impl CrawlCtx {
    pub fn new(query: String, job_index: usize, batch_num: usize) -> Self {
        Self {
            query,
            job_index,
            batch_num,
        }
    }
}

impl Display for CrawlCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[批次 #{} 查询 #{} {}]",
            self.batch_num,
            self.job_index,
            truncate_text(&self.query, 40)
        )
    }
}
