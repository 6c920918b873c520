/// 日志工具模块
///
/// 控制台横幅和统计输出的辅助函数
use std::path::Path;

use tracing::info;

use crate::config::Config;

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 本次运行的配置
/// - `log_file`: 运行日志路径
pub fn log_startup(config: &Config, log_file: &Path) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 搜索结果 PDF 批量下载");
    info!("🔎 搜索引擎: {:?}", config.search_engine);
    info!("📊 最大并发数: {}", config.concurrency);
    info!("📄 每个查询最多 {} 页结果", config.max_pages);
    info!("📝 运行日志: {}", log_file.display());
    info!("{}", "=".repeat(60));
}

/// 记录查询加载信息
///
/// # 参数
/// - `total`: 展开后的查询总数
/// - `batch_size`: 每批查询数（即并发数）
/// - `total_batches`: 批次数
pub fn log_queries_loaded(total: usize, batch_size: usize, total_batches: usize) {
    info!("✓ 共 {} 个查询", total);
    info!("📋 将以每批 {} 个的方式处理，共 {} 批", batch_size, total_batches);
    info!("💡 每批完成后再开始下一批\n");
}

/// 记录批次开始信息
///
/// # 参数
/// - `start` / `end`: 本批第一个和最后一个查询的序号（从1开始）
pub fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批查询: {}-{} / 共 {} 个", start, end, total);
    info!("{}", "=".repeat(60));
}

/// 记录批次完成信息
pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(
    jobs_succeeded: usize,
    jobs_total: usize,
    downloaded: usize,
    download_failed: usize,
    log_file: &Path,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 查询完成: {}/{}", jobs_succeeded, jobs_total);
    info!("📥 下载成功: {}", downloaded);
    info!("❌ 下载失败: {}", download_failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原文本
/// - `max_len`: 保留的最大字符数（按字符而不是字节计）
///
/// # 返回
/// 超长时截断并追加 `...`
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
