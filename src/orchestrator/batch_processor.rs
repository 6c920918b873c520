//! 运行编排器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建运行日志、启动（或连接）浏览器
//! 2. **查询展开**：按搜索引擎替换文件类型占位符
//! 3. **分批处理**：以并发数为批大小，批内并发，批间串行
//! 4. **资源管理**：唯一持有共享渲染器的模块，运行结束后释放
//! 5. **全局统计**：汇总所有查询的处理结果
//!
//! 单个查询失败只影响本查询，不会中止整个运行。

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::{ChromeRenderer, Renderer, RunLog};
use crate::orchestrator::batcher;
use crate::services::expand_queries;
use crate::utils::logging::{
    log_batch_complete, log_batch_start, log_queries_loaded, log_startup, print_final_stats,
};
use crate::workflow::{CrawlCtx, CrawlJob, CrawlReport};

/// 应用主结构
pub struct App {
    config: Arc<Config>,
    renderer: Arc<dyn Renderer>,
    run_log: Arc<RunLog>,
    cancel: CancellationToken,
}

/// 单个查询的结果
#[derive(Debug)]
pub enum JobOutcome {
    Completed(CrawlReport),
    Failed(String),
}

#[derive(Debug)]
pub struct JobReport {
    pub query: String,
    pub outcome: JobOutcome,
}

/// 一个批次的结果，顺序与批内查询顺序一致
#[derive(Debug, Default)]
pub struct BatchReport {
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.jobs
            .iter()
            .filter(|job| matches!(job.outcome, JobOutcome::Completed(_)))
            .count()
    }
}

/// 整次运行的结果
#[derive(Debug, Default)]
pub struct RunReport {
    pub batches: Vec<BatchReport>,
    /// 运行被取消，后续批次未执行
    pub cancelled: bool,
}

impl RunReport {
    pub fn total_jobs(&self) -> usize {
        self.batches.iter().map(|b| b.jobs.len()).sum()
    }

    pub fn succeeded(&self) -> usize {
        self.batches.iter().map(BatchReport::succeeded).sum()
    }

    fn crawl_reports(&self) -> impl Iterator<Item = &CrawlReport> {
        self.batches
            .iter()
            .flat_map(|b| b.jobs.iter())
            .filter_map(|job| match &job.outcome {
                JobOutcome::Completed(report) => Some(report),
                JobOutcome::Failed(_) => None,
            })
    }

    pub fn downloaded(&self) -> usize {
        self.crawl_reports().map(|r| r.downloaded).sum()
    }

    pub fn download_failed(&self) -> usize {
        self.crawl_reports().map(|r| r.download_failed).sum()
    }
}

impl App {
    /// 初始化应用：创建运行日志并启动浏览器
    ///
    /// 浏览器启动失败会写入运行日志后返回错误。
    pub async fn initialize(config: Config) -> Result<Self> {
        let run_log = RunLog::create(&config.log_dir, &config.log_file_prefix)
            .await
            .context("无法创建运行日志")?;
        log_startup(&config, run_log.path());

        let renderer =
            match ChromeRenderer::start(&config.browser, config.navigation_timeout()).await {
                Ok(renderer) => renderer,
                Err(e) => {
                    if let Err(log_err) = run_log.record_error(&format!("Error: {}", e), &e).await {
                        warn!("写入运行日志失败: {}", log_err);
                    }
                    return Err(e).context("浏览器启动失败");
                }
            };

        Ok(Self::with_renderer(
            Arc::new(config),
            Arc::new(renderer),
            Arc::new(run_log),
        ))
    }

    /// 使用已有的渲染器和日志构建应用
    pub fn with_renderer(
        config: Arc<Config>,
        renderer: Arc<dyn Renderer>,
        run_log: Arc<RunLog>,
    ) -> Self {
        Self {
            config,
            renderer,
            run_log,
            cancel: CancellationToken::new(),
        }
    }

    /// 取消令牌，触发后在页面和批次边界停止
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn run_log(&self) -> &RunLog {
        &self.run_log
    }

    /// 运行全部批次，结束后无论成败都释放渲染器
    pub async fn run_to_completion(self) -> Result<RunReport> {
        let result = self.run().await;

        if let Err(e) = &result {
            let message = format!("Error: {}", e);
            let err: &(dyn std::error::Error + Send + Sync + 'static) = e.as_ref();
            if let Err(log_err) = self.run_log.record_error(&message, err).await {
                warn!("写入运行日志失败: {}", log_err);
            }
        }

        if let Err(e) = self.renderer.close().await {
            error!("释放浏览器失败: {}", e);
        }

        result
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunReport> {
        let queries = expand_queries(&self.config.search_queries, self.config.search_engine);
        let batches = batcher::chunk(&queries, self.config.concurrency)?;
        let total_queries = queries.len();
        let total_batches = batches.len();

        log_queries_loaded(total_queries, self.config.concurrency, total_batches);
        self.run_log
            .record(&format!(
                "Run started: {} queries in {} batches",
                total_queries, total_batches
            ))
            .await?;

        let mut report = RunReport::default();
        let mut batch_start = 0;

        for (idx, batch) in batches.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!("⚠️ 运行已取消，剩余批次不再执行");
                report.cancelled = true;
                break;
            }

            let batch_num = idx + 1;
            let batch_len = batch.len();
            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch_len,
                total_queries,
            );

            let batch_report = self.process_batch(batch, batch_start, batch_num).await;
            log_batch_complete(batch_num, batch_report.succeeded(), batch_len);

            report.batches.push(batch_report);
            batch_start += batch_len;
        }

        report.cancelled |= self.cancel.is_cancelled();

        self.run_log
            .record(&format!(
                "Run finished: {}/{} queries completed, {} downloaded, {} failed downloads",
                report.succeeded(),
                report.total_jobs(),
                report.downloaded(),
                report.download_failed()
            ))
            .await?;
        print_final_stats(
            report.succeeded(),
            report.total_jobs(),
            report.downloaded(),
            report.download_failed(),
            self.run_log.path(),
        );

        Ok(report)
    }

    /// 处理单个批次：批内全部并发启动，全部结束后才返回
    async fn process_batch(
        &self,
        batch: Vec<String>,
        batch_start: usize,
        batch_num: usize,
    ) -> BatchReport {
        let mut handles = Vec::with_capacity(batch.len());

        for (idx, query) in batch.into_iter().enumerate() {
            let ctx = CrawlCtx::new(query, batch_start + idx + 1, batch_num);
            let job = CrawlJob::new(
                self.renderer.clone(),
                self.run_log.clone(),
                self.config.clone(),
                self.cancel.clone(),
            );

            let handle = tokio::spawn(async move {
                let result = job.run(&ctx).await;
                (ctx, result)
            });
            handles.push(handle);
        }

        let mut batch_report = BatchReport::default();

        for (idx, handle) in handles.into_iter().enumerate() {
            let job_report = match handle.await {
                Ok((ctx, Ok(report))) => JobReport {
                    query: ctx.query,
                    outcome: JobOutcome::Completed(report),
                },
                Ok((ctx, Err(e))) => {
                    self.log_job_failure(&ctx.query, &e).await;
                    JobReport {
                        query: ctx.query,
                        outcome: JobOutcome::Failed(e.to_string()),
                    }
                }
                Err(e) => {
                    let query = format!("#{}", batch_start + idx + 1);
                    self.log_job_failure(&query, &e).await;
                    JobReport {
                        query,
                        outcome: JobOutcome::Failed(e.to_string()),
                    }
                }
            };
            batch_report.jobs.push(job_report);
        }

        info!("第 {} 批全部结束", batch_num);
        batch_report
    }

    async fn log_job_failure(
        &self,
        query: &str,
        err: &(dyn std::error::Error + Send + Sync + 'static),
    ) {
        let message = format!("Error processing query: {}", query);
        if let Err(log_err) = self.run_log.record_error(&message, err).await {
            warn!("写入运行日志失败: {}", log_err);
        }
    }
}
