pub mod crawl_ctx;
pub mod crawl_job;

pub use crawl_ctx::CrawlCtx;
pub use crawl_job::{CrawlJob, CrawlReport, CrawlState};
