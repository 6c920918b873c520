//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 运行编排器
//! - 管理应用生命周期（初始化、运行、释放浏览器）
//! - 展开查询并按并发数分批
//! - 批与批之间严格串行，批内并发
//! - 输出全局统计信息
//!
//! ### `batcher` - 分批工具
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Query>)
//!     ↓
//! workflow::CrawlJob (处理单个查询：翻页 → 提取 → 过滤 → 下载)
//!     ↓
//! services (能力层：链接过滤 / 下载)
//!     ↓
//! infrastructure (基础设施：Renderer / RunLog)
//! ```

pub mod batch_processor;
pub mod batcher;

pub use batch_processor::{App, BatchReport, JobOutcome, JobReport, RunReport};
pub use batcher::chunk;
