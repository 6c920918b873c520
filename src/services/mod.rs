pub mod download;
pub mod link_filter;
pub mod query_expander;

pub use download::{DownloadOutcome, Downloader};
pub use link_filter::{is_allowed_domain, is_pdf_link, pdf_links};
pub use query_expander::{expand_queries, expand_query};
