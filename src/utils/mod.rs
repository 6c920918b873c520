pub mod logging;
pub mod paths;

pub use paths::{filename_from_link, sanitize_directory_name};
