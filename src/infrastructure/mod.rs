//! 基础设施层：持有稀缺资源（浏览器、页面、日志文件），只暴露能力

pub mod chrome;
pub mod fs_store;
pub mod js_executor;
pub mod renderer;
pub mod run_log;

pub use chrome::ChromeRenderer;
pub use js_executor::JsExecutor;
pub use renderer::{navigate_with_timeout, PaperFormat, Renderer, Session, SessionGuard, WaitPolicy};
pub use run_log::RunLog;
