//! JS 执行器 - 基础设施层
//!
//! 持有一个 page，只暴露"执行 JS 并取回结果"的能力

use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;

/// JS 执行器
///
/// 职责：
/// - 持有 Page 资源
/// - 暴露 eval_as() 能力
/// - 不认识查询 / 链接 / 下载
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于导航、打印等其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 表达式并反序列化为指定类型
    ///
    /// # 参数
    /// - `js_code`: 要执行的 JavaScript 表达式
    ///
    /// # 返回
    /// 表达式的值；执行失败或类型不匹配时返回 `CdpError`
    pub async fn eval_as<T: DeserializeOwned>(
        &self,
        js_code: impl Into<String>,
    ) -> Result<T, CdpError> {
        let result = self.page.evaluate(js_code.into()).await?;
        Ok(result.into_value()?)
    }
}
