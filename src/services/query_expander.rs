//! 查询展开：把模板中的文件类型占位符替换为引擎实际的参数名

use crate::config::SearchEngine;

/// 展开单个查询模板，只替换第一个占位符
///
/// # 参数
/// - `template`: 配置中的查询模板，可能含 `filetype`
/// - `engine`: 当前搜索引擎
///
/// # 返回
/// 可直接提交给搜索引擎的查询
pub fn expand_query(template: &str, engine: SearchEngine) -> String {
    template.replacen(
        SearchEngine::FILE_TYPE_PLACEHOLDER,
        engine.file_type_param(),
        1,
    )
}

/// 按顺序展开全部查询模板
pub fn expand_queries(templates: &[String], engine: SearchEngine) -> Vec<String> {
    templates
        .iter()
        .map(|template| expand_query(template, engine))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_keeps_filetype() {
        assert_eq!(
            expand_query("query filetype:pdf", SearchEngine::Google),
            "query filetype:pdf"
        );
    }

    #[test]
    fn test_yandex_uses_mime() {
        assert_eq!(
            expand_query("query filetype:pdf", SearchEngine::Yandex),
            "query mime:pdf"
        );
    }

    #[test]
    fn test_template_without_placeholder_is_unchanged() {
        assert_eq!(
            expand_query("земельное право", SearchEngine::Yandex),
            "земельное право"
        );
    }

    #[test]
    fn test_only_first_placeholder_is_replaced() {
        assert_eq!(
            expand_query("filetype filetype:pdf", SearchEngine::Yandex),
            "mime filetype:pdf"
        );
    }

    #[test]
    fn test_expand_queries_preserves_order() {
        let templates = vec!["a filetype:pdf".to_string(), "b".to_string()];
        assert_eq!(
            expand_queries(&templates, SearchEngine::Yandex),
            vec!["a mime:pdf", "b"]
        );
    }
}
