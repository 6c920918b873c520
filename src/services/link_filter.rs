//! 候选链接过滤
//!
//! - `is_pdf_link`：按 URL 中是否包含 `.pdf` 判断，是启发式而不是 content-type 检测
//! - `is_allowed_domain`：域名后缀的宽松子串匹配，不做严格的后缀校验

const PDF_MARKER: &str = ".pdf";

pub fn is_pdf_link(href: &str) -> bool {
    !href.is_empty() && href.contains(PDF_MARKER)
}

/// URL 包含任意一个允许的后缀即通过（区分大小写）
///
/// # 参数
/// - `url`: 候选链接
/// - `allowed_domains`: 允许的域名后缀，如 `.ru`
///
/// # 返回
/// 列表为空时总是 `false`
pub fn is_allowed_domain(url: &str, allowed_domains: &[String]) -> bool {
    allowed_domains
        .iter()
        .any(|domain| url.contains(domain.as_str()))
}

/// 从渲染器返回的原始链接中挑出 PDF 链接，保持原有顺序
///
/// # 参数
/// - `raw_links`: 页面中全部锚点的 href
pub fn pdf_links(raw_links: Vec<String>) -> Vec<String> {
    raw_links
        .into_iter()
        .filter(|href| is_pdf_link(href))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domains(list: &[&str]) -> Vec<String> {
        list.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_allowed_domain() {
        assert!(is_allowed_domain(
            "https://example.ru/doc.pdf",
            &domains(&[".ru"])
        ));
        assert!(!is_allowed_domain(
            "https://example.com/doc.pdf",
            &domains(&[".ru", ".by"])
        ));
    }

    #[test]
    fn test_domain_match_is_loose_substring() {
        // 子串匹配：路径中出现的后缀同样会通过
        assert!(is_allowed_domain(
            "https://example.com/files.ru/doc.pdf",
            &domains(&[".ru"])
        ));
        assert!(!is_allowed_domain("https://EXAMPLE.RU/doc.pdf", &domains(&[".ru"])));
        assert!(!is_allowed_domain("https://example.ru/doc.pdf", &[]));
    }

    #[test]
    fn test_pdf_links_keeps_order_and_drops_others() {
        let raw = vec![
            "https://a.ru/one.pdf".to_string(),
            "https://a.ru/page.html".to_string(),
            String::new(),
            "https://b.by/view?file=two.pdf&x=1".to_string(),
        ];
        assert_eq!(
            pdf_links(raw),
            vec!["https://a.ru/one.pdf", "https://b.by/view?file=two.pdf&x=1"]
        );
    }
}
