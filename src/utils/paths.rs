//! 目录名与文件名推导

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// 最后一段路径为空时使用的文件名
pub const FALLBACK_FILE_NAME: &str = "document.pdf";

static UNSAFE_DIR_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\s]"#).expect("invalid directory regex"));

/// 把查询字符串转换为目录名：不安全字符和空白替换为 `_`
///
/// # 参数
/// - `name`: 展开后的查询
///
/// # 返回
/// 可直接用作目录名的字符串
pub fn sanitize_directory_name(name: &str) -> String {
    UNSAFE_DIR_CHARS.replace_all(name, "_").into_owned()
}

/// 取链接中最后一个 `/` 之后的部分（包括查询字符串）作为保存的文件名
///
/// 片段（`#...`）不参与命名。百分号解码后，路径分隔符和目录名中不允许的字符
/// 同样替换为 `_`，所以 `get.php?id=1.pdf` 保存为 `get.php_id=1.pdf`。
///
/// # 参数
/// - `link`: 候选 PDF 链接
///
/// # 返回
/// 非空的文件名；无法得到有效文件名时返回 [`FALLBACK_FILE_NAME`]
pub fn filename_from_link(link: &str) -> String {
    let without_fragment = match Url::parse(link) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => link.to_string(),
    };
    let segment = without_fragment.rsplit('/').next().unwrap_or_default();

    let decoded = match urlencoding::decode(segment) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    };

    // 解码后可能出现路径分隔符，不能让文件跑出目标目录
    let cleaned = UNSAFE_DIR_CHARS
        .replace_all(&decoded, "_")
        .replace('\0', "_");

    match cleaned.as_str() {
        "" | "." | ".." => FALLBACK_FILE_NAME.to_string(),
        _ => cleaned,
    }
}
