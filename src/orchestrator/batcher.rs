//! 分批：把有序列表切成固定大小的连续批次

use crate::error::{ScrapeError, ScrapeResult};

/// 按 `batch_size` 切分，最后一批可能不足；保持原有顺序
pub fn chunk<T: Clone>(items: &[T], batch_size: usize) -> ScrapeResult<Vec<Vec<T>>> {
    if batch_size == 0 {
        return Err(ScrapeError::invalid_argument("批大小必须 >= 1"));
    }
    Ok(items.chunks(batch_size).map(<[T]>::to_vec).collect())
}
