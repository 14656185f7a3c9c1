use crate::error::{HealthError, Result};
use futures::stream::{self, Stream, TryStreamExt};
use std::future::Future;

/// 可分页的上游响应
pub trait Paginated {
    /// 下一页的令牌，`None` 表示已是最后一页
    fn next_token(&self) -> Option<&str>;
}

/// 通用分页结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// 最后一页
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    pub fn with_next_token(items: Vec<T>, next_token: impl Into<String>) -> Self {
        Self {
            items,
            next_token: Some(next_token.into()),
        }
    }
}

impl<T> Paginated for Page<T> {
    fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }
}

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// 将按令牌取页的调用包装为惰性、有限、单次遍历的页流
///
/// 任意一页失败即终止整个流。空字符串令牌视为结束。
pub fn paginate<P, F, Fut>(fetch: F) -> impl Stream<Item = Result<P>>
where
    P: Paginated,
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<P>>,
{
    stream::try_unfold((fetch, Cursor::Start), |(mut fetch, cursor)| async move {
        let token = match cursor {
            Cursor::Start => None,
            Cursor::Next(token) => Some(token),
            Cursor::Done => return Ok::<_, HealthError>(None),
        };

        let page = fetch(token).await?;
        let cursor = match page.next_token() {
            Some(next) if !next.is_empty() => Cursor::Next(next.to_string()),
            _ => Cursor::Done,
        };

        Ok(Some((page, (fetch, cursor))))
    })
}

/// 取完所有页并按页序拼接条目
pub async fn collect_items<T, F, Fut>(fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    paginate(fetch).map_ok(|page| page.items).try_concat().await
}
