use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 抓取时间窗口，左闭右开 `[from, to)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl ScrapeWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// 以本窗口的 `to` 作为下一个窗口的 `from`
    pub fn next(&self, now: DateTime<Utc>) -> Self {
        Self {
            from: self.to,
            to: now,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at < self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_window_is_half_open() {
        let from = Utc::now();
        let to = from + Duration::seconds(30);
        let window = ScrapeWindow::new(from, to);

        assert!(window.contains(from));
        assert!(!window.contains(to));
        assert!(window.contains(to - Duration::milliseconds(1)));
    }

    #[test]
    fn test_next_window_is_contiguous() {
        let from = Utc::now();
        let first = ScrapeWindow::new(from, from + Duration::seconds(15));
        let second = first.next(from + Duration::seconds(40));

        assert_eq!(second.from, first.to);
        assert_eq!(second.to, from + Duration::seconds(40));
    }
}
