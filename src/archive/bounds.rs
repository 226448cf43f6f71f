use crate::archive::range::day_start;
use crate::repository::PostRepository;
use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// 归档的历史下界
///
/// 下界取最早可见文章发布日的零点；没有文章时取 now 所在日的零点。
/// 翻页器和站点地图共用同一份计算，避免两处各自实现后漂移。
/// 每次请求重新加载，不做缓存。
#[derive(Debug, Clone, Copy)]
pub struct ArchiveBounds {
    first: DateTime<Utc>,
}

impl ArchiveBounds {
    pub async fn load(posts: &PostRepository, now: DateTime<Utc>) -> Self {
        let first = match posts.first_visible(now).await {
            Some(post) => day_start(post.published_at.date_naive()),
            None => day_start(now.date_naive()),
        };
        Self { first }
    }

    /// 最早可见文章发布日的零点
    pub fn first_date(&self) -> DateTime<Utc> {
        self.first
    }

    pub fn first_year(&self) -> i32 {
        self.first.year()
    }

    /// 下界所在月份的 1 日零点（月归档的边界比较用）
    pub fn first_month_start(&self) -> DateTime<Utc> {
        let date = self.first.date_naive();
        match NaiveDate::from_ymd_opt(date.year(), date.month(), 1) {
            Some(first_of_month) => day_start(first_of_month),
            None => self.first,
        }
    }

    /// requested 是否落在 [first_date, now]，两端均含
    pub fn is_in_range(&self, requested: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        self.first <= requested && requested <= now
    }
}
