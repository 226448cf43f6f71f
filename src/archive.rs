pub mod bounds;
pub mod pager;
pub mod range;
pub mod table;

pub use bounds::ArchiveBounds;
pub use pager::Pager;
pub use table::{ArchiveEntry, ArchiveTable};

use crate::config::SiteConfig;
use crate::locale;
use crate::repository::{Category, CategoryRepository, PostRepository};
use crate::urls::UrlBuilder;
use chrono::{DateTime, Datelike, Locale, Utc};
use sqlx::SqlitePool;
use thiserror::Error;

/// 归档核心对调用方只暴露一种失败：未找到
///
/// 无效请求（缺年份、2 月 30 日、13 月）和越界请求（未来年份、
/// 早于第一篇文章、未知分类）统一折叠成同一个信号，表现层渲染
/// 同一个 404；具体原因只进日志。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArchiveError {
    #[error("归档不存在")]
    NotFound,
}

/// 请求粒度，由给出的参数推导：日 > 月 > 年
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Year,
    Month,
    Day,
}

/// 归档请求（URL 参数解析后的形态）
///
/// day 只有在 month 同时给出时才生效；year 始终必填。
#[derive(Debug, Clone, Default)]
pub struct ArchiveRequest {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub category: Option<String>,
}

impl ArchiveRequest {
    pub fn granularity(&self) -> Granularity {
        match (self.month, self.day) {
            (Some(_), Some(_)) => Granularity::Day,
            (Some(_), None) => Granularity::Month,
            (None, _) => Granularity::Year,
        }
    }
}

/// 半开区间 [start, end)，两端都对齐到 UTC 日界
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// 归档服务：组合仓库、URL 生成与 locale，承载对外的两个操作
pub struct ArchiveService {
    posts: PostRepository,
    categories: CategoryRepository,
    urls: UrlBuilder,
    locale: Locale,
}

impl ArchiveService {
    pub fn new(db: SqlitePool, config: &SiteConfig) -> Self {
        Self {
            posts: PostRepository::new(db.clone()),
            categories: CategoryRepository::new(db),
            urls: UrlBuilder::new(config),
            locale: locale::parse(&config.site.locale),
        }
    }

    /// 归档表：区间内的可见文章按月份名分组
    pub async fn get_archive(
        &self,
        request: &ArchiveRequest,
        now: DateTime<Utc>,
    ) -> Result<ArchiveTable, ArchiveError> {
        let year = require_year(request)?;
        let range = range::compute(year, request.month, request.day)?;
        let category = self.resolve_category(request).await?;

        let bounds = ArchiveBounds::load(&self.posts, now).await;
        if !request_in_bounds(&bounds, request.granularity(), year, &range, now) {
            tracing::debug!("归档请求越界：{request:?}");
            return Err(ArchiveError::NotFound);
        }

        Ok(table::assemble(
            &self.posts,
            &self.urls,
            range,
            category.as_ref(),
            self.locale,
            now,
        )
        .await)
    }

    /// 当前归档单位的上一页/下一页
    pub async fn get_pager(
        &self,
        request: &ArchiveRequest,
        now: DateTime<Utc>,
    ) -> Result<Pager, ArchiveError> {
        let year = require_year(request)?;
        let bounds = ArchiveBounds::load(&self.posts, now).await;
        Pager::build(
            &bounds,
            &self.urls,
            self.locale,
            year,
            request.month,
            request.day,
            now,
        )
    }

    async fn resolve_category(
        &self,
        request: &ArchiveRequest,
    ) -> Result<Option<Category>, ArchiveError> {
        match &request.category {
            Some(slug) => match self.categories.find_by_slug(slug).await {
                Some(category) => Ok(Some(category)),
                None => {
                    tracing::debug!("未知分类：{slug}");
                    Err(ArchiveError::NotFound)
                }
            },
            None => Ok(None),
        }
    }
}

fn require_year(request: &ArchiveRequest) -> Result<i32, ArchiveError> {
    request.year.ok_or_else(|| {
        tracing::debug!("归档请求缺少年份");
        ArchiveError::NotFound
    })
}

/// 粒度各自的边界判定，三种比较刻意保持各自的写法：
///
/// 年：只挡未来年份（过去的空年份渲染空表）；
/// 月：不得早于第一篇文章所在月，也不得晚于 now；
/// 日：落在 [first_date, now]，两端均含。
fn request_in_bounds(
    bounds: &ArchiveBounds,
    granularity: Granularity,
    year: i32,
    range: &DateRange,
    now: DateTime<Utc>,
) -> bool {
    match granularity {
        Granularity::Year => year <= now.year(),
        Granularity::Month => {
            bounds.first_month_start() <= range.start && range.start <= now
        }
        Granularity::Day => bounds.is_in_range(range.start, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        at(2017, 6, 1)
    }

    fn request(year: i32, month: Option<u32>, day: Option<u32>) -> ArchiveRequest {
        ArchiveRequest {
            year: Some(year),
            month,
            day,
            category: None,
        }
    }

    /// 跨三年的九篇文章，覆盖同月多篇、跨年与同日多篇的情况
    async fn service() -> ArchiveService {
        let db = testutil::memory_pool().await;
        let posts = [
            ("p0", "一月文", "jan-post", (2017, 1, 1)),
            ("p1", "二月文", "feb-post", (2017, 2, 20)),
            ("p2", "三月文", "mar-post", (2017, 3, 3)),
            ("p3", "四月初", "apr-first", (2017, 4, 1)),
            ("p4", "四月中", "apr-second", (2017, 4, 15)),
            ("p5", "年末文", "dec-post", (2016, 12, 31)),
            ("p6", "晚秋文", "nov-post", (2016, 11, 3)),
            ("p7", "五月甲", "may-a", (2015, 5, 14)),
            ("p8", "五月乙", "may-b", (2015, 5, 14)),
        ];
        for (id, title, slug, (y, m, d)) in posts {
            testutil::insert_post(&db, id, title, slug, at(y, m, d)).await;
        }
        ArchiveService::new(db, &SiteConfig::default())
    }

    #[tokio::test]
    async fn year_archive_groups_by_month_descending() {
        let service = service().await;
        let table = service.get_archive(&request(2017, None, None), now()).await.unwrap();

        assert_eq!(table.len(), 4);
        // 分组顺序为遍历顺序（时间降序），四月在最前
        let months: Vec<&str> = table.groups().iter().map(|g| g.month.as_str()).collect();
        assert_eq!(months, ["April", "March", "February", "January"]);

        let april = table.get("April").unwrap();
        assert_eq!(april.len(), 2);
        assert_eq!(april[0].title, "四月中");
        assert_eq!(april[1].title, "四月初");
        assert_eq!(april[0].url, "/blog/post/apr-second");

        assert_eq!(table.get("January").unwrap()[0].title, "一月文");
    }

    #[tokio::test]
    async fn month_and_day_archives() {
        let service = service().await;

        let april = service
            .get_archive(&request(2017, Some(4), None), now())
            .await
            .unwrap();
        assert_eq!(april.len(), 1);
        assert_eq!(april.get("April").unwrap().len(), 2);

        let day = service
            .get_archive(&request(2015, Some(5), Some(14)), now())
            .await
            .unwrap();
        assert_eq!(day.len(), 1);
        assert_eq!(day.get("May").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_past_year_is_not_an_error() {
        let service = service().await;

        // 2014 年没有文章：返回空表而不是 404
        let table = service.get_archive(&request(2014, None, None), now()).await.unwrap();
        assert!(table.is_empty());

        let y2016 = service.get_archive(&request(2016, None, None), now()).await.unwrap();
        assert_eq!(y2016.len(), 2);
    }

    #[tokio::test]
    async fn out_of_bounds_requests_are_not_found() {
        let service = service().await;

        // 未来年份
        assert_eq!(
            service.get_archive(&request(2099, None, None), now()).await.unwrap_err(),
            ArchiveError::NotFound
        );
        // 第一篇文章之前的月份
        assert_eq!(
            service.get_archive(&request(2015, Some(4), None), now()).await.unwrap_err(),
            ArchiveError::NotFound
        );
        // 第一篇文章所在月必须可访问
        assert!(service.get_archive(&request(2015, Some(5), None), now()).await.is_ok());
        // 第一篇文章之前的日子
        assert_eq!(
            service
                .get_archive(&request(2015, Some(5), Some(13)), now())
                .await
                .unwrap_err(),
            ArchiveError::NotFound
        );
        // 无效日历日期
        assert_eq!(
            service
                .get_archive(&request(2017, Some(2), Some(30)), now())
                .await
                .unwrap_err(),
            ArchiveError::NotFound
        );
        // 缺少年份
        assert_eq!(
            service
                .get_archive(&ArchiveRequest::default(), now())
                .await
                .unwrap_err(),
            ArchiveError::NotFound
        );
    }

    #[tokio::test]
    async fn category_filter_splits_counts() {
        let db = testutil::memory_pool().await;
        for (id, slug) in [("c0", "alpha"), ("c1", "beta"), ("c2", "gamma")] {
            testutil::insert_category(&db, id, slug, slug).await;
        }
        // 同一个月里 3/1/4 篇，分属三个分类
        let spread = [
            ("p0", "c0"), ("p1", "c0"), ("p2", "c0"),
            ("p3", "c1"),
            ("p4", "c2"), ("p5", "c2"), ("p6", "c2"), ("p7", "c2"),
        ];
        for (i, (id, category)) in spread.iter().enumerate() {
            testutil::insert_post(&db, id, id, id, at(2017, 1, i as u32 + 1)).await;
            testutil::link_category(&db, id, category).await;
        }
        let service = ArchiveService::new(db, &SiteConfig::default());

        for (slug, expected) in [("alpha", 3), ("beta", 1), ("gamma", 4)] {
            let request = ArchiveRequest {
                year: Some(2017),
                category: Some(slug.to_string()),
                ..Default::default()
            };
            let table = service.get_archive(&request, now()).await.unwrap();
            assert_eq!(table.get("January").unwrap().len(), expected, "分类 {slug}");
        }

        // 未知分类
        let unknown = ArchiveRequest {
            year: Some(2017),
            category: Some("missing".to_string()),
            ..Default::default()
        };
        assert_eq!(
            service.get_archive(&unknown, now()).await.unwrap_err(),
            ArchiveError::NotFound
        );
    }

    #[tokio::test]
    async fn entries_carry_first_category_only() {
        let db = testutil::memory_pool().await;
        testutil::insert_category(&db, "c1", "Rust", "rust").await;
        testutil::insert_category(&db, "c2", "News", "news").await;
        testutil::insert_post(&db, "p1", "双分类", "both", at(2017, 1, 1)).await;
        testutil::link_category(&db, "p1", "c1").await;
        testutil::link_category(&db, "p1", "c2").await;
        testutil::insert_post(&db, "p2", "无分类", "none", at(2017, 1, 2)).await;

        let service = ArchiveService::new(db, &SiteConfig::default());
        let table = service.get_archive(&request(2017, None, None), now()).await.unwrap();
        let january = table.get("January").unwrap();

        assert_eq!(january[0].title, "无分类");
        assert_eq!(january[0].category, "");
        assert_eq!(january[0].category_url, "");
        assert_eq!(january[1].category, "Rust");
        assert_eq!(january[1].category_url, "/blog/category/rust");
    }

    #[tokio::test]
    async fn granularity_is_derived_from_params() {
        assert_eq!(request(2017, None, None).granularity(), Granularity::Year);
        assert_eq!(request(2017, Some(4), None).granularity(), Granularity::Month);
        assert_eq!(request(2017, Some(4), Some(15)).granularity(), Granularity::Day);
        // 没有月份时日参数被忽略
        assert_eq!(request(2017, None, Some(15)).granularity(), Granularity::Year);
    }
}
