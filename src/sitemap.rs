use crate::archive::range::day_start;
use crate::archive::ArchiveBounds;
use crate::config::SiteConfig;
use crate::repository::PostRepository;
use crate::urls::UrlBuilder;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::SqlitePool;

/// 站点地图条目：每个归档年份一条
#[derive(Debug, Clone)]
pub struct SitemapEntry {
    pub title: String,
    /// 归档路由未声明年份参数时为空串（条目仍然生成，不跳过）
    pub url: String,
    pub mtime: DateTime<Utc>,
}

/// 枚举从第一篇文章年份到当前年份的归档年
pub struct SitemapYears {
    posts: PostRepository,
    urls: UrlBuilder,
}

impl SitemapYears {
    pub fn new(db: SqlitePool, config: &SiteConfig) -> Self {
        Self {
            posts: PostRepository::new(db),
            urls: UrlBuilder::new(config),
        }
    }

    pub async fn enumerate(&self, now: DateTime<Utc>) -> Vec<SitemapEntry> {
        let bounds = ArchiveBounds::load(&self.posts, now).await;
        let has_year_param = self.urls.has_year_param();
        if !has_year_param {
            tracing::warn!("归档路由没有年份参数，站点地图条目将没有 URL");
        }

        let mut entries = Vec::new();
        for year in bounds.first_year()..=now.year() {
            let url = if has_year_param {
                self.urls.year_url(year)
            } else {
                String::new()
            };
            entries.push(SitemapEntry {
                title: format!("Archive for year {year}"),
                url,
                mtime: self.mtime(year, now).await,
            });
        }
        entries
    }

    /// 当前年份取最新文章的发布时间；其余情况取当年 12 月 31 日零点，
    /// 保证历史年份的时间戳稳定、不随生成时刻变化
    async fn mtime(&self, year: i32, now: DateTime<Utc>) -> DateTime<Utc> {
        if year == now.year()
            && let Some(post) = self.posts.last_visible(now).await
        {
            return post.published_at;
        }

        match NaiveDate::from_ymd_opt(year, 12, 31) {
            Some(date) => day_start(date),
            None => day_start(now.date_naive()),
        }
    }
}

/// 生成 sitemap.xml 文本（无 URL 的条目跳过，枚举结果仍保留它们）
pub fn write_xml(entries: &[SitemapEntry], site_url: &str) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");

    for entry in entries {
        if entry.url.is_empty() {
            tracing::warn!("跳过无 URL 的条目：{}", entry.title);
            continue;
        }
        xml.push_str(&format!(
            "  <url>\n    <loc>{}{}</loc>\n    <lastmod>{}</lastmod>\n  </url>\n",
            xml_escape(site_url),
            xml_escape(&entry.url),
            entry.mtime.format("%Y-%m-%d"),
        ));
    }

    xml.push_str("</urlset>\n");
    xml
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn enumerates_years_ascending_with_stable_mtimes() {
        let db = testutil::memory_pool().await;
        testutil::insert_post(&db, "p1", "旧", "old", at(2015, 5, 14)).await;
        testutil::insert_post(&db, "p2", "新", "new", at(2017, 4, 15)).await;

        let sitemap = SitemapYears::new(db, &SiteConfig::default());
        let entries = sitemap.enumerate(at(2017, 6, 1)).await;

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].title, "Archive for year 2015");
        assert_eq!(entries[0].url, "/blog/archive/2015");
        assert_eq!(entries[0].mtime, at(2015, 12, 31));
        assert_eq!(entries[1].mtime, at(2016, 12, 31));
        // 当前年：最新文章的发布时间
        assert_eq!(entries[2].mtime, at(2017, 4, 15));
    }

    #[tokio::test]
    async fn empty_blog_yields_single_current_year() {
        let db = testutil::memory_pool().await;
        let sitemap = SitemapYears::new(db, &SiteConfig::default());
        let entries = sitemap.enumerate(at(2017, 6, 1)).await;

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Archive for year 2017");
        assert_eq!(entries[0].mtime, at(2017, 12, 31));
    }

    #[tokio::test]
    async fn missing_year_param_yields_empty_urls() {
        let db = testutil::memory_pool().await;
        testutil::insert_post(&db, "p1", "旧", "old", at(2016, 1, 1)).await;

        let mut config = SiteConfig::default();
        config.routes.archive_url = "/blog/archive".to_string();
        let sitemap = SitemapYears::new(db, &config);
        let entries = sitemap.enumerate(at(2017, 6, 1)).await;

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.url.is_empty()));
    }

    #[test]
    fn xml_skips_empty_urls_and_escapes() {
        let entries = vec![
            SitemapEntry {
                title: "Archive for year 2016".to_string(),
                url: "/blog/archive/2016?a=1&b=2".to_string(),
                mtime: at(2016, 12, 31),
            },
            SitemapEntry {
                title: "Archive for year 2017".to_string(),
                url: String::new(),
                mtime: at(2017, 12, 31),
            },
        ];

        let xml = write_xml(&entries, "https://example.org");
        assert!(xml.contains("<loc>https://example.org/blog/archive/2016?a=1&amp;b=2</loc>"));
        assert!(xml.contains("<lastmod>2016-12-31</lastmod>"));
        assert_eq!(xml.matches("<url>").count(), 1);
    }
}
