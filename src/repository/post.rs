use crate::repository::Category;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// 归档视图需要的文章字段
#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PostRepository {
    db: SqlitePool,
}

impl PostRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// 查询 [start, end) 内的可见文章，按发布时间降序
    ///
    /// 可见 = published 且发布时间不晚于 now。category_id 给定时仅保留该分类下的文章。
    pub async fn find_visible_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        category_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<PostRow> {
        let rows = match category_id {
            Some(category_id) => {
                sqlx::query(
                    "SELECT p.id, p.title, p.slug, p.published_at FROM posts p \
                     JOIN post_categories pc ON pc.post_id = p.id \
                     WHERE pc.category_id = ? \
                     AND p.published = 1 AND p.published_at IS NOT NULL AND p.published_at <= ? \
                     AND p.published_at >= ? AND p.published_at < ? \
                     ORDER BY p.published_at DESC",
                )
                .bind(category_id)
                .bind(now.to_rfc3339())
                .bind(start.to_rfc3339())
                .bind(end.to_rfc3339())
                .fetch_all(&self.db)
                .await
                .unwrap_or_default()
            }
            None => {
                sqlx::query(
                    "SELECT id, title, slug, published_at FROM posts \
                     WHERE published = 1 AND published_at IS NOT NULL AND published_at <= ? \
                     AND published_at >= ? AND published_at < ? \
                     ORDER BY published_at DESC",
                )
                .bind(now.to_rfc3339())
                .bind(start.to_rfc3339())
                .bind(end.to_rfc3339())
                .fetch_all(&self.db)
                .await
                .unwrap_or_default()
            }
        };

        rows.iter().filter_map(to_post_row).collect()
    }

    /// 最早的可见文章（确定归档下界）
    pub async fn first_visible(&self, now: DateTime<Utc>) -> Option<PostRow> {
        let row = sqlx::query(
            "SELECT id, title, slug, published_at FROM posts \
             WHERE published = 1 AND published_at IS NOT NULL AND published_at <= ? \
             ORDER BY published_at ASC LIMIT 1",
        )
        .bind(now.to_rfc3339())
        .fetch_optional(&self.db)
        .await
        .ok()
        .flatten()?;

        to_post_row(&row)
    }

    /// 最新的可见文章（站点地图的当年 mtime）
    pub async fn last_visible(&self, now: DateTime<Utc>) -> Option<PostRow> {
        let row = sqlx::query(
            "SELECT id, title, slug, published_at FROM posts \
             WHERE published = 1 AND published_at IS NOT NULL AND published_at <= ? \
             ORDER BY published_at DESC LIMIT 1",
        )
        .bind(now.to_rfc3339())
        .fetch_optional(&self.db)
        .await
        .ok()
        .flatten()?;

        to_post_row(&row)
    }

    /// 文章的第一个分类（按关联表自然顺序）
    pub async fn first_category_of(&self, post_id: &str) -> Option<Category> {
        sqlx::query_as::<_, Category>(
            "SELECT c.id, c.name, c.slug FROM categories c \
             JOIN post_categories pc ON pc.category_id = c.id \
             WHERE pc.post_id = ? \
             ORDER BY pc.rowid LIMIT 1",
        )
        .bind(post_id)
        .fetch_optional(&self.db)
        .await
        .ok()
        .flatten()
    }
}

fn to_post_row(row: &sqlx::sqlite::SqliteRow) -> Option<PostRow> {
    let published_at: String = row.get("published_at");
    let published_at = match DateTime::parse_from_rfc3339(&published_at) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
            tracing::warn!("文章 published_at 无法解析：{e}");
            return None;
        }
    };

    Some(PostRow {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        published_at,
    })
}
