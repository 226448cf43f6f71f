pub mod category;
pub mod post;

pub use category::{Category, CategoryRepository};
pub use post::{PostRepository, PostRow};

use anyhow::Result;
use sqlx::SqlitePool;

/// 建表（幂等）。归档引擎对博客库只读，但首次运行时保证表存在
pub async fn init_schema(db: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS posts (\
            id TEXT PRIMARY KEY, \
            slug TEXT NOT NULL, \
            title TEXT NOT NULL, \
            content TEXT NOT NULL DEFAULT '', \
            published INTEGER NOT NULL DEFAULT 0, \
            published_at TEXT, \
            created_at TEXT NOT NULL, \
            updated_at TEXT NOT NULL)",
    )
    .execute(db)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS categories (\
            id TEXT PRIMARY KEY, \
            name TEXT NOT NULL, \
            slug TEXT NOT NULL UNIQUE, \
            description TEXT NOT NULL DEFAULT '', \
            created_at TEXT NOT NULL)",
    )
    .execute(db)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS post_categories (\
            post_id TEXT NOT NULL, \
            category_id TEXT NOT NULL, \
            PRIMARY KEY (post_id, category_id))",
    )
    .execute(db)
    .await?;

    Ok(())
}
