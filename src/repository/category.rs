use sqlx::SqlitePool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Clone)]
pub struct CategoryRepository {
    db: SqlitePool,
}

impl CategoryRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_slug(&self, slug: &str) -> Option<Category> {
        sqlx::query_as::<_, Category>("SELECT id, name, slug FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.db)
            .await
            .ok()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testutil;

    #[tokio::test]
    async fn finds_by_exact_slug() {
        let db = testutil::memory_pool().await;
        testutil::insert_category(&db, "c1", "Rust", "rust").await;

        let repo = CategoryRepository::new(db);
        let found = repo.find_by_slug("rust").await.unwrap();
        assert_eq!(found.name, "Rust");
        assert!(repo.find_by_slug("go").await.is_none());
    }
}
