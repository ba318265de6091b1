use super::{ItemRepositoryTrait, OwnershipChange, RepoResult, MAX_QUERY_ROWS};
use crate::models::Item;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

const ITEM_COLUMNS: &str = r#"
    item_id, owner_id, category, subcategory, brand, condition, photo, value,
    is_fractional, share_percentage, parent_item_id, created_at, updated_at
"#;

/// PostgreSQL repository for items
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepositoryTrait for PgItemRepository {
    async fn create(&self, item: &Item) -> RepoResult<Item> {
        let sql = format!(
            r#"
            INSERT INTO items (
                item_id, owner_id, category, subcategory, brand, condition, photo, value,
                is_fractional, share_percentage, parent_item_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        );

        let created = sqlx::query_as::<_, Item>(&sql)
            .bind(item.item_id)
            .bind(item.owner_id)
            .bind(&item.category)
            .bind(&item.subcategory)
            .bind(&item.brand)
            .bind(&item.condition)
            .bind(&item.photo)
            .bind(item.value)
            .bind(item.is_fractional)
            .bind(item.share_percentage)
            .bind(item.parent_item_id)
            .bind(item.created_at)
            .bind(item.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_by_id(&self, item_id: Uuid) -> RepoResult<Option<Item>> {
        let sql = format!("SELECT {} FROM items WHERE item_id = $1", ITEM_COLUMNS);
        let item = sqlx::query_as::<_, Item>(&sql)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<Item>> {
        let sql = format!(
            "SELECT {} FROM items WHERE owner_id = $1 ORDER BY created_at LIMIT $2",
            ITEM_COLUMNS
        );
        let items = sqlx::query_as::<_, Item>(&sql)
            .bind(owner_id)
            .bind(MAX_QUERY_ROWS as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn update(&self, item: &Item) -> RepoResult<Item> {
        let sql = format!(
            r#"
            UPDATE items
            SET owner_id = $2, share_percentage = $3, updated_at = $4
            WHERE item_id = $1
            RETURNING {}
            "#,
            ITEM_COLUMNS
        );

        let updated = sqlx::query_as::<_, Item>(&sql)
            .bind(item.item_id)
            .bind(item.owner_id)
            .bind(item.share_percentage)
            .bind(item.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn apply_ownership(&self, item_id: Uuid, change: OwnershipChange) -> RepoResult<bool> {
        // COALESCE keeps the stored share when the change carries none
        let result = sqlx::query(
            r#"
            UPDATE items
            SET owner_id = $2,
                share_percentage = COALESCE($3, share_percentage),
                updated_at = $4
            WHERE item_id = $1
            "#,
        )
        .bind(item_id)
        .bind(change.owner_id)
        .bind(change.share_percentage)
        .bind(change.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, item_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM items WHERE item_id = $1")
            .bind(item_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
