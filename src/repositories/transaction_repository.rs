use super::{RepoResult, TransactionRepositoryTrait, MAX_QUERY_ROWS};
use crate::error::RepositoryError;
use crate::models::{ItemDetails, SpentItem, Transaction, TransactionStatus, TransactionType};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const TRANSACTION_COLUMNS: &str = r#"
    transaction_id, user_id, transaction_type, amount, item_id, item_details,
    merchant_name, website_name, status, description, spent_items, created_at, updated_at
"#;

#[derive(Debug, FromRow)]
struct TransactionRow {
    transaction_id: String,
    user_id: Uuid,
    transaction_type: String,
    amount: Decimal,
    item_id: Option<Uuid>,
    item_details: Option<Json<ItemDetails>>,
    merchant_name: Option<String>,
    website_name: Option<String>,
    status: String,
    description: Option<String>,
    spent_items: Option<Json<Vec<SpentItem>>>,
    created_at: Option<NaiveDateTime>,
    updated_at: Option<NaiveDateTime>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = RepositoryError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let transaction_type = TransactionType::from_str(&row.transaction_type).ok_or_else(|| {
            RepositoryError::InvalidInput(format!(
                "unknown transaction type: {}",
                row.transaction_type
            ))
        })?;
        let status = TransactionStatus::from_str(&row.status).ok_or_else(|| {
            RepositoryError::InvalidInput(format!("unknown transaction status: {}", row.status))
        })?;

        Ok(Transaction {
            transaction_id: row.transaction_id,
            user_id: row.user_id,
            transaction_type,
            amount: row.amount,
            item_id: row.item_id,
            item_details: row.item_details.map(|d| d.0),
            merchant_name: row.merchant_name,
            website_name: row.website_name,
            status,
            description: row.description,
            spent_items: row.spent_items.map(|s| s.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL repository for persisted ledger entries
pub struct PgTransactionRepository {
    pool: PgPool,
}

impl PgTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionRepositoryTrait for PgTransactionRepository {
    async fn create(&self, transaction: &Transaction) -> RepoResult<Transaction> {
        let sql = format!(
            r#"
            INSERT INTO transactions (
                transaction_id, user_id, transaction_type, amount, item_id, item_details,
                merchant_name, website_name, status, description, spent_items,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            TRANSACTION_COLUMNS
        );

        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(&transaction.transaction_id)
            .bind(transaction.user_id)
            .bind(transaction.transaction_type.as_str())
            .bind(transaction.amount)
            .bind(transaction.item_id)
            .bind(transaction.item_details.as_ref().map(Json))
            .bind(&transaction.merchant_name)
            .bind(&transaction.website_name)
            .bind(transaction.status.as_str())
            .bind(&transaction.description)
            .bind(transaction.spent_items.as_ref().map(Json))
            .bind(transaction.created_at)
            .bind(transaction.updated_at)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn find_by_id(&self, transaction_id: &str) -> RepoResult<Option<Transaction>> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE transaction_id = $1",
            TRANSACTION_COLUMNS
        );
        let row = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(transaction_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Transaction::try_from).transpose()
    }

    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE user_id = $1 ORDER BY seq LIMIT $2",
            TRANSACTION_COLUMNS
        );
        let rows = sqlx::query_as::<_, TransactionRow>(&sql)
            .bind(user_id)
            .bind(MAX_QUERY_ROWS as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Transaction::try_from).collect()
    }
}
