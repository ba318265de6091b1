use super::{RepoResult, TradeRepositoryTrait, MAX_QUERY_ROWS};
use crate::error::RepositoryError;
use crate::models::{Trade, TradeItem, TradeStatus};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const TRADE_COLUMNS: &str = r#"
    trade_id, timestamp, payer_id, payee_id, items, total_value, status,
    payer_signature, payee_signature
"#;

/// Row shape of the `trades` table; items live in a JSONB column
#[derive(Debug, FromRow)]
struct TradeRow {
    trade_id: Uuid,
    timestamp: NaiveDateTime,
    payer_id: Uuid,
    payee_id: Uuid,
    items: Json<Vec<TradeItem>>,
    total_value: Decimal,
    status: String,
    payer_signature: String,
    payee_signature: String,
}

impl TryFrom<TradeRow> for Trade {
    type Error = RepositoryError;

    fn try_from(row: TradeRow) -> Result<Self, Self::Error> {
        let status = TradeStatus::from_str(&row.status).map_err(RepositoryError::InvalidInput)?;
        Ok(Trade {
            trade_id: row.trade_id,
            timestamp: row.timestamp,
            payer_id: row.payer_id,
            payee_id: row.payee_id,
            items: row.items.0,
            total_value: row.total_value,
            status,
            payer_signature: row.payer_signature,
            payee_signature: row.payee_signature,
        })
    }
}

/// PostgreSQL repository for the trade log
pub struct PgTradeRepository {
    pool: PgPool,
}

impl PgTradeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TradeRepositoryTrait for PgTradeRepository {
    /// Append a trade. Trades are never updated afterwards.
    async fn create(&self, trade: &Trade) -> RepoResult<Trade> {
        let sql = format!(
            r#"
            INSERT INTO trades (
                trade_id, timestamp, payer_id, payee_id, items, total_value, status,
                payer_signature, payee_signature
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            TRADE_COLUMNS
        );

        let row = sqlx::query_as::<_, TradeRow>(&sql)
            .bind(trade.trade_id)
            .bind(trade.timestamp)
            .bind(trade.payer_id)
            .bind(trade.payee_id)
            .bind(Json(&trade.items))
            .bind(trade.total_value)
            .bind(trade.status.as_str())
            .bind(&trade.payer_signature)
            .bind(&trade.payee_signature)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn find_by_id(&self, trade_id: Uuid) -> RepoResult<Option<Trade>> {
        let sql = format!("SELECT {} FROM trades WHERE trade_id = $1", TRADE_COLUMNS);
        let row = sqlx::query_as::<_, TradeRow>(&sql)
            .bind(trade_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Trade::try_from).transpose()
    }

    async fn find_by_participant(&self, user_id: Uuid) -> RepoResult<Vec<Trade>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM trades
            WHERE payer_id = $1 OR payee_id = $1
            ORDER BY seq
            LIMIT $2
            "#,
            TRADE_COLUMNS
        );

        let rows = sqlx::query_as::<_, TradeRow>(&sql)
            .bind(user_id)
            .bind(MAX_QUERY_ROWS as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Trade::try_from).collect()
    }
}
