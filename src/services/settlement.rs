//! Trade settlement: ownership rewrites for live trades and offline batches

use super::AuditTrailService;
use crate::error::{AppError, AppResult};
use crate::models::{SyncSummary, Trade, TradeCreate};
use crate::repositories::{ItemRepositoryTrait, OwnershipChange, TradeRepositoryTrait};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Settlement service for handling trades between users
pub struct SettlementService {
    item_repo: Arc<dyn ItemRepositoryTrait>,
    trade_repo: Arc<dyn TradeRepositoryTrait>,
    audit: Option<Arc<AuditTrailService>>,
}

impl SettlementService {
    pub fn new(
        item_repo: Arc<dyn ItemRepositoryTrait>,
        trade_repo: Arc<dyn TradeRepositoryTrait>,
        audit: Option<Arc<AuditTrailService>>,
    ) -> Self {
        Self {
            item_repo,
            trade_repo,
            audit,
        }
    }

    /// Settle a live trade.
    ///
    /// Every trade item reassigns its item to `new_owner` and stores the
    /// remaining share (`1 - transferred`, or 0 on a full transfer). Item
    /// writes happen before the trade is recorded; a store failure aborts
    /// the call and leaves earlier writes in place.
    pub async fn settle_trade(&self, req: TradeCreate) -> AppResult<Trade> {
        req.validate().map_err(AppError::Validation)?;

        let trade = Trade::new(req);
        info!(
            "Settling trade {}: payer={}, payee={}, items={}",
            trade.trade_id,
            trade.payer_id,
            trade.payee_id,
            trade.items.len()
        );

        let now = chrono::Utc::now().naive_utc();
        for trade_item in &trade.items {
            let change = OwnershipChange {
                owner_id: trade_item.new_owner,
                share_percentage: Some(trade_item.remaining_share()),
                updated_at: now,
            };
            if !self.item_repo.apply_ownership(trade_item.item_id, change).await? {
                warn!(
                    "Trade {}: item {} not found, skipping ownership update",
                    trade.trade_id, trade_item.item_id
                );
            }
        }

        let trade = self.trade_repo.create(&trade).await?;
        info!("Trade {} settled", trade.trade_id);

        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_trade_settled(&trade).await {
                warn!("Failed to write audit entry for trade {}: {}", trade.trade_id, e);
            }
        }

        Ok(trade)
    }

    /// Replay trades queued while a client was offline.
    ///
    /// Each submission is parsed, validated and stored on its own; a
    /// failure is recorded in the summary and the batch continues. Synced
    /// trades only reassign the owner, the stored share is left as is.
    pub async fn sync_offline_trades(&self, submissions: Vec<serde_json::Value>) -> SyncSummary {
        let total = submissions.len();
        let mut summary = SyncSummary::default();

        for (index, submission) in submissions.into_iter().enumerate() {
            match self.sync_one(submission).await {
                Ok(trade_id) => summary.record_success(trade_id),
                Err(e) => {
                    let error = e.detail();
                    warn!("Offline trade {} of {} failed to sync: {}", index, total, error);
                    if let Some(audit) = &self.audit {
                        if let Err(e) = audit.log_trade_sync_failed(index, &error).await {
                            warn!("Failed to write audit entry: {}", e);
                        }
                    }
                    summary.record_failure(index, error);
                }
            }
        }

        info!(
            "Offline sync finished: {} synced, {} failed",
            summary.synced_count, summary.failed_count
        );

        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_trades_synced(&summary).await {
                warn!("Failed to write audit entry: {}", e);
            }
        }

        summary
    }

    async fn sync_one(&self, submission: serde_json::Value) -> AppResult<Uuid> {
        let req: TradeCreate = serde_json::from_value(submission)
            .map_err(|e| AppError::Validation(format!("Malformed trade: {}", e)))?;
        req.validate().map_err(AppError::Validation)?;

        let trade = self.trade_repo.create(&Trade::new(req)).await?;

        let now = chrono::Utc::now().naive_utc();
        for trade_item in &trade.items {
            let change = OwnershipChange {
                owner_id: trade_item.new_owner,
                share_percentage: None,
                updated_at: now,
            };
            if !self.item_repo.apply_ownership(trade_item.item_id, change).await? {
                warn!(
                    "Synced trade {}: item {} not found",
                    trade.trade_id, trade_item.item_id
                );
            }
        }

        Ok(trade.trade_id)
    }

    /// Trades where the user is payer or payee, oldest first
    pub async fn list_trades_for_user(&self, user_id: Uuid) -> AppResult<Vec<Trade>> {
        Ok(self.trade_repo.find_by_participant(user_id).await?)
    }

    pub async fn get_trade(&self, trade_id: Uuid) -> AppResult<Trade> {
        self.trade_repo
            .find_by_id(trade_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Trade {} not found", trade_id)))
    }
}
