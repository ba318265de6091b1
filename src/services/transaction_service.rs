use crate::error::{AppError, AppResult};
use crate::models::{Transaction, TransactionCreate};
use crate::repositories::{ItemRepositoryTrait, TransactionRepositoryTrait};
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Ledger entries and the per-user activity feed
pub struct TransactionService {
    item_repo: Arc<dyn ItemRepositoryTrait>,
    transaction_repo: Arc<dyn TransactionRepositoryTrait>,
}

impl TransactionService {
    pub fn new(
        item_repo: Arc<dyn ItemRepositoryTrait>,
        transaction_repo: Arc<dyn TransactionRepositoryTrait>,
    ) -> Self {
        Self {
            item_repo,
            transaction_repo,
        }
    }

    pub async fn create_transaction(&self, req: TransactionCreate) -> AppResult<Transaction> {
        req.validate().map_err(AppError::Validation)?;

        let transaction = self.transaction_repo.create(&Transaction::new(req)).await?;
        info!(
            "Recorded {} transaction {} for user {}",
            transaction.transaction_type.as_str(),
            transaction.transaction_id,
            transaction.user_id
        );
        Ok(transaction)
    }

    pub async fn get_transaction(&self, transaction_id: &str) -> AppResult<Transaction> {
        self.transaction_repo
            .find_by_id(transaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))
    }

    /// Activity feed for a user, newest first.
    ///
    /// Every item the user owns shows up as a `deposit-<item_id>` entry
    /// next to the persisted transactions. Entries without a timestamp
    /// sort last; ties keep deposits ahead of persisted entries.
    pub async fn transaction_feed(&self, user_id: Uuid) -> AppResult<Vec<Transaction>> {
        let (items, persisted) = futures::try_join!(
            self.item_repo.find_by_owner(user_id),
            self.transaction_repo.find_by_user(user_id),
        )?;

        debug!(
            "Building feed for {}: {} deposits, {} transactions",
            user_id,
            items.len(),
            persisted.len()
        );

        let mut feed: Vec<Transaction> = items
            .iter()
            .map(Transaction::deposit_from_item)
            .chain(persisted)
            .collect();

        // Option orders None first, so reversing puts untimestamped entries last
        feed.sort_by_key(|t| Reverse(t.created_at));
        Ok(feed)
    }
}
