//! Process-local store used by tests and `STORE_BACKEND=memory`.
//!
//! Collections are append-ordered vectors so listings come back in the
//! same order Postgres returns them (`ORDER BY seq`).

use super::{
    ItemRepositoryTrait, OwnershipChange, RepoResult, TradeRepositoryTrait,
    TransactionRepositoryTrait, UserRepositoryTrait, MAX_QUERY_ROWS,
};
use crate::error::RepositoryError;
use crate::models::{Item, Trade, Transaction, User};
use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    items: RwLock<Vec<Item>>,
    trades: RwLock<Vec<Trade>>,
    transactions: RwLock<Vec<Transaction>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn trade_count(&self) -> usize {
        self.trades.read().await.len()
    }

    pub async fn item_count(&self) -> usize {
        self.items.read().await.len()
    }
}

#[async_trait]
impl UserRepositoryTrait for InMemoryStore {
    async fn create(&self, user: &User) -> RepoResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::Duplicate(format!(
                "username {} already exists",
                user.username
            )));
        }
        if users.iter().any(|u| u.user_id == user.user_id) {
            return Err(RepositoryError::Duplicate(format!("user {}", user.user_id)));
        }
        users.push(user.clone());
        Ok(user.clone())
    }

    async fn find_by_id(&self, user_id: Uuid) -> RepoResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn update(&self, user: &User) -> RepoResult<User> {
        let mut users = self.users.write().await;
        let stored = users
            .iter_mut()
            .find(|u| u.user_id == user.user_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("user {}", user.user_id)))?;
        *stored = user.clone();
        Ok(stored.clone())
    }
}

#[async_trait]
impl ItemRepositoryTrait for InMemoryStore {
    async fn create(&self, item: &Item) -> RepoResult<Item> {
        let mut items = self.items.write().await;
        if items.iter().any(|i| i.item_id == item.item_id) {
            return Err(RepositoryError::Duplicate(format!("item {}", item.item_id)));
        }
        items.push(item.clone());
        Ok(item.clone())
    }

    async fn find_by_id(&self, item_id: Uuid) -> RepoResult<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.iter().find(|i| i.item_id == item_id).cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<Item>> {
        let items = self.items.read().await;
        Ok(items
            .iter()
            .filter(|i| i.owner_id == owner_id)
            .take(MAX_QUERY_ROWS)
            .cloned()
            .collect())
    }

    async fn update(&self, item: &Item) -> RepoResult<Item> {
        let mut items = self.items.write().await;
        let stored = items
            .iter_mut()
            .find(|i| i.item_id == item.item_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("item {}", item.item_id)))?;
        stored.owner_id = item.owner_id;
        stored.share_percentage = item.share_percentage;
        stored.updated_at = item.updated_at;
        Ok(stored.clone())
    }

    async fn apply_ownership(&self, item_id: Uuid, change: OwnershipChange) -> RepoResult<bool> {
        let mut items = self.items.write().await;
        match items.iter_mut().find(|i| i.item_id == item_id) {
            Some(item) => {
                item.owner_id = change.owner_id;
                if let Some(share) = change.share_percentage {
                    item.share_percentage = share;
                }
                item.updated_at = change.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, item_id: Uuid) -> RepoResult<bool> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|i| i.item_id != item_id);
        Ok(items.len() < before)
    }
}

#[async_trait]
impl TradeRepositoryTrait for InMemoryStore {
    async fn create(&self, trade: &Trade) -> RepoResult<Trade> {
        let mut trades = self.trades.write().await;
        if trades.iter().any(|t| t.trade_id == trade.trade_id) {
            return Err(RepositoryError::Duplicate(format!("trade {}", trade.trade_id)));
        }
        trades.push(trade.clone());
        Ok(trade.clone())
    }

    async fn find_by_id(&self, trade_id: Uuid) -> RepoResult<Option<Trade>> {
        let trades = self.trades.read().await;
        Ok(trades.iter().find(|t| t.trade_id == trade_id).cloned())
    }

    async fn find_by_participant(&self, user_id: Uuid) -> RepoResult<Vec<Trade>> {
        let trades = self.trades.read().await;
        Ok(trades
            .iter()
            .filter(|t| t.involves(user_id))
            .take(MAX_QUERY_ROWS)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TransactionRepositoryTrait for InMemoryStore {
    async fn create(&self, transaction: &Transaction) -> RepoResult<Transaction> {
        let mut transactions = self.transactions.write().await;
        if transactions
            .iter()
            .any(|t| t.transaction_id == transaction.transaction_id)
        {
            return Err(RepositoryError::Duplicate(format!(
                "transaction {}",
                transaction.transaction_id
            )));
        }
        transactions.push(transaction.clone());
        Ok(transaction.clone())
    }

    async fn find_by_id(&self, transaction_id: &str) -> RepoResult<Option<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .iter()
            .find(|t| t.transaction_id == transaction_id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Transaction>> {
        let transactions = self.transactions.read().await;
        Ok(transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .take(MAX_QUERY_ROWS)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemCreate, UserCreate};
    use rust_decimal::Decimal;

    fn item_for(owner_id: Uuid) -> Item {
        Item::new(ItemCreate {
            owner_id,
            category: "shoes".into(),
            subcategory: "sneakers".into(),
            brand: "Nike".into(),
            condition: "good".into(),
            photo: String::new(),
            value: Decimal::new(27, 0),
            is_fractional: false,
            share_percentage: Decimal::ONE,
            parent_item_id: None,
        })
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = InMemoryStore::new();
        let req = UserCreate {
            username: "alice".into(),
            pin_hash: "h".into(),
            ..Default::default()
        };
        UserRepositoryTrait::create(&store, &User::new(req.clone()))
            .await
            .unwrap();
        let err = UserRepositoryTrait::create(&store, &User::new(req))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_apply_ownership_keeps_share_when_absent() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let mut item = item_for(owner);
        item.share_percentage = Decimal::new(4, 1);
        ItemRepositoryTrait::create(&store, &item).await.unwrap();

        let new_owner = Uuid::new_v4();
        let change = OwnershipChange {
            owner_id: new_owner,
            share_percentage: None,
            updated_at: chrono::Utc::now().naive_utc(),
        };
        assert!(store.apply_ownership(item.item_id, change).await.unwrap());
        assert!(!store.apply_ownership(Uuid::new_v4(), change).await.unwrap());

        let stored = ItemRepositoryTrait::find_by_id(&store, item.item_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.owner_id, new_owner);
        assert_eq!(stored.share_percentage, Decimal::new(4, 1));
    }

    #[tokio::test]
    async fn test_listing_keeps_insertion_order() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let first = item_for(owner);
        let second = item_for(owner);
        ItemRepositoryTrait::create(&store, &first).await.unwrap();
        ItemRepositoryTrait::create(&store, &item_for(Uuid::new_v4()))
            .await
            .unwrap();
        ItemRepositoryTrait::create(&store, &second).await.unwrap();

        let owned = store.find_by_owner(owner).await.unwrap();
        let ids: Vec<Uuid> = owned.iter().map(|i| i.item_id).collect();
        assert_eq!(ids, vec![first.item_id, second.item_id]);
        assert_eq!(store.item_count().await, 3);
    }
}
