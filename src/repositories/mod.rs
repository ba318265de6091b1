//! Data access for users, items, trades and transactions.
//!
//! Each collection sits behind a trait so services take an injected store
//! handle. `Pg*Repository` types talk to PostgreSQL; [`InMemoryStore`]
//! implements every trait over process memory.

pub mod item_repository;
pub mod memory;
pub mod trade_repository;
pub mod transaction_repository;
pub mod user_repository;

pub use item_repository::PgItemRepository;
pub use memory::InMemoryStore;
pub use trade_repository::PgTradeRepository;
pub use transaction_repository::PgTransactionRepository;
pub use user_repository::PgUserRepository;

use crate::error::RepositoryError;
use crate::models::{Item, Trade, Transaction, User};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Page-size ceiling applied to every multi-row query
pub const MAX_QUERY_ROWS: usize = 1000;

pub type RepoResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Insert a new user. Fails with `Duplicate` when the username is taken.
    async fn create(&self, user: &User) -> RepoResult<User>;
    async fn find_by_id(&self, user_id: Uuid) -> RepoResult<Option<User>>;
    /// Exact, case-sensitive match
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    /// Overwrite the mutable profile fields of an existing user
    async fn update(&self, user: &User) -> RepoResult<User>;
}

/// Ownership rewrite applied to a single item during settlement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OwnershipChange {
    pub owner_id: Uuid,
    /// `None` leaves the stored share untouched
    pub share_percentage: Option<Decimal>,
    pub updated_at: NaiveDateTime,
}

#[async_trait]
pub trait ItemRepositoryTrait: Send + Sync {
    async fn create(&self, item: &Item) -> RepoResult<Item>;
    async fn find_by_id(&self, item_id: Uuid) -> RepoResult<Option<Item>>;
    async fn find_by_owner(&self, owner_id: Uuid) -> RepoResult<Vec<Item>>;
    async fn update(&self, item: &Item) -> RepoResult<Item>;
    /// Returns false when no item has this id
    async fn apply_ownership(&self, item_id: Uuid, change: OwnershipChange) -> RepoResult<bool>;
    /// Returns false when no item has this id
    async fn delete(&self, item_id: Uuid) -> RepoResult<bool>;
}

#[async_trait]
pub trait TradeRepositoryTrait: Send + Sync {
    async fn create(&self, trade: &Trade) -> RepoResult<Trade>;
    async fn find_by_id(&self, trade_id: Uuid) -> RepoResult<Option<Trade>>;
    /// Trades where the user is payer or payee, in storage order
    async fn find_by_participant(&self, user_id: Uuid) -> RepoResult<Vec<Trade>>;
}

#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    async fn create(&self, transaction: &Transaction) -> RepoResult<Transaction>;
    async fn find_by_id(&self, transaction_id: &str) -> RepoResult<Option<Transaction>>;
    async fn find_by_user(&self, user_id: Uuid) -> RepoResult<Vec<Transaction>>;
}
