//! Barter Backend Library
//!
//! This module exposes the backend components for use by tests and other consumers.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod http_service;
pub mod models;
pub mod repositories;
pub mod services;
pub mod valuation;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use repositories::{
    InMemoryStore, ItemRepositoryTrait, PgItemRepository, PgTradeRepository,
    PgTransactionRepository, PgUserRepository, TradeRepositoryTrait, TransactionRepositoryTrait,
    UserRepositoryTrait,
};
use services::{
    AuditTrailService, DepositAnalysisService, ItemService, SettlementService,
    TransactionService, UserService,
};
use std::sync::Arc;

/// Store handles shared by every service
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepositoryTrait>,
    pub items: Arc<dyn ItemRepositoryTrait>,
    pub trades: Arc<dyn TradeRepositoryTrait>,
    pub transactions: Arc<dyn TransactionRepositoryTrait>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            items: Arc::new(PgItemRepository::new(pool.clone())),
            trades: Arc::new(PgTradeRepository::new(pool.clone())),
            transactions: Arc::new(PgTransactionRepository::new(pool)),
        }
    }

    /// Every collection served by the same in-memory store
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            users: store.clone(),
            items: store.clone(),
            trades: store.clone(),
            transactions: store,
        }
    }
}

/// Application state containing all services
pub struct AppState {
    pub config: AppConfig,
    pub users: UserService,
    pub items: ItemService,
    pub settlement: SettlementService,
    pub transactions: TransactionService,
    pub deposit_analysis: DepositAnalysisService,
}

impl AppState {
    /// Wire services over the given repositories. Opens the audit trail
    /// when `audit_log_dir` is configured.
    pub fn new(config: AppConfig, repos: Repositories) -> AppResult<Self> {
        let audit = match &config.audit_log_dir {
            Some(dir) => Some(Arc::new(AuditTrailService::new(dir)?)),
            None => None,
        };

        Ok(Self {
            users: UserService::new(repos.users.clone()),
            items: ItemService::new(repos.items.clone()),
            settlement: SettlementService::new(repos.items.clone(), repos.trades.clone(), audit),
            transactions: TransactionService::new(repos.items.clone(), repos.transactions.clone()),
            deposit_analysis: DepositAnalysisService::new(config.vision.clone())?,
            config,
        })
    }
}
