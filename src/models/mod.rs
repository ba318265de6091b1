//! Domain models for the barter backend.
//!
//! Users, the items they deposit, the trades that move ownership shares
//! between them, and the transactions shown in their activity feed.

pub mod item;
pub mod trade;
pub mod transaction;
pub mod user;

// Re-export all models for convenient access
pub use item::{validate_share, Item, ItemCreate, ItemUpdate};
pub use trade::{SyncFailure, SyncSummary, Trade, TradeCreate, TradeItem, TradeStatus};
pub use transaction::{
    ItemDetails, SpentItem, Transaction, TransactionCreate, TransactionStatus, TransactionType,
    DEPOSIT_ID_PREFIX,
};
pub use user::{PersonalInfoUpdate, User, UserCreate, UserLogin};
