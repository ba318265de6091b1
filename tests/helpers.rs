#![allow(dead_code)]

use barter_backend::config::{AppConfig, DatabaseConfig};
use barter_backend::database::{create_pool, run_migrations};
use barter_backend::models::*;
use barter_backend::repositories::*;
use barter_backend::{AppState, Repositories};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Application wired over a fresh in-memory store
pub struct TestApp {
    pub store: Arc<InMemoryStore>,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Same as `new`, with the audit trail written under `dir`
    pub fn with_audit(dir: &Path) -> Self {
        let config = AppConfig {
            audit_log_dir: Some(dir.to_path_buf()),
            ..AppConfig::default()
        };
        Self::with_config(config)
    }

    fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::new(config, Repositories::in_memory(store.clone()))
            .expect("Failed to build app state");
        Self {
            store,
            state: Arc::new(state),
        }
    }

    pub async fn item(&self, item_id: Uuid) -> Item {
        ItemRepositoryTrait::find_by_id(self.store.as_ref(), item_id)
            .await
            .expect("Failed to read item")
            .expect("Item should exist")
    }
}

/// Test database configuration. `None` when TEST_DATABASE_URL is unset.
pub struct TestDatabase {
    pub pool: PgPool,
    pub repos: Repositories,
}

impl TestDatabase {
    pub async fn connect() -> Option<Self> {
        let database_url = std::env::var("TEST_DATABASE_URL").ok()?;

        let config = DatabaseConfig {
            url: database_url,
            max_connections: 5,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 300,
            max_lifetime_secs: 600,
            test_before_acquire: true,
            migrations_path: "./migrations".to_string(),
        };

        let pool = create_pool(&config)
            .await
            .expect("Failed to create test database pool");

        run_migrations(&pool, Some(&config.migrations_path))
            .await
            .expect("Failed to run migrations");

        Some(Self {
            repos: Repositories::postgres(pool.clone()),
            pool,
        })
    }

}

/// Run a test against Postgres, or skip it when no database is configured.
///
/// Tests share one database, so each one works with fresh ids instead of
/// truncating tables.
pub async fn with_test_db<F, Fut>(test: F)
where
    F: FnOnce(TestDatabase) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let Some(db) = TestDatabase::connect().await else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    test(db).await;
}

/// Assert that two items are equal (ignoring timestamps)
pub fn assert_items_equal(a: &Item, b: &Item) {
    assert_eq!(a.item_id, b.item_id);
    assert_eq!(a.owner_id, b.owner_id);
    assert_eq!(a.brand, b.brand);
    assert_eq!(a.value, b.value);
    assert_eq!(a.share_percentage, b.share_percentage);
    assert_eq!(a.parent_item_id, b.parent_item_id);
}

/// Assert that two trades are equal (ignoring timestamps)
pub fn assert_trades_equal(a: &Trade, b: &Trade) {
    assert_eq!(a.trade_id, b.trade_id);
    assert_eq!(a.payer_id, b.payer_id);
    assert_eq!(a.payee_id, b.payee_id);
    assert_eq!(a.items, b.items);
    assert_eq!(a.total_value, b.total_value);
    assert_eq!(a.status, b.status);
}

/// Two registered users, each holding one item
pub struct TestFixtures {
    pub alice: User,
    pub bob: User,
    pub alice_item: Item,
    pub bob_item: Item,
}

impl TestFixtures {
    pub async fn create(app: &TestApp) -> Self {
        let alice = app
            .state
            .users
            .register(user_request("alice", "hash-a"))
            .await
            .expect("Failed to create alice");
        let bob = app
            .state
            .users
            .register(user_request("bob", "hash-b"))
            .await
            .expect("Failed to create bob");

        let alice_item = app
            .state
            .items
            .create_item(item_request(alice.user_id, "Nike", Decimal::new(56, 0)))
            .await
            .expect("Failed to create alice's item");
        let bob_item = app
            .state
            .items
            .create_item(item_request(bob.user_id, "Adidas", Decimal::new(49, 0)))
            .await
            .expect("Failed to create bob's item");

        Self {
            alice,
            bob,
            alice_item,
            bob_item,
        }
    }
}

pub fn user_request(username: &str, pin_hash: &str) -> UserCreate {
    UserCreate {
        username: username.to_string(),
        pin_hash: pin_hash.to_string(),
        ..Default::default()
    }
}

pub fn item_request(owner_id: Uuid, brand: &str, value: Decimal) -> ItemCreate {
    ItemCreate {
        owner_id,
        category: "shoes".to_string(),
        subcategory: "sneakers".to_string(),
        brand: brand.to_string(),
        condition: "good".to_string(),
        photo: String::new(),
        value,
        is_fractional: false,
        share_percentage: Decimal::ONE,
        parent_item_id: None,
    }
}

/// A trade moving `share` of `item` from its owner to `to`
pub fn trade_request(item: &Item, to: Uuid, share: Decimal) -> TradeCreate {
    TradeCreate {
        payer_id: to,
        payee_id: item.owner_id,
        items: vec![TradeItem {
            item_id: item.item_id,
            share_percentage: share,
            value: (item.value * share).round_dp(2),
            previous_owner: item.owner_id,
            new_owner: to,
        }],
        total_value: (item.value * share).round_dp(2),
        payer_signature: "payer-sig".to_string(),
        payee_signature: "payee-sig".to_string(),
    }
}
