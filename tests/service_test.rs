mod helpers;

use barter_backend::models::*;
use barter_backend::AppError;
use chrono::Duration;
use helpers::*;
use rust_decimal::Decimal;
use uuid::Uuid;

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_register_and_fetch_user() {
    let app = TestApp::new();
    let user = app
        .state
        .users
        .register(user_request("alice", "hash-a"))
        .await
        .unwrap();

    let by_id = app.state.users.get_user(user.user_id).await.unwrap();
    let by_name = app.state.users.get_user_by_username("alice").await.unwrap();
    assert_eq!(by_id, user);
    assert_eq!(by_name, user);
    assert!(!user.biometric_enabled);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new();
    app.state
        .users
        .register(user_request("alice", "hash-a"))
        .await
        .unwrap();

    let err = app
        .state
        .users
        .register(user_request("alice", "other"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(err.status_code(), 409);

    // Usernames are case-sensitive
    assert!(app
        .state
        .users
        .register(user_request("Alice", "hash-a"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_register_requires_username() {
    let app = TestApp::new();
    let err = app
        .state
        .users
        .register(user_request("  ", "hash"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_login() {
    let app = TestApp::new();
    let user = app
        .state
        .users
        .register(user_request("alice", "hash-a"))
        .await
        .unwrap();

    let logged_in = app
        .state
        .users
        .login(UserLogin {
            username: "alice".into(),
            pin_hash: "hash-a".into(),
        })
        .await
        .unwrap();
    assert_eq!(logged_in.user_id, user.user_id);

    for (username, pin_hash) in [("alice", "wrong"), ("mallory", "hash-a"), ("ALICE", "hash-a")] {
        let err = app
            .state
            .users
            .login(UserLogin {
                username: username.into(),
                pin_hash: pin_hash.into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(err.detail(), "Invalid credentials");
    }
}

#[tokio::test]
async fn test_update_personal_info() {
    let app = TestApp::new();
    let mut req = user_request("alice", "hash-a");
    req.city = Some("Austin".into());
    req.email = Some("alice@example.com".into());
    let user = app.state.users.register(req).await.unwrap();

    let patch: PersonalInfoUpdate = serde_json::from_value(serde_json::json!({
        "first_name": "Alice",
        "email": null
    }))
    .unwrap();
    let updated = app
        .state
        .users
        .update_personal_info(user.user_id, patch)
        .await
        .unwrap();

    assert_eq!(updated.first_name.as_deref(), Some("Alice"));
    assert_eq!(updated.email, None);
    assert_eq!(updated.city.as_deref(), Some("Austin"));

    let err = app
        .state
        .users
        .update_personal_info(Uuid::new_v4(), PersonalInfoUpdate::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_missing_user_not_found() {
    let app = TestApp::new();
    assert!(app
        .state
        .users
        .get_user(Uuid::new_v4())
        .await
        .unwrap_err()
        .is_not_found());
    assert!(app
        .state
        .users
        .get_user_by_username("ghost")
        .await
        .unwrap_err()
        .is_not_found());
}

// ============================================================================
// Items
// ============================================================================

#[tokio::test]
async fn test_item_lifecycle() {
    let app = TestApp::new();
    let owner = Uuid::new_v4();

    let item = app
        .state
        .items
        .create_item(item_request(owner, "Nike", Decimal::new(56, 0)))
        .await
        .unwrap();
    assert_eq!(item.share_percentage, Decimal::ONE);
    assert!(!item.is_fractional);

    let owned = app.state.items.list_items_for_owner(owner).await.unwrap();
    assert_eq!(owned, vec![item.clone()]);

    let new_owner = Uuid::new_v4();
    let updated = app
        .state
        .items
        .update_item(
            item.item_id,
            ItemUpdate {
                share_percentage: Some(Decimal::new(4, 1)),
                owner_id: Some(new_owner),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.owner_id, new_owner);
    assert_eq!(updated.share_percentage, Decimal::new(4, 1));
    assert_eq!(updated.brand, "Nike");

    app.state.items.delete_item(item.item_id).await.unwrap();
    assert!(app
        .state
        .items
        .get_item(item.item_id)
        .await
        .unwrap_err()
        .is_not_found());
    assert!(app
        .state
        .items
        .delete_item(item.item_id)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_item_update_rejects_share_out_of_range() {
    let app = TestApp::new();
    let item = app
        .state
        .items
        .create_item(item_request(Uuid::new_v4(), "Nike", Decimal::new(56, 0)))
        .await
        .unwrap();

    let err = app
        .state
        .items
        .update_item(
            item.item_id,
            ItemUpdate {
                share_percentage: Some(Decimal::new(12, 1)),
                owner_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(app.item(item.item_id).await.share_percentage, Decimal::ONE);
}

// ============================================================================
// Transactions and the projected feed
// ============================================================================

fn payment(user_id: Uuid, amount: Decimal) -> TransactionCreate {
    TransactionCreate {
        user_id,
        transaction_type: TransactionType::Payment,
        amount,
        item_id: None,
        item_details: None,
        merchant_name: Some("Coffee Shop".into()),
        website_name: None,
        status: None,
        description: None,
        spent_items: None,
    }
}

#[tokio::test]
async fn test_create_and_fetch_transaction() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();

    let tx = app
        .state
        .transactions
        .create_transaction(payment(user_id, Decimal::new(45, 0)))
        .await
        .unwrap();
    assert_eq!(tx.status, TransactionStatus::Completed);

    let fetched = app
        .state
        .transactions
        .get_transaction(&tx.transaction_id)
        .await
        .unwrap();
    assert_eq!(fetched, tx);

    let err = app
        .state
        .transactions
        .get_transaction("missing")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_feed_merges_deposits_and_transactions_newest_first() {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();

    let older = app
        .state
        .items
        .create_item(item_request(user_id, "Nike", Decimal::new(56, 0)))
        .await
        .unwrap();
    let newer = app
        .state
        .items
        .create_item(item_request(user_id, "Adidas", Decimal::new(49, 0)))
        .await
        .unwrap();
    let paid = app
        .state
        .transactions
        .create_transaction(payment(user_id, Decimal::new(20, 0)))
        .await
        .unwrap();

    let feed = app.state.transactions.transaction_feed(user_id).await.unwrap();
    assert_eq!(feed.len(), 3);

    let deposits: Vec<&Transaction> = feed.iter().filter(|t| t.is_synthetic()).collect();
    assert_eq!(deposits.len(), 2);
    for d in &deposits {
        assert!(d.transaction_id.starts_with("deposit-"));
        assert_eq!(d.transaction_type, TransactionType::Deposit);
    }
    assert!(feed.iter().any(|t| t.transaction_id == paid.transaction_id));
    assert!(feed
        .iter()
        .any(|t| t.transaction_id == format!("deposit-{}", older.item_id)));
    assert!(feed
        .iter()
        .any(|t| t.description.as_deref() == Some("Deposited Adidas sneakers")
            && t.item_id == Some(newer.item_id)));

    // Sorted descending by created_at
    for pair in feed.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[tokio::test]
async fn test_feed_places_untimestamped_entries_last() {
    use barter_backend::repositories::TransactionRepositoryTrait;

    let app = TestApp::new();
    let user_id = Uuid::new_v4();

    let mut undated = Transaction::new(payment(user_id, Decimal::new(5, 0)));
    undated.created_at = None;
    app.store.create(&undated).await.unwrap();

    let mut dated = Transaction::new(payment(user_id, Decimal::new(7, 0)));
    dated.created_at = Some(chrono::Utc::now().naive_utc() - Duration::days(30));
    app.store.create(&dated).await.unwrap();

    app.state
        .items
        .create_item(item_request(user_id, "Puma", Decimal::new(42, 0)))
        .await
        .unwrap();

    let feed = app.state.transactions.transaction_feed(user_id).await.unwrap();
    assert_eq!(feed.len(), 3);
    assert!(feed[0].is_synthetic());
    assert_eq!(feed[1].transaction_id, dated.transaction_id);
    assert_eq!(feed[2].transaction_id, undated.transaction_id);
}

#[tokio::test]
async fn test_feed_for_unknown_user_is_empty() {
    let app = TestApp::new();
    let feed = app
        .state
        .transactions
        .transaction_feed(Uuid::new_v4())
        .await
        .unwrap();
    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_reads_are_idempotent() {
    let app = TestApp::new();
    let f = TestFixtures::create(&app).await;
    app.state
        .settlement
        .settle_trade(trade_request(&f.alice_item, f.bob.user_id, Decimal::new(5, 1)))
        .await
        .unwrap();

    let feed_a = app.state.transactions.transaction_feed(f.bob.user_id).await.unwrap();
    let feed_b = app.state.transactions.transaction_feed(f.bob.user_id).await.unwrap();
    assert_eq!(feed_a, feed_b);

    let trades_a = app.state.settlement.list_trades_for_user(f.bob.user_id).await.unwrap();
    let trades_b = app.state.settlement.list_trades_for_user(f.bob.user_id).await.unwrap();
    assert_eq!(trades_a, trades_b);

    let items_a = app.state.items.list_items_for_owner(f.bob.user_id).await.unwrap();
    let items_b = app.state.items.list_items_for_owner(f.bob.user_id).await.unwrap();
    assert_eq!(items_a, items_b);
}
